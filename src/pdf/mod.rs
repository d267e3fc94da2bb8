pub mod document;
pub mod port;

pub use document::{LopdfPort, PdfDocument, PdfInfo};
