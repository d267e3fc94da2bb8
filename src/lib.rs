//! Assemble new PDFs from page ranges of existing ones.
//!
//! Sources are described as [`SourceDocument`]s (a file plus its selected
//! pages) and split targets as [`ExtractSpec`]s. [`AssemblyEngine`] turns
//! them into output documents by one of four operations: merge, split,
//! interleave and booklet reorder. Document I/O goes through the
//! [`DocumentPort`] traits; [`LopdfPort`] is the lopdf implementation.

pub mod assembly;
pub mod commands;
pub mod error;
pub mod mcp;
pub mod page_range;
pub mod pdf;

pub use assembly::source::{ExtractSpec, Selection, SourceDocument, SourceList, SplitJob};
pub use assembly::{Assembly, AssemblyEngine, OutputSummary};
pub use error::{AssemblyError, AssemblyResult};
pub use page_range::PageRange;
pub use pdf::port::DocumentPort;
pub use pdf::LopdfPort;
