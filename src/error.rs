use std::path::PathBuf;
use thiserror::Error;

pub type AssemblyResult<T> = std::result::Result<T, AssemblyError>;

/// Failures surfaced by page assembly.
///
/// Rejected range edits are not errors; `PageRange` setters report them
/// by returning `false`.
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// The source could not be read or is not a paginated document.
    #[error("Failed to open {}: {message}", .path.display())]
    SourceOpen { path: PathBuf, message: String },

    /// Two extracts were registered with the same destination.
    #[error("Destination already used by another extract: {}", .path.display())]
    DuplicateDestination { path: PathBuf },

    /// The same file was added twice to a working set that forbids it.
    #[error("Source already added: {}", .path.display())]
    DuplicateSource { path: PathBuf },

    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },

    /// Writing the output failed; nothing was left at the destination.
    #[error("Failed to save {}: {message}", .path.display())]
    Save { path: PathBuf, message: String },
}
