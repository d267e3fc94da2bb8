//! Page container abstraction used by the assembly engine.
//!
//! The engine only ever opens documents, pulls pages out of them, appends
//! those pages to fresh documents and saves the result. Keeping that
//! surface behind traits lets the engine run against lopdf in the binary
//! and against an in-memory recorder in tests.

use crate::error::AssemblyResult;
use std::path::Path;

/// Opens source documents and creates empty output documents.
pub trait DocumentPort {
    /// Handle to one page of an opened source. Moved into exactly one
    /// output by [`OutputDocument::append_page`].
    type Page;

    /// An opened source document. Dropping it releases the document.
    type Source: SourceHandle<Page = Self::Page>;

    type Output: OutputDocument<Page = Self::Page>;

    /// Open a paginated document, failing if it is unreadable or has no pages.
    fn open(&self, path: &Path) -> AssemblyResult<Self::Source>;

    fn new_document(&self) -> Self::Output;
}

pub trait SourceHandle {
    type Page;

    fn page_count(&self) -> u32;

    /// Page handle for a 1-based page number
    fn page(&self, number: u32) -> AssemblyResult<Self::Page>;
}

pub trait OutputDocument {
    type Page;

    fn append_page(&mut self, page: Self::Page);

    fn page_count(&self) -> u32;

    /// Write the document to `path`. On failure nothing is left at `path`.
    fn save(&mut self, path: &Path) -> AssemblyResult<()>;
}
