use crate::error::{AssemblyError, AssemblyResult};
use crate::page_range::PageRange;
use crate::pdf::port::{DocumentPort, SourceHandle};
use std::path::{Path, PathBuf};

/// Something carrying an editable page selection within one document.
///
/// Edits follow [`PageRange`]: an edit that would leave the selection
/// invalid is refused and the previous selection kept.
pub trait Selection {
    fn range(&self) -> PageRange;

    fn set_start(&mut self, page: u32) -> bool;

    fn set_end(&mut self, page: u32) -> bool;

    /// Select `range`, which must belong to a document with the same page
    /// count. Returns whether the selection now equals `range`.
    fn select(&mut self, range: PageRange) -> bool {
        if range.page_count() != self.range().page_count() {
            return false;
        }
        // Order the two edits so that neither crosses the other bound
        if range.end() >= self.range().start() {
            self.set_end(range.end());
            self.set_start(range.start());
        } else {
            self.set_start(range.start());
            self.set_end(range.end());
        }
        self.range() == range
    }
}

/// A source file with its page count and the pages selected from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    path: PathBuf,
    range: PageRange,
}

impl SourceDocument {
    /// Open `path` once to learn its page count. The document is released
    /// before this returns; the full document is selected.
    pub fn open<P: DocumentPort>(port: &P, path: impl AsRef<Path>) -> AssemblyResult<Self> {
        let path = path.as_ref();
        let page_count = port.open(path)?.page_count();
        let range = PageRange::full(page_count).ok_or_else(|| AssemblyError::SourceOpen {
            path: path.to_path_buf(),
            message: "document has no pages".to_string(),
        })?;

        Ok(SourceDocument {
            path: path.to_path_buf(),
            range,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> u32 {
        self.range.page_count()
    }
}

impl Selection for SourceDocument {
    fn range(&self) -> PageRange {
        self.range
    }

    fn set_start(&mut self, page: u32) -> bool {
        self.range.set_start(page)
    }

    fn set_end(&mut self, page: u32) -> bool {
        self.range.set_end(page)
    }
}

/// An ordered working set of sources, as used by merge and interleave
#[derive(Debug, Clone, Default)]
pub struct SourceList {
    sources: Vec<SourceDocument>,
    allow_duplicates: bool,
}

impl SourceList {
    /// A list that refuses a second entry for a path it already holds
    pub fn new() -> Self {
        Self::default()
    }

    /// A list that accepts the same file more than once, each entry with
    /// its own selection
    pub fn with_duplicates() -> Self {
        SourceList {
            sources: Vec::new(),
            allow_duplicates: true,
        }
    }

    /// Append a source, returning its index
    pub fn add(&mut self, source: SourceDocument) -> AssemblyResult<usize> {
        if !self.allow_duplicates && self.sources.iter().any(|s| s.path == source.path) {
            return Err(AssemblyError::DuplicateSource { path: source.path });
        }
        self.sources.push(source);
        Ok(self.sources.len() - 1)
    }

    pub fn remove(&mut self, index: usize) -> Option<SourceDocument> {
        (index < self.sources.len()).then(|| self.sources.remove(index))
    }

    /// Swap the source with its predecessor. Returns the new index, or
    /// `None` (leaving the list unchanged) if it is already first.
    pub fn move_up(&mut self, index: usize) -> Option<usize> {
        if index == 0 || index >= self.sources.len() {
            return None;
        }
        self.sources.swap(index - 1, index);
        Some(index - 1)
    }

    /// Swap the source with its successor. Returns the new index, or
    /// `None` (leaving the list unchanged) if it is already last.
    pub fn move_down(&mut self, index: usize) -> Option<usize> {
        if index + 1 >= self.sources.len() {
            return None;
        }
        self.sources.swap(index, index + 1);
        Some(index + 1)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SourceDocument> {
        self.sources.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDocument> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn can_merge(&self) -> bool {
        self.sources.len() > 1
    }

    pub fn can_interleave(&self) -> bool {
        self.sources.len() > 1
    }
}

/// One requested split output: a destination and the pages it receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSpec {
    destination: PathBuf,
    range: PageRange,
}

impl ExtractSpec {
    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

impl Selection for ExtractSpec {
    fn range(&self) -> PageRange {
        self.range
    }

    fn set_start(&mut self, page: u32) -> bool {
        self.range.set_start(page)
    }

    fn set_end(&mut self, page: u32) -> bool {
        self.range.set_end(page)
    }
}

/// A document to split together with the extracts registered against it.
///
/// Extracts may overlap, but no two share a destination.
#[derive(Debug, Clone)]
pub struct SplitJob {
    source: SourceDocument,
    extracts: Vec<ExtractSpec>,
}

impl SplitJob {
    pub fn new(source: SourceDocument) -> Self {
        SplitJob {
            source,
            extracts: Vec::new(),
        }
    }

    pub fn source(&self) -> &SourceDocument {
        &self.source
    }

    /// Register an extract covering the whole source. Fails if another
    /// extract already writes to `destination` (compared case-insensitively).
    pub fn add_extract(
        &mut self,
        destination: impl Into<PathBuf>,
    ) -> AssemblyResult<&mut ExtractSpec> {
        let destination = destination.into();
        let key = destination_key(&destination);
        if self
            .extracts
            .iter()
            .any(|e| destination_key(&e.destination) == key)
        {
            return Err(AssemblyError::DuplicateDestination { path: destination });
        }

        let range = self.source.range.whole_document();
        self.extracts.push(ExtractSpec { destination, range });
        let last = self.extracts.len() - 1;
        Ok(&mut self.extracts[last])
    }

    pub fn remove_extract(&mut self, index: usize) -> Option<ExtractSpec> {
        (index < self.extracts.len()).then(|| self.extracts.remove(index))
    }

    pub fn extracts(&self) -> &[ExtractSpec] {
        &self.extracts
    }

    pub fn extract_mut(&mut self, index: usize) -> Option<&mut ExtractSpec> {
        self.extracts.get_mut(index)
    }

    pub fn can_split(&self) -> bool {
        !self.extracts.is_empty()
    }
}

fn destination_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}
