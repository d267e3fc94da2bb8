//! Page assembly: building new documents out of page ranges of existing ones.
//!
//! The engine is stateless between calls. Every source it opens is held
//! as an owned handle and released when the handle drops, which happens on
//! every way out of an operation, including early returns on error.

pub mod order;
pub mod source;

use crate::error::AssemblyResult;
use crate::pdf::port::{DocumentPort, OutputDocument, SourceHandle};
use order::{booklet_order, RoundRobin};
use serde::Serialize;
use source::{Selection, SourceDocument, SourceList, SplitJob};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// A document written by an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSummary {
    pub path: PathBuf,
    pub page_count: u32,
}

/// What an operation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembly {
    Written(Vec<OutputSummary>),
    /// The operation's precondition did not hold, so nothing was touched
    Skipped(&'static str),
}

impl Assembly {
    pub fn outputs(&self) -> &[OutputSummary] {
        match self {
            Assembly::Written(outputs) => outputs,
            Assembly::Skipped(_) => &[],
        }
    }
}

pub struct AssemblyEngine<P> {
    port: P,
}

impl<P: DocumentPort> AssemblyEngine<P> {
    pub fn new(port: P) -> Self {
        AssemblyEngine { port }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Concatenate the selected pages of each source, in list order, into
    /// one document at `output`
    pub fn merge(&self, sources: &SourceList, output: &Path) -> AssemblyResult<Assembly> {
        if !sources.can_merge() {
            return Ok(skip("merge needs at least two sources"));
        }

        let mut merged = self.port.new_document();
        for source in sources.iter() {
            let opened = self.port.open(source.path())?;
            for page in source.range().pages() {
                merged.append_page(opened.page(page)?);
            }
            log::debug!(
                "Appended {} page(s) ({}) of {}",
                source.range().count(),
                source.range(),
                source.path().display()
            );
        }
        merged.save(output)?;

        log::info!(
            "Merged {} files ({} pages) into {}",
            sources.len(),
            merged.page_count(),
            output.display()
        );
        Ok(written(output, merged.page_count()))
    }

    /// Write each extract of `job` to its destination. The source is opened
    /// once and shared by all extracts. Stops at the first extract that
    /// fails; extracts saved before it are kept.
    pub fn split(&self, job: &SplitJob) -> AssemblyResult<Assembly> {
        if !job.can_split() {
            return Ok(skip("split needs at least one extract"));
        }

        let source = job.source();
        let opened = self.port.open(source.path())?;

        let mut outputs = Vec::with_capacity(job.extracts().len());
        for extract in job.extracts() {
            let mut output = self.port.new_document();
            for page in extract.range().pages() {
                output.append_page(opened.page(page)?);
            }
            output.save(extract.destination())?;
            log::debug!(
                "Extracted pages {} to {}",
                extract.range(),
                extract.destination().display()
            );
            outputs.push(OutputSummary {
                path: extract.destination().to_path_buf(),
                page_count: output.page_count(),
            });
        }

        log::info!(
            "Split {} into {} extract(s)",
            source.path().display(),
            outputs.len()
        );
        Ok(Assembly::Written(outputs))
    }

    /// Take one selected page from each source in turn until all are used
    /// up. Sources with fewer pages drop out while the rest continue.
    pub fn interleave(&self, sources: &SourceList, output: &Path) -> AssemblyResult<Assembly> {
        if !sources.can_interleave() {
            return Ok(skip("interleave needs at least two sources"));
        }

        // Every source stays open until the output is saved
        let mut opened = Vec::with_capacity(sources.len());
        let mut queues = Vec::with_capacity(sources.len());
        for source in sources.iter() {
            let document = self.port.open(source.path())?;
            let queue = source
                .range()
                .pages()
                .map(|page| document.page(page))
                .collect::<AssemblyResult<VecDeque<_>>>()?;
            queues.push(queue);
            opened.push(document);
        }

        let mut interleaved = self.port.new_document();
        for page in RoundRobin::new(queues) {
            interleaved.append_page(page);
        }
        interleaved.save(output)?;
        drop(opened);

        log::info!(
            "Interleaved {} files ({} pages) into {}",
            sources.len(),
            interleaved.page_count(),
            output.display()
        );
        Ok(written(output, interleaved.page_count()))
    }

    /// Reorder the whole of `source` for booklet printing: 1, n, 2, n-1, ...
    /// The source's page selection is ignored.
    pub fn booklet_reorder(
        &self,
        source: &SourceDocument,
        output: &Path,
    ) -> AssemblyResult<Assembly> {
        let opened = self.port.open(source.path())?;

        let mut booklet = self.port.new_document();
        for index in booklet_order(opened.page_count()) {
            booklet.append_page(opened.page(index + 1)?);
        }
        booklet.save(output)?;

        log::info!(
            "Reordered {} ({} pages) into {}",
            source.path().display(),
            booklet.page_count(),
            output.display()
        );
        Ok(written(output, booklet.page_count()))
    }
}

fn skip(reason: &'static str) -> Assembly {
    log::warn!("Nothing to do: {}", reason);
    Assembly::Skipped(reason)
}

fn written(path: &Path, page_count: u32) -> Assembly {
    Assembly::Written(vec![OutputSummary {
        path: path.to_path_buf(),
        page_count,
    }])
}
