//! Assembly jobs described in a JSON file.
//!
//! ```json
//! {
//!   "operation": "merge",
//!   "sources": [{ "path": "a.pdf", "start": 2, "end": 4 }, { "path": "b.pdf" }],
//!   "output": "merged.pdf"
//! }
//! ```
//!
//! `interleave` takes the same shape, `split` takes a `source` and a list of
//! `extracts` (`output`, `start`, `end`), and `booklet` a `source` and `output`.

use crate::assembly::source::{Selection, SourceDocument, SourceList, SplitJob};
use crate::assembly::{Assembly, AssemblyEngine};
use crate::commands::report;
use crate::pdf::port::DocumentPort;
use crate::pdf::LopdfPort;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase", deny_unknown_fields)]
pub enum Job {
    Merge {
        sources: Vec<JobSource>,
        output: PathBuf,
    },
    Interleave {
        sources: Vec<JobSource>,
        output: PathBuf,
    },
    Split {
        source: PathBuf,
        extracts: Vec<JobExtract>,
    },
    Booklet {
        source: PathBuf,
        output: PathBuf,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobSource {
    pub path: PathBuf,
    pub start: Option<u32>,
    pub end: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobExtract {
    pub output: PathBuf,
    pub start: Option<u32>,
    pub end: Option<u32>,
}

impl Job {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid job file: {}", path.display()))
    }

    pub fn execute<P: DocumentPort>(&self, engine: &AssemblyEngine<P>) -> Result<Assembly> {
        let port = engine.port();
        let assembly = match self {
            Job::Merge { sources, output } => {
                engine.merge(&open_sources(port, sources)?, output)?
            }
            Job::Interleave { sources, output } => {
                engine.interleave(&open_sources(port, sources)?, output)?
            }
            Job::Split { source, extracts } => {
                let mut job = SplitJob::new(SourceDocument::open(port, source)?);
                for spec in extracts {
                    let extract = job.add_extract(&spec.output)?;
                    edit_range(extract, spec.start, spec.end, &spec.output);
                }
                engine.split(&job)?
            }
            Job::Booklet { source, output } => {
                engine.booklet_reorder(&SourceDocument::open(port, source)?, output)?
            }
        };
        Ok(assembly)
    }

    fn action(&self) -> &'static str {
        match self {
            Job::Merge { .. } => "Merged",
            Job::Interleave { .. } => "Interleaved",
            Job::Split { .. } => "Extracted",
            Job::Booklet { .. } => "Reordered",
        }
    }
}

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let job = Job::load(&path)?;
    let result = job.execute(&AssemblyEngine::new(LopdfPort))?;
    report(job.action(), &result);
    Ok(())
}

fn open_sources<P: DocumentPort>(port: &P, entries: &[JobSource]) -> Result<SourceList> {
    let mut sources = SourceList::with_duplicates();
    for entry in entries {
        let mut source = SourceDocument::open(port, &entry.path)?;
        edit_range(&mut source, entry.start, entry.end, &entry.path);
        sources.add(source)?;
    }
    Ok(sources)
}

/// Apply start then end the way an interactive edit would. A refused edit
/// keeps the previous bound.
fn edit_range<S: Selection>(target: &mut S, start: Option<u32>, end: Option<u32>, label: &Path) {
    if let Some(start) = start {
        if !target.set_start(start) && target.range().start() != start {
            log::warn!(
                "Ignoring start page {} for {} (selection {})",
                start,
                label.display(),
                target.range()
            );
        }
    }
    if let Some(end) = end {
        if !target.set_end(end) && target.range().end() != end {
            log::warn!(
                "Ignoring end page {} for {} (selection {})",
                end,
                label.display(),
                target.range()
            );
        }
    }
}
