pub mod booklet;
pub mod info;
pub mod interleave;
pub mod job;
pub mod merge;
pub mod split;

use crate::assembly::source::{Selection, SourceDocument, SourceList};
use crate::assembly::{Assembly, OutputSummary};
use crate::page_range::PageRange;
use crate::pdf::port::DocumentPort;
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// A command-line path with an optional page range: `PATH[:RANGE]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathArg {
    pub path: PathBuf,
    pub range: Option<String>,
}

impl PathArg {
    /// Split `a.pdf:2-5` into path and range. An argument naming an existing
    /// file is taken whole, so paths that happen to contain ':' still work.
    pub fn parse(arg: &str) -> Self {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"(?i)^(?P<path>.+?):(?P<range>(?:\d+|end)(?:-(?:\d+|end))?)$")
                .expect("valid path/range pattern")
        });

        if !Path::new(arg).exists() {
            if let Some(caps) = pattern.captures(arg) {
                return PathArg {
                    path: PathBuf::from(&caps["path"]),
                    range: Some(caps["range"].to_string()),
                };
            }
        }
        PathArg {
            path: PathBuf::from(arg),
            range: None,
        }
    }

    /// Resolve the range against a document with `page_count` pages
    pub fn page_range(&self, page_count: u32) -> Result<Option<PageRange>> {
        self.range
            .as_deref()
            .map(|range| {
                PageRange::parse(range, page_count)
                    .with_context(|| format!("Invalid page range for {}", self.path.display()))
            })
            .transpose()
    }
}

/// Whether `path` names a PDF by extension, ignoring case
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// The `.pdf` files in `dir`, sorted by path
pub fn pdf_files_in(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(dir).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if entry.file_type().is_file() && has_pdf_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Open every input as a source. Directories expand to the PDFs inside
/// them; files without a `.pdf` extension are skipped.
pub fn collect_sources<P: DocumentPort>(
    port: &P,
    inputs: &[String],
    recursive: bool,
) -> Result<SourceList> {
    let mut sources = SourceList::with_duplicates();

    for input in inputs {
        let arg = PathArg::parse(input);

        if arg.path.is_dir() {
            if arg.range.is_some() {
                bail!(
                    "A page range cannot be applied to a directory: {}",
                    arg.path.display()
                );
            }
            for path in pdf_files_in(&arg.path, recursive)? {
                sources.add(SourceDocument::open(port, &path)?)?;
            }
            continue;
        }

        if !has_pdf_extension(&arg.path) {
            log::warn!("Skipping {}: not a .pdf file", arg.path.display());
            continue;
        }

        let mut source = SourceDocument::open(port, &arg.path)?;
        if let Some(range) = arg.page_range(source.page_count())? {
            source.select(range);
        }
        sources.add(source)?;
    }

    Ok(sources)
}

/// Print what an operation wrote
pub fn report(action: &str, assembly: &Assembly) {
    match assembly {
        Assembly::Written(outputs) => {
            for OutputSummary { path, page_count } in outputs {
                println!("{} {} page(s) to {}", action, page_count, path.display());
            }
        }
        Assembly::Skipped(reason) => println!("Nothing written: {}", reason),
    }
}
