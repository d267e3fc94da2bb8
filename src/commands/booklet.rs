use crate::assembly::source::SourceDocument;
use crate::assembly::AssemblyEngine;
use crate::commands::report;
use crate::pdf::LopdfPort;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub fn run<P: AsRef<Path>>(input: P, output: Option<PathBuf>) -> Result<()> {
    let input = input.as_ref();
    let output = output.unwrap_or_else(|| default_output(input));

    let engine = AssemblyEngine::new(LopdfPort);
    let source = SourceDocument::open(engine.port(), input)?;
    let result = engine.booklet_reorder(&source, &output)?;
    report("Reordered", &result);

    Ok(())
}

/// `<stem>_2.pdf` next to the input
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "booklet".to_string());
    input.with_file_name(format!("{}_2.pdf", stem))
}
