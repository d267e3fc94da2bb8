use crate::assembly::source::{Selection, SourceDocument, SplitJob};
use crate::assembly::AssemblyEngine;
use crate::commands::{report, PathArg};
use crate::pdf::LopdfPort;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Split `input` into the requested extracts (`DEST[:RANGE]`), and/or into
/// one file per page under `burst_dir`
pub fn run<P: AsRef<Path>>(input: P, extracts: &[String], burst_dir: Option<&Path>) -> Result<()> {
    let input = input.as_ref();
    let engine = AssemblyEngine::new(LopdfPort);
    let mut job = SplitJob::new(SourceDocument::open(engine.port(), input)?);
    let total_pages = job.source().page_count();

    // Registration rejects a repeated destination before any output is written
    for spec in extracts {
        let arg = PathArg::parse(spec);
        let range = arg.page_range(total_pages)?;
        let extract = job.add_extract(&arg.path)?;
        if let Some(range) = range {
            extract.select(range);
        }
    }

    if let Some(output_dir) = burst_dir {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("page");

        for page_num in 1..=total_pages {
            let output_path = output_dir.join(format!("{}_{:04}.pdf", stem, page_num));
            let extract = job.add_extract(output_path)?;
            extract.set_end(page_num);
            extract.set_start(page_num);
        }
    }

    if !job.can_split() {
        bail!("Nothing to split: give at least one --extract or --burst directory");
    }

    let result = engine.split(&job)?;
    report("Extracted", &result);

    Ok(())
}
