use crate::assembly::AssemblyEngine;
use crate::commands::{collect_sources, report};
use crate::pdf::LopdfPort;
use anyhow::{bail, Result};
use std::path::Path;

pub fn run<Q: AsRef<Path>>(inputs: &[String], output: Q, recursive: bool) -> Result<()> {
    let engine = AssemblyEngine::new(LopdfPort);
    let sources = collect_sources(engine.port(), inputs, recursive)?;

    if !sources.can_merge() {
        bail!(
            "Merge needs at least two source documents, got {}",
            sources.len()
        );
    }

    let result = engine.merge(&sources, output.as_ref())?;
    report("Merged", &result);

    Ok(())
}
