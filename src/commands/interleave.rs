use crate::assembly::AssemblyEngine;
use crate::commands::{collect_sources, report};
use crate::pdf::LopdfPort;
use anyhow::{bail, Result};
use std::path::Path;

pub fn run<Q: AsRef<Path>>(inputs: &[String], output: Q, recursive: bool) -> Result<()> {
    let engine = AssemblyEngine::new(LopdfPort);
    let sources = collect_sources(engine.port(), inputs, recursive)?;

    if !sources.can_interleave() {
        bail!(
            "Interleave needs at least two source documents, got {}",
            sources.len()
        );
    }

    let result = engine.interleave(&sources, output.as_ref())?;
    report("Interleaved", &result);

    Ok(())
}
