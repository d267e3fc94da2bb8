use crate::commands::booklet::default_output;
use crate::page_range::PageRange;
use crate::pdf::{PdfDocument, PdfInfo};
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let doc = PdfDocument::open(&path)?;
    for line in describe(doc.path(), &doc.info()) {
        println!("{}", line);
    }
    Ok(())
}

/// Lines shown for one document: what ranges and outputs it accepts, then
/// whatever metadata it carries.
fn describe(path: &Path, info: &PdfInfo) -> Vec<String> {
    let mut lines = vec![format!("File: {}", path.display())];
    lines.push(format!("Pages: {}", info.page_count));
    if let Some(range) = PageRange::full(info.page_count) {
        lines.push(format!("Selectable: {}:{}", path.display(), range));
    }
    lines.push(format!("Booklet output: {}", default_output(path).display()));

    let metadata = [
        ("Title", &info.title),
        ("Author", &info.author),
        ("Subject", &info.subject),
        ("Creator", &info.creator),
        ("Producer", &info.producer),
    ];
    for (label, value) in metadata {
        if let Some(value) = value {
            lines.push(format!("{}: {}", label, value));
        }
    }
    lines
}
