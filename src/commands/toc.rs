use crate::pdf::outline::flatten_outline;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P, json: bool) -> Result<()> {
    let doc = PdfDocument::open(&path)?;
    let entries = doc.outline()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No outline found.");
        return Ok(());
    }

    for entry in flatten_outline(&entries) {
        let indent = "  ".repeat(entry.level as usize);
        let page_str = entry
            .page
            .map(|p| format!(" (p. {})", p))
            .unwrap_or_default();
        println!("{}{}{}", indent, entry.title, page_str);
    }

    Ok(())
}
