use crate::pdf::outline::{extract_outline, write_outline, OutlineEntry};
use crate::toc::OutlineTree;
use anyhow::{Context, Result};
use lopdf::Document;
use std::path::Path;

pub struct PdfDocument {
    pub doc: Document,
    pub path: String,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let doc =
            Document::load(&path).with_context(|| format!("Failed to open PDF: {}", path_str))?;
        Ok(PdfDocument {
            doc,
            path: path_str,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// An empty outline bounded by this document's pages, ready to be built into.
    pub fn new_outline(&self) -> OutlineTree {
        OutlineTree::new(self.page_count())
    }

    pub fn outline(&self) -> Result<Vec<OutlineEntry>> {
        extract_outline(&self.doc)
            .with_context(|| format!("Failed to read outline of {}", self.path))
    }

    /// Replace the document outline. Returns the number of items written.
    pub fn attach_outline(&mut self, tree: &OutlineTree) -> Result<usize> {
        write_outline(&mut self.doc, tree)
            .with_context(|| format!("Failed to write outline into {}", self.path))?;
        Ok(tree.len())
    }

    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.doc
            .save(&path)
            .with_context(|| format!("Failed to save PDF: {}", path.as_ref().display()))?;
        Ok(())
    }
}
