use crate::toc::{build, read_toc_file, OutlineItem, OutlineTree};
use anyhow::{Context, Result};
use std::path::Path;

pub struct CheckOptions {
    pub page_shift: i64,
    pub encoding: String,
    /// Page count to validate targets against; unbounded when `None`.
    pub pages: Option<u32>,
}

/// Parse and build a TOC file without touching any PDF.
pub fn check<P: AsRef<Path>>(toc: P, options: &CheckOptions) -> Result<OutlineTree> {
    let toc = toc.as_ref();
    let lines = read_toc_file(toc, &options.encoding)
        .with_context(|| format!("Failed to read TOC file: {}", toc.display()))?;

    let mut tree = OutlineTree::new(options.pages.unwrap_or(u32::MAX));
    build(lines, options.page_shift, &mut tree)
        .with_context(|| format!("Failed to build outline from {}", toc.display()))?;

    Ok(tree)
}

pub fn run<P: AsRef<Path>>(toc: P, options: &CheckOptions, json: bool) -> Result<()> {
    let tree = check(toc, options)?;

    if json {
        let items: Vec<OutlineItem> = tree.items();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for (level, id) in tree.walk() {
        let node = tree.node(id);
        println!("{}{} (p. {})", "  ".repeat(level), node.title, node.target_page);
    }
    println!("\n{} outline item(s).", tree.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TocError;
    use crate::toc::DEFAULT_ENCODING;

    fn options(pages: Option<u32>) -> CheckOptions {
        CheckOptions {
            page_shift: 0,
            encoding: DEFAULT_ENCODING.to_string(),
            pages,
        }
    }

    #[test]
    fn test_check_builds_tree() {
        let dir = tempfile::tempdir().unwrap();
        let toc = dir.path().join("toc.txt");
        std::fs::write(&toc, "1 A 1\n1.1 B 500\n").unwrap();

        let tree = check(&toc, &options(None)).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.descendant_count(tree.children(OutlineTree::ROOT)[0]), 1);
    }

    #[test]
    fn test_check_with_page_bound() {
        let dir = tempfile::tempdir().unwrap();
        let toc = dir.path().join("toc.txt");
        std::fs::write(&toc, "1 A 1\n1.1 B 500\n").unwrap();

        let err = check(&toc, &options(Some(100))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TocError>(),
            Some(TocError::InvalidTargetPage { page: 500, .. })
        ));
    }
}
