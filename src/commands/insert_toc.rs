use crate::pdf::PdfDocument;
use crate::toc::{build, read_toc_file, DEFAULT_ENCODING};
use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub struct InsertOptions {
    pub toc: PathBuf,
    pub page_shift: i64,
    pub encoding: String,
    /// Defaults to `<input>.new.pdf`.
    pub output: Option<PathBuf>,
}

impl Default for InsertOptions {
    fn default() -> Self {
        InsertOptions {
            toc: PathBuf::new(),
            page_shift: 0,
            encoding: DEFAULT_ENCODING.to_string(),
            output: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InsertSummary {
    pub output_path: String,
    pub items: usize,
    pub page_count: u32,
}

pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".new.pdf");
    PathBuf::from(name)
}

/// Parse the TOC file, build the outline and write the new PDF.
///
/// The TOC is fully parsed and the tree fully built before the document is
/// modified, so any error leaves no output file behind.
pub fn insert<P: AsRef<Path>>(input: P, options: &InsertOptions) -> Result<InsertSummary> {
    let input = input.as_ref();
    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input));

    let lines = read_toc_file(&options.toc, &options.encoding)
        .with_context(|| format!("Failed to read TOC file: {}", options.toc.display()))?;

    let mut doc = PdfDocument::open(input)?;
    let mut tree = doc.new_outline();
    build(lines, options.page_shift, &mut tree)
        .with_context(|| format!("Failed to build outline from {}", options.toc.display()))?;

    let items = doc.attach_outline(&tree)?;
    doc.save(&output)?;
    info!("Wrote {} with {} outline items", output.display(), items);

    Ok(InsertSummary {
        output_path: output.display().to_string(),
        items,
        page_count: doc.page_count(),
    })
}

pub fn run<P: AsRef<Path>>(input: P, options: &InsertOptions) -> Result<()> {
    let summary = insert(input, options)?;

    println!(
        "Inserted {} outline item(s) into {}",
        summary.items, summary.output_path
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TocError;
    use crate::pdf::document::tests::write_blank_pdf;
    use crate::pdf::outline::flatten_outline;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/tmp/book.pdf")),
            PathBuf::from("/tmp/book.pdf.new.pdf")
        );
    }

    #[test]
    fn test_insert_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("book.pdf");
        let toc = dir.path().join("toc.txt");
        write_blank_pdf(&pdf, 30);
        std::fs::write(
            &toc,
            "# contents\n1 Introduction 1\n1.1 Background 2\n1.2 Motivation 4\n2 Methods 10\n",
        )
        .unwrap();

        let options = InsertOptions {
            toc,
            page_shift: 2,
            ..Default::default()
        };
        let summary = insert(&pdf, &options).unwrap();
        assert_eq!(summary.items, 4);
        assert_eq!(summary.page_count, 30);

        let out = PdfDocument::open(default_output_path(&pdf)).unwrap();
        let flat: Vec<_> = flatten_outline(&out.outline().unwrap())
            .into_iter()
            .map(|e| (e.level, e.title, e.page))
            .collect();
        assert_eq!(
            flat,
            vec![
                (0, "1 Introduction".to_string(), Some(3)),
                (1, "1.1 Background".to_string(), Some(4)),
                (1, "1.2 Motivation".to_string(), Some(6)),
                (0, "2 Methods".to_string(), Some(12)),
            ]
        );
    }

    #[test]
    fn test_gbk_toc() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("book.pdf");
        let toc = dir.path().join("toc.txt");
        write_blank_pdf(&pdf, 5);
        let (bytes, _, _) = encoding_rs::GBK.encode("1 第一章 1\n1.1 第一节 2\n");
        std::fs::write(&toc, bytes).unwrap();

        let options = InsertOptions {
            toc,
            encoding: "GBK".to_string(),
            output: Some(dir.path().join("out.pdf")),
            ..Default::default()
        };
        insert(&pdf, &options).unwrap();

        let out = PdfDocument::open(dir.path().join("out.pdf")).unwrap();
        let outline = out.outline().unwrap();
        assert_eq!(outline[0].title, "1 第一章");
        assert_eq!(outline[0].children[0].title, "1.1 第一节");
    }

    #[test]
    fn test_bad_line_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("book.pdf");
        let toc = dir.path().join("toc.txt");
        write_blank_pdf(&pdf, 5);
        std::fs::write(&toc, "1 Good 1\n2 Bad 5a\n").unwrap();

        let options = InsertOptions {
            toc,
            ..Default::default()
        };
        let err = insert(&pdf, &options).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TocError>(),
            Some(TocError::InvalidPageNumber { line_number: 2, .. })
        ));
        assert!(!default_output_path(&pdf).exists());
    }

    #[test]
    fn test_page_past_end_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("book.pdf");
        let toc = dir.path().join("toc.txt");
        write_blank_pdf(&pdf, 5);
        std::fs::write(&toc, "1 A 1\n2 B 5\n").unwrap();

        let options = InsertOptions {
            toc,
            page_shift: 1,
            ..Default::default()
        };
        let err = insert(&pdf, &options).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TocError>(),
            Some(TocError::InvalidTargetPage { page: 6, page_count: 5 })
        ));
        assert!(!default_output_path(&pdf).exists());
    }

    #[test]
    fn test_unsupported_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("book.pdf");
        let toc = dir.path().join("toc.txt");
        write_blank_pdf(&pdf, 1);
        std::fs::write(&toc, "1 A 1\n").unwrap();

        let options = InsertOptions {
            toc,
            encoding: "EBCDIC-ish".to_string(),
            ..Default::default()
        };
        let err = insert(&pdf, &options).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TocError>(),
            Some(TocError::UnsupportedEncoding(_))
        ));
    }
}
