//! Error taxonomy shared by the TOC parser, the outline builder and the PDF layer.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TocError {
    #[error("The hierarchy level \"{label}\" in TOC entry \"{line}\" (line {line_number}) is not valid")]
    InvalidLevelLabel {
        label: String,
        line: String,
        line_number: usize,
    },

    #[error("The page number \"{page}\" in TOC entry \"{line}\" (line {line_number}) is not a number")]
    InvalidPageNumber {
        page: String,
        line: String,
        line_number: usize,
    },

    #[error("TOC entry \"{line}\" (line {line_number}) needs a level, a title and a page number separated by spaces")]
    MalformedEntry { line: String, line_number: usize },

    #[error("Encoding {0} is not supported (run `pdftoc encodings` for a list)")]
    UnsupportedEncoding(String),

    #[error("Page {page_number} shifted by {page_shift} overflows the page range")]
    PageShiftOverflow { page_number: u32, page_shift: i64 },

    #[error("Target page {page} is out of range (1-{page_count})")]
    InvalidTargetPage { page: i64, page_count: u32 },

    #[error(
        "Line {line_number} goes from depth {last_depth} to depth {depth}, which closes more levels than are open"
    )]
    StackUnderflow {
        line_number: usize,
        last_depth: usize,
        depth: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

impl TocError {
    /// Attach the 1-based source line number to an error raised without one.
    pub fn at_line(self, number: usize) -> Self {
        match self {
            TocError::InvalidLevelLabel { label, line, .. } => TocError::InvalidLevelLabel {
                label,
                line,
                line_number: number,
            },
            TocError::InvalidPageNumber { page, line, .. } => TocError::InvalidPageNumber {
                page,
                line,
                line_number: number,
            },
            TocError::MalformedEntry { line, .. } => TocError::MalformedEntry {
                line,
                line_number: number,
            },
            TocError::StackUnderflow {
                last_depth, depth, ..
            } => TocError::StackUnderflow {
                line_number: number,
                last_depth,
                depth,
            },
            other => other,
        }
    }
}

pub type Result<T, E = TocError> = std::result::Result<T, E>;
