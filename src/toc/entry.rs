use crate::error::{Result, TocError};
use regex::Regex;
use std::sync::LazyLock;

// Dot-separated word runs with an optional trailing dot, a dash, or a run of dots.
// Multi-part labels such as `1.2.3` are accepted as well as the single-dot `1.` form.
static LEVEL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*\.?|-|\.+)$")
        .expect("valid level label regex")
});

static PLACEHOLDER_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\.+|-)$").expect("valid placeholder regex"));

static PAGE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid page number regex"));

/// One parsed line of a TOC text file: `<level-label> <title> <page-number>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level_label: String,
    pub title: String,
    pub page_number: u32,
    pub depth: usize,
    pub display_label: String,
}

impl TocEntry {
    /// Title of the outline node created for this entry.
    ///
    /// The label and title are always joined by a space, so placeholder labels
    /// produce a title with a leading space.
    pub fn outline_title(&self) -> String {
        format!("{} {}", self.display_label, self.title)
    }
}

/// Comment lines (`#` after optional whitespace) and blank lines carry no entry.
pub fn is_ignorable(line: &str) -> bool {
    let rest = line.trim_start();
    rest.is_empty() || rest.starts_with('#')
}

/// Parse a single non-ignorable line.
///
/// The label ends at the first space and the page number starts after the last
/// space; whatever lies between is the title. Errors carry line number 0, use
/// [`TocError::at_line`] to attach the real position.
pub fn parse_entry(line: &str) -> Result<TocEntry> {
    let (first_space, last_space) = match (line.find(' '), line.rfind(' ')) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(TocError::MalformedEntry {
                line: line.to_string(),
                line_number: 0,
            })
        }
    };

    let level_label = &line[..first_space];
    if !LEVEL_LABEL.is_match(level_label) {
        return Err(TocError::InvalidLevelLabel {
            label: level_label.to_string(),
            line: line.to_string(),
            line_number: 0,
        });
    }

    let page_text = &line[last_space + 1..];
    let page_number = PAGE_NUMBER
        .is_match(page_text)
        .then(|| page_text.parse::<u32>().ok())
        .flatten()
        .ok_or_else(|| TocError::InvalidPageNumber {
            page: page_text.to_string(),
            line: line.to_string(),
            line_number: 0,
        })?;

    let title = line[first_space..=last_space].trim_matches(' ').to_string();

    let depth = level_label.matches('.').count();
    let display_label = if PLACEHOLDER_LABEL.is_match(level_label) {
        String::new()
    } else {
        level_label.to_string()
    };

    Ok(TocEntry {
        level_label: level_label.to_string(),
        title,
        page_number,
        depth,
        display_label,
    })
}
