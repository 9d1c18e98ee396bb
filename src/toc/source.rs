use crate::error::{Result, TocError};
use crate::toc::entry::{is_ignorable, parse_entry, TocEntry};
use encoding_rs::Encoding;
use log::{info, warn};
use std::path::Path;

pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Encodings offered by `pdftoc encodings`. Any other WHATWG label that maps to
/// one of these is accepted too.
pub fn supported_encodings() -> Vec<&'static Encoding> {
    vec![
        encoding_rs::UTF_8,
        encoding_rs::UTF_16LE,
        encoding_rs::UTF_16BE,
        encoding_rs::GBK,
        encoding_rs::GB18030,
        encoding_rs::BIG5,
        encoding_rs::SHIFT_JIS,
        encoding_rs::EUC_JP,
        encoding_rs::ISO_2022_JP,
        encoding_rs::EUC_KR,
        encoding_rs::IBM866,
        encoding_rs::KOI8_R,
        encoding_rs::KOI8_U,
        encoding_rs::MACINTOSH,
        encoding_rs::X_MAC_CYRILLIC,
        encoding_rs::ISO_8859_2,
        encoding_rs::ISO_8859_3,
        encoding_rs::ISO_8859_4,
        encoding_rs::ISO_8859_5,
        encoding_rs::ISO_8859_6,
        encoding_rs::ISO_8859_7,
        encoding_rs::ISO_8859_8,
        encoding_rs::ISO_8859_10,
        encoding_rs::ISO_8859_13,
        encoding_rs::ISO_8859_14,
        encoding_rs::ISO_8859_15,
        encoding_rs::ISO_8859_16,
        encoding_rs::WINDOWS_874,
        encoding_rs::WINDOWS_1250,
        encoding_rs::WINDOWS_1251,
        encoding_rs::WINDOWS_1252,
        encoding_rs::WINDOWS_1253,
        encoding_rs::WINDOWS_1254,
        encoding_rs::WINDOWS_1255,
        encoding_rs::WINDOWS_1256,
        encoding_rs::WINDOWS_1257,
        encoding_rs::WINDOWS_1258,
    ]
}

/// A parsed entry together with its 1-based position in the TOC file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocLine {
    pub line_number: usize,
    pub entry: TocEntry,
}

/// Resolve an encoding name such as `UTF-8`, `gbk` or `latin1`.
pub fn lookup_encoding(name: &str) -> Result<&'static Encoding> {
    // `replacement` would decode any input to a single U+FFFD
    Encoding::for_label_no_replacement(name.trim().as_bytes())
        .ok_or_else(|| TocError::UnsupportedEncoding(name.to_string()))
}

/// Decode raw TOC bytes, dropping a byte-order mark for the chosen encoding.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        warn!(
            "TOC text contains byte sequences that are not valid {}; they were replaced",
            encoding.name()
        );
    }
    text.into_owned()
}

/// Parse every line of a TOC text up front.
///
/// Nothing is handed to a sink until the whole text has been validated, so the
/// first bad line aborts the run before the document is touched.
pub fn parse_toc(text: &str) -> Result<Vec<TocLine>> {
    let mut lines = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        if is_ignorable(raw) {
            continue;
        }
        let line_number = idx + 1;
        let entry = parse_entry(raw).map_err(|e| e.at_line(line_number))?;
        lines.push(TocLine { line_number, entry });
    }

    Ok(lines)
}

/// Read, decode and parse a TOC text file.
pub fn read_toc_file<P: AsRef<Path>>(path: P, encoding: &str) -> Result<Vec<TocLine>> {
    let encoding = lookup_encoding(encoding)?;
    let bytes = std::fs::read(path.as_ref())?;
    let lines = parse_toc(&decode(&bytes, encoding))?;

    info!(
        "Parsed {} TOC entries from {} ({})",
        lines.len(),
        path.as_ref().display(),
        encoding.name()
    );

    Ok(lines)
}
