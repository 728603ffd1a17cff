//! PDF text extraction.
//!
//! Documents are loaded with `lopdf`, which only decodes the object graph and
//! content streams; embedded JavaScript and other active content are never
//! executed. Extraction walks pages in order and stops at whichever comes
//! first: [`MAX_PAGES`] pages or more than [`MAX_CHARS`] accumulated
//! characters.

use crate::dates::find_date_in_text;
use crate::error::ParseError;
use crate::parsers::ParsedDocument;
use crate::parsers::text::{collapse_whitespace, first_line};
use crate::results::{ContentType, PDF_TITLE};
use crate::utils::truncate_chars;
use lopdf::Document;

/// Pages read at most
pub const MAX_PAGES: usize = 12;

/// Extraction stops once accumulated text exceeds this many characters
pub const MAX_CHARS: usize = 20_000;

/// Title length cap
pub const TITLE_CHARS: usize = 120;

/// Prefix of the text searched for a publication date
pub const DATE_SCAN_CHARS: usize = 3_000;

/// Text gathered from the leading pages of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CappedText {
    /// Pages joined by newlines; words within a page joined by spaces
    pub text: String,
    /// First non-blank line of the raw page text
    pub first_line: Option<String>,
    /// Number of pages pulled from the source
    pub pages_read: usize,
}

/// Pull page texts lazily until either cap is hit.
///
/// The iterator is only advanced while under both caps, so pages past the
/// cut-off are never extracted.
pub fn collect_capped<I>(pages: I, max_pages: usize, max_chars: usize) -> CappedText
where
    I: IntoIterator<Item = String>,
{
    let mut joined = String::new();
    let mut chars = 0usize;
    let mut title = None;
    let mut pages_read = 0usize;

    for raw in pages.into_iter().take(max_pages) {
        pages_read += 1;
        if title.is_none() {
            title = first_line(&raw, TITLE_CHARS);
        }

        let page = collapse_whitespace(&raw);
        if !page.is_empty() {
            if !joined.is_empty() {
                joined.push('\n');
                chars += 1;
            }
            chars += page.chars().count();
            joined.push_str(&page);
        }

        if chars > max_chars {
            ::log::debug!("PDF text cap reached after {} pages", pages_read);
            break;
        }
    }

    CappedText {
        text: joined,
        first_line: title,
        pages_read,
    }
}

/// Extract capped raw text from PDF bytes
pub fn extract_text(bytes: &[u8]) -> Result<CappedText, ParseError> {
    let doc = Document::load_mem(bytes).map_err(|e| ParseError::PdfLoad(e.to_string()))?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    ::log::debug!("PDF has {} pages", page_numbers.len());

    let pages = page_numbers.into_iter().map(|n| match doc.extract_text(&[n]) {
        Ok(text) => text,
        Err(e) => {
            let err = ParseError::PdfExtract {
                page: n,
                reason: e.to_string(),
            };
            ::log::debug!("Skipping page: {}", err);
            String::new()
        }
    });

    Ok(collect_capped(pages, MAX_PAGES, MAX_CHARS))
}

/// Parses a PDF into title, cleaned text and publication date
pub fn parse(bytes: &[u8]) -> Result<ParsedDocument, ParseError> {
    let capped = extract_text(bytes)?;

    let text = truncate_chars(&collapse_whitespace(&capped.text), MAX_CHARS);
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let title = capped
        .first_line
        .unwrap_or_else(|| PDF_TITLE.to_string());
    let published_at = find_date_in_text(&truncate_chars(&text, DATE_SCAN_CHARS));

    Ok(ParsedDocument {
        title,
        text,
        published_at,
        content_type: ContentType::Pdf,
    })
}
