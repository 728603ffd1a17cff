pub mod html;
pub mod pdf;
pub mod text;

#[cfg(test)]
pub(crate) mod tests;

use crate::error::ParseError;
use crate::results::ContentType;
use chrono::{DateTime, Utc};

/// Enum to represent the supported content parsers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserType {
    /// HTML (and other `text/*`) parser
    Html,
    /// PDF parser
    Pdf,
}

impl ParserType {
    /// Determines the parser from a `Content-Type` header; `None` means unsupported
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let ct = content_type.to_ascii_lowercase();
        if ct.contains("pdf") {
            ::log::trace!("Classifying as PDF: {}", content_type);
            Some(ParserType::Pdf)
        } else if ct.contains("html") || ct.contains("text") {
            ::log::trace!("Classifying as HTML: {}", content_type);
            Some(ParserType::Html)
        } else {
            ::log::debug!("Unsupported content type: {}", content_type);
            None
        }
    }
}

/// Result of parsing one response body
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub title: String,
    /// Whitespace-collapsed text
    pub text: String,
    pub published_at: Option<DateTime<Utc>>,
    pub content_type: ContentType,
}

/// Main parser that delegates to specific format parsers
pub struct Parser;

impl Parser {
    /// Parse a response body with the given parser
    pub fn parse(body: &[u8], parser_type: ParserType) -> Result<ParsedDocument, ParseError> {
        match parser_type {
            ParserType::Html => Ok(html::parse(&String::from_utf8_lossy(body))),
            ParserType::Pdf => pdf::parse(body),
        }
    }
}
