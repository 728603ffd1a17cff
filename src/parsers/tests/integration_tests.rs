use crate::parsers::tests::pdf_support::build_pdf;
use crate::parsers::{Parser, ParserType};
use crate::results::ContentType;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_classification() {
        let cases = [
            ("text/html; charset=utf-8", Some(ParserType::Html)),
            ("application/xhtml+xml", Some(ParserType::Html)),
            ("text/plain", Some(ParserType::Html)),
            ("application/pdf", Some(ParserType::Pdf)),
            ("application/x-pdf", Some(ParserType::Pdf)),
            ("image/png", None),
            ("application/json", None),
            ("", None),
        ];

        for (content_type, expected) in cases {
            assert_eq!(
                ParserType::from_content_type(content_type),
                expected,
                "content type {:?}",
                content_type
            );
        }
    }

    #[test]
    fn test_parse_dispatches_by_type() {
        let html = b"<html><head><title>T</title></head><body>Hello, world!</body></html>";
        let doc = Parser::parse(html, ParserType::Html).unwrap();
        assert_eq!(doc.content_type, ContentType::Html);
        assert_eq!(doc.text, "Hello, world!");

        let pdf = build_pdf(&[vec!["Boil water advisory".to_string()]]);
        let doc = Parser::parse(&pdf, ParserType::Pdf).unwrap();
        assert_eq!(doc.content_type, ContentType::Pdf);
        assert!(doc.text.contains("Boil water advisory"));
    }

    #[test]
    fn test_html_parser_tolerates_invalid_utf8() {
        let body = b"<html><body>caf\xe9 water</body></html>";
        let doc = Parser::parse(body, ParserType::Html).unwrap();
        assert!(doc.text.ends_with("water"));
    }
}
