use crate::dates::parse_date;
use crate::parsers::ParsedDocument;
use crate::parsers::text::collapse_whitespace;
use crate::results::{ContentType, UNTITLED};
use scraper::{ElementRef, Html, Selector};

/// Containers tried in order for the document body
const BODY_SELECTORS: &[&str] = &["main", "article", "body"];

/// Where a publication date may live, in preference order
enum DateSource {
    Attr(&'static str, &'static str),
    Text(&'static str),
}

const DATE_SOURCES: &[DateSource] = &[
    DateSource::Attr("meta[name=date]", "content"),
    DateSource::Attr("meta[name=last-modified]", "content"),
    DateSource::Attr(r#"meta[property="article:published_time"]"#, "content"),
    DateSource::Attr("time[datetime]", "datetime"),
    DateSource::Text("time"),
];

/// Elements whose text is never part of the readable body
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Parses an HTML document into title, cleaned text and publication date
pub fn parse(html: &str) -> ParsedDocument {
    let doc = Html::parse_document(html);

    let title = select_first(&doc, "title")
        .map(|e| collapse_whitespace(&e.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let text = BODY_SELECTORS
        .iter()
        .filter_map(|sel| select_first(&doc, sel))
        .map(visible_text)
        .find(|t| !t.is_empty())
        .unwrap_or_default();

    let published_at = first_date_value(&doc).and_then(|value| parse_date(&value));

    ::log::debug!(
        "HTML parser extracted {} chars, title {:?}, date {:?}",
        text.len(),
        title,
        published_at
    );

    ParsedDocument {
        title,
        text,
        published_at,
        content_type: ContentType::Html,
    }
}

fn select_first<'a>(doc: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector).next()
}

/// The first non-empty date candidate in `DATE_SOURCES` order
fn first_date_value(doc: &Html) -> Option<String> {
    DATE_SOURCES.iter().find_map(|source| {
        let value = match source {
            DateSource::Attr(selector, attr) => {
                select_first(doc, selector)?.value().attr(attr)?.to_string()
            }
            DateSource::Text(selector) => {
                collapse_whitespace(&select_first(doc, selector)?.text().collect::<String>())
            }
        };
        let value = value.trim().to_string();
        (!value.is_empty()).then_some(value)
    })
}

/// Whitespace-collapsed text of an element, skipping script-like descendants
fn visible_text(element: ElementRef) -> String {
    let parts = element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
            });
            (!hidden).then_some(&**text)
        })
        .collect::<Vec<_>>();

    collapse_whitespace(&parts.join(" "))
}
