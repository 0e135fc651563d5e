//! Document structure extraction
//!
//! Pulls the doctype, page title and heading text out of a page. The doctype
//! is read from the raw source so its declared spelling survives; everything
//! else comes from the parsed document. Malformed or sparse documents yield
//! empty or absent fields, never errors.

use scraper::{node::Doctype, Html, Node, Selector};
use std::collections::BTreeMap;

/// Heading text by level (`h1`..`h6`), in document order
///
/// Levels without any non-empty heading are absent.
pub type HeadingData = BTreeMap<String, Vec<String>>;

/// Structural metadata of a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStructure {
    pub doc_type: Option<String>,
    pub page_title: String,
    pub heading_data: HeadingData,
}

impl DocumentStructure {
    /// Extracts the structure of `document`, parsed from `html`
    pub fn extract(html: &str, document: &Html) -> Self {
        Self {
            doc_type: extract_doc_type(html, document),
            page_title: extract_page_title(document),
            heading_data: extract_heading_data(document),
        }
    }
}

/// Returns the text following `<!DOCTYPE` in the page's doctype declaration
///
/// The declaration is taken verbatim from the start of `html` (leading
/// whitespace and a byte-order mark are skipped), so `<!DOCTYPE HTML PUBLIC
/// "-//W3C//DTD HTML 4.01//EN">` yields `HTML PUBLIC "-//W3C//DTD HTML 4.01//EN"`.
/// When the source does not open with a declaration, the doctype node of the
/// parsed document is used instead, rebuilt in its normalised form.
pub fn extract_doc_type(html: &str, document: &Html) -> Option<String> {
    raw_doc_type(html).or_else(|| parsed_doc_type(document))
}

/// Case-insensitive match of `<!DOCTYPE\s+([^>]+)>` at the start of `html`
fn raw_doc_type(html: &str) -> Option<String> {
    const KEYWORD: &str = "<!doctype";

    let source = html.trim_start_matches('\u{feff}').trim_start();
    let head = source.get(..KEYWORD.len())?;
    if !head.eq_ignore_ascii_case(KEYWORD) {
        return None;
    }

    let rest = &source[KEYWORD.len()..];
    if !rest.starts_with(|c: char| c.is_ascii_whitespace()) {
        return None;
    }

    let end = rest.find('>')?;
    let text = rest[..end].trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn parsed_doc_type(document: &Html) -> Option<String> {
    document
        .tree
        .root()
        .children()
        .find_map(|node| match node.value() {
            Node::Doctype(doctype) => Some(format_doctype(doctype)),
            _ => None,
        })
}

fn format_doctype(doctype: &Doctype) -> String {
    let mut text = doctype.name().to_string();
    let public_id = doctype.public_id();
    let system_id = doctype.system_id();

    if !public_id.is_empty() {
        text.push_str(&format!(" PUBLIC \"{}\"", public_id));
        if !system_id.is_empty() {
            text.push_str(&format!(" \"{}\"", system_id));
        }
    } else if !system_id.is_empty() {
        text.push_str(&format!(" SYSTEM \"{}\"", system_id));
    }

    text
}

/// Extracts the trimmed text of the first `<title>`, or an empty string
pub fn extract_page_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Collects the trimmed, non-empty text of every heading, grouped by level
pub fn extract_heading_data(document: &Html) -> HeadingData {
    let mut heading_data = HeadingData::new();

    for level in 1..=6 {
        let tag = format!("h{}", level);
        let Ok(selector) = Selector::parse(&tag) else {
            continue;
        };

        let texts: Vec<String> = document
            .select(&selector)
            .map(|heading| heading.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();

        if !texts.is_empty() {
            heading_data.insert(tag, texts);
        }
    }

    heading_data
}
