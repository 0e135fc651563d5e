//! URL handling module for Page-Lens
//!
//! This module resolves the hrefs found on a page into absolute URLs,
//! deduplicates them and splits them into internal and external sets by
//! origin.

mod resolve;

use crate::UrlResult;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

pub use resolve::{resolve_absolute_url, same_origin};

/// Absolute link URLs found on a page, split by origin
///
/// Both lists keep document order and never contain the same absolute URL twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrefData {
    /// Links sharing the page's origin
    pub internal: Vec<String>,

    /// Links pointing to any other origin
    pub external: Vec<String>,
}

impl HrefData {
    /// Total number of links across both sets
    pub fn len(&self) -> usize {
        self.internal.len() + self.external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_empty() && self.external.is_empty()
    }
}

/// Resolves, deduplicates and classifies a sequence of raw hrefs
///
/// Empty hrefs are ignored. The first occurrence of an absolute URL wins;
/// later duplicates are dropped silently. A link is internal when its origin
/// equals the page's origin.
///
/// # Arguments
///
/// * `hrefs` - Raw href values in document order
/// * `page_url` - The URL of the page the hrefs were found on
///
/// # Returns
///
/// * `Ok(HrefData)` - Classified absolute URLs
/// * `Err(UrlError::InvalidUrl)` - An href could not be resolved
///
/// # Examples
///
/// ```
/// use page_lens::url::classify_hrefs;
/// use url::Url;
///
/// let page = Url::parse("http://ex.com/").unwrap();
/// let data = classify_hrefs(["/a", "https://other.com/", "/a"], &page).unwrap();
/// assert_eq!(data.internal, vec!["http://ex.com/a"]);
/// assert_eq!(data.external, vec!["https://other.com/"]);
/// ```
pub fn classify_hrefs<'a, I>(hrefs: I, page_url: &Url) -> UrlResult<HrefData>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut href_data = HrefData::default();
    let mut seen = HashSet::new();

    for href in hrefs {
        if href.is_empty() {
            continue;
        }

        let absolute = resolve_absolute_url(href, page_url)?;
        let key = absolute.to_string();
        if !seen.insert(key.clone()) {
            continue;
        }

        if same_origin(&absolute, page_url) {
            href_data.internal.push(key);
        } else {
            href_data.external.push(key);
        }
    }

    Ok(href_data)
}

/// Collects the hrefs of every anchor element in a parsed document and
/// classifies them against the page URL
pub fn extract_href_data(document: &Html, page_url: &Url) -> UrlResult<HrefData> {
    let hrefs = anchor_hrefs(document);
    classify_hrefs(hrefs.iter().map(String::as_str), page_url)
}

/// Returns the raw `href` attribute of every `<a>` element, in document order
fn anchor_hrefs(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UrlError;

    fn page() -> Url {
        Url::parse("http://ex.com/").unwrap()
    }

    #[test]
    fn test_internal_and_external_split() {
        let data = classify_hrefs(
            ["/a", "http://ex.com/b", "https://ex.com/c", "http://other.org/d"],
            &page(),
        )
        .unwrap();
        assert_eq!(data.internal, vec!["http://ex.com/a", "http://ex.com/b"]);
        assert_eq!(
            data.external,
            vec!["https://ex.com/c", "http://other.org/d"]
        );
    }

    #[test]
    fn test_first_occurrence_wins() {
        let data = classify_hrefs(
            ["/a", "https://b.com/", "http://ex.com/a", "/a", "https://b.com"],
            &page(),
        )
        .unwrap();
        assert_eq!(data.internal, vec!["http://ex.com/a"]);
        assert_eq!(data.external, vec!["https://b.com/"]);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let once = classify_hrefs(["/a", "/b", "/a"], &page()).unwrap();
        let twice = classify_hrefs(
            once.internal
                .iter()
                .chain(once.internal.iter())
                .map(String::as_str),
            &page(),
        )
        .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_hrefs_are_skipped() {
        let data = classify_hrefs(["", "/a", ""], &page()).unwrap();
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_no_links() {
        let data = classify_hrefs(std::iter::empty(), &page()).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_unresolvable_href_propagates() {
        let page = Url::parse("foo://").unwrap();
        let result = classify_hrefs(["["], &page);
        assert!(matches!(result, Err(UrlError::InvalidUrl { .. })));
    }

    #[test]
    fn test_extract_from_document() {
        let html = Html::parse_document(
            r#"<html><body>
                <a href="/a">x</a>
                <a>no href</a>
                <a href="">empty</a>
                <a href="https://elsewhere.net/page">y</a>
            </body></html>"#,
        );
        let data = extract_href_data(&html, &page()).unwrap();
        assert_eq!(data.internal, vec!["http://ex.com/a"]);
        assert_eq!(data.external, vec!["https://elsewhere.net/page"]);
    }
}
