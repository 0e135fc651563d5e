use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves an href found on a page to an absolute URL
///
/// # Resolution Steps
///
/// 1. An href starting with `/` is rebased onto the page's origin
/// 2. Otherwise the href is parsed as an absolute URL
/// 3. If that fails, the href is appended to the page URL's string form
///    and parsed again
/// 4. If every attempt fails, the first parse error is returned
///
/// # Arguments
///
/// * `href` - The raw `href` attribute value
/// * `page_url` - The URL of the page the href was found on
///
/// # Returns
///
/// * `Ok(Url)` - The resolved absolute URL
/// * `Err(UrlError::InvalidUrl)` - The href cannot be resolved
///
/// # Examples
///
/// ```
/// use page_lens::url::resolve_absolute_url;
/// use url::Url;
///
/// let page = Url::parse("https://a.com/y").unwrap();
/// let url = resolve_absolute_url("/x", &page).unwrap();
/// assert_eq!(url.as_str(), "https://a.com/x");
/// ```
pub fn resolve_absolute_url(href: &str, page_url: &Url) -> UrlResult<Url> {
    let candidate = if href.starts_with('/') {
        format!("{}{}", page_url.origin().ascii_serialization(), href)
    } else {
        href.to_string()
    };

    match Url::parse(&candidate) {
        Ok(url) => Ok(url),
        Err(first_error) => {
            let concatenated = format!("{}{}", page_url.as_str(), href);
            Url::parse(&concatenated).map_err(|_| UrlError::InvalidUrl {
                href: href.to_string(),
                source: first_error,
            })
        }
    }
}

/// Returns true when both URLs share scheme, host and port
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}
