//! HTML retrieval
//!
//! Analysis works on raw HTML; where that HTML comes from is behind the
//! [`HtmlSource`] trait. [`HttpHtmlSource`] is the lightweight implementation:
//! a single GET request whose body is returned as-is, without running any
//! scripts on the page.

use crate::LensError;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Validates a caller-supplied page URL
///
/// Blank input and anything that is not an absolute URL are rejected with
/// [`LensError::InvalidInput`].
pub fn parse_page_url(raw: &str) -> Result<Url, LensError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LensError::InvalidInput(
            "missing url query parameter".to_string(),
        ));
    }

    Url::parse(trimmed)
        .map_err(|e| LensError::InvalidInput(format!("invalid url '{}': {}", trimmed, e)))
}

/// Something that can produce the HTML of a page
#[async_trait]
pub trait HtmlSource: Send + Sync {
    async fn fetch_html(&self, url: &Url) -> Result<String, LensError>;
}

/// Fetches pages with a plain HTTP GET
#[derive(Debug, Clone)]
pub struct HttpHtmlSource {
    client: Client,
}

impl HttpHtmlSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HtmlSource for HttpHtmlSource {
    async fn fetch_html(&self, url: &Url) -> Result<String, LensError> {
        tracing::debug!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_error(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(
                url,
                format!("HTTP status code: {}", status.as_u16()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| fetch_error(url, e.to_string()))
    }
}

fn fetch_error(url: &Url, message: String) -> LensError {
    LensError::Fetch {
        url: url.to_string(),
        message,
    }
}
