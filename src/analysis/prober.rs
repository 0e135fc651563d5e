//! Reachability prober
//!
//! This module checks whether links are live, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - Issuing one request per link and recording status and redirects
//! - Capturing per-link failures as data rather than errors
//! - Bounding the number of requests in flight with a semaphore

use crate::analysis::{AdvancedHrefData, AdvancedHrefDataItem};
use crate::config::UserAgentConfig;
use crate::url::HrefData;
use crate::UrlError;
use futures::future::join_all;
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Maximum redirect hops followed by a single request
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Overall timeout for a single request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use page_lens::analysis::build_http_client;
/// use page_lens::config::UserAgentConfig;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Probes a single URL
///
/// # Outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx response | `isReachable = true` |
/// | Other response | `error = "HTTP status code: <status>"` |
/// | No response (DNS, refused, timeout, unsupported scheme) | `status = null`, `error = <message>` |
///
/// Redirects are followed by the client; `redirected` reports whether the
/// final URL differs from the requested one.
pub async fn probe_url(client: &Client, url: &Url) -> AdvancedHrefDataItem {
    let mut item = AdvancedHrefDataItem::pending(url);

    match client.get(url.clone()).send().await {
        Ok(response) => {
            let status = response.status();
            item.status = Some(status.as_u16());
            item.redirected = response.url() != url;

            if status.is_success() {
                item.is_reachable = true;
            } else {
                item.error = Some(format!("HTTP status code: {}", status.as_u16()));
            }
        }
        Err(e) => {
            item.error = Some(e.to_string());
        }
    }

    tracing::debug!(
        url = %item.url,
        status = ?item.status,
        reachable = item.is_reachable,
        "Probed link"
    );
    item
}

/// Probes every link of an [`HrefData`] with bounded concurrency
///
/// Cloning is cheap; clones share the HTTP client and the concurrency limit.
#[derive(Debug, Clone)]
pub struct ReachabilityProber {
    client: Client,
    semaphore: Arc<Semaphore>,
}

impl ReachabilityProber {
    /// Creates a prober allowing at most `max_concurrency` requests in flight
    pub fn new(client: Client, max_concurrency: usize) -> Self {
        Self {
            client,
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    /// Probes all internal and external links
    ///
    /// Both sets are probed concurrently and every probe is awaited; a failed
    /// probe never affects the others. The output keeps the input order and
    /// length of each set.
    ///
    /// # Returns
    ///
    /// * `Ok(AdvancedHrefData)` - One item per input URL
    /// * `Err(UrlError::InvalidUrl)` - An input entry is not an absolute URL
    pub async fn probe(&self, href_data: &HrefData) -> Result<AdvancedHrefData, UrlError> {
        let internal = parse_all(&href_data.internal)?;
        let external = parse_all(&href_data.external)?;

        tracing::info!(
            "Probing {} internal and {} external links",
            internal.len(),
            external.len()
        );

        let (internal, external) =
            tokio::join!(self.probe_batch(&internal), self.probe_batch(&external));

        let unreachable = internal
            .iter()
            .chain(external.iter())
            .filter(|item| !item.is_reachable)
            .count();
        tracing::info!(
            "Reachability scan finished: {} links, {} unreachable",
            internal.len() + external.len(),
            unreachable
        );

        Ok(AdvancedHrefData { internal, external })
    }

    async fn probe_batch(&self, urls: &[Url]) -> Vec<AdvancedHrefDataItem> {
        join_all(urls.iter().map(|url| async move {
            // A closed semaphore only means the limit is gone; probe anyway
            let _permit = self.semaphore.acquire().await.ok();
            probe_url(&self.client, url).await
        }))
        .await
    }
}

fn parse_all(urls: &[String]) -> Result<Vec<Url>, UrlError> {
    urls.iter()
        .map(|raw| {
            Url::parse(raw).map_err(|source| UrlError::InvalidUrl {
                href: raw.clone(),
                source,
            })
        })
        .collect()
}
