//! Page analyzer - orchestration of a single page analysis
//!
//! The analyzer parses the HTML once, extracts everything synchronously
//! (structure, links, login-form signals), then awaits the login decision.
//! When deep analysis is requested it launches the reachability scan as a
//! detached task and hands back a shareable handle to its eventual result.

use crate::analysis::document::{DocumentStructure, HeadingData};
use crate::analysis::login::{LoginFormDetector, LoginSignals};
use crate::analysis::prober::{build_http_client, ReachabilityProber};
use crate::analysis::AdvancedHrefData;
use crate::config::Config;
use crate::translation::Translator;
use crate::url::{extract_href_data, HrefData};
use crate::{LensError, UrlError};
use futures::future::{BoxFuture, FutureExt, Shared};
use scraper::Html;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Handle to a reachability scan that may still be running
///
/// Every clone resolves to the same result. The error is the scan's failure
/// message.
pub type DeferredHrefData = Shared<BoxFuture<'static, Result<AdvancedHrefData, String>>>;

/// Per-call analysis options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Probe every discovered link in the background
    pub perform_deep_analysis: bool,

    /// Extra login keywords for this call
    pub elective_keywords: Vec<String>,
}

/// Result of analysing one page
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebPageData {
    pub doc_type: Option<String>,
    pub page_title: String,
    pub heading_data: HeadingData,
    pub href_data: HrefData,
    pub has_login_form: bool,

    /// Absolute URL where the deferred reachability result can be collected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get_advanced_link_data: Option<String>,

    #[serde(skip)]
    advanced_href_data: Option<DeferredHrefData>,
}

impl WebPageData {
    /// Takes the pending reachability scan, if deep analysis was requested
    pub fn take_advanced_href_data(&mut self) -> Option<DeferredHrefData> {
        self.advanced_href_data.take()
    }

    pub fn has_advanced_href_data(&self) -> bool {
        self.advanced_href_data.is_some()
    }
}

impl fmt::Debug for WebPageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebPageData")
            .field("doc_type", &self.doc_type)
            .field("page_title", &self.page_title)
            .field("heading_data", &self.heading_data)
            .field("href_data", &self.href_data)
            .field("has_login_form", &self.has_login_form)
            .field("get_advanced_link_data", &self.get_advanced_link_data)
            .field("deferred", &self.advanced_href_data.is_some())
            .finish()
    }
}

/// Analyses pages: structure, links, login form, and optional link probing
pub struct PageAnalyzer {
    detector: LoginFormDetector,
    prober: ReachabilityProber,
    elective_keywords: Vec<String>,
}

impl PageAnalyzer {
    pub fn new(detector: LoginFormDetector, prober: ReachabilityProber) -> Self {
        Self {
            detector,
            prober,
            elective_keywords: Vec::new(),
        }
    }

    /// Builds an analyzer (HTTP client, translator, prober) from configuration
    pub fn from_config(config: &Config) -> Result<Self, LensError> {
        let client = build_http_client(&config.user_agent, config.analysis.probe_timeout())?;
        let translator = Translator::from_config(&config.translation, client.clone());
        let prober = ReachabilityProber::new(client, config.analysis.probe_concurrency as usize);

        let mut analyzer = Self::new(LoginFormDetector::new(Arc::new(translator)), prober);
        analyzer.elective_keywords = config.analysis.elective_keywords.clone();
        Ok(analyzer)
    }

    /// Analyses `html`, fetched from `page_url`
    ///
    /// # Returns
    ///
    /// * `Ok(WebPageData)` - The synchronous result; with deep analysis it
    ///   also carries the pending reachability scan
    /// * `Err(LensError::Url)` - The page URL or one of its hrefs cannot be
    ///   resolved
    pub async fn analyze(
        &self,
        html: &str,
        page_url: &str,
        options: &AnalysisOptions,
    ) -> Result<WebPageData, LensError> {
        let page_url = Url::parse(page_url).map_err(|source| UrlError::InvalidSource {
            url: page_url.to_string(),
            source,
        })?;

        // The parsed document is not Send; keep it out of any await point
        let (structure, href_data, signals) = {
            let document = Html::parse_document(html);
            (
                DocumentStructure::extract(html, &document),
                extract_href_data(&document, &page_url)?,
                LoginSignals::from_document(&document),
            )
        };

        let keywords = self.merged_keywords(&options.elective_keywords);
        let has_login_form = self.detector.has_login_form(&signals, &keywords).await;

        tracing::info!(
            "Analysed {}: {} internal / {} external links, login form: {}",
            page_url,
            href_data.internal.len(),
            href_data.external.len(),
            has_login_form
        );

        let advanced_href_data = options
            .perform_deep_analysis
            .then(|| self.spawn_reachability_scan(href_data.clone()));

        Ok(WebPageData {
            doc_type: structure.doc_type,
            page_title: structure.page_title,
            heading_data: structure.heading_data,
            href_data,
            has_login_form,
            get_advanced_link_data: None,
            advanced_href_data,
        })
    }

    /// Starts probing `href_data` on a detached task
    ///
    /// The scan runs to completion whether or not the returned handle is ever
    /// awaited.
    pub fn spawn_reachability_scan(&self, href_data: HrefData) -> DeferredHrefData {
        let prober = self.prober.clone();
        let handle = tokio::spawn(async move { prober.probe(&href_data).await });

        async move {
            match handle.await {
                Ok(Ok(data)) => Ok(data),
                Ok(Err(e)) => Err(e.to_string()),
                Err(e) => Err(format!("Reachability scan did not complete: {}", e)),
            }
        }
        .boxed()
        .shared()
    }

    fn merged_keywords(&self, per_call: &[String]) -> Vec<String> {
        per_call
            .iter()
            .chain(self.elective_keywords.iter())
            .cloned()
            .collect()
    }
}
