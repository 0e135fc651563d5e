//! Page analysis module
//!
//! This module contains the analysis pipeline for a single page:
//! - Document structure extraction (doctype, title, headings)
//! - Login-form detection
//! - Reachability probing of discovered links
//! - The analyzer that ties them together into a [`WebPageData`]

mod document;
mod engine;
mod login;
mod prober;

pub use document::{
    extract_doc_type, extract_heading_data, extract_page_title, DocumentStructure, HeadingData,
};
pub use engine::{AnalysisOptions, DeferredHrefData, PageAnalyzer, WebPageData};
pub use login::{LoginFormDetector, LoginSignals, DEFAULT_LOGIN_KEYWORDS};
pub use prober::{build_http_client, probe_url, ReachabilityProber};

use serde::{Deserialize, Serialize};
use url::Url;

/// Outcome of probing a single link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedHrefDataItem {
    /// The probed URL
    pub url: String,

    /// URL scheme followed by `:` (e.g. `https:`)
    pub protocol: String,

    /// Whether the response came from a different URL than requested
    pub redirected: bool,

    /// Whether the response status indicated success
    pub is_reachable: bool,

    /// HTTP status, absent when no response was received
    pub status: Option<u16>,

    /// Failure description, absent for reachable links
    pub error: Option<String>,
}

impl AdvancedHrefDataItem {
    /// A not-yet-probed item for `url`
    pub fn pending(url: &Url) -> Self {
        Self {
            url: url.to_string(),
            protocol: format!("{}:", url.scheme()),
            redirected: false,
            is_reachable: false,
            status: None,
            error: None,
        }
    }
}

/// Probe results, in the same order and cardinality as the source [`crate::HrefData`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedHrefData {
    pub internal: Vec<AdvancedHrefDataItem>,
    pub external: Vec<AdvancedHrefDataItem>,
}
