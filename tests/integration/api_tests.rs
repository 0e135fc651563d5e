//! HTTP API tests driven through the router

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use futures::FutureExt;
use page_lens::analysis::{
    build_http_client, AdvancedHrefData, DeferredHrefData, LoginFormDetector, PageAnalyzer,
    ReachabilityProber,
};
use page_lens::cache::DeferredCache;
use page_lens::config::UserAgentConfig;
use page_lens::server::{router, AppState};
use page_lens::source::HtmlSource;
use page_lens::translation::Translator;
use page_lens::LensError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves pages from memory; unknown URLs fail like an unreachable site
struct StaticSource {
    pages: HashMap<String, String>,
}

#[async_trait]
impl HtmlSource for StaticSource {
    async fn fetch_html(&self, url: &Url) -> Result<String, LensError> {
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| LensError::Fetch {
                url: url.to_string(),
                message: "HTTP status code: 404".to_string(),
            })
    }
}

fn test_state(pages: &[(&str, &str)]) -> AppState {
    let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5)).unwrap();
    let analyzer = PageAnalyzer::new(
        LoginFormDetector::new(Arc::new(Translator::disabled())),
        ReachabilityProber::new(client, 4),
    );
    let source = StaticSource {
        pages: pages
            .iter()
            .map(|(url, html)| (url.to_string(), html.to_string()))
            .collect(),
    };

    AppState::new(
        Arc::new(analyzer),
        Arc::new(source),
        Arc::new(DeferredCache::new(Duration::from_secs(60))),
    )
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("host", "lens.test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_analyze_requires_url() {
    let app = router(test_state(&[]));

    let (status, body) = get(app.clone(), "/api/v1/analyze").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = get(app.clone(), "/api/v1/analyze?url=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(app, "/api/v1/analyze?url=not%20a%20url").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_unreachable_page() {
    let app = router(test_state(&[]));
    let (status, body) = get(app, "/api/v1/analyze?url=http%3A%2F%2Fgone.test%2F").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("gone.test"));
}

#[tokio::test]
async fn test_analyze_without_deep_analysis() {
    let html = r#"<!DOCTYPE html><html><head><title>Home</title></head>
        <body><h1>Hello</h1><a href="/about">About</a><a href="https://elsewhere.test/">Out</a></body></html>"#;
    let app = router(test_state(&[("http://site.test/", html)]));

    let (status, body) = get(app, "/api/v1/analyze?url=http://site.test/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["docType"], "html");
    assert_eq!(body["pageTitle"], "Home");
    assert_eq!(body["headingData"]["h1"][0], "Hello");
    assert_eq!(body["hrefData"]["internal"][0], "http://site.test/about");
    assert_eq!(body["hrefData"]["external"][0], "https://elsewhere.test/");
    assert_eq!(body["hasLoginForm"], false);
    assert!(body.get("getAdvancedLinkData").is_none());
}

#[tokio::test]
async fn test_deep_analysis_round_trip() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let html = format!(
        r#"<html><body><a href="{0}/up">up</a><a href="{0}/down">down</a></body></html>"#,
        mock_server.uri()
    );
    let state = test_state(&[("http://site.test/", html.as_str())]);
    let app = router(state.clone());

    let (status, body) = get(
        app.clone(),
        "/api/v1/analyze?url=http://site.test/&performDeepAnalysis=true",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hrefData"]["external"].as_array().unwrap().len(), 2);
    assert_eq!(state.cache().len(), 1);

    let link = body["getAdvancedLinkData"].as_str().unwrap();
    let link = Url::parse(link).unwrap();
    assert_eq!(link.host_str(), Some("lens.test"));
    assert!(link.path().starts_with("/api/v1/advancedLinkData/"));

    let (status, body) = get(app.clone(), link.path()).await;
    assert_eq!(status, StatusCode::OK);
    let advanced: AdvancedHrefData =
        serde_json::from_value(body["advancedHrefData"].clone()).unwrap();
    assert!(advanced.internal.is_empty());
    assert_eq!(advanced.external.len(), 2);
    assert!(advanced.external[0].is_reachable);
    assert_eq!(advanced.external[1].status, Some(500));
    assert_eq!(
        advanced.external[1].error.as_deref(),
        Some("HTTP status code: 500")
    );

    // The entry stays until it expires, so a second collection succeeds
    let (status, _) = get(app, link.path()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_deep_analysis_flag_must_be_true() {
    let html = r#"<a href="/x">x</a>"#;
    let state = test_state(&[("http://site.test/", html)]);
    let app = router(state.clone());

    let (status, body) = get(
        app,
        "/api/v1/analyze?url=http://site.test/&performDeepAnalysis=yes",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("getAdvancedLinkData").is_none());
    assert!(state.cache().is_empty());
}

#[tokio::test]
async fn test_public_base_url_is_advertised() {
    let html = r#"<a href="/x">x</a>"#;
    let state = test_state(&[("http://site.test/", html)])
        .with_public_base_url("https://lens.example.com/");
    let app = router(state);

    let (status, body) = get(
        app,
        "/api/v1/analyze?url=http://site.test/&performDeepAnalysis=true",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["getAdvancedLinkData"]
        .as_str()
        .unwrap()
        .starts_with("https://lens.example.com/api/v1/advancedLinkData/"));
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let app = router(test_state(&[]));
    let (status, body) = get(app, "/api/v1/advancedLinkData/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "could not find data by id");
    assert_eq!(body["id"], "does-not-exist");
}

#[tokio::test]
async fn test_missing_id_is_not_found_with_message() {
    let app = router(test_state(&[]));

    for uri in ["/api/v1/advancedLinkData/", "/api/v1/advancedLinkData"] {
        let (status, body) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["message"], "missing id parameter", "{}", uri);
    }
}

#[tokio::test]
async fn test_failed_scan_is_server_error() {
    let state = test_state(&[]);
    let failed: DeferredHrefData = futures::future::ready(Err("scan aborted".to_string()))
        .boxed()
        .shared();
    state.cache().set("broken", failed);

    let (status, body) = get(router(state), "/api/v1/advancedLinkData/broken").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "scan aborted");
}

#[tokio::test]
async fn test_expired_entry_is_not_found() {
    let state = test_state(&[]);
    state.cache().set_lifespan(Duration::from_millis(20));
    let done: DeferredHrefData = futures::future::ready(Ok(AdvancedHrefData::default()))
        .boxed()
        .shared();
    state.cache().set("soon-gone", done);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let (status, _) = get(router(state), "/api/v1/advancedLinkData/soon-gone").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
