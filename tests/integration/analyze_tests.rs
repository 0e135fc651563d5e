//! End-to-end analysis against mock sites

use page_lens::analysis::{build_http_client, AnalysisOptions, PageAnalyzer};
use page_lens::config::Config;
use page_lens::source::{HtmlSource, HttpHtmlSource};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Default configuration with translation switched off so no test leaves
/// the machine
fn offline_config() -> Config {
    let mut config = Config::default();
    config.translation.enabled = false;
    config.analysis.probe_timeout_secs = 5;
    config.analysis.probe_concurrency = 4;
    config
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_single_internal_link() {
    let analyzer = PageAnalyzer::from_config(&offline_config()).expect("analyzer");
    let data = analyzer
        .analyze(
            r#"<html><body><a href="/a">A</a></body></html>"#,
            "http://ex.com/",
            &AnalysisOptions::default(),
        )
        .await
        .expect("analysis");

    assert_eq!(data.doc_type, None);
    assert_eq!(data.page_title, "");
    assert!(data.heading_data.is_empty());
    assert_eq!(data.href_data.internal, vec!["http://ex.com/a".to_string()]);
    assert!(data.href_data.external.is_empty());
    assert!(!data.has_login_form);
    assert!(data.get_advanced_link_data.is_none());
}

#[tokio::test]
async fn test_fetch_and_analyze_page() {
    let mock_server = MockServer::start().await;
    let html = r#"<!DOCTYPE html>
<html lang="en">
<head><title> Sign in to Example </title></head>
<body>
  <h1>Welcome</h1>
  <h2>Account</h2>
  <h2></h2>
  <a href="/help">Help</a>
  <a href="/help">Help again</a>
  <a href="https://other.example/docs">Docs</a>
  <form action="/session">
    <input type="text" name="user">
    <input type="password" name="pass">
    <button type="submit">Log in</button>
  </form>
</body>
</html>"#;
    mount_page(&mock_server, "/login", html).await;

    let config = offline_config();
    let client = build_http_client(&config.user_agent, Duration::from_secs(5)).unwrap();
    let source = HttpHtmlSource::new(client);
    let page_url = Url::parse(&format!("{}/login", mock_server.uri())).unwrap();

    let fetched = source.fetch_html(&page_url).await.expect("fetch");
    let analyzer = PageAnalyzer::from_config(&config).unwrap();
    let data = analyzer
        .analyze(&fetched, page_url.as_str(), &AnalysisOptions::default())
        .await
        .expect("analysis");

    assert_eq!(data.doc_type.as_deref(), Some("html"));
    assert_eq!(data.page_title, "Sign in to Example");
    assert_eq!(data.heading_data["h1"], vec!["Welcome".to_string()]);
    assert_eq!(data.heading_data["h2"], vec!["Account".to_string()]);
    assert_eq!(
        data.href_data.internal,
        vec![format!("{}/help", mock_server.uri())]
    );
    assert_eq!(
        data.href_data.external,
        vec!["https://other.example/docs".to_string()]
    );
    assert!(data.has_login_form);
}

#[tokio::test]
async fn test_deep_analysis_probes_every_link_in_order() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/ok"))
        .mount(&mock_server)
        .await;

    let html = r#"<html><body>
        <a href="/missing">missing</a>
        <a href="/ok">ok</a>
        <a href="/old">old</a>
        <a href="http://127.0.0.1:9/closed">closed</a>
    </body></html>"#;
    let page_url = format!("{}/", mock_server.uri());

    let analyzer = PageAnalyzer::from_config(&offline_config()).unwrap();
    let options = AnalysisOptions {
        perform_deep_analysis: true,
        elective_keywords: Vec::new(),
    };
    let mut data = analyzer.analyze(html, &page_url, &options).await.unwrap();
    assert_eq!(data.href_data.internal.len(), 3);
    assert_eq!(data.href_data.external.len(), 1);

    let deferred = data.take_advanced_href_data().expect("deferred scan");
    let advanced = deferred.await.expect("scan result");

    assert_eq!(advanced.internal.len(), data.href_data.internal.len());
    assert_eq!(advanced.external.len(), data.href_data.external.len());
    for (item, href) in advanced.internal.iter().zip(&data.href_data.internal) {
        assert_eq!(&item.url, href);
        assert_eq!(item.protocol, "http:");
    }

    let missing = &advanced.internal[0];
    assert!(!missing.is_reachable);
    assert_eq!(missing.status, Some(404));
    assert_eq!(missing.error.as_deref(), Some("HTTP status code: 404"));

    let ok = &advanced.internal[1];
    assert!(ok.is_reachable);
    assert_eq!(ok.status, Some(200));
    assert!(!ok.redirected);
    assert!(ok.error.is_none());

    let old = &advanced.internal[2];
    assert!(old.is_reachable);
    assert!(old.redirected);

    let closed = &advanced.external[0];
    assert_eq!(closed.url, "http://127.0.0.1:9/closed");
    assert!(!closed.is_reachable);
    assert_eq!(closed.status, None);
    assert!(closed.error.is_some());
}

#[tokio::test]
async fn test_deferred_result_is_shared_between_waiters() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page_url = format!("{}/", mock_server.uri());
    let analyzer = PageAnalyzer::from_config(&offline_config()).unwrap();
    let options = AnalysisOptions {
        perform_deep_analysis: true,
        elective_keywords: Vec::new(),
    };
    let mut data = analyzer
        .analyze(r#"<a href="/ok">ok</a>"#, &page_url, &options)
        .await
        .unwrap();

    let deferred = data.take_advanced_href_data().unwrap();
    let (first, second) = tokio::join!(deferred.clone(), deferred);
    assert_eq!(first.unwrap(), second.unwrap());
}
