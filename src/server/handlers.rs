use crate::analysis::{AdvancedHrefData, AnalysisOptions, WebPageData};
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::source::parse_page_url;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyzeQuery {
    url: Option<String>,
    perform_deep_analysis: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdvancedLinkDataResponse {
    advanced_href_data: AdvancedHrefData,
}

/// `GET /api/v1/analyze?url=<URL>&performDeepAnalysis=<true|false>`
pub(crate) async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<WebPageData>, ApiError> {
    let url = parse_page_url(query.url.as_deref().unwrap_or_default())?;

    let options = AnalysisOptions {
        perform_deep_analysis: query.perform_deep_analysis.as_deref() == Some("true"),
        elective_keywords: Vec::new(),
    };

    let html = state.source.fetch_html(&url).await?;
    let mut data = state.analyzer.analyze(&html, url.as_str(), &options).await?;

    if let Some(deferred) = data.take_advanced_href_data() {
        let id = Uuid::new_v4().to_string();
        data.get_advanced_link_data = Some(format!(
            "{}/api/v1/advancedLinkData/{}",
            state.base_url(&headers),
            id
        ));
        state.cache.set(id.clone(), deferred);
        tracing::info!("Registered deferred link analysis {} for {}", id, url);
    }

    Ok(Json(data))
}

/// `GET /api/v1/advancedLinkData/:id`
pub(crate) async fn advanced_link_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AdvancedLinkDataResponse>, ApiError> {
    let entry = state
        .cache
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(id.clone()))?;

    let advanced_href_data = entry.payload.await.map_err(ApiError::Internal)?;
    Ok(Json(AdvancedLinkDataResponse { advanced_href_data }))
}

/// `GET /api/v1/advancedLinkData` without an id
pub(crate) async fn missing_link_data_id() -> ApiError {
    ApiError::MissingId
}

impl AppState {
    /// Base URL for links handed back to clients
    fn base_url(&self, headers: &HeaderMap) -> String {
        if let Some(base) = &self.public_base_url {
            return base.trim_end_matches('/').to_string();
        }

        let host = headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("localhost");
        format!("http://{}", host)
    }
}
