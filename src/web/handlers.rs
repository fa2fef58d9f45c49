//! HTTP request handlers

use super::state::AppState;
use crate::config::{parse_page, parse_timeout};
use crate::search::Query as SearchQuery;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Query parameters for search
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Provider name
    pub provider: Option<String>,
    /// Search text
    pub keyword: Option<String>,
    /// Page number
    pub page: Option<String>,
    /// Timeout, e.g. `5000ms`
    pub timeout: Option<String>,
    /// JSONP callback name
    pub callback: Option<String>,
}

/// Query parameters for provider listing
#[derive(Debug, Default, Deserialize)]
pub struct ProvidersParams {
    /// JSONP callback name
    pub callback: Option<String>,
}

/// One provider in the `/providers` listing
#[derive(Debug, Serialize)]
pub struct ProviderResponse {
    pub name: String,
    pub title: String,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Provider listing handler
pub async fn providers(
    State(state): State<AppState>,
    Query(params): Query<ProvidersParams>,
) -> Response {
    let providers: Vec<ProviderResponse> = state
        .registry
        .list()
        .into_iter()
        .filter(|p| p.is_enabled() && !p.is_no_ui())
        .map(|p| ProviderResponse {
            name: p.name().to_string(),
            title: p.title().to_string(),
        })
        .collect();

    respond(StatusCode::OK, &providers, params.callback.as_deref())
}

/// Search handler
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let mut query = SearchQuery::new(
        params.provider.unwrap_or_default(),
        params.keyword.unwrap_or_default(),
    )
    .with_page(parse_page(params.page.as_deref().unwrap_or_default()))
    .with_timeout(parse_timeout(
        params.timeout.as_deref().unwrap_or_default(),
        state.default_timeout,
    ));

    let callback = params.callback.as_deref();
    match state.search.run(&mut query).await {
        Ok(_) => respond(StatusCode::OK, &query.results, callback),
        Err(e) => {
            let status = query
                .http_status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = ErrorResponse {
                error: e.to_string(),
            };
            respond(status, &body, callback)
        }
    }
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

/// Plain JSON, or a JSONP script when a callback name is given
fn respond<T: Serialize>(status: StatusCode, body: &T, callback: Option<&str>) -> Response {
    match callback.filter(|c| is_valid_callback(c)) {
        Some(callback) => {
            let json = match serde_json::to_string(body) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize response: {}", e);
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            };
            (
                status,
                [(header::CONTENT_TYPE, "application/javascript")],
                format!("{}({});", callback, json),
            )
                .into_response()
        }
        None => (status, Json(body)).into_response(),
    }
}

fn is_valid_callback(callback: &str) -> bool {
    !callback.is_empty()
        && callback
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$')
}
