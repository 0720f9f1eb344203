//! Image proxy.
//!
//! Lets the catalog frontend load vendor images through this origin.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::header::CONTENT_TYPE,
    response::Response,
};
use reqwest::Url;

use crate::error::{ApiError, ApiResult};
use crate::models::{ErrorResponse, ProxyQuery};
use crate::state::AppState;

/// Parse the target URL, accepting only absolute http(s) URLs.
fn parse_target(raw: Option<&str>) -> ApiResult<Url> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Missing 'url' query parameter".into()))?;

    let url = Url::parse(raw).map_err(|e| ApiError::Validation(format!("Invalid url '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::Validation(format!("Unsupported url scheme '{}'", other))),
    }
}

/// Stream a remote image back to the caller.
///
/// The upstream `content-type` is forwarded and the body is passed through
/// unmodified. Fetch failures and non-success upstream statuses are 500.
#[utoipa::path(
    get,
    path = "/api/proxy-image",
    tag = "proxy",
    params(ProxyQuery),
    responses(
        (status = 200, description = "Image bytes as served upstream", content_type = "application/octet-stream"),
        (status = 400, description = "Missing or invalid url", body = ErrorResponse),
        (status = 500, description = "Upstream fetch failed", body = ErrorResponse)
    )
)]
pub async fn proxy_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProxyQuery>,
) -> ApiResult<Response> {
    let url = parse_target(query.url.as_deref())?;

    let upstream = state
        .http
        .get(url.clone())
        .send()
        .await
        .map_err(|e| ApiError::Upstream(format!("Failed to fetch image: {}", e)))?;

    let status = upstream.status();
    if !status.is_success() {
        return Err(ApiError::Upstream(format!(
            "Image host returned {} for {}",
            status, url
        )));
    }

    tracing::debug!(url = %url, status = status.as_u16(), "Proxying image");

    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    if let Some(content_type) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert!(parse_target(Some("https://cdn.example.com/a.jpg")).is_ok());
        assert!(matches!(parse_target(None), Err(ApiError::Validation(_))));
        assert!(matches!(parse_target(Some("  ")), Err(ApiError::Validation(_))));
        assert!(matches!(parse_target(Some("not a url")), Err(ApiError::Validation(_))));
        assert!(matches!(
            parse_target(Some("file:///etc/passwd")),
            Err(ApiError::Validation(_))
        ));
    }
}
