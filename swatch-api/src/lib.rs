//! Swatch API Library
//!
//! REST API for the swatch material catalog.
//!
//! # Endpoints
//!
//! ## Materials
//! - `POST /materials` - Create a material
//! - `GET /materials` - List materials, paginated
//! - `GET /materials/{id}` - Fetch one material
//! - `PUT /materials/{id}` - Partially update a material
//! - `DELETE /materials/{id}` - Delete a material
//!
//! ## Querying
//! - `GET /search` - Free-text search
//! - `POST /products/filtered` - Column filters
//! - `GET /filter-options` - Distinct values per filterable column
//! - `GET /` - Search, filter, sort and facets in one call
//!
//! ## Other
//! - `GET /api/proxy-image` - Stream a remote image
//! - `GET /health` - Health check
//! - `GET /api-docs/openapi.json` - OpenAPI specification
//!
//! The binary (`swatch-api`) serves [`rate_limited_router`], which adds
//! per-IP rate limiting on top of [`router`].

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_governor::{governor::GovernorConfigBuilder, GovernorError, GovernorLayer};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

pub mod error;
pub mod handlers;
pub mod models;
pub mod state;
pub mod tracing_middleware;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

/// Maximum accepted request body (1 MB).
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Swatch API",
        version = "0.1.0",
        description = "REST API for the swatch material catalog.\n\nSupports:\n- Material CRUD\n- Free-text search\n- Column filters (OR within a column, AND across columns)\n- Filter options with selection flags\n- Image proxying",
        license(name = "Apache-2.0", url = "https://www.apache.org/licenses/LICENSE-2.0"),
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "materials", description = "Material CRUD"),
        (name = "search", description = "Free-text search and catalog listing"),
        (name = "filter", description = "Column filters and filter options"),
        (name = "proxy", description = "Image proxy")
    ),
    paths(
        handlers::health::health,
        handlers::materials::create_material,
        handlers::materials::list_materials,
        handlers::materials::get_material,
        handlers::materials::update_material,
        handlers::materials::delete_material,
        handlers::search::search,
        handlers::search::catalog,
        handlers::filter::filter_materials,
        handlers::filter::filter_options,
        handlers::proxy::proxy_image,
    ),
    components(schemas(
        swatch::Material,
        swatch::NewMaterial,
        swatch::MaterialPatch,
        swatch::FilterCriterion,
        swatch::FacetValue,
        models::ErrorResponse,
        models::FilteredRequest,
        models::MaterialListResponse,
        models::MaterialPageResponse,
        models::DeleteMaterialResponse,
        models::FilterOptionsResponse,
        models::HealthResponse,
    ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}

/// Build the API router.
///
/// Carries request ids, tracing, timeout, CORS, a concurrency limit shared by
/// every route, and a body size limit. See [`rate_limited_router`] for the
/// per-IP rate limit.
pub fn router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let cors = cors_layer(&state.config);
    // Router::layer wraps each route separately, so the semaphore must be shared
    let in_flight = GlobalConcurrencyLimitLayer::new(state.config.max_in_flight);

    Router::new()
        .route("/", get(handlers::catalog))
        .route("/health", get(handlers::health))
        .route(
            "/materials",
            get(handlers::list_materials).post(handlers::create_material),
        )
        .route(
            "/materials/{id}",
            get(handlers::get_material)
                .put(handlers::update_material)
                .delete(handlers::delete_material),
        )
        .route("/search", get(handlers::search))
        .route("/products/filtered", post(handlers::filter_materials))
        .route("/filter-options", get(handlers::filter_options))
        .route("/api/proxy-image", get(handlers::proxy_image))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(tracing_middleware::trace_request))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(cors)
        .layer(in_flight)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Handle rate limit errors with a JSON response.
fn rate_limit_error(_err: GovernorError) -> Response<Body> {
    let body = serde_json::json!({
        "code": "RATE_LIMITED",
        "message": "Too many requests. Please retry after the specified time.",
        "retry_after_seconds": 1
    });

    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
    response
}

/// [`router`] with per-client-IP rate limiting.
///
/// Each IP may send `rate_limit_burst` requests at once and then
/// `rate_limit_per_second` sustained. The limiter keys on the peer address,
/// so serve it with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn rate_limited_router(state: Arc<AppState>) -> ApiResult<Router> {
    let per_second = state.config.rate_limit_per_second;
    let burst = state.config.rate_limit_burst;
    if per_second == 0 || burst == 0 {
        return Err(ApiError::Internal(
            "Rate limit and burst size must be positive".into(),
        ));
    }

    // The quota replenishes one request every `period`
    let governor_conf = GovernorConfigBuilder::default()
        .period(Duration::from_secs(1) / per_second)
        .burst_size(burst)
        .finish()
        .ok_or_else(|| {
            ApiError::Internal(format!("Rate limit of {} req/sec is out of range", per_second))
        })?;

    let governor_layer = GovernorLayer::new(governor_conf).error_handler(rate_limit_error);
    Ok(router(state).layer(governor_layer))
}
