// 🌐 REST API with Axum
// Router and handlers for the mock feed. Every request regenerates from the
// shared read-only fixtures.

use crate::bundle::{build_bundle, bundle_file_name};
use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::feed::{get_page, FeedFilters};
use crate::fixture::Fixtures;
use crate::funding::FundingStream;
use crate::lookup::{get_by_id, get_provider_funding};
use crate::reference;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub fixtures: Arc<Fixtures>,
    pub config: Arc<FeedConfig>,
}

impl AppState {
    pub fn new(fixtures: Fixtures, config: FeedConfig) -> Self {
        AppState {
            fixtures: Arc::new(fixtures),
            config: Arc::new(config),
        }
    }
}

/// API Response wrapper for health and error bodies
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler failure mapped onto an HTTP status
#[derive(Debug)]
pub enum ApiError {
    Feed(FeedError),
    Internal(String),
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        ApiError::Feed(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Feed(err) if err.is_client_error() => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Feed(err) => {
                error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Internal(message) => {
                error!(error = %message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(ApiResponse::error(message))).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

fn not_found(what: &str, id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error(format!("{} {} not found", what, id))),
    )
        .into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/feed - Newest page of the filtered feed
async fn feed(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult {
    feed_response(&state, params, None)
}

/// GET /api/feed/:page - A specific page of the filtered feed
async fn feed_page(
    State(state): State<AppState>,
    Path(page): Path<usize>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult {
    feed_response(&state, params, Some(page))
}

fn feed_response(state: &AppState, params: Vec<(String, String)>, page: Option<usize>) -> ApiResult {
    let filters = FeedFilters::from_pairs(params)?;
    let response = get_page(&state.fixtures, &filters, page, &state.config)?;
    Ok(Json(response).into_response())
}

/// GET /api/feed/byId/:id - Funding record content of one feed entry
async fn funding_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    match get_by_id(&state.fixtures, &id)? {
        Some(funding) => Ok(Json(funding).into_response()),
        None => Ok(not_found("Funding", &id)),
    }
}

/// GET /api/providerfunding/:id - Single-provider funding record
async fn provider_funding(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    match get_provider_funding(&state.fixtures, &id)? {
        Some(funding) => Ok(Json(funding).into_response()),
        None => Ok(not_found("Provider funding", &id)),
    }
}

/// GET /api/periods
async fn periods() -> impl IntoResponse {
    Json(reference::periods())
}

/// GET /api/fundingstreams
async fn funding_streams() -> impl IntoResponse {
    Json(reference::funding_streams())
}

/// GET /api/logical - Template trees without values
async fn logical() -> impl IntoResponse {
    Json(reference::logical_models())
}

/// GET /api/downloadDsgFiles
async fn download_dsg(State(state): State<AppState>) -> ApiResult {
    download(state, FundingStream::Dsg).await
}

/// GET /api/downloadPesportsFiles
async fn download_pesports(State(state): State<AppState>) -> ApiResult {
    download(state, FundingStream::PeSports).await
}

async fn download(state: AppState, stream: FundingStream) -> ApiResult {
    let bytes = tokio::task::spawn_blocking(move || {
        build_bundle(&state.fixtures, stream, &state.config)
    })
    .await
    .map_err(|err| ApiError::Internal(format!("bundle task failed: {}", err)))??;

    let disposition = format!("attachment; filename=\"{}\"", bundle_file_name(stream));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/feed", get(feed))
        .route("/feed/:page", get(feed_page))
        .route("/feed/byId/:id", get(funding_by_id))
        .route("/providerfunding/:id", get(provider_funding))
        .route("/periods", get(periods))
        .route("/fundingstreams", get(funding_streams))
        .route("/logical", get(logical))
        .route("/downloadDsgFiles", get(download_dsg))
        .route("/downloadPesportsFiles", get(download_pesports))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(
            Fixtures::embedded().unwrap(),
            FeedConfig::new("http://mock.test", 50),
        );
        router(state)
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_feed_with_filters() {
        let (status, body) =
            get_json("/api/feed?fundingStreamCodes%5B%5D=PESports&pageSize=10").await;
        assert_eq!(status, StatusCode::OK);
        // 16 entries, 2 pages, default page 2 holds the 6 oldest
        assert_eq!(body["atomEntry"].as_array().unwrap().len(), 6);
        assert_eq!(
            body["atomEntry"][0]["content"]["funding"]["id"],
            "PESports_AY1920_MOCKUKPRN202_1.0"
        );
    }

    #[tokio::test]
    async fn test_feed_page_links() {
        let (status, body) = get_json("/api/feed/1?fundingStreamCodes=DSG").await;
        assert_eq!(status, StatusCode::OK);
        let links = body["link"].as_array().unwrap();
        let last = links.iter().find(|l| l["rel"] == "last").unwrap();
        assert_eq!(last["href"], "http://mock.test/api/feed/1?fundingStreamCodes=DSG");
    }

    #[tokio::test]
    async fn test_bad_query_is_400() {
        let (status, body) = get_json("/api/feed?fundingPeriodStartYear=soon").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_by_id_and_not_found() {
        let (status, body) = get_json("/api/feed/byId/DSG_FY1920_MOCKUKPRN202_1.0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["organisationGroup"]["name"], "Camden");

        let (status, _) = get_json("/api/feed/byId/NOPE_1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_provider_funding() {
        let (status, body) = get_json("/api/providerfunding/DSG_FY1920_MOCKUKPRN202_1.0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["provider"]["name"], "Camden");
    }

    #[tokio::test]
    async fn test_catalogs() {
        let (_, periods) = get_json("/api/periods").await;
        assert_eq!(periods.as_array().unwrap().len(), 3);

        let (_, streams) = get_json("/api/fundingstreams").await;
        assert_eq!(streams[0]["code"], "DSG");

        let (_, logical) = get_json("/api/logical").await;
        assert_eq!(logical[0]["fundingLines"][0]["templateLineId"], 1);
    }

    #[tokio::test]
    async fn test_download_is_zip() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/downloadPesportsFiles")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        // Local file header signature
        assert_eq!(&bytes[..4], b"PK\x03\x04");
    }
}
