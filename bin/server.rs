// Food Rescue Ledger - Web Server
// REST API with Axum over the shared ledger connection

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use food_rescue::{
    claim_food, get_all_listings, get_all_providers, get_all_receivers, get_claim,
    get_claims_for_listing, get_listing, get_receiver, list_claimable, list_food, local_now,
    local_today, open_database, register_provider, register_receiver, run_all, telemetry,
    AppConfig, Claim, FoodError, FoodListing, NewListing, NewProvider, NewReceiver, Provider,
    Receiver, Report, ReportOutput, ReportParams, VERSION,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db.lock().map_err(|_| ApiError::Poisoned)
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

#[derive(Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
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

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

enum ApiError {
    Food(FoodError),
    UnknownReport(String),
    NotFound(&'static str, i64),
    Poisoned,
}

impl From<FoodError> for ApiError {
    fn from(err: FoodError) -> Self {
        ApiError::Food(err)
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::Food(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Food(err) => {
                let status = match &err {
                    FoodError::UnknownProvider(_) | FoodError::UnknownReceiver(_) => StatusCode::NOT_FOUND,
                    FoodError::NotClaimable(_) => StatusCode::CONFLICT,
                    FoodError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    FoodError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    FoodError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    error!(error = %err, "request failed");
                }
                (status, err.kind(), err.to_string())
            }
            ApiError::UnknownReport(name) => (
                StatusCode::NOT_FOUND,
                "UnknownReport",
                format!("no report named {name:?}"),
            ),
            ApiError::NotFound(entity, id) => (
                StatusCode::NOT_FOUND,
                "NotFound",
                format!("{entity} {id} does not exist"),
            ),
            ApiError::Poisoned => {
                error!("database mutex poisoned");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "StoreUnavailable",
                    "database handle unavailable".to_string(),
                )
            }
        };

        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ErrorBody { kind, message }),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct CatalogEntry {
    number: u8,
    slug: &'static str,
    title: &'static str,
    needs_city: bool,
}

#[derive(Deserialize)]
struct CityQuery {
    city: Option<String>,
}

#[derive(Deserialize)]
struct ClaimRequest {
    food_id: i64,
    receiver_id: i64,
}

#[derive(Serialize)]
struct ClaimResponse {
    claim_id: i64,
    food_id: i64,
    receiver_id: i64,
    status: &'static str,
}

#[derive(Serialize)]
struct CreatedResponse {
    id: i64,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ListingDetail {
    #[serde(flatten)]
    listing: FoodListing,
    claims: Vec<Claim>,
}

#[derive(Serialize)]
struct ClaimableResponse {
    label: String,
    #[serde(flatten)]
    listing: FoodListing,
}

fn report_params(city: Option<String>) -> ReportParams {
    ReportParams {
        city,
        today: local_today(),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "OK",
        version: VERSION,
    }))
}

/// GET /api/reports - The report catalog
async fn get_catalog() -> Json<ApiResponse<Vec<CatalogEntry>>> {
    let catalog = Report::ALL
        .iter()
        .map(|r| CatalogEntry {
            number: r.number(),
            slug: r.slug(),
            title: r.title(),
            needs_city: r.needs_city(),
        })
        .collect();
    Json(ApiResponse::ok(catalog))
}

/// GET /api/reports/:slug?city= - Run one report
async fn get_report(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<CityQuery>,
) -> ApiResult<ReportOutput> {
    let report = Report::from_slug(&slug).ok_or(ApiError::UnknownReport(slug))?;
    let conn = state.conn()?;
    let output = report.output(&conn, &report_params(query.city))?;
    Ok(Json(ApiResponse::ok(output)))
}

/// GET /api/dashboard?city= - Run the whole catalog
async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<CityQuery>,
) -> ApiResult<Vec<ReportOutput>> {
    let conn = state.conn()?;
    let outputs = run_all(&conn, &report_params(query.city))?;
    Ok(Json(ApiResponse::ok(outputs)))
}

/// GET /api/claimable - Food that can be claimed right now
async fn get_claimable(State(state): State<AppState>) -> ApiResult<Vec<ClaimableResponse>> {
    let conn = state.conn()?;
    let listings = list_claimable(&conn, local_today())?
        .into_iter()
        .map(|listing| ClaimableResponse {
            label: listing.label(),
            listing,
        })
        .collect();
    Ok(Json(ApiResponse::ok(listings)))
}

/// POST /api/claims - Claim a listing for a receiver
async fn post_claim(
    State(state): State<AppState>,
    Json(request): Json<ClaimRequest>,
) -> ApiResult<ClaimResponse> {
    let mut conn = state.conn()?;
    let claim_id = claim_food(&mut conn, request.food_id, request.receiver_id, local_now())?;
    Ok(Json(ApiResponse::ok(ClaimResponse {
        claim_id,
        food_id: request.food_id,
        receiver_id: request.receiver_id,
        status: "Pending",
    })))
}

/// POST /api/listings - List a new food item
async fn post_listing(
    State(state): State<AppState>,
    Json(listing): Json<NewListing>,
) -> ApiResult<CreatedResponse> {
    let conn = state.conn()?;
    let id = list_food(&conn, &listing)?;
    Ok(Json(ApiResponse::ok(CreatedResponse { id })))
}

/// POST /api/providers - Register a provider
async fn post_provider(
    State(state): State<AppState>,
    Json(provider): Json<NewProvider>,
) -> ApiResult<CreatedResponse> {
    let conn = state.conn()?;
    let id = register_provider(&conn, &provider)?;
    Ok(Json(ApiResponse::ok(CreatedResponse { id })))
}

/// POST /api/receivers - Register a receiver
async fn post_receiver(
    State(state): State<AppState>,
    Json(receiver): Json<NewReceiver>,
) -> ApiResult<CreatedResponse> {
    let conn = state.conn()?;
    let id = register_receiver(&conn, &receiver)?;
    Ok(Json(ApiResponse::ok(CreatedResponse { id })))
}

/// GET /api/providers - All providers
async fn get_providers(State(state): State<AppState>) -> ApiResult<Vec<Provider>> {
    let conn = state.conn()?;
    Ok(Json(ApiResponse::ok(get_all_providers(&conn)?)))
}

/// GET /api/receivers - All receivers
async fn get_receivers(State(state): State<AppState>) -> ApiResult<Vec<Receiver>> {
    let conn = state.conn()?;
    Ok(Json(ApiResponse::ok(get_all_receivers(&conn)?)))
}

/// GET /api/receivers/:id - One receiver
async fn get_receiver_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Receiver> {
    let conn = state.conn()?;
    let receiver = get_receiver(&conn, id)?.ok_or(FoodError::UnknownReceiver(id))?;
    Ok(Json(ApiResponse::ok(receiver)))
}

/// GET /api/listings - All listings, claimed or not
async fn get_listings(State(state): State<AppState>) -> ApiResult<Vec<FoodListing>> {
    let conn = state.conn()?;
    Ok(Json(ApiResponse::ok(get_all_listings(&conn)?)))
}

/// GET /api/listings/:id - One listing with its claim history
async fn get_listing_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ListingDetail> {
    let conn = state.conn()?;
    let listing = get_listing(&conn, id)?.ok_or(ApiError::NotFound("food listing", id))?;
    let claims = get_claims_for_listing(&conn, id)?;
    Ok(Json(ApiResponse::ok(ListingDetail { listing, claims })))
}

/// GET /api/claims/:id - One claim
async fn get_claim_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Claim> {
    let conn = state.conn()?;
    let claim = get_claim(&conn, id)?.ok_or(ApiError::NotFound("claim", id))?;
    Ok(Json(ApiResponse::ok(claim)))
}

// ============================================================================
// Main Server
// ============================================================================

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/reports", get(get_catalog))
        .route("/reports/:slug", get(get_report))
        .route("/dashboard", get(get_dashboard))
        .route("/claimable", get(get_claimable))
        .route("/claims", post(post_claim))
        .route("/claims/:id", get(get_claim_by_id))
        .route("/listings", get(get_listings).post(post_listing))
        .route("/listings/:id", get(get_listing_detail))
        .route("/providers", get(get_providers).post(post_provider))
        .route("/receivers", get(get_receivers).post(post_receiver))
        .route("/receivers/:id", get(get_receiver_by_id))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    telemetry::init(&config.log_level)?;

    let conn = open_database(&config.db_path)?;
    info!(path = %config.db_path.display(), "database opened");

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
    };

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "food-rescue API listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
