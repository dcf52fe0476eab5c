use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::filter::{AlertCriteria, FilterCriteria, TimeWindow};
use crate::services::alert_service::AlertListResponse;
use crate::services::station_service::StationListResponse;
use crate::services::{AlertService, StationService};
use crate::store::{FacetsResponse, FleetSummary, ReadingHistory, StationDetail};

#[derive(Clone)]
pub struct AppState {
    pub station_service: StationService,
    pub alert_service: AlertService,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StationListQuery {
    /// Exact state match
    pub state: Option<String>,
    /// Exact district match
    pub district: Option<String>,
    /// Case-insensitive substring against name, district or state
    pub search: Option<String>,
    /// Current status class (critical, warning, normal, unknown)
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AlertListQuery {
    /// Alert severity (critical, warning); absent means either
    pub severity: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub search: Option<String>,
    /// Cap on returned alerts (the dashboard widget uses 5)
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReadingHistoryQuery {
    /// Named window: 7days, 30days, 3months, 6months, 1year, season
    pub window: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FacetsQuery {
    /// Narrow districts to one state
    pub state: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Groundwater Monitor Service API",
        description = "Read-only monitoring API over groundwater stations and their water-level readings"
    ),
    paths(health, get_stations, get_station_by_id, get_station_readings, get_alerts, get_summary, get_facets),
    components(schemas(
        HealthResponse,
        crate::classifier::Status,
        crate::filter::AlertSeverity,
        crate::store::Station,
        crate::store::Reading,
        crate::store::StationSummary,
        crate::store::StationDetail,
        crate::store::ReadingPoint,
        crate::store::ReadingHistory,
        crate::store::WindowStatistics,
        crate::store::FleetSummary,
        crate::store::StatusBreakdown,
        crate::store::FacetsResponse,
        crate::store::Trend,
        crate::services::station_service::StationListResponse,
        crate::services::alert_service::AlertSummary,
        crate::services::alert_service::AlertListResponse,
    )),
    tags(
        (name = "stations", description = "Station list and detail"),
        (name = "alerts", description = "Threshold alerts"),
        (name = "dashboard", description = "Fleet-level metrics")
    )
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/stations", get(get_stations))
        .route("/stations/{station_id}", get(get_station_by_id))
        .route("/stations/{station_id}/readings", get(get_station_readings))
        .route("/alerts", get(get_alerts))
        .route("/summary", get(get_summary))
        .route("/facets", get(get_facets))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/api-docs/openapi.json", get(openapi_spec))
        .route("/docs", get(redoc_ui))
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "dashboard"
)]
#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations",
    params(StationListQuery),
    responses(
        (status = 200, description = "Filtered station list", body = StationListResponse),
        (status = 400, description = "Unrecognized status value")
    ),
    tag = "stations"
)]
#[instrument(skip(state))]
async fn get_stations(
    State(state): State<AppState>,
    Query(params): Query<StationListQuery>,
) -> Result<Json<StationListResponse>, StatusCode> {
    debug!("Fetching station list with filters {:?}", params);

    let criteria =
        FilterCriteria::from_raw(params.state, params.district, params.search, params.status)
            .map_err(|e| {
                warn!("Rejecting station list request: {}", e);
                StatusCode::BAD_REQUEST
            })?;

    let response = state.station_service.list_stations(&criteria);
    info!(
        "Retrieved {} of {} stations",
        response.matched_stations, response.total_stations
    );

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{station_id}",
    params(("station_id" = String, Path, description = "Station identifier")),
    responses(
        (status = 200, description = "Station detail", body = StationDetail),
        (status = 404, description = "Unknown station id")
    ),
    tag = "stations"
)]
#[instrument(skip(state), fields(station_id = %station_id))]
async fn get_station_by_id(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> Result<Json<StationDetail>, StatusCode> {
    debug!("Fetching station detail for {}", station_id);

    let detail = state
        .station_service
        .get_station_detail(&station_id)
        .ok_or_else(|| {
            warn!("Station {} not found", station_id);
            StatusCode::NOT_FOUND
        })?;

    info!(
        "Retrieved station {} with status {}",
        station_id, detail.status
    );
    Ok(Json(detail))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{station_id}/readings",
    params(("station_id" = String, Path, description = "Station identifier"), ReadingHistoryQuery),
    responses(
        (status = 200, description = "Windowed readings with statistics", body = ReadingHistory),
        (status = 400, description = "Unrecognized window name"),
        (status = 404, description = "Unknown station id")
    ),
    tag = "stations"
)]
#[instrument(skip(state), fields(station_id = %station_id))]
async fn get_station_readings(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
    Query(params): Query<ReadingHistoryQuery>,
) -> Result<Json<ReadingHistory>, StatusCode> {
    let window = match params.window.as_deref() {
        None | Some("") => TimeWindow::ThirtyDays,
        Some(raw) => raw.parse::<TimeWindow>().map_err(|e| {
            warn!("Rejecting readings request for {}: {}", station_id, e);
            StatusCode::BAD_REQUEST
        })?,
    };
    debug!("Fetching {} readings for {}", window, station_id);

    let history = state
        .station_service
        .get_reading_history(&station_id, window)
        .ok_or_else(|| {
            warn!("Station {} not found", station_id);
            StatusCode::NOT_FOUND
        })?;

    info!(
        "Retrieved {} readings for station {} window {}",
        history.statistics.count, station_id, window
    );
    Ok(Json(history))
}

#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    params(AlertListQuery),
    responses(
        (status = 200, description = "Stations whose history crossed a threshold", body = AlertListResponse),
        (status = 400, description = "Unrecognized severity value")
    ),
    tag = "alerts"
)]
#[instrument(skip(state))]
async fn get_alerts(
    State(state): State<AppState>,
    Query(params): Query<AlertListQuery>,
) -> Result<Json<AlertListResponse>, StatusCode> {
    debug!("Fetching alerts with filters {:?}", params);

    let criteria =
        AlertCriteria::from_raw(params.state, params.district, params.search, params.severity)
            .map_err(|e| {
                warn!("Rejecting alerts request: {}", e);
                StatusCode::BAD_REQUEST
            })?;

    let response = state.alert_service.list_alerts(&criteria, params.limit);
    info!(
        "Retrieved {} of {} alerts",
        response.alerts.len(),
        response.total_alerts
    );

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/summary",
    responses((status = 200, description = "Fleet-level key metrics", body = FleetSummary)),
    tag = "dashboard"
)]
#[instrument(skip(state))]
async fn get_summary(State(state): State<AppState>) -> Json<FleetSummary> {
    debug!("Fetching fleet summary");
    let summary = state.station_service.fleet_summary();
    info!(
        "Fleet summary: {} stations, {} critical",
        summary.total_stations, summary.critical_stations
    );
    Json(summary)
}

#[utoipa::path(
    get,
    path = "/api/v1/facets",
    params(FacetsQuery),
    responses((status = 200, description = "Distinct filter values", body = FacetsResponse)),
    tag = "stations"
)]
#[instrument(skip(state))]
async fn get_facets(
    State(state): State<AppState>,
    Query(params): Query<FacetsQuery>,
) -> Json<FacetsResponse> {
    debug!("Fetching facets (state={:?})", params.state);
    let facets = state.station_service.facets(params.state.as_deref());
    Json(facets)
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(generate_openapi_spec())
}

async fn redoc_ui() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
  <head>
    <title>Groundwater Monitor API Documentation</title>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1">
  </head>
  <body>
    <redoc spec-url="/api-docs/openapi.json"></redoc>
    <script src="https://cdn.redoc.ly/redoc/latest/bundles/redoc.standalone.js"></script>
  </body>
</html>"#,
    )
}
