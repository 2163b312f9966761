use astrospot_core::{Coordinate, LocationsCluster, ScoringParameters, SearchArea};
use astrospot_search::{ScoredByPeriod, SearchStatus};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

const MAX_RADIUS_KM: f64 = 150.0;
const DEFAULT_MAX_RESULTS: i64 = 100;

#[derive(Debug, Deserialize)]
pub(super) struct BestLocationsQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub max_results: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct BestLocationsData {
    pub status: SearchStatus,
    pub message: &'static str,
    pub clusters: Vec<LocationsCluster>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ScoreRequest {
    pub clusters: Vec<LocationsCluster>,
    #[serde(default)]
    pub parameters: Option<ScoringParameters>,
    #[serde(default)]
    pub timezone: Option<String>,
}

fn search_area(req_id: &str, query: &BestLocationsQuery) -> Result<SearchArea, ApiError> {
    let center = Coordinate::validated(query.latitude, query.longitude)
        .map_err(|e| ApiError::validation(req_id, e))?;
    if query.radius_km > MAX_RADIUS_KM {
        return Err(ApiError::validation(
            req_id,
            format!("radius_km must be at most {MAX_RADIUS_KM}"),
        ));
    }
    SearchArea::validated(center, query.radius_km).map_err(|e| ApiError::validation(req_id, e))
}

fn max_results(req_id: &str, value: Option<i64>) -> Result<usize, ApiError> {
    let value = value.unwrap_or(DEFAULT_MAX_RESULTS);
    usize::try_from(value)
        .map_err(|_| ApiError::validation(req_id, "max_results must be non-negative"))
}

pub(super) async fn best_locations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<BestLocationsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<BestLocationsData>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(req_id.0.clone(), e.body_text()))?;
    let area = search_area(&req_id.0, &query)?;
    let limit = max_results(&req_id.0, query.max_results)?;

    tracing::info!(
        request_id = %req_id.0,
        center = %area.center,
        radius_km = area.radius_km,
        "best locations requested"
    );
    let params = state.engine.root_params(area);
    let mut result = state.engine.search_darkest_locations(params).await;
    result.clusters.truncate(limit);

    Ok(Json(ApiResponse::new(
        BestLocationsData {
            status: result.status,
            message: result.status.message(),
            clusters: result.clusters,
        },
        req_id.0,
    )))
}

pub(super) async fn best_scored_locations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ScoredByPeriod>>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::validation(req_id.0.clone(), e.body_text()))?;
    let parameters = request.parameters.unwrap_or_default();
    parameters
        .validate()
        .map_err(|e| ApiError::validation(req_id.0.clone(), e))?;

    let outcome = state
        .scoring
        .score_clusters_counted(&request.clusters, &parameters, request.timezone.as_deref())
        .await;

    if !request.clusters.is_empty() && outcome.failed_clusters == request.clusters.len() {
        tracing::warn!(
            request_id = %req_id.0,
            clusters = request.clusters.len(),
            "every cluster failed to score"
        );
        return Err(ApiError::new(
            req_id.0,
            "upstream_unavailable",
            "weather forecasts are unavailable, please try again later",
        ));
    }

    Ok(Json(ApiResponse::new(outcome.scored, req_id.0)))
}
