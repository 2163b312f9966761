//! Adaptive recursive search.
//!
//! One level runs grid → sample → select → cluster, then refines every
//! cluster concurrently on a finer grid one level deeper. Every entry point
//! re-checks [`SearchEngine::is_invalid`]; depth only grows and the radius
//! only shrinks along a branch, so the check is what ends the recursion.
//!
//! An empty grid is retried at the same depth with a finer grid, at most
//! `max_thickening` times.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use astrospot_core::{
    Coordinate, GridSize, LocationConditions, LocationsCluster, SearchArea, SearchContext,
    SearchParams, SearchTuning,
};
use astrospot_lookup::BrightnessLookup;
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;

use crate::cluster::ProximityClusterer;
use crate::geo::{DistanceCalculator, Haversine};
use crate::grid::GridGenerator;
use crate::pool::WorkerPool;
use crate::sampler::{BrightnessSampler, SampleReport};
use crate::select::TopSelector;

/// Child radius margin over the current grid cell's longer side.
const CHILD_RADIUS_MARGIN: f64 = 1.5;

/// How a clustered search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchStatus {
    InvalidParameters,
    GridPointsEmpty,
    BrightestSpotsEmpty,
    /// `max_depth` is 0: the first pass is the answer.
    NoNeedToGoDeeper,
    Accurate,
    /// Some root-pass lookups failed or were rate limited.
    MayBeInaccurate,
}

impl SearchStatus {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidParameters => "Invalid parameters.",
            Self::GridPointsEmpty => "No grid points lie within the search area.",
            Self::BrightestSpotsEmpty => "No brightness readings were available.",
            Self::NoNeedToGoDeeper => "There is no need to go deeper.",
            Self::Accurate => "This response is accurate.",
            Self::MayBeInaccurate => "The answer may be inaccurate, please try again later.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DarkestLocations {
    pub clusters: Vec<LocationsCluster>,
    pub status: SearchStatus,
}

/// Result of generating a level's grid, after any thickening.
enum GridOutcome {
    Invalid,
    Empty,
    Points(SearchParams, Vec<Coordinate>),
}

/// Cheap to clone; clones share the pool and the collaborators.
#[derive(Clone)]
pub struct SearchEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    grid: GridGenerator,
    sampler: BrightnessSampler,
    selector: TopSelector,
    clusterer: ProximityClusterer,
    tuning: SearchTuning,
}

impl SearchEngine {
    /// Engine measuring distance with the haversine formula.
    #[must_use]
    pub fn new(lookup: Arc<dyn BrightnessLookup>, pool: WorkerPool, tuning: SearchTuning) -> Self {
        Self::with_distance(lookup, Arc::new(Haversine), pool, tuning)
    }

    #[must_use]
    pub fn with_distance(
        lookup: Arc<dyn BrightnessLookup>,
        distance: Arc<dyn DistanceCalculator>,
        pool: WorkerPool,
        tuning: SearchTuning,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                grid: GridGenerator::new(Arc::clone(&distance), tuning.km_per_degree),
                sampler: BrightnessSampler::new(lookup, pool),
                selector: TopSelector::new(
                    tuning.top_percent,
                    tuning.top_number,
                    tuning.top_extended,
                ),
                clusterer: ProximityClusterer::new(distance),
                tuning,
            }),
        }
    }

    #[must_use]
    pub fn tuning(&self) -> &SearchTuning {
        &self.inner.tuning
    }

    /// Root parameters for `search_area` with the configured grid and depth.
    #[must_use]
    pub fn root_params(&self, search_area: SearchArea) -> SearchParams {
        let t = &self.inner.tuning;
        SearchParams::root(
            SearchContext::new(t.max_depth, t.grid_step_divisor, search_area),
            GridSize::new(t.grid_latitude_degrees, t.grid_longitude_degrees),
        )
    }

    /// Too deep, or an area too small for the grid to mean anything.
    #[must_use]
    pub fn is_invalid(&self, params: &SearchParams) -> bool {
        params.depth > params.max_depth() || params.radius_km() < self.inner.tuning.min_radius_km
    }

    /// Radius for a sub-search centred on a point of `grid`: the cell's
    /// longer side in km, plus margin.
    #[must_use]
    pub fn child_radius_km(&self, grid: &GridSize) -> f64 {
        let t = &self.inner.tuning;
        let north_south = grid.latitude_degrees * t.km_per_degree_latitude;
        let east_west = grid.longitude_degrees * t.km_per_degree_longitude;
        north_south.max(east_west) * CHILD_RADIUS_MARGIN
    }

    fn generate_grid(&self, params: SearchParams) -> GridOutcome {
        let mut params = params;
        let mut thickenings = 0;
        loop {
            if self.is_invalid(&params) {
                return GridOutcome::Invalid;
            }
            let points = self.inner.grid.points_within(
                params.search_area(),
                &params.origin_search_area,
                &params.grid_size,
            );
            if !points.is_empty() {
                return GridOutcome::Points(params, points);
            }
            if thickenings >= self.inner.tuning.max_thickening {
                tracing::debug!(depth = params.depth, thickenings, "grid still empty; giving up");
                return GridOutcome::Empty;
            }
            thickenings += 1;
            tracing::debug!(depth = params.depth, thickenings, "grid empty; thickening");
            params = params.thickened();
        }
    }

    async fn sample_and_select(
        &self,
        points: Vec<Coordinate>,
    ) -> (Vec<LocationConditions>, SampleReport) {
        let mut report = self.inner.sampler.sample(points).await;
        let top = self
            .inner
            .selector
            .select(std::mem::take(&mut report.locations));
        (top, report)
    }

    /// Point-wise recursion: the darkest points of this level plus every
    /// point found by a sub-search around each of them, deduplicated.
    pub fn search_best_spots(
        &self,
        params: SearchParams,
    ) -> BoxFuture<'static, Vec<LocationConditions>> {
        let engine = self.clone();
        async move {
            let started = Instant::now();
            let (params, points) = match engine.generate_grid(params) {
                GridOutcome::Points(params, points) => (params, points),
                GridOutcome::Invalid | GridOutcome::Empty => return Vec::new(),
            };

            let (top, _) = engine.sample_and_select(points).await;
            if top.is_empty() {
                tracing::debug!(depth = params.depth, "no top spots");
                return Vec::new();
            }

            let radius_km = engine.child_radius_km(&params.grid_size);
            let children: Vec<_> = top
                .iter()
                .map(|spot| engine.search_best_spots(params.child(spot.coordinate, radius_km)))
                .collect();
            let nested = engine.pool().fork_join(children).await;

            let mut seen = HashSet::new();
            let result: Vec<LocationConditions> = top
                .into_iter()
                .chain(nested.into_iter().flatten())
                .filter(|l| seen.insert(l.key()))
                .collect();

            tracing::info!(
                depth = params.depth,
                results = result.len(),
                elapsed_ms = started.elapsed().as_millis(),
                "point search level finished"
            );
            result
        }
        .boxed()
    }

    /// Clustered search. Clusters that end up empty are dropped.
    pub async fn search_best_locations_clusters(
        &self,
        params: SearchParams,
    ) -> Vec<LocationsCluster> {
        self.search_darkest_locations(params).await.clusters
    }

    /// Clustered search with a status describing how it ended.
    pub async fn search_darkest_locations(&self, params: SearchParams) -> DarkestLocations {
        let started = Instant::now();
        let (params, points) = match self.generate_grid(params) {
            GridOutcome::Points(params, points) => (params, points),
            GridOutcome::Invalid => return darkest(Vec::new(), SearchStatus::InvalidParameters),
            GridOutcome::Empty => return darkest(Vec::new(), SearchStatus::GridPointsEmpty),
        };

        let (top, report) = self.sample_and_select(points).await;
        if top.is_empty() {
            return darkest(Vec::new(), SearchStatus::BrightestSpotsEmpty);
        }

        let eps = self.eps(&params);
        let clusters = self.inner.clusterer.cluster(top, eps);
        tracing::debug!(clusters = clusters.len(), eps, "root clusters built");

        if params.max_depth() == 0 {
            return darkest(finalize(clusters), SearchStatus::NoNeedToGoDeeper);
        }

        let refinements: Vec<_> = clusters
            .into_iter()
            .map(|cluster| self.refine_cluster(params, cluster))
            .collect();
        let refined = finalize(self.pool().fork_join(refinements).await);

        let status = if report.dropped > 0 {
            SearchStatus::MayBeInaccurate
        } else {
            SearchStatus::Accurate
        };
        tracing::info!(
            clusters = refined.len(),
            dropped = report.dropped,
            ?status,
            elapsed_ms = started.elapsed().as_millis(),
            "clustered search finished"
        );
        darkest(refined, status)
    }

    /// Refines `cluster`, found on `level`'s grid, one level deeper and
    /// recurses until the next level is invalid.
    fn refine_cluster(
        &self,
        level: SearchParams,
        cluster: LocationsCluster,
    ) -> BoxFuture<'static, LocationsCluster> {
        let engine = self.clone();
        async move {
            let started = Instant::now();
            let radius_km = engine.child_radius_km(&level.grid_size);
            let Some(anchor) = cluster.best().map(|b| b.coordinate) else {
                return cluster;
            };
            if engine.is_invalid(&level.child(anchor, radius_km)) {
                return cluster;
            }

            let explorations: Vec<_> = cluster
                .locations()
                .iter()
                .map(|member| {
                    let engine = engine.clone();
                    let child = level.child(member.coordinate, radius_km);
                    async move { engine.explore(child) }
                })
                .collect();
            let discovered = engine.pool().fork_join(explorations).await;

            let mut fresh = Vec::new();
            let mut seen = HashSet::new();
            for coordinate in discovered.into_iter().flatten() {
                if !cluster.contains_coordinate(&coordinate) && seen.insert(coordinate) {
                    fresh.push(coordinate);
                }
            }

            let report = engine.inner.sampler.sample(fresh).await;
            let mut candidates = cluster.into_locations();
            candidates.extend(report.locations);
            let refined =
                LocationsCluster::from_locations(engine.inner.selector.select(candidates));

            tracing::debug!(
                depth = level.depth + 1,
                members = refined.len(),
                elapsed_ms = started.elapsed().as_millis(),
                "cluster refined"
            );

            match refined.best().map(|b| b.coordinate) {
                Some(best) => {
                    let next = level.child(best, radius_km);
                    engine.refine_cluster(next, refined).await
                }
                None => refined,
            }
        }
        .boxed()
    }

    /// Grid points of a sub-search area, thickened if needed.
    fn explore(&self, params: SearchParams) -> Vec<Coordinate> {
        match self.generate_grid(params) {
            GridOutcome::Points(_, points) => points,
            GridOutcome::Invalid | GridOutcome::Empty => Vec::new(),
        }
    }

    fn eps(&self, params: &SearchParams) -> f64 {
        self.inner.clusterer.eps_for_grid(
            params.search_area().center,
            &params.grid_size,
            self.inner.tuning.cluster_eps_factor,
        )
    }

    fn pool(&self) -> &WorkerPool {
        self.inner.sampler.pool()
    }
}

fn darkest(clusters: Vec<LocationsCluster>, status: SearchStatus) -> DarkestLocations {
    DarkestLocations { clusters, status }
}

/// No location in two clusters (first cluster wins), no empty clusters,
/// darkest cluster first.
fn finalize(clusters: Vec<LocationsCluster>) -> Vec<LocationsCluster> {
    let mut claimed = HashSet::new();
    let mut out: Vec<LocationsCluster> = clusters
        .into_iter()
        .map(|mut cluster| {
            cluster.retain(|l| claimed.insert(l.key()));
            cluster
        })
        .filter(|c| !c.is_empty())
        .collect();
    out.sort_by(|a, b| match (a.best(), b.best()) {
        (Some(x), Some(y)) => x.cmp_brightness(y),
        _ => std::cmp::Ordering::Equal,
    });
    out
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
