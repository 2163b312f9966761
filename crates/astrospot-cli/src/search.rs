use astrospot_core::{AppConfig, Coordinate, SearchArea, SearchTuning};
use astrospot_search::{SearchEngine, WorkerPool};

pub(crate) struct SearchArgs {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub max_depth: Option<u32>,
}

/// Configured tuning with the command-line depth override applied.
pub(crate) fn tuning_for(config: &AppConfig, max_depth: Option<u32>) -> SearchTuning {
    SearchTuning {
        max_depth: max_depth.unwrap_or(config.search.max_depth),
        ..config.search
    }
}

pub(crate) async fn run_search(config: &AppConfig, args: SearchArgs) -> anyhow::Result<()> {
    let center = Coordinate::validated(args.latitude, args.longitude)?;
    let area = SearchArea::validated(center, args.radius_km)?;

    let pool = WorkerPool::with_parallelism_multiplier(config.search.pool_parallelism_multiplier);
    let brightness = astrospot_lookup::brightness_from_config(config)?;
    let engine = SearchEngine::new(brightness, pool.clone(), tuning_for(config, args.max_depth));

    let result = engine.search_darkest_locations(engine.root_params(area)).await;
    pool.shutdown().await;

    tracing::info!(
        status = ?result.status,
        clusters = result.clusters.len(),
        "{}",
        result.status.message()
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
