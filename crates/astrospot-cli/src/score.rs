use std::path::PathBuf;

use anyhow::Context;
use astrospot_core::{AppConfig, LocationsCluster, ScoringParameters};
use astrospot_search::WeatherScoring;
use serde::Deserialize;

pub(crate) struct ScoreArgs {
    pub input: PathBuf,
    pub timezone: Option<String>,
    pub hour_from: Option<u32>,
    pub hour_to: Option<u32>,
}

/// Accepts a bare cluster list or the output of `search`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ClusterInput {
    Bare(Vec<LocationsCluster>),
    Wrapped { clusters: Vec<LocationsCluster> },
}

impl ClusterInput {
    pub(crate) fn into_clusters(self) -> Vec<LocationsCluster> {
        match self {
            Self::Bare(clusters) | Self::Wrapped { clusters } => clusters,
        }
    }
}

pub(crate) fn parameters_for(hour_from: Option<u32>, hour_to: Option<u32>) -> ScoringParameters {
    let defaults = ScoringParameters::default();
    ScoringParameters {
        hour_from: hour_from.unwrap_or(defaults.hour_from),
        hour_to: hour_to.unwrap_or(defaults.hour_to),
        ..defaults
    }
}

pub(crate) async fn run_score(config: &AppConfig, args: ScoreArgs) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let clusters = serde_json::from_str::<ClusterInput>(&raw)
        .with_context(|| format!("{} is not a cluster list", args.input.display()))?
        .into_clusters();

    let parameters = parameters_for(args.hour_from, args.hour_to);
    parameters.validate()?;

    let weather = astrospot_lookup::weather_from_config(config)?;
    let outcome = WeatherScoring::new(weather)
        .score_clusters_counted(&clusters, &parameters, args.timezone.as_deref())
        .await;
    if outcome.failed_clusters > 0 {
        tracing::warn!(
            failed = outcome.failed_clusters,
            total = clusters.len(),
            "some clusters could not be scored"
        );
    }

    println!("{}", serde_json::to_string_pretty(&outcome.scored)?);
    Ok(())
}
