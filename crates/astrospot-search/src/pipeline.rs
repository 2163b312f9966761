//! Weather-scoring pipeline.
//!
//! 1. For every cluster, concurrently, fetch a forecast for each member.
//! 2. Merge each forecast into a new snapshot of that member.
//! 3. Score and rank the cluster's members per night.
//! 4. Merge every cluster's ranking per night and re-sort.
//!
//! A cluster whose forecasts or scoring fail contributes nothing; the other
//! clusters are unaffected.

use std::sync::Arc;
use std::time::Instant;

use astrospot_core::{LocationConditions, LocationsCluster, ScoringParameters};
use astrospot_lookup::WeatherLookup;
use futures::future::{join_all, try_join_all};

use crate::error::ScoringError;
use crate::scorer::{sort_by_score, LocationScorer, ScoredByPeriod};

/// Scored candidates plus how many clusters were skipped.
#[derive(Debug, Default)]
pub struct ClusterScoring {
    pub scored: ScoredByPeriod,
    pub failed_clusters: usize,
}

#[derive(Clone)]
pub struct WeatherScoring {
    weather: Arc<dyn WeatherLookup>,
    scorer: LocationScorer,
}

impl WeatherScoring {
    #[must_use]
    pub fn new(weather: Arc<dyn WeatherLookup>) -> Self {
        Self {
            weather,
            scorer: LocationScorer,
        }
    }

    /// Scores every cluster and returns all candidates grouped by night,
    /// best score first.
    pub async fn score_clusters(
        &self,
        clusters: &[LocationsCluster],
        parameters: &ScoringParameters,
        timezone: Option<&str>,
    ) -> ScoredByPeriod {
        self.score_clusters_counted(clusters, parameters, timezone)
            .await
            .scored
    }

    /// Like [`WeatherScoring::score_clusters`], also counting skipped clusters.
    pub async fn score_clusters_counted(
        &self,
        clusters: &[LocationsCluster],
        parameters: &ScoringParameters,
        timezone: Option<&str>,
    ) -> ClusterScoring {
        let started = Instant::now();
        let per_cluster = join_all(
            clusters
                .iter()
                .map(|cluster| self.score_cluster(cluster.locations(), parameters, timezone)),
        )
        .await;

        let mut merged = ScoredByPeriod::new();
        let mut failed = 0_usize;
        for (index, outcome) in per_cluster.into_iter().enumerate() {
            match outcome {
                Ok(grouped) => {
                    for (period, mut locations) in grouped {
                        merged.entry(period).or_default().append(&mut locations);
                    }
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(cluster = index, error = %e, "cluster scoring failed; skipping");
                }
            }
        }
        sort_by_score(&mut merged);

        tracing::info!(
            clusters = clusters.len(),
            failed,
            periods = merged.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "clusters scored"
        );
        ClusterScoring {
            scored: merged,
            failed_clusters: failed,
        }
    }

    async fn score_cluster(
        &self,
        members: &[LocationConditions],
        parameters: &ScoringParameters,
        timezone: Option<&str>,
    ) -> Result<ScoredByPeriod, ScoringError> {
        let enriched = try_join_all(members.iter().map(|member| async move {
            let forecast = self.weather.forecast(member.coordinate, timezone).await?;
            Ok::<_, ScoringError>(member.with_weather(forecast))
        }))
        .await?;
        self.scorer.score_and_sort_locations(&enriched, parameters)
    }
}
