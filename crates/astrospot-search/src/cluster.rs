//! Proximity clustering with transitive merge.

use std::sync::Arc;

use astrospot_core::{Coordinate, GridSize, LocationConditions, LocationsCluster};

use crate::geo::DistanceCalculator;

pub struct ProximityClusterer {
    distance: Arc<dyn DistanceCalculator>,
}

impl ProximityClusterer {
    #[must_use]
    pub fn new(distance: Arc<dyn DistanceCalculator>) -> Self {
        Self { distance }
    }

    /// Clustering threshold for one grid level: the diagonal of the grid
    /// cell at `anchor`, scaled by `factor`.
    #[must_use]
    pub fn eps_for_grid(&self, anchor: Coordinate, grid: &GridSize, factor: f64) -> f64 {
        let corner = Coordinate::new(
            anchor.latitude + grid.latitude_degrees,
            anchor.longitude + grid.longitude_degrees,
        );
        self.distance.distance_km(anchor, corner) * factor
    }

    /// Single-pass assignment followed by [`ProximityClusterer::merge_overlapping`].
    #[must_use]
    pub fn cluster(&self, points: Vec<LocationConditions>, eps: f64) -> Vec<LocationsCluster> {
        let clusters = self.cluster_by_proximity(points, eps);
        self.merge_overlapping(clusters, eps)
    }

    /// Each point joins the first cluster holding a member within `eps` of
    /// it, or starts a new one.
    #[must_use]
    pub fn cluster_by_proximity(
        &self,
        points: Vec<LocationConditions>,
        eps: f64,
    ) -> Vec<LocationsCluster> {
        let mut clusters: Vec<LocationsCluster> = Vec::new();
        for point in points {
            match clusters
                .iter_mut()
                .find(|c| self.near_any(&point, c.locations(), eps))
            {
                Some(cluster) => {
                    cluster.add(point);
                }
                None => clusters.push(LocationsCluster::from_locations([point])),
            }
        }
        clusters
    }

    /// Absorbs any cluster that has a member within `eps` of another
    /// cluster's member, rescanning after every merge until a full pass
    /// merges nothing. Clusters are never split.
    #[must_use]
    pub fn merge_overlapping(
        &self,
        mut clusters: Vec<LocationsCluster>,
        eps: f64,
    ) -> Vec<LocationsCluster> {
        'scan: loop {
            for i in 0..clusters.len() {
                for j in (i + 1)..clusters.len() {
                    if self.overlaps(&clusters[i], &clusters[j], eps) {
                        let absorbed = clusters.remove(j);
                        clusters[i].merge(absorbed);
                        continue 'scan;
                    }
                }
            }
            break;
        }
        tracing::debug!(clusters = clusters.len(), eps, "clusters merged");
        clusters
    }

    fn overlaps(&self, a: &LocationsCluster, b: &LocationsCluster, eps: f64) -> bool {
        a.locations()
            .iter()
            .any(|m| self.near_any(m, b.locations(), eps))
    }

    fn near_any(&self, point: &LocationConditions, members: &[LocationConditions], eps: f64) -> bool {
        members
            .iter()
            .any(|m| self.distance.distance_km(point.coordinate, m.coordinate) <= eps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Haversine;
    use crate::test_support::loc;

    fn clusterer() -> ProximityClusterer {
        ProximityClusterer::new(Arc::new(Haversine))
    }

    #[test]
    fn far_apart_points_stay_separate() {
        let points = vec![loc(50.0, 20.0, 1.0), loc(51.0, 21.0, 2.0), loc(49.0, 19.0, 3.0)];
        let clusters = clusterer().cluster(points, 5.0);
        assert_eq!(clusters.len(), 3);
    }

    #[test]
    fn neighbours_join_the_same_cluster() {
        let points = vec![loc(50.0, 20.0, 1.0), loc(50.01, 20.0, 2.0), loc(51.0, 20.0, 3.0)];
        let clusters = clusterer().cluster(points, 2.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].len(), 2);
    }

    #[test]
    fn bridging_point_merges_two_clusters_and_far_one_stays() {
        // a and b are 2.2 km apart (> eps), so single pass makes two clusters;
        // c sits between them and is assigned to a's cluster, after which the
        // merge pass finds c within eps of b.
        let a = loc(50.0, 20.0, 1.0);
        let b = loc(50.02, 20.0, 2.0);
        let c = loc(50.01, 20.0, 3.0);
        let far = loc(52.0, 22.0, 4.0);
        let p = clusterer();

        let single = p.cluster_by_proximity(vec![a.clone(), b.clone(), far.clone(), c.clone()], 1.5);
        assert_eq!(single.len(), 3);

        let merged = p.merge_overlapping(single, 1.5);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.iter().map(LocationsCluster::len).sum::<usize>(), 4);
        assert!(merged.iter().any(|cl| cl.contains(&a) && cl.contains(&b) && cl.contains(&c)));
    }

    #[test]
    fn merged_clusters_are_pairwise_further_than_eps() {
        let points: Vec<_> = (0..30)
            .map(|i| {
                let i = f64::from(i);
                loc(50.0 + (i * 0.37).sin() * 0.3, 20.0 + (i * 0.73).cos() * 0.3, i)
            })
            .collect();
        let eps = 4.0;
        let p = clusterer();
        let clusters = p.cluster(points, eps);

        assert_eq!(clusters.iter().map(LocationsCluster::len).sum::<usize>(), 30);
        for (i, a) in clusters.iter().enumerate() {
            for b in clusters.iter().skip(i + 1) {
                for m in a.locations() {
                    for n in b.locations() {
                        assert!(Haversine.distance_km(m.coordinate, n.coordinate) > eps);
                    }
                }
            }
        }
    }

    #[test]
    fn eps_is_scaled_cell_diagonal() {
        let eps = clusterer().eps_for_grid(Coordinate::new(50.0, 20.0), &GridSize::new(0.1, 0.1), 1.2);
        let diagonal = Haversine.distance_km(Coordinate::new(50.0, 20.0), Coordinate::new(50.1, 20.1));
        assert!((eps - diagonal * 1.2).abs() < 1e-9);
    }

    #[test]
    fn empty_input_gives_no_clusters() {
        assert!(clusterer().cluster(Vec::new(), 1.0).is_empty());
    }
}
