//! Unit tests for ped-spatial.

#[cfg(test)]
mod elevation {
    use crate::{Elevation, SpatialError};

    /// 3×3 raster: h(row, col) = col + 10·row, i.e. the plane h = x + 10y
    /// with 1 m cells anchored at the origin.
    fn plane() -> Elevation {
        Elevation::from_fn(3, 3, |r, c| c as f64 + 10.0 * r as f64).unwrap()
    }

    #[test]
    fn samples_at_grid_points() {
        let e = plane();
        assert_eq!(e.height(0.0, 0.0), 0.0);
        assert_eq!(e.height(2.0, 0.0), 2.0);
        assert_eq!(e.height(2.0, 2.0), 22.0);
        assert_eq!(e.sample(1, 2), Some(12.0));
        assert_eq!(e.sample(3, 0), None);
    }

    #[test]
    fn bilinear_between_samples() {
        let e = plane();
        assert!((e.height(0.5, 0.5) - 5.5).abs() < 1e-12);
        assert!((e.height(1.25, 1.75) - 18.75).abs() < 1e-12);
    }

    #[test]
    fn outside_returns_default() {
        let e = plane();
        assert_eq!(e.height(-0.1, 1.0), 0.0);
        assert_eq!(e.height(1.0, 2.5), 0.0);
        assert_eq!(e.height(f64::NAN, 1.0), 0.0);

        let raised = plane().with_outside_height(-3.0).unwrap();
        assert_eq!(raised.height(100.0, 100.0), -3.0);
    }

    #[test]
    fn meta_moves_and_scales_raster() {
        let mut e = plane();
        e.set_meta(-125.0, -75.0, 2.0).unwrap();
        assert_eq!(e.height(-125.0, -75.0), 0.0);
        // Two cells east, one cell north.
        assert_eq!(e.height(-121.0, -73.0), 12.0);
        assert!(!e.contains(-126.0, -75.0));
        assert!(e.contains(-121.0, -71.0));
    }

    #[test]
    fn gradient_of_plane() {
        let mut e = plane();
        e.set_meta(0.0, 0.0, 2.0).unwrap();
        let g = e.gradient(1.3, 2.9);
        assert!((g.x - 0.5).abs() < 1e-12);
        assert!((g.y - 5.0).abs() < 1e-12);
        assert_eq!(e.gradient(-1.0, 0.0).length(), 0.0);
    }

    #[test]
    fn single_row_raster() {
        let e = Elevation::from_rows(vec![vec![1.0, 3.0]]).unwrap();
        assert_eq!(e.height(0.5, 0.0), 2.0);
        assert_eq!(e.height(0.5, 0.1), 0.0); // outside: only y = 0 is sampled
        assert_eq!(e.gradient(0.5, 0.0).y, 0.0);
    }

    #[test]
    fn rejects_bad_rasters() {
        assert!(matches!(Elevation::from_rows(vec![]), Err(SpatialError::EmptyRaster)));
        assert!(matches!(
            Elevation::from_rows(vec![vec![0.0, 1.0], vec![0.0]]),
            Err(SpatialError::RaggedRaster { row: 1, got: 1, expected: 2 })
        ));
        assert!(matches!(
            Elevation::from_rows(vec![vec![0.0, f64::INFINITY]]),
            Err(SpatialError::NonFiniteSample { row: 0, col: 1 })
        ));
        let mut e = plane();
        assert!(e.set_meta(0.0, 0.0, 0.0).is_err());
        assert!(e.set_meta(f64::NAN, 0.0, 1.0).is_err());
    }
}

#[cfg(test)]
mod obstacles {
    use ped_core::{ObstacleId, Vector3};

    use crate::{Obstacle, ObstacleSet};

    fn set() -> ObstacleSet {
        let mut s = ObstacleSet::new();
        s.insert(Obstacle::new(0.0, 0.0, 10.0, 0.0).unwrap()); // 0: floor
        s.insert(Obstacle::new(5.0, -5.0, 5.0, 5.0).unwrap()); // 1: wall at x = 5
        s.insert(Obstacle::new(50.0, 50.0, 60.0, 50.0).unwrap()); // 2: far away
        s
    }

    #[test]
    fn rejects_non_finite() {
        assert!(Obstacle::new(0.0, f64::NAN, 1.0, 1.0).is_err());
    }

    #[test]
    fn near_uses_exact_segment_distance() {
        let s = set();
        let mut hits: Vec<_> = s.near(Vector3::planar(2.0, 1.0), 1.5).map(|(id, _)| id).collect();
        hits.sort();
        assert_eq!(hits, [ObstacleId(0)]);

        let mut hits: Vec<_> = s.near(Vector3::planar(4.0, 0.5), 1.5).map(|(id, _)| id).collect();
        hits.sort();
        assert_eq!(hits, [ObstacleId(0), ObstacleId(1)]);
    }

    #[test]
    fn remove_returns_obstacle_and_hides_it() {
        let mut s = set();
        let removed = s.remove(ObstacleId(1)).unwrap();
        assert_eq!(removed.start(), Vector3::planar(5.0, -5.0));
        assert_eq!(s.len(), 2);
        assert!(s.remove(ObstacleId(1)).is_none());
        assert_eq!(s.near(Vector3::planar(5.0, 2.0), 0.5).count(), 0);
    }

    #[test]
    fn handles_not_reused() {
        let mut s = set();
        s.remove(ObstacleId(2));
        let id = s.insert(Obstacle::new(1.0, 1.0, 2.0, 2.0).unwrap());
        assert_eq!(id, ObstacleId(3));
    }

    #[test]
    fn crossing_detection() {
        let s = set();
        let hit = s.first_crossing(Vector3::planar(4.0, 1.0), Vector3::planar(6.0, 1.0));
        assert_eq!(hit.map(|(id, _)| id), Some(ObstacleId(1)));
        assert!(s.first_crossing(Vector3::planar(1.0, 1.0), Vector3::planar(4.0, 2.0)).is_none());
    }

    #[test]
    fn drain_empties_set() {
        let mut s = set();
        let all = s.drain();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].0, ObstacleId(0));
        assert!(s.is_empty());
        assert_eq!(s.iter().count(), 0);
    }
}

#[cfg(test)]
mod waypoints {
    use ped_core::Vector3;

    use crate::Waypoint;

    #[test]
    fn capture_radius_is_inclusive() {
        let w = Waypoint::new(10.0, 0.0, 1.0).unwrap();
        assert!(w.reached(Vector3::new(9.0, 0.0, 4.0)));
        assert!(!w.reached(Vector3::planar(8.9, 0.0)));
    }

    #[test]
    fn rejects_bad_radius() {
        assert!(Waypoint::new(0.0, 0.0, 0.0).is_err());
        assert!(Waypoint::new(0.0, 0.0, -2.0).is_err());
        assert!(Waypoint::new(f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn direction_is_horizontal_unit() {
        let w = Waypoint::new(3.0, 4.0, 1.0).unwrap();
        let d = w.direction_from(Vector3::new(0.0, 0.0, 7.0));
        assert_eq!(d, Vector3::planar(0.6, 0.8));
        assert_eq!(w.direction_from(Vector3::planar(3.0, 4.0)), Vector3::ZERO);
    }
}

#[cfg(test)]
mod indexes {
    use ped_core::{AgentId, Vector3};

    use crate::{GridIndex, NeighborIndex, TreeIndex};

    fn points() -> Vec<(AgentId, Vector3)> {
        vec![
            (AgentId(0), Vector3::planar(0.0, 0.0)),
            (AgentId(1), Vector3::planar(1.0, 0.0)),
            (AgentId(2), Vector3::planar(0.0, 2.5)),
            (AgentId(3), Vector3::planar(-3.0, -3.0)),
            (AgentId(4), Vector3::planar(100.0, 100.0)),
        ]
    }

    fn query(index: &dyn NeighborIndex, x: f64, y: f64, r: f64) -> Vec<AgentId> {
        let mut out = Vec::new();
        index.within(Vector3::planar(x, y), r, &mut out);
        out.sort();
        out
    }

    fn check(index: &mut dyn NeighborIndex) {
        index.rebuild(&points());
        assert_eq!(index.len(), 5);
        assert_eq!(query(index, 0.0, 0.0, 2.5), [AgentId(0), AgentId(1), AgentId(2)]);
        assert_eq!(query(index, 0.0, 0.0, 0.5), [AgentId(0)]);
        assert_eq!(query(index, 0.0, 0.0, 5.0).len(), 4);
        assert!(query(index, 50.0, 50.0, 10.0).is_empty());

        // Agent set changes between ticks.
        index.rebuild(&points()[3..]);
        assert_eq!(index.len(), 2);
        assert!(query(index, 0.0, 0.0, 2.5).is_empty());
        assert_eq!(query(index, 99.0, 99.0, 2.0), [AgentId(4)]);
    }

    #[test]
    fn tree_index_queries() {
        check(&mut TreeIndex::new());
    }

    #[test]
    fn grid_index_queries() {
        check(&mut GridIndex::new(3.0).unwrap());
    }

    #[test]
    fn grid_radius_larger_than_cell() {
        let mut g = GridIndex::new(0.5).unwrap();
        g.rebuild(&points());
        assert_eq!(query(&g, 0.0, 0.0, 2.5), [AgentId(0), AgentId(1), AgentId(2)]);
    }

    #[test]
    fn grid_unbounded_radius_returns_everyone() {
        let mut g = GridIndex::new(3.0).unwrap();
        g.rebuild(&points());
        let all: Vec<AgentId> = (0..5).map(AgentId).collect();
        assert_eq!(query(&g, 0.0, 0.0, f64::INFINITY), all);
        assert_eq!(query(&g, 0.0, 0.0, f64::MAX), all);
        assert_eq!(query(&g, 0.0, 0.0, 1e9), all);
        assert!(query(&g, 0.0, 0.0, f64::NAN).is_empty());
    }

    #[test]
    fn grid_far_centre_does_not_overflow() {
        let mut g = GridIndex::new(0.001).unwrap();
        g.rebuild(&points());
        assert!(query(&g, 1e300, -1e300, 1.0).is_empty());
        assert_eq!(query(&g, 100.0, 100.0, 1e-4), [AgentId(4)]);
    }

    #[test]
    fn grid_rejects_bad_cell_size() {
        assert!(GridIndex::new(0.0).is_err());
    }

    #[test]
    fn indexes_agree_on_random_cloud() {
        let mut rng = ped_core::SimRng::new(5);
        let cloud: Vec<_> = (0..400)
            .map(|i| {
                (AgentId(i), Vector3::planar(rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0)))
            })
            .collect();
        let mut tree = TreeIndex::new();
        let mut grid = GridIndex::new(2.0).unwrap();
        tree.rebuild(&cloud);
        grid.rebuild(&cloud);
        for &(_, p) in cloud.iter().step_by(17) {
            assert_eq!(query(&tree, p.x, p.y, 3.0), query(&grid, p.x, p.y, 3.0));
        }
    }
}
