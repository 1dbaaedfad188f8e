//! Unit tests for ped-scene.

#[cfg(test)]
mod support {
    use std::sync::{Arc, Mutex};

    use ped_core::{ObstacleId, Vector3};
    use ped_spatial::{Obstacle, Waypoint};

    use crate::{OutputWriter, Shape, TickSnapshot, WriterError};

    /// Everything a [`Spy`] saw, shared with the test body.
    #[derive(Default)]
    pub struct Seen {
        pub scenario: String,
        pub obstacles: Vec<ObstacleId>,
        pub erased: Vec<ObstacleId>,
        pub waypoints: Vec<Vector3>,
        pub draws: Vec<String>,
        pub cameras: Vec<String>,
        pub frames: Vec<TickSnapshot>,
        pub finished: bool,
    }

    /// Writer that records calls and optionally fails every publish.
    pub struct Spy {
        pub seen: Arc<Mutex<Seen>>,
        pub fail: bool,
    }

    impl Spy {
        pub fn new(fail: bool) -> (Self, Arc<Mutex<Seen>>) {
            let seen = Arc::new(Mutex::new(Seen::default()));
            (Self { seen: Arc::clone(&seen), fail }, seen)
        }
    }

    impl OutputWriter for Spy {
        fn set_scenario_name(&mut self, name: &str) {
            self.seen.lock().unwrap().scenario = name.to_owned();
        }
        fn draw_point(&mut self, _shape: Shape, label: &str) {
            self.seen.lock().unwrap().draws.push(label.to_owned());
        }
        fn set_camera(&mut self, _position: Vector3, _direction: Vector3, label: &str) {
            self.seen.lock().unwrap().cameras.push(label.to_owned());
        }
        fn draw_obstacle(&mut self, id: ObstacleId, _obstacle: &Obstacle) {
            self.seen.lock().unwrap().obstacles.push(id);
        }
        fn erase_obstacle(&mut self, id: ObstacleId) {
            self.seen.lock().unwrap().erased.push(id);
        }
        fn draw_waypoint(&mut self, waypoint: &Waypoint) {
            self.seen.lock().unwrap().waypoints.push(waypoint.center());
        }
        fn publish(&mut self, snapshot: &TickSnapshot) -> Result<(), WriterError> {
            if self.fail {
                return Err("viewer unreachable".into());
            }
            self.seen.lock().unwrap().frames.push(snapshot.clone());
            Ok(())
        }
        fn finish(&mut self) -> Result<(), WriterError> {
            self.seen.lock().unwrap().finished = true;
            Ok(())
        }
    }
}

#[cfg(test)]
mod lifecycle {
    use ped_agent::{Agent, AgentBuilder};
    use ped_core::{AgentId, ObstacleId, SceneConfig, Tick, Vector3};
    use ped_spatial::{Elevation, Obstacle, Waypoint};

    use crate::{Scene, SceneError};

    #[test]
    fn rejects_invalid_config() {
        let config = SceneConfig { interaction_radius: 0.0, ..SceneConfig::default() };
        assert!(matches!(Scene::new(config), Err(SceneError::Config(_))));
    }

    #[test]
    fn rejects_bad_time_steps() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        for dt in [0.0, -0.4, f64::NAN, f64::INFINITY] {
            assert!(matches!(scene.advance(dt), Err(SceneError::InvalidTimeStep(_))));
        }
        assert_eq!(scene.tick(), Tick(0));
        assert_eq!(scene.elapsed(), 0.0);

        scene.advance(0.4).unwrap();
        scene.advance(0.4).unwrap();
        assert_eq!(scene.tick(), Tick(2));
        assert!((scene.elapsed() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn unregistered_waypoint_rejected() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let mut other = Scene::new(SceneConfig::default()).unwrap();
        let ours = scene.add_waypoint(Waypoint::new(5.0, 0.0, 1.0).unwrap());
        let theirs = other.add_waypoint(Waypoint::new(5.0, 0.0, 1.0).unwrap());

        let stray = AgentBuilder::new(Vector3::ZERO).waypoint(theirs.clone()).build().unwrap();
        assert!(matches!(
            scene.add_agent(stray),
            Err(SceneError::UnregisteredWaypoint { .. })
        ));
        assert_eq!(scene.agent_count(), 0);

        let id = scene
            .add_agent(AgentBuilder::new(Vector3::ZERO).waypoint(ours.clone()).build().unwrap())
            .unwrap();
        assert!(scene.assign_waypoint(id, &theirs).is_err());
        scene.assign_waypoint(id, &ours).unwrap();
        assert_eq!(scene.agent(id).unwrap().waypoints().len(), 2);
        assert!(matches!(
            scene.assign_waypoint(AgentId(99), &ours),
            Err(SceneError::UnknownAgent(_))
        ));
    }

    #[test]
    fn agents_are_handed_back() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let a = scene.add_agent(Agent::new(Vector3::planar(1.0, 0.0)).unwrap()).unwrap();
        let b = scene.add_agent(Agent::new(Vector3::planar(2.0, 0.0)).unwrap()).unwrap();
        assert_ne!(a, b);

        let back = scene.remove_agent(a).unwrap();
        assert_eq!(back.position().x, 1.0);
        assert!(scene.agent(a).is_none());
        assert!(matches!(scene.remove_agent(a), Err(SceneError::UnknownAgent(_))));

        let c = scene.add_agent(back).unwrap();
        assert_ne!(c, a);
        let ids: Vec<_> = scene.agents().map(Agent::id).collect();
        assert_eq!(ids, vec![b, c]);

        assert_eq!(scene.drain_agents().len(), 2);
        assert_eq!(scene.agent_count(), 0);
        scene.advance(0.1).unwrap();
    }

    #[test]
    fn obstacles_are_handed_back() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let a = scene.add_obstacle(Obstacle::new(0.0, 0.0, 1.0, 0.0).unwrap());
        let b = scene.add_obstacle(Obstacle::new(0.0, 1.0, 1.0, 1.0).unwrap());
        assert_eq!(scene.obstacles().count(), 2);

        let removed = scene.remove_obstacle(a).unwrap();
        assert_eq!(removed.end(), Vector3::planar(1.0, 0.0));
        assert!(matches!(scene.remove_obstacle(a), Err(SceneError::UnknownObstacle(_))));
        assert!(matches!(
            scene.remove_obstacle(ObstacleId(42)),
            Err(SceneError::UnknownObstacle(_))
        ));

        let drained = scene.drain_obstacles();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].0, b);
        assert!(scene.obstacle(b).is_none());
    }

    #[test]
    fn ground_height_requires_elevation() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        assert!(matches!(scene.ground_height(0.0, 0.0), Err(SceneError::NoElevation)));

        // h = 2·col on 1 m cells.
        let e = Elevation::from_fn(4, 4, |_, c| 2.0 * c as f64).unwrap();
        assert!(scene.set_elevation(e).is_none());
        assert!((scene.ground_height(1.5, 1.0).unwrap() - 3.0).abs() < 1e-12);

        let id = scene.add_agent(Agent::new(Vector3::planar(1.0, 1.0)).unwrap()).unwrap();
        assert!((scene.agent(id).unwrap().position().z - 2.0).abs() < 1e-12);

        assert!(scene.clear_elevation().is_some());
        assert!(scene.elevation().is_none());
        assert!(scene.ground_height(1.0, 1.0).is_err());
    }

    #[test]
    fn agents_follow_terrain() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        scene.set_elevation(Elevation::from_fn(11, 11, |_, c| 0.5 * c as f64).unwrap());
        let goal = scene.add_waypoint(Waypoint::new(9.0, 5.0, 0.5).unwrap());
        let id = scene
            .add_agent(AgentBuilder::new(Vector3::planar(1.0, 5.0)).waypoint(goal).build().unwrap())
            .unwrap();
        for _ in 0..10 {
            scene.advance(0.4).unwrap();
            let a = scene.agent(id).unwrap();
            let p = a.position();
            assert!((p.z - 0.5 * p.x).abs() < 1e-9);
            assert_eq!(a.velocity().z, 0.0);
        }
    }
}

#[cfg(test)]
mod motion {
    use ped_agent::{AgentBuilder, RouteProgress, WaypointBehavior};
    use ped_core::{SceneConfig, Vector3};
    use ped_spatial::{Obstacle, Waypoint};

    use crate::Scene;

    #[test]
    fn straight_line_toward_goal() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let goal = scene.add_waypoint(Waypoint::new(30.0, 40.0, 1.0).unwrap());
        let id = scene
            .add_agent(AgentBuilder::new(Vector3::ZERO).waypoint(goal).build().unwrap())
            .unwrap();

        scene.advance(0.1).unwrap();
        // v = (0.6, 0.8)·1·0.1, p = v·0.1
        let p = scene.agent(id).unwrap().position();
        assert!((p - Vector3::planar(0.006, 0.008)).length() < 1e-12);

        for _ in 0..20 {
            scene.advance(0.1).unwrap();
            let p = scene.agent(id).unwrap().position();
            assert!((p.x * 0.8 - p.y * 0.6).abs() < 1e-9);
        }
    }

    #[test]
    fn concrete_five_tick_scenario() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let goal = scene.add_waypoint(Waypoint::new(10.0, 0.0, 1.0).unwrap());
        let id = scene
            .add_agent(
                AgentBuilder::new(Vector3::ZERO)
                    .waypoint(goal)
                    .behavior(WaypointBehavior::Once)
                    .social_weight(0.0)
                    .obstacle_weight(0.0)
                    .max_speed(2.0)
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let mut xs = Vec::new();
        for _ in 0..5 {
            let report = scene.advance(1.0).unwrap();
            xs.push(scene.agent(id).unwrap().position().x);
            if xs.len() < 5 {
                assert!(report.captured.is_empty());
            } else {
                assert_eq!(report.exhausted, vec![id]);
            }
        }
        assert_eq!(xs, vec![1.0, 3.0, 5.0, 7.0, 9.0]);
        let agent = scene.agent(id).unwrap();
        assert!((8.0..=10.0).contains(&agent.position().x));
        assert_eq!(agent.progress(), RouteProgress::Exhausted);
        assert_eq!(agent.waypoint_index(), None);

        let mut speed = agent.velocity().length();
        for _ in 0..10 {
            scene.advance(1.0).unwrap();
            let v = scene.agent(id).unwrap().velocity().length();
            assert!(v < speed);
            speed = v;
        }
        assert!(speed < 0.01);
    }

    #[test]
    fn once_route_index_never_regresses() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let route: Vec<_> = [3.0, 6.0, 9.0]
            .iter()
            .map(|&x| scene.add_waypoint(Waypoint::new(x, 0.0, 0.5).unwrap()))
            .collect();
        let id = scene
            .add_agent(AgentBuilder::new(Vector3::ZERO).waypoints(route).build().unwrap())
            .unwrap();

        let mut last = 0;
        for _ in 0..200 {
            scene.advance(0.4).unwrap();
            match scene.agent(id).unwrap().waypoint_index() {
                Some(i) => {
                    assert!(i >= last);
                    last = i;
                }
                None => break,
            }
        }
        assert_eq!(last, 2);
        assert!(scene.agent(id).unwrap().is_exhausted());
    }

    #[test]
    fn repeat_route_wraps_to_start() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let a = scene.add_waypoint(Waypoint::new(4.0, 0.0, 0.5).unwrap());
        let b = scene.add_waypoint(Waypoint::new(-4.0, 0.0, 0.5).unwrap());
        let id = scene
            .add_agent(
                AgentBuilder::new(Vector3::ZERO)
                    .waypoint(a)
                    .waypoint(b)
                    .behavior(WaypointBehavior::Repeat)
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let mut seen = vec![0];
        for _ in 0..400 {
            scene.advance(0.4).unwrap();
            let i = scene.agent(id).unwrap().waypoint_index().unwrap();
            if seen.last() != Some(&i) {
                seen.push(i);
            }
        }
        assert!(seen.len() >= 3);
        assert_eq!(&seen[..3], &[0, 1, 0]);
    }

    #[test]
    fn head_on_wall_approach_stops_short() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        scene.add_obstacle(Obstacle::new(-20.0, 0.0, 20.0, 0.0).unwrap());
        let beyond = scene.add_waypoint(Waypoint::new(0.0, -10.0, 1.0).unwrap());
        let id = scene
            .add_agent(AgentBuilder::new(Vector3::planar(0.0, 5.0)).waypoint(beyond).build().unwrap())
            .unwrap();

        let mut min_y = f64::MAX;
        for _ in 0..300 {
            scene.advance(0.4).unwrap();
            min_y = min_y.min(scene.agent(id).unwrap().position().y);
        }
        let a = scene.agent(id).unwrap();
        // Goal pull balances 10·(1/d − 1/1.5) at d = 1/(0.1 + 1/1.5).
        assert!(min_y > 1.0);
        assert!((a.position().y - 1.0 / (0.1 + 1.0 / 1.5)).abs() < 0.05);
        assert!(a.velocity().y.abs() < 1e-3);
    }

    #[test]
    fn wall_never_penetrated_at_large_steps() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        scene.add_obstacle(Obstacle::new(-20.0, 0.0, 20.0, 0.0).unwrap());
        let beyond = scene.add_waypoint(Waypoint::new(3.0, -10.0, 1.0).unwrap());
        let ids: Vec<_> = (0..5)
            .map(|i| {
                let agent = AgentBuilder::new(Vector3::planar(i as f64 * 2.0 - 4.0, 4.0))
                    .waypoint(beyond.clone())
                    .max_speed(3.0)
                    .goal_weight(5.0)
                    .build()
                    .unwrap();
                scene.add_agent(agent).unwrap()
            })
            .collect();

        for _ in 0..200 {
            scene.advance(1.0).unwrap();
            for &id in &ids {
                assert!(scene.agent(id).unwrap().position().y > 0.0);
            }
        }
    }
}

#[cfg(test)]
mod locality {
    use ped_agent::{Agent, AgentBuilder};
    use ped_core::{AgentId, SceneConfig, SimRng, Vector3};
    use ped_spatial::{GridIndex, Obstacle, Waypoint};

    use crate::Scene;

    fn cluster(cx: f64) -> Vec<Vector3> {
        (0..6).map(|i| Vector3::planar(cx + (i % 3) as f64, (i / 3) as f64)).collect()
    }

    #[test]
    fn far_cluster_does_not_affect_forces() {
        let mut both = Scene::new(SceneConfig::default()).unwrap();
        let mut alone = Scene::new(SceneConfig::default()).unwrap();
        for p in cluster(0.0) {
            both.add_agent(Agent::new(p).unwrap()).unwrap();
            alone.add_agent(Agent::new(p).unwrap()).unwrap();
        }
        for p in cluster(100.0) {
            both.add_agent(Agent::new(p).unwrap()).unwrap();
        }

        for _ in 0..5 {
            both.advance(0.2).unwrap();
            alone.advance(0.2).unwrap();
        }
        for a in alone.agents() {
            let b = both.agent(a.id()).unwrap();
            assert!((a.position() - b.position()).length() < 1e-12);
            assert!((a.velocity() - b.velocity()).length() < 1e-12);
        }

        let near = both.neighbors(Vector3::planar(1.0, 0.5), 5.0);
        assert_eq!(near, (0..6).map(AgentId).collect::<Vec<_>>());
    }

    #[test]
    fn grid_scene_answers_unbounded_neighbour_query() {
        let config = SceneConfig::default();
        let mut scene = Scene::with_index(config, GridIndex::new(3.0).unwrap()).unwrap();
        for p in cluster(0.0).into_iter().chain(cluster(500.0)) {
            scene.add_agent(Agent::new(p).unwrap()).unwrap();
        }
        let all: Vec<AgentId> = (0..12).map(AgentId).collect();
        assert_eq!(scene.neighbors(Vector3::ZERO, f64::INFINITY), all);
        assert_eq!(scene.neighbors(Vector3::ZERO, 1e300), all);
    }

    fn populated<I: ped_spatial::NeighborIndex>(mut scene: Scene<I>, seed: u64) -> Scene<I> {
        let mut rng = SimRng::new(seed);
        scene.add_obstacle(Obstacle::new(-10.0, -2.0, 10.0, -2.0).unwrap());
        scene.add_obstacle(Obstacle::new(-10.0, 12.0, 10.0, 12.0).unwrap());
        let left = scene.add_waypoint(Waypoint::new(-8.0, 5.0, 1.0).unwrap());
        let right = scene.add_waypoint(Waypoint::new(8.0, 5.0, 1.0).unwrap());
        let top = scene.add_waypoint(Waypoint::new(0.0, 10.0, 1.0).unwrap());
        for i in 0..40 {
            let p = Vector3::planar(rng.gen_range(-6.0..6.0), rng.gen_range(0.0..10.0));
            let agent = AgentBuilder::new(p)
                .waypoints([left.clone(), right.clone(), top.clone()])
                .behavior(if i % 2 == 0 {
                    ped_agent::WaypointBehavior::RepeatRandom
                } else {
                    ped_agent::WaypointBehavior::Repeat
                })
                .build()
                .unwrap();
            scene.add_agent(agent).unwrap();
        }
        scene
    }

    #[test]
    fn thousand_ticks_are_reproducible() {
        let mut a = populated(Scene::new(SceneConfig::with_seed(9)).unwrap(), 3);
        let mut b = populated(Scene::new(SceneConfig::with_seed(9)).unwrap(), 3);
        for _ in 0..1000 {
            let ra = a.advance(0.2).unwrap();
            let rb = b.advance(0.2).unwrap();
            assert_eq!(ra, rb);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn grid_and_tree_indexes_agree() {
        let config = SceneConfig::with_seed(5);
        let grid = GridIndex::new(config.interaction_radius).unwrap();
        let mut a = populated(Scene::new(config.clone()).unwrap(), 11);
        let mut b = populated(Scene::with_index(config, grid).unwrap(), 11);
        for _ in 0..10 {
            a.advance(0.2).unwrap();
            b.advance(0.2).unwrap();
        }
        // Same neighbour sets; only summation order may differ.
        for (x, y) in a.snapshot().agents.iter().zip(&b.snapshot().agents) {
            assert_eq!(x.id, y.id);
            assert!((x.position - y.position).length() < 1e-9);
        }
    }
}

#[cfg(test)]
mod output {
    use ped_agent::Agent;
    use ped_core::{ObstacleId, SceneConfig, Tick, Vector3};
    use ped_spatial::{Obstacle, Waypoint};

    use super::support::Spy;
    use crate::{NoopWriter, Scene, Shape};

    #[test]
    fn attach_replays_static_geometry() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        scene.add_obstacle(Obstacle::new(0.0, 0.0, 1.0, 0.0).unwrap());
        scene.add_waypoint(Waypoint::new(3.0, 3.0, 1.0).unwrap());

        let (spy, seen) = Spy::new(false);
        assert!(scene.set_output_writer(Box::new(spy)).is_none());
        scene.add_obstacle(Obstacle::new(0.0, 2.0, 1.0, 2.0).unwrap());
        scene.add_waypoint(Waypoint::new(-3.0, 3.0, 1.0).unwrap());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.obstacles, vec![ObstacleId(0), ObstacleId(1)]);
        assert_eq!(seen.waypoints, vec![Vector3::planar(3.0, 3.0), Vector3::planar(-3.0, 3.0)]);
    }

    #[test]
    fn removed_obstacles_are_erased_from_writer() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let (spy, seen) = Spy::new(false);
        scene.set_output_writer(Box::new(spy));
        let a = scene.add_obstacle(Obstacle::new(0.0, 0.0, 1.0, 0.0).unwrap());
        let b = scene.add_obstacle(Obstacle::new(0.0, 2.0, 1.0, 2.0).unwrap());
        let c = scene.add_obstacle(Obstacle::new(0.0, 4.0, 1.0, 4.0).unwrap());

        scene.remove_obstacle(b).unwrap();
        assert!(scene.remove_obstacle(b).is_err());
        assert_eq!(seen.lock().unwrap().erased, vec![b]);

        scene.drain_obstacles();
        assert_eq!(seen.lock().unwrap().erased, vec![b, a, c]);
    }

    #[test]
    fn publishes_post_commit_snapshot() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let id = scene
            .add_agent(Agent::new(Vector3::ZERO).unwrap())
            .unwrap();
        let (spy, seen) = Spy::new(false);
        scene.set_output_writer(Box::new(spy));

        let writer = scene.output_writer_mut().unwrap();
        writer.set_scenario_name("lobby");
        writer.draw_point(Shape::Point(Vector3::planar(1.0, 1.0)), "tree");
        writer.set_camera(Vector3::new(0.0, -10.0, 5.0), Vector3::UNIT_Y, "overview");

        for _ in 0..3 {
            let report = scene.advance(0.4).unwrap();
            assert!(report.output_fault.is_none());
        }

        let seen = seen.lock().unwrap();
        assert_eq!(seen.scenario, "lobby");
        assert_eq!(seen.draws, vec!["tree"]);
        assert_eq!(seen.cameras, vec!["overview"]);
        let ticks: Vec<Tick> = seen.frames.iter().map(|f| f.tick).collect();
        assert_eq!(ticks, vec![Tick(1), Tick(2), Tick(3)]);
        let last = seen.frames.last().unwrap();
        assert_eq!(last.agents.len(), 1);
        assert_eq!(last.agents[0].id, id);
        assert_eq!(last.agents[0].position, scene.agent(id).unwrap().position());
        assert!((last.time - 1.2).abs() < 1e-12);
    }

    #[test]
    fn publish_failure_is_not_fatal() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        scene.add_agent(Agent::new(Vector3::ZERO).unwrap()).unwrap();
        let (spy, _seen) = Spy::new(true);
        scene.set_output_writer(Box::new(spy));

        let report = scene.advance(0.4).unwrap();
        assert_eq!(report.tick, Tick(1));
        assert_eq!(report.output_fault.as_deref(), Some("viewer unreachable"));
        assert!(scene.take_output_error().is_some());
        assert!(scene.take_output_error().is_none());
        assert!(scene.advance(0.4).unwrap().output_fault.is_some());
    }

    #[test]
    fn writer_finished_on_drop() {
        let (spy, seen) = Spy::new(false);
        {
            let mut scene = Scene::new(SceneConfig::default()).unwrap();
            scene.set_output_writer(Box::new(NoopWriter));
            assert!(scene.set_output_writer(Box::new(spy)).is_some());
        }
        assert!(seen.lock().unwrap().finished);

        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        scene.set_output_writer(Box::new(NoopWriter));
        assert!(scene.take_output_writer().is_some());
        assert!(scene.output_writer_mut().is_none());
    }
}
