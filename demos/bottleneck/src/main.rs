//! bottleneck — pedestrians squeezing through a funnel.
//!
//! 250 agents start in a block on the west side of a walled arena and all
//! head for one exit waypoint on the east side.  Between them two funnel
//! walls narrow into a 4 m corridor.  The ground is a procedural heightmap,
//! so agents also rise and fall with the terrain.
//!
//! ```text
//! bottleneck [--config scene.json] [--viewer HOST:PORT] [--ticks N] [--realtime]
//! ```
//!
//! Frames are streamed to the viewer address (default `127.0.0.1:2222`)
//! whenever something is listening there; the run never waits for it.
//! `RUST_LOG` controls log output.

mod arena;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ped_agent::{AgentBuilder, WaypointBehavior};
use ped_core::{AgentId, SceneConfig, SimRng, Vector3};
use ped_output::{StreamConfig, StreamingWriter};
use ped_scene::{OutputWriter, Scene};

// ── Constants ─────────────────────────────────────────────────────────────────

const AGENT_COUNT:     usize      = 250;
const SEED:            u64        = 42;
const DT:              f64        = 0.4;
const DEFAULT_TICKS:   u64        = 10_000;
const DEFAULT_VIEWER:  &str       = "127.0.0.1:2222";
const FRAME_INTERVAL:  Duration   = Duration::from_millis(1000 / 50);
const LOG_INTERVAL:    u64        = 100;
/// The agent the follow camera tracks.
const CAMERA_AGENT:    usize      = 100;
/// Start block, west of the funnel.
const START_MIN:       (f64, f64) = (-100.0, -15.0);
const START_MAX:       (f64, f64) = (-60.0, 15.0);
/// East end of the corridor.
const CORRIDOR_EXIT_X: f64        = 30.0;

// ── Command line ──────────────────────────────────────────────────────────────

struct Options {
    config:   Option<PathBuf>,
    viewer:   String,
    ticks:    u64,
    realtime: bool,
}

fn parse_args() -> Result<Options> {
    let mut opts = Options {
        config:   None,
        viewer:   DEFAULT_VIEWER.to_owned(),
        ticks:    DEFAULT_TICKS,
        realtime: false,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => opts.config = Some(args.next().context("--config needs a path")?.into()),
            "--viewer" => opts.viewer = args.next().context("--viewer needs an address")?,
            "--ticks" => {
                let n = args.next().context("--ticks needs a count")?;
                opts.ticks = n.parse().with_context(|| format!("bad tick count {n:?}"))?;
            }
            "--realtime" => opts.realtime = true,
            other => bail!("unknown argument {other:?}"),
        }
    }
    Ok(opts)
}

fn load_config(path: Option<&Path>) -> Result<SceneConfig> {
    let Some(path) = path else {
        return Ok(SceneConfig::with_seed(SEED));
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

// ── Cameras ───────────────────────────────────────────────────────────────────

/// Smoothed chase camera over one agent's shoulder.
struct FollowCamera {
    position:  Vector3,
    direction: Vector3,
}

impl FollowCamera {
    fn new(start: Vector3) -> Self {
        Self { position: start, direction: Vector3::UNIT_X }
    }

    fn update(&mut self, position: Vector3, velocity: Vector3) {
        self.position = 0.2 * position + 0.8 * self.position;
        self.direction = 0.005 * velocity.normalized() + 0.995 * self.direction;
    }

    fn aim(&self, writer: &mut dyn OutputWriter) {
        let p = self.position;
        writer.set_camera(Vector3::new(p.x, p.y, p.z + 2.2), self.direction.normalized(), "follow");
        writer.set_camera(
            Vector3::new(p.x - 20.0, p.y + 40.0, p.z + 20.0),
            Vector3::new(1.0, -2.0, -1.0).normalized(),
            "overview",
        );
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let opts = parse_args()?;
    let config = load_config(opts.config.as_deref())?;
    info!(agents = AGENT_COUNT, ticks = opts.ticks, seed = config.seed, "bottleneck");

    // 1. Scene, terrain and walls.
    let mut scene = Scene::new(config.clone())?;
    scene.set_elevation(arena::terrain()?);
    let exit = arena::build(&mut scene)?;

    // 2. Viewer output.  Obstacles and the exit are replayed on attach.
    let mut writer = StreamingWriter::new(&opts.viewer, StreamConfig::default());
    writer.set_scenario_name("Bottleneck");
    for tree in arena::trees(&scene)? {
        writer.draw_point(tree, "tree");
    }
    scene.set_output_writer(Box::new(writer));

    // 3. Agents in a 40 × 30 m block west of the funnel.
    let mut rng = SimRng::new(config.seed);
    let mut ids: Vec<AgentId> = Vec::with_capacity(AGENT_COUNT);
    for _ in 0..AGENT_COUNT {
        let agent = AgentBuilder::new(rng.point_in(START_MIN, START_MAX))
            .waypoint(exit.clone())
            .behavior(WaypointBehavior::Once)
            .social_weight(10.0)
            .build()?;
        ids.push(scene.add_agent(agent)?);
    }
    let tracked = ids[CAMERA_AGENT];
    let mut camera = FollowCamera::new(
        scene.agent(tracked).map(|a| a.position()).unwrap_or(Vector3::ZERO),
    );

    // 4. Run.
    let t0 = Instant::now();
    let mut faults = 0usize;
    for _ in 0..opts.ticks {
        let report = scene.advance(DT)?;
        if let Some(fault) = &report.output_fault {
            faults += 1;
            // Only the first of a run of faults is interesting.
            if faults == 1 {
                warn!(%fault, "viewer unavailable; continuing without it");
            }
        } else {
            faults = 0;
        }

        if let Some(agent) = scene.agent(tracked) {
            camera.update(agent.position(), agent.velocity());
        }
        if let Some(writer) = scene.output_writer_mut() {
            camera.aim(writer);
        }

        if report.tick.0 % LOG_INTERVAL == 0 {
            let through = scene.agents().filter(|a| a.position().x > CORRIDOR_EXIT_X).count();
            info!(tick = report.tick.0, time = scene.elapsed(), through, "progress");
        }
        if opts.realtime {
            thread::sleep(FRAME_INTERVAL);
        }
    }
    let elapsed = t0.elapsed();

    // 5. Summary.
    let through = scene.agents().filter(|a| a.position().x > CORRIDOR_EXIT_X).count();
    let arrived = scene.agents().filter(|a| a.is_exhausted()).count();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  ticks            : {}", scene.tick().0);
    println!("  simulated time   : {:.1} s", scene.elapsed());
    println!("  through corridor : {through} / {AGENT_COUNT}");
    println!("  reached exit     : {arrived} / {AGENT_COUNT}");

    if let Some(mut writer) = scene.take_output_writer() {
        if let Err(e) = writer.finish() {
            warn!(error = %e, "viewer stream closed with a fault");
        }
    }
    Ok(())
}
