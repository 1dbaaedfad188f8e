//! Wire protocol: newline-delimited JSON, one message per line.
//!
//! ```text
//! {"type":"hello","protocol":1,"scenario":"…","obstacles":[…],"waypoints":[…],"draws":[…],"cameras":[…]}
//! {"type":"tick","protocol":1,"scenario":"…","tick":1,"time":0.4,"agents":[{"id":0,"position":{…},"velocity":{…}}, …]}
//! ```
//!
//! A `hello` opens every connection and carries the complete static context.
//! Each `tick` is self-contained for agent state; its `obstacles`,
//! `waypoints`, `draws` and `cameras` hold only what was added since the
//! previous tick on the same writer and are omitted when empty.  Obstacles
//! and waypoints carry ids, so a consumer that sees one twice (in the `hello`
//! and in the first `tick` after it) can upsert.
//!
//! `removed_obstacles` lists obstacle ids erased since the previous tick.
//! Apply it after the frame's additions.  Obstacle ids are never reused, so
//! a removal always wins over an addition of the same id.
//!
//! The `hello` replays at most [`MAX_REPLAYED_DRAWS`] draws, newest kept,
//! and collapses exact repeats of a label and shape.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use ped_core::{AgentId, ObstacleId, Vector3};
use ped_scene::{AgentRecord, Shape, TickSnapshot};
use ped_spatial::{Obstacle, Waypoint};

use crate::{OutputError, OutputResult};

/// Version stamped on every frame.
pub const PROTOCOL_VERSION: u32 = 1;

/// Draw directives a `hello` replays.  Older ones are dropped first.
pub const MAX_REPLAYED_DRAWS: usize = 1024;

// ── Frames ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    Hello(Hello),
    Tick(TickFrame),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hello {
    pub protocol:  u32,
    pub scenario:  String,
    pub obstacles: Vec<ObstacleRecord>,
    pub waypoints: Vec<WaypointRecord>,
    pub draws:     Vec<DrawRecord>,
    pub cameras:   Vec<CameraRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickFrame {
    pub protocol: u32,
    pub scenario: String,
    pub tick:     u64,
    pub time:     f64,
    pub agents:   Vec<AgentState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obstacles: Vec<ObstacleRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub waypoints: Vec<WaypointRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub draws: Vec<DrawRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cameras: Vec<CameraRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_obstacles: Vec<ObstacleId>,
}

impl TickFrame {
    /// Fold the additions of an older, never-sent frame into this one so
    /// that replacing it loses no one-shot directives.
    pub fn absorb(&mut self, older: TickFrame) {
        fn prepend<T>(dst: &mut Vec<T>, mut src: Vec<T>) {
            src.append(dst);
            *dst = src;
        }
        prepend(&mut self.obstacles, older.obstacles);
        prepend(&mut self.waypoints, older.waypoints);
        prepend(&mut self.draws, older.draws);
        prepend(&mut self.cameras, older.cameras);
        prepend(&mut self.removed_obstacles, older.removed_obstacles);
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub id:       AgentId,
    pub position: Vector3,
    pub velocity: Vector3,
}

impl From<&AgentRecord> for AgentState {
    fn from(r: &AgentRecord) -> Self {
        Self { id: r.id, position: r.position, velocity: r.velocity }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObstacleRecord {
    pub id:    ObstacleId,
    pub start: Vector3,
    pub end:   Vector3,
}

impl ObstacleRecord {
    pub fn new(id: ObstacleId, obstacle: &Obstacle) -> Self {
        Self { id, start: obstacle.start(), end: obstacle.end() }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaypointRecord {
    /// Registration order on the writer.
    pub id:     u32,
    pub center: Vector3,
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub label: String,
    pub shape: ShapeRecord,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeRecord {
    Point { at: Vector3 },
    Segment { start: Vector3, end: Vector3 },
    Circle { center: Vector3, radius: f64 },
}

impl From<Shape> for ShapeRecord {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Point(at) => ShapeRecord::Point { at },
            Shape::Segment(s) => ShapeRecord::Segment { start: s.start, end: s.end },
            Shape::Circle { center, radius } => ShapeRecord::Circle { center, radius },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraRecord {
    pub label:     String,
    pub position:  Vector3,
    pub direction: Vector3,
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Writer-side protocol state: the static context a `hello` replays, plus
/// the changes the next `tick` has yet to carry.
#[derive(Clone, Debug, Default)]
pub struct Session {
    hello: Hello,
    pending: Pending,
}

/// Changes queued since the last tick.
#[derive(Clone, Debug, Default)]
struct Pending {
    obstacles: Vec<ObstacleRecord>,
    removed:   Vec<ObstacleId>,
    waypoints: Vec<WaypointRecord>,
    draws:     Vec<DrawRecord>,
    cameras:   Vec<CameraRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self { hello: Hello { protocol: PROTOCOL_VERSION, ..Hello::default() }, ..Self::default() }
    }

    pub fn scenario(&self) -> &str {
        &self.hello.scenario
    }

    pub fn set_scenario(&mut self, name: &str) {
        self.hello.scenario = name.to_owned();
    }

    pub fn add_obstacle(&mut self, id: ObstacleId, obstacle: &Obstacle) {
        let record = ObstacleRecord::new(id, obstacle);
        self.hello.obstacles.push(record);
        self.pending.obstacles.push(record);
    }

    /// Forget an obstacle.  Later `hello`s omit it and the next tick lists
    /// its id in `removed_obstacles`.  Unknown ids are ignored.
    pub fn remove_obstacle(&mut self, id: ObstacleId) {
        let before = self.hello.obstacles.len();
        self.hello.obstacles.retain(|o| o.id != id);
        if self.hello.obstacles.len() == before {
            return;
        }
        self.pending.obstacles.retain(|o| o.id != id);
        self.pending.removed.push(id);
    }

    pub fn add_waypoint(&mut self, waypoint: &Waypoint) {
        let id = self.hello.waypoints.len() as u32;
        let record = WaypointRecord { id, center: waypoint.center(), radius: waypoint.radius() };
        self.hello.waypoints.push(record);
        self.pending.waypoints.push(record);
    }

    /// Queue a draw directive.  The `hello` keeps one copy of each distinct
    /// label and shape, newest last, up to [`MAX_REPLAYED_DRAWS`].
    pub fn add_draw(&mut self, shape: Shape, label: &str) {
        let record = DrawRecord { label: label.to_owned(), shape: shape.into() };
        let draws = &mut self.hello.draws;
        if let Some(i) = draws.iter().position(|d| *d == record) {
            draws.remove(i);
        }
        if draws.len() >= MAX_REPLAYED_DRAWS {
            draws.drain(..=draws.len() - MAX_REPLAYED_DRAWS);
        }
        draws.push(record.clone());
        self.pending.draws.push(record);
    }

    /// Queue a camera directive.  The `hello` keeps only the latest one per
    /// label.
    pub fn add_camera(&mut self, position: Vector3, direction: Vector3, label: &str) {
        let record = CameraRecord { label: label.to_owned(), position, direction };
        match self.hello.cameras.iter_mut().find(|c| c.label == label) {
            Some(slot) => *slot = record.clone(),
            None => self.hello.cameras.push(record.clone()),
        }
        self.pending.cameras.push(record);
    }

    /// The frame that opens a connection.
    pub fn hello(&self) -> Frame {
        Frame::Hello(self.hello.clone())
    }

    /// Build the next tick frame and mark every pending change as sent.
    pub fn tick(&mut self, snapshot: &TickSnapshot) -> TickFrame {
        let Pending { obstacles, removed, waypoints, draws, cameras } = std::mem::take(&mut self.pending);
        TickFrame {
            protocol: PROTOCOL_VERSION,
            scenario: self.hello.scenario.clone(),
            tick:     snapshot.tick.0,
            time:     snapshot.time,
            agents:   snapshot.agents.iter().map(AgentState::from).collect(),
            obstacles,
            waypoints,
            draws,
            cameras,
            removed_obstacles: removed,
        }
    }
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Serialise `frame` as one JSON line, trailing `\n` included.
pub fn encode_frame(frame: &Frame) -> OutputResult<Vec<u8>> {
    let mut buf = serde_json::to_vec(frame)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Parse one line.  Surrounding whitespace (the line terminator) is ignored.
pub fn decode_frame(line: &[u8]) -> OutputResult<Frame> {
    let frame: Frame = serde_json::from_slice(line.trim_ascii())?;
    let got = match &frame {
        Frame::Hello(h) => h.protocol,
        Frame::Tick(t) => t.protocol,
    };
    if got != PROTOCOL_VERSION {
        return Err(OutputError::Protocol { got, expected: PROTOCOL_VERSION });
    }
    Ok(frame)
}

/// Reads frames from a byte stream, one per line, skipping blank lines.
pub struct FrameReader<R> {
    inner: R,
    line: Vec<u8>,
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, line: Vec::new() }
    }

    /// Next frame, or `None` at end of stream.
    pub fn next_frame(&mut self) -> OutputResult<Option<Frame>> {
        loop {
            self.line.clear();
            if self.inner.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(None);
            }
            if self.line.trim_ascii().is_empty() {
                continue;
            }
            return decode_frame(&self.line).map(Some);
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = OutputResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}
