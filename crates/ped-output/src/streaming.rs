//! TCP streaming writer.
//!
//! # Threading
//!
//! `publish` never touches the socket.  It builds a [`TickFrame`] and drops
//! it into a single-slot mailbox; a background sender thread takes it from
//! there and writes it with a bounded write timeout.  If the sender is still
//! busy with an older frame when a new one arrives, the older one is replaced
//! (its one-shot additions are carried over, see [`TickFrame::absorb`]).  A
//! slow or absent viewer therefore costs the simulation nothing but dropped
//! frames.
//!
//! # Faults
//!
//! A failed connect or write is logged, the socket dropped, and the error
//! parked for the next `publish` to return.  The sender keeps taking frames
//! and reconnects, at most once per `reconnect_interval`, sending a fresh
//! `hello` on every new connection.

use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use ped_core::{ObstacleId, Vector3};
use ped_scene::{OutputWriter, Shape, TickSnapshot, WriterError};
use ped_spatial::{Obstacle, Waypoint};
use tracing::{debug, info, warn};

use crate::message::{Frame, Session, TickFrame, encode_frame};
use crate::{OutputError, OutputResult, StreamConfig};

// ── Shared state ──────────────────────────────────────────────────────────────

struct State {
    session:   Session,
    /// Latest unsent frame.
    slot:      Option<TickFrame>,
    /// Oldest unreported fault from the sender.
    fault:     Option<OutputError>,
    connected: bool,
    closed:    bool,
}

struct Shared {
    state: Mutex<State>,
    ready: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── StreamingWriter ───────────────────────────────────────────────────────────

/// Best-effort live feed to a viewer over TCP.
pub struct StreamingWriter {
    addr:   String,
    shared: Arc<Shared>,
    sender: Option<JoinHandle<()>>,
}

impl StreamingWriter {
    /// Connect now, failing if the viewer is not reachable.
    pub fn connect(addr: &str, config: StreamConfig) -> OutputResult<Self> {
        let stream = open(addr, &config)?;
        info!(addr, "stream connected");
        Ok(Self::spawn(addr, config, Some(stream)))
    }

    /// Start without a connection; the sender connects when the first frame
    /// is published and keeps retrying afterwards.
    pub fn new(addr: &str, config: StreamConfig) -> Self {
        Self::spawn(addr, config, None)
    }

    fn spawn(addr: &str, config: StreamConfig, stream: Option<TcpStream>) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                session:   Session::new(),
                slot:      None,
                fault:     None,
                connected: stream.is_some(),
                closed:    false,
            }),
            ready: Condvar::new(),
        });
        let sender = {
            let shared = Arc::clone(&shared);
            let addr = addr.to_owned();
            thread::spawn(move || Sender::new(addr, config, shared, stream).run())
        };
        Self { addr: addr.to_owned(), shared, sender: Some(sender) }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Whether the sender currently holds an open connection.
    pub fn is_connected(&self) -> bool {
        self.shared.lock().connected
    }

    /// Stop the sender after it has written any queued frame.
    fn shutdown(&mut self) -> OutputResult<()> {
        let Some(handle) = self.sender.take() else {
            return Ok(());
        };
        self.shared.lock().closed = true;
        self.shared.ready.notify_all();
        handle.join().map_err(|_| OutputError::SenderPanicked)?;
        match self.shared.lock().fault.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl OutputWriter for StreamingWriter {
    fn set_scenario_name(&mut self, name: &str) {
        self.shared.lock().session.set_scenario(name);
    }

    fn draw_point(&mut self, shape: Shape, label: &str) {
        self.shared.lock().session.add_draw(shape, label);
    }

    fn set_camera(&mut self, position: Vector3, direction: Vector3, label: &str) {
        self.shared.lock().session.add_camera(position, direction, label);
    }

    fn draw_obstacle(&mut self, id: ObstacleId, obstacle: &Obstacle) {
        self.shared.lock().session.add_obstacle(id, obstacle);
    }

    fn erase_obstacle(&mut self, id: ObstacleId) {
        self.shared.lock().session.remove_obstacle(id);
    }

    fn draw_waypoint(&mut self, waypoint: &Waypoint) {
        self.shared.lock().session.add_waypoint(waypoint);
    }

    fn publish(&mut self, snapshot: &TickSnapshot) -> Result<(), WriterError> {
        let fault = {
            let mut state = self.shared.lock();
            let mut frame = state.session.tick(snapshot);
            if let Some(older) = state.slot.take() {
                debug!(tick = older.tick, "replacing unsent frame");
                frame.absorb(older);
            }
            state.slot = Some(frame);
            state.fault.take()
        };
        self.shared.ready.notify_one();
        match fault {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    fn finish(&mut self) -> Result<(), WriterError> {
        self.shutdown().map_err(Into::into)
    }
}

impl Drop for StreamingWriter {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(addr = %self.addr, error = %e, "stream closed with a pending fault");
        }
    }
}

// ── Sender thread ─────────────────────────────────────────────────────────────

struct Sender {
    addr:         String,
    config:       StreamConfig,
    shared:       Arc<Shared>,
    stream:       Option<TcpStream>,
    /// `hello` already written on the current connection.
    greeted:      bool,
    last_attempt: Option<Instant>,
}

impl Sender {
    fn new(addr: String, config: StreamConfig, shared: Arc<Shared>, stream: Option<TcpStream>) -> Self {
        Self { addr, config, shared, stream, greeted: false, last_attempt: None }
    }

    fn run(mut self) {
        while let Some(frame) = self.wait_for_frame() {
            if self.stream.is_none() && !self.reconnect() {
                continue;
            }
            if let Err(e) = self.send(frame) {
                warn!(addr = %self.addr, error = %e, "stream write failed; dropping connection");
                self.disconnect(e);
            }
        }
        debug!(addr = %self.addr, "stream sender stopped");
    }

    /// Block until a frame is queued.  `None` once the writer is closed and
    /// the slot drained.
    fn wait_for_frame(&self) -> Option<TickFrame> {
        let mut state = self.shared.lock();
        loop {
            if let Some(frame) = state.slot.take() {
                return Some(frame);
            }
            if state.closed {
                return None;
            }
            state = self.shared.ready.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn reconnect(&mut self) -> bool {
        let due = self
            .last_attempt
            .is_none_or(|t| t.elapsed() >= self.config.reconnect_interval());
        if !due {
            return false;
        }
        self.last_attempt = Some(Instant::now());
        match open(&self.addr, &self.config) {
            Ok(stream) => {
                info!(addr = %self.addr, "stream connected");
                self.stream = Some(stream);
                self.greeted = false;
                self.shared.lock().connected = true;
                true
            }
            Err(e) => {
                warn!(addr = %self.addr, error = %e, "stream connect failed");
                self.record(e);
                false
            }
        }
    }

    fn send(&mut self, frame: TickFrame) -> OutputResult<()> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(());
        };
        if !self.greeted {
            let hello = self.shared.lock().session.hello();
            stream.write_all(&encode_frame(&hello)?)?;
            self.greeted = true;
        }
        stream.write_all(&encode_frame(&Frame::Tick(frame))?)?;
        stream.flush()?;
        Ok(())
    }

    fn disconnect(&mut self, e: OutputError) {
        self.stream = None;
        self.greeted = false;
        let mut state = self.shared.lock();
        state.connected = false;
        state.fault.get_or_insert(e);
    }

    fn record(&self, e: OutputError) {
        self.shared.lock().fault.get_or_insert(e);
    }
}

/// Resolve `addr` and connect to the first address that accepts.
fn open(addr: &str, config: &StreamConfig) -> OutputResult<TcpStream> {
    let mut last = None;
    for sock in addr.to_socket_addrs()? {
        match TcpStream::connect_timeout(&sock, config.connect_timeout()) {
            Ok(stream) => {
                stream.set_write_timeout(Some(config.write_timeout()))?;
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) => last = Some(e),
        }
    }
    Err(last.map_or_else(|| OutputError::Unresolved(addr.to_owned()), OutputError::Io))
}
