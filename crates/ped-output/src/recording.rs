//! In-memory writer that records the exact byte stream a viewer would see.

use std::io::Cursor;
use std::sync::{Arc, Mutex, PoisonError};

use ped_core::{ObstacleId, Vector3};
use ped_scene::{OutputWriter, Shape, TickSnapshot, WriterError};
use ped_spatial::{Obstacle, Waypoint};

use crate::message::{Frame, FrameReader, Session, encode_frame};
use crate::OutputResult;

/// Encodes frames as a [`StreamingWriter`](crate::StreamingWriter) would on a
/// single, never-dropped connection, into a shared buffer.
///
/// Useful for headless runs and tests: keep the [`Recording`] handle, move
/// the writer into the scene.
pub struct RecordingWriter {
    session: Session,
    greeted: bool,
    buffer:  Arc<Mutex<Vec<u8>>>,
}

/// Read side of a [`RecordingWriter`].
#[derive(Clone)]
pub struct Recording {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl RecordingWriter {
    /// A writer and the handle that reads back what it wrote.
    pub fn pair() -> (Self, Recording) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer = Self { session: Session::new(), greeted: false, buffer: Arc::clone(&buffer) };
        (writer, Recording { buffer })
    }

    fn push(&self, frame: &Frame) -> OutputResult<()> {
        let bytes = encode_frame(frame)?;
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(&bytes);
        Ok(())
    }
}

impl OutputWriter for RecordingWriter {
    fn set_scenario_name(&mut self, name: &str) {
        self.session.set_scenario(name);
    }

    fn draw_point(&mut self, shape: Shape, label: &str) {
        self.session.add_draw(shape, label);
    }

    fn set_camera(&mut self, position: Vector3, direction: Vector3, label: &str) {
        self.session.add_camera(position, direction, label);
    }

    fn draw_obstacle(&mut self, id: ObstacleId, obstacle: &Obstacle) {
        self.session.add_obstacle(id, obstacle);
    }

    fn erase_obstacle(&mut self, id: ObstacleId) {
        self.session.remove_obstacle(id);
    }

    fn draw_waypoint(&mut self, waypoint: &Waypoint) {
        self.session.add_waypoint(waypoint);
    }

    fn publish(&mut self, snapshot: &TickSnapshot) -> Result<(), WriterError> {
        if !self.greeted {
            self.push(&self.session.hello())?;
            self.greeted = true;
        }
        let frame = Frame::Tick(self.session.tick(snapshot));
        self.push(&frame)?;
        Ok(())
    }
}

impl Recording {
    /// Raw bytes written so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Decode everything written so far.
    pub fn frames(&self) -> OutputResult<Vec<Frame>> {
        FrameReader::new(Cursor::new(self.bytes())).collect()
    }
}
