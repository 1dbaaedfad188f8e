//! `ped-output` — viewer output for the pedsim crowd engine.
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`message`]   | Wire frames, `encode_frame` / `decode_frame`, `FrameReader` |
//! | [`streaming`] | `StreamingWriter`: background TCP sender, latest-frame-wins |
//! | [`recording`] | `RecordingWriter`: same byte stream into memory             |
//! | [`config`]    | `StreamConfig` timeouts                                     |
//! | [`error`]     | `OutputError`, `OutputResult<T>`                            |
//!
//! Both writers implement `ped_scene::OutputWriter`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ped_output::{StreamConfig, StreamingWriter};
//!
//! let mut writer = StreamingWriter::new("127.0.0.1:2222", StreamConfig::default());
//! writer.set_scenario_name("bottleneck");
//! scene.set_output_writer(Box::new(writer));
//! loop {
//!     let report = scene.advance(0.4)?;
//!     if let Some(fault) = report.output_fault {
//!         eprintln!("viewer: {fault}");
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod message;
pub mod recording;
pub mod streaming;


pub use config::StreamConfig;
pub use error::{OutputError, OutputResult};
pub use message::{
    AgentState, CameraRecord, DrawRecord, Frame, FrameReader, Hello, ObstacleRecord, MAX_REPLAYED_DRAWS,
    PROTOCOL_VERSION, ShapeRecord, TickFrame, WaypointRecord, decode_frame, encode_frame,
};
pub use recording::{Recording, RecordingWriter};
pub use streaming::StreamingWriter;
