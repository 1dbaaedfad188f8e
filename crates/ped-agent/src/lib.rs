//! `ped-agent` — pedestrian agents and the social-force step.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`params`]    | `ForceWeights`, `AgentParams`, `WaypointBehavior`           |
//! | [`agent`]     | `Agent` state, `RouteProgress` state machine                |
//! | [`builder`]   | `AgentBuilder` (fluent, validated construction)             |
//! | [`force`]     | `StepContext`, `Forces`, `AgentUpdate`, the step itself     |
//! | [`store`]     | `AgentStore` arena addressed by `AgentId`                   |
//! | [`error`]     | `AgentError`, `AgentResult<T>`                              |
//!
//! # Two-phase step
//!
//! 1. **Plan** (read-only, parallelisable): [`Agent::plan_step`] reads the
//!    pre-tick [`AgentStore`] through a shared [`StepContext`] and returns an
//!    [`AgentUpdate`].  No agent can observe another's new position.
//!
//! 2. **Commit** (sequential): [`Agent::apply`] writes the update back.  This
//!    is also the only place an agent's RNG is touched.

pub mod agent;
pub mod builder;
pub mod error;
pub mod force;
pub mod params;
pub mod store;


pub use agent::{Agent, RouteProgress};
pub use builder::AgentBuilder;
pub use error::{AgentError, AgentResult};
pub use force::{AgentUpdate, Forces, RouteEvent, StepContext};
pub use params::{AgentParams, ForceWeights, WaypointBehavior};
pub use store::AgentStore;
