use ped_core::{AgentId, Tick};

/// Outcome of one [`Scene::advance`](crate::Scene::advance).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Tick number just completed (1 for the first call).
    pub tick: Tick,
    /// Agents stepped.
    pub agents: usize,
    /// Agents that captured a waypoint this tick, ascending.
    pub captured: Vec<AgentId>,
    /// Agents whose `Once` route ran out this tick, ascending.  Also listed
    /// in `captured`.
    pub exhausted: Vec<AgentId>,
    /// Rendered output error, if publishing failed.  The tick itself
    /// completed.
    pub output_fault: Option<String>,
}
