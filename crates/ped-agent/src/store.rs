//! Arena of agents addressed by [`AgentId`].
//!
//! Handles are slot indices and are never reused: removing an agent leaves an
//! empty slot behind, so a stale handle resolves to `None` instead of to some
//! later agent.  Iteration is always in ascending handle order, which is the
//! order the scene commits updates in.

use ped_core::{AgentId, Vector3};

use crate::Agent;

pub struct AgentStore {
    slots: Vec<Option<Agent>>,
    seed: u64,
    live: usize,
}

impl AgentStore {
    /// Empty store whose agents derive their RNG streams from `seed`.
    pub fn new(seed: u64) -> Self {
        Self { slots: Vec::new(), seed, live: 0 }
    }

    /// Take ownership of `agent`, assign its handle and seed its RNG.
    pub fn insert(&mut self, mut agent: Agent) -> AgentId {
        let id = AgentId::from_slot(self.slots.len());
        agent.attach(id, self.seed);
        self.slots.push(Some(agent));
        self.live += 1;
        id
    }

    /// Remove and return an agent.  The handle is retired.
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let mut agent = self.slots.get_mut(id.index())?.take()?;
        agent.detach();
        self.live -= 1;
        Some(agent)
    }

    /// Remove every agent, returning them in ascending handle order.
    pub fn drain(&mut self) -> Vec<Agent> {
        let drained: Vec<Agent> = self
            .slots
            .iter_mut()
            .filter_map(Option::take)
            .map(|mut a| {
                a.detach();
                a
            })
            .collect();
        self.live = 0;
        drained
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.slots.get(id.index())?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> + '_ {
        self.slots.iter_mut().flatten()
    }

    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.iter().map(Agent::id)
    }

    /// Fill `out` with `(id, position)` for every live agent.
    pub fn positions_into(&self, out: &mut Vec<(AgentId, Vector3)>) {
        out.clear();
        out.extend(self.iter().map(|a| (a.id, a.position)));
    }
}
