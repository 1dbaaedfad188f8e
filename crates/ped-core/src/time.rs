//! Simulation time model.
//!
//! A scene counts completed ticks and, because every `advance` call supplies
//! its own `dt`, also sums the simulated seconds.  Both live in [`SimClock`].

use std::fmt;

/// Number of ticks a scene has completed.  `Tick(0)` is the state before the
/// first `advance`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Tick counter plus accumulated simulated time.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    pub current_tick: Tick,
    /// Sum of every `dt` passed to `advance`, in seconds.
    pub elapsed_secs: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed tick of length `dt`.
    #[inline]
    pub fn advance(&mut self, dt: f64) {
        self.current_tick = self.current_tick.next();
        self.elapsed_secs += dt;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2} s)", self.current_tick, self.elapsed_secs)
    }
}
