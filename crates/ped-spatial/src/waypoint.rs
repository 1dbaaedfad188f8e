//! Goal regions agents steer toward.

use ped_core::{CoreError, Vector3};

use crate::SpatialResult;

/// A circular goal on the ground plane.
///
/// Agents share waypoints through `Arc<Waypoint>`; the scene that registered
/// a waypoint is its owner.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    center: Vector3,
    radius: f64,
}

impl Waypoint {
    /// Goal at `(x, y)` captured within `radius` metres.
    ///
    /// Fails unless the coordinates are finite and `radius > 0`.
    pub fn new(x: f64, y: f64, radius: f64) -> SpatialResult<Self> {
        CoreError::check_finite("waypoint x", x)?;
        CoreError::check_finite("waypoint y", y)?;
        CoreError::check_positive("waypoint radius", radius)?;
        Ok(Self { center: Vector3::planar(x, y), radius })
    }

    #[inline]
    pub fn center(&self) -> Vector3 {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// `true` once `p` is within the capture radius (horizontal distance).
    #[inline]
    pub fn reached(&self, p: Vector3) -> bool {
        self.center.horizontal_distance(p) <= self.radius
    }

    /// Horizontal unit vector from `p` toward the centre.
    ///
    /// Zero when `p` sits exactly on the centre.
    #[inline]
    pub fn direction_from(&self, p: Vector3) -> Vector3 {
        (self.center - p).horizontal().normalized()
    }
}
