//! Time-to-collision (TTC) evaluation
//!
//! Estimates, for every ray in the forward half of a range scan, how long it
//! would take to reach the obstacle at the current forward velocity, and decides
//! whether the smallest of those times warrants an emergency brake.
//!
//! # Example
//!
//! ```rust,ignore
//! use reflex_library::algorithms::ttc::{min_time_to_collision, should_brake};
//!
//! let estimate = min_time_to_collision(&scan, odom.forward_velocity());
//! if should_brake(estimate.min_ttc, 1.0) {
//!     // publish zero velocity
//! }
//! ```

use crate::messages::LaserScan;
use std::fmt;
use std::ops::Range;

/// Minimum TTC reported when no ray is closing in
pub const TTC_SENTINEL: f64 = 1_000_000.0;

/// Result of one TTC evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TtcEstimate {
    /// Smallest time-to-collision in seconds, or [`TTC_SENTINEL`]
    pub min_ttc: f64,
    /// Scan index that produced `min_ttc`
    pub index: Option<usize>,
}

impl TtcEstimate {
    /// Estimate with no closing ray
    pub fn clear() -> Self {
        Self {
            min_ttc: TTC_SENTINEL,
            index: None,
        }
    }
}

impl Default for TtcEstimate {
    fn default() -> Self {
        Self::clear()
    }
}

/// Latched braking decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrakeState {
    #[default]
    Released,
    Braking,
}

impl BrakeState {
    pub fn from_decision(brake: bool) -> Self {
        if brake {
            BrakeState::Braking
        } else {
            BrakeState::Released
        }
    }

    pub fn is_braking(&self) -> bool {
        matches!(self, BrakeState::Braking)
    }
}

impl fmt::Display for BrakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrakeState::Released => write!(f, "Released"),
            BrakeState::Braking => write!(f, "Braking"),
        }
    }
}

/// Index window covering the forward +/-90 deg of a full-circle scan
///
/// For 360 samples this is `90..270`.
pub fn forward_sector(len: usize) -> Range<usize> {
    len / 4..3 * len / 4
}

/// Minimum time-to-collision over the forward sector
///
/// Infinite and NaN readings are skipped. Rays whose closing speed
/// `cos(angle) * forward_velocity` is not positive produce no candidate.
pub fn min_time_to_collision(scan: &LaserScan, forward_velocity: f64) -> TtcEstimate {
    let mut estimate = TtcEstimate::clear();

    for index in forward_sector(scan.len()) {
        let distance = scan.ranges[index];
        if !distance.is_finite() {
            continue;
        }

        let angle = scan.angle_min as f64 + index as f64 * scan.angle_increment as f64;
        let closing_speed = angle.cos() * forward_velocity;
        if closing_speed <= 0.0 {
            continue;
        }

        let ttc = distance as f64 / closing_speed;
        if ttc < estimate.min_ttc {
            estimate = TtcEstimate {
                min_ttc: ttc,
                index: Some(index),
            };
        }
    }

    estimate
}

/// Braking decision: brake when the minimum TTC is at or below the threshold
pub fn should_brake(min_ttc: f64, threshold: f64) -> bool {
    min_ttc <= threshold
}
