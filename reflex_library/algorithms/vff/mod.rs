//! Virtual Force Field (VFF) obstacle avoidance
//!
//! A constant attractive vector pulls the robot forward; the single nearest
//! obstacle inside [`OBSTACLE_DISTANCE`] pushes it sideways. The sum of both is
//! turned into a clamped velocity command.
//!
//! # Example
//!
//! ```rust,ignore
//! use reflex_library::algorithms::vff::{compute_vff, to_command};
//!
//! let vectors = compute_vff(&scan);
//! let cmd = to_command(&vectors.result, scan.timestamp);
//! ```

use crate::messages::{CmdVel, ColorRGBA, LaserScan, Marker, MarkerArray, Point3};
use nalgebra::Vector2;
use std::f64::consts::{FRAC_PI_2, PI};

/// Radius inside which an obstacle repels, also the attractive magnitude (m)
pub const OBSTACLE_DISTANCE: f64 = 1.5;

/// Readings at or below this are treated as no return (m)
pub const MIN_VALID_RANGE: f32 = 0.2;

/// Command limits, in the `f32` precision of [`CmdVel`]
pub const MIN_LINEAR_SPEED: f32 = 0.0;
pub const MAX_LINEAR_SPEED: f32 = 0.5;
pub const MAX_ANGULAR_SPEED: f32 = 0.8;

/// Frame the debug markers are drawn in
pub const DEBUG_FRAME_ID: &str = "base_footprint";

pub const REPULSIVE_MARKER_ID: i32 = 0;
pub const RESULT_MARKER_ID: i32 = 1;
pub const ATTRACTIVE_MARKER_ID: i32 = 2;

/// Force vectors of one VFF evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VffVectors {
    pub attractive: Vector2<f64>,
    pub repulsive: Vector2<f64>,
    pub result: Vector2<f64>,
}

/// Nearest reading of a sanitized scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestObstacle {
    pub index: usize,
    pub distance: f64,
    pub angle: f64,
}

/// Replace readings at or below [`MIN_VALID_RANGE`] (and NaN) with infinity
pub fn sanitize_ranges(ranges: &[f32]) -> Vec<f32> {
    ranges
        .iter()
        .map(|&r| if r > MIN_VALID_RANGE { r } else { f32::INFINITY })
        .collect()
}

/// First index holding the smallest sanitized reading
///
/// Returns `None` only for an empty scan; an all-infinite scan yields index 0
/// at infinite distance.
pub fn nearest_obstacle(scan: &LaserScan, sanitized: &[f32]) -> Option<NearestObstacle> {
    let (index, &distance) = sanitized
        .iter()
        .enumerate()
        .reduce(|best, candidate| if candidate.1 < best.1 { candidate } else { best })?;

    Some(NearestObstacle {
        index,
        distance: distance as f64,
        angle: scan.angle_min as f64 + index as f64 * scan.angle_increment as f64,
    })
}

/// Constant forward pull
pub fn attractive_vector() -> Vector2<f64> {
    Vector2::new(OBSTACLE_DISTANCE, 0.0)
}

/// Sideways push away from an obstacle closer than [`OBSTACLE_DISTANCE`]
///
/// Obstacles on the right (negative angle) push towards +90 deg, obstacles on
/// the left towards 270 deg. An obstacle dead ahead produces no push.
pub fn repulsive_vector(obstacle: &NearestObstacle) -> Vector2<f64> {
    if obstacle.distance >= OBSTACLE_DISTANCE {
        return Vector2::zeros();
    }

    let magnitude = OBSTACLE_DISTANCE - obstacle.distance;
    if obstacle.angle < 0.0 {
        polar(magnitude, FRAC_PI_2)
    } else if obstacle.angle > 0.0 {
        polar(magnitude, 3.0 * PI / 2.0)
    } else {
        Vector2::zeros()
    }
}

/// Full VFF evaluation of one scan
pub fn compute_vff(scan: &LaserScan) -> VffVectors {
    let sanitized = sanitize_ranges(&scan.ranges);
    let attractive = attractive_vector();
    let repulsive = nearest_obstacle(scan, &sanitized)
        .map(|obstacle| repulsive_vector(&obstacle))
        .unwrap_or_else(Vector2::zeros);

    VffVectors {
        attractive,
        repulsive,
        result: attractive + repulsive,
    }
}

/// Direction of a vector in radians
pub fn heading(v: &Vector2<f64>) -> f64 {
    v.y.atan2(v.x)
}

/// Length of a vector
pub fn magnitude(v: &Vector2<f64>) -> f64 {
    v.norm()
}

/// Clamped velocity command steering along `result`
///
/// Clamping happens after narrowing to `f32`, so a saturated command equals
/// the limit constant exactly.
pub fn to_command(result: &Vector2<f64>, stamp_nanos: u64) -> CmdVel {
    let linear = (magnitude(result) as f32).clamp(MIN_LINEAR_SPEED, MAX_LINEAR_SPEED);
    let angular = (heading(result) as f32).clamp(-MAX_ANGULAR_SPEED, MAX_ANGULAR_SPEED);
    CmdVel::with_timestamp(linear, angular, stamp_nanos)
}

/// Three arrows from the robot origin: repulsive (red), result (green), attractive (blue)
pub fn vff_debug_markers(vectors: &VffVectors, stamp_nanos: u64) -> MarkerArray {
    let arrow = |id: i32, v: &Vector2<f64>, color: ColorRGBA| {
        Marker::arrow(
            id,
            DEBUG_FRAME_ID,
            Point3::origin(),
            Point3::new(v.x, v.y, 0.0),
            color,
            stamp_nanos,
        )
    };

    MarkerArray::new(vec![
        arrow(ATTRACTIVE_MARKER_ID, &vectors.attractive, ColorRGBA::BLUE),
        arrow(REPULSIVE_MARKER_ID, &vectors.repulsive, ColorRGBA::RED),
        arrow(RESULT_MARKER_ID, &vectors.result, ColorRGBA::GREEN),
    ])
}

fn polar(magnitude: f64, angle: f64) -> Vector2<f64> {
    Vector2::new(magnitude * angle.cos(), magnitude * angle.sin())
}
