//! Geometric primitives shared by sensor and visualization messages

use reflex_core::core::LogSummary;
use serde::{Deserialize, Serialize};

/// 3D velocity command with linear and angular components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Twist {
    /// Linear velocity [x, y, z] in m/s
    pub linear: [f64; 3],
    /// Angular velocity [roll, pitch, yaw] in rad/s
    pub angular: [f64; 3],
}

impl Twist {
    /// Create a new twist
    pub fn new(linear: [f64; 3], angular: [f64; 3]) -> Self {
        Self { linear, angular }
    }

    /// Planar twist: forward/lateral velocity plus yaw rate
    pub fn new_2d(linear_x: f64, linear_y: f64, angular_z: f64) -> Self {
        Self {
            linear: [linear_x, linear_y, 0.0],
            angular: [0.0, 0.0, angular_z],
        }
    }

    /// Zero velocity
    pub fn stop() -> Self {
        Self::default()
    }
}

/// 2D pose (position and orientation)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    /// Orientation angle in radians
    pub theta: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    pub fn origin() -> Self {
        Self::default()
    }
}

/// 3D point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::default()
    }
}

/// 3D vector, used for marker scales
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl LogSummary for Twist {
    fn log_summary(&self) -> String {
        format!(
            "Twist(lin=[{:.2}, {:.2}, {:.2}], ang_z={:.2})",
            self.linear[0], self.linear[1], self.linear[2], self.angular[2]
        )
    }
}

impl LogSummary for Pose2D {
    fn log_summary(&self) -> String {
        format!("Pose2D({:.2}, {:.2}, {:.2})", self.x, self.y, self.theta)
    }
}
