//! Sensor data formats consumed by the control loops

use crate::messages::geometry::{Pose2D, Twist};
use reflex_core::core::LogSummary;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Default number of samples in a full-circle scan
pub const DEFAULT_SCAN_SAMPLES: usize = 360;

/// Laser scan data from a rotating range finder
///
/// Reading `i` lies at `angle_min + i * angle_increment`. Readings that are
/// infinite or NaN mean "no return".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserScan {
    /// Range measurements in meters
    pub ranges: Vec<f32>,
    /// Start angle of the scan in radians
    pub angle_min: f32,
    /// End angle of the scan in radians
    pub angle_max: f32,
    /// Angular distance between measurements in radians
    pub angle_increment: f32,
    /// Minimum trusted range value in meters
    pub range_min: f32,
    /// Maximum trusted range value in meters
    pub range_max: f32,
    /// Time to take one full scan in seconds
    pub scan_time: f32,
    /// Frame the scan is expressed in
    pub frame_id: String,
    /// Capture timestamp in nanoseconds since epoch
    pub timestamp: u64,
}

impl Default for LaserScan {
    fn default() -> Self {
        Self::full_circle(vec![f32::INFINITY; DEFAULT_SCAN_SAMPLES])
    }
}

impl LaserScan {
    /// Create a scan from explicit angular layout
    pub fn new(ranges: Vec<f32>, angle_min: f32, angle_increment: f32) -> Self {
        let angle_max = angle_min + angle_increment * ranges.len().saturating_sub(1) as f32;
        Self {
            ranges,
            angle_min,
            angle_max,
            angle_increment,
            range_min: 0.0,
            range_max: f32::INFINITY,
            scan_time: 0.1,
            frame_id: "laser".to_string(),
            timestamp: reflex_core::timestamp_now(),
        }
    }

    /// Create a 360 degree scan starting behind the sensor
    ///
    /// Index `N/2` points straight ahead (angle 0), index `N/4` to the right
    /// (-90 deg) and index `3N/4` to the left (+90 deg).
    pub fn full_circle(ranges: Vec<f32>) -> Self {
        let increment = if ranges.is_empty() {
            0.0
        } else {
            2.0 * PI / ranges.len() as f32
        };
        Self::new(ranges, -PI, increment)
    }

    /// Set the capture timestamp
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the trusted range window
    pub fn with_range_limits(mut self, range_min: f32, range_max: f32) -> Self {
        self.range_min = range_min;
        self.range_max = range_max;
        self
    }

    /// Number of readings
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True when the scan has no readings
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Get the angle for a specific range index
    pub fn angle_at(&self, index: usize) -> f32 {
        self.angle_min + index as f32 * self.angle_increment
    }

    /// Check if a range reading is finite and inside the trusted window
    pub fn is_range_valid(&self, index: usize) -> bool {
        self.ranges.get(index).is_some_and(|&range| {
            range.is_finite() && range >= self.range_min && range <= self.range_max
        })
    }

    /// Count valid range readings
    pub fn valid_count(&self) -> usize {
        (0..self.ranges.len())
            .filter(|&i| self.is_range_valid(i))
            .count()
    }

    /// Get minimum valid range reading
    pub fn min_range(&self) -> Option<f32> {
        (0..self.ranges.len())
            .filter(|&i| self.is_range_valid(i))
            .map(|i| self.ranges[i])
            .reduce(f32::min)
    }
}

/// Odometry: pose plus the velocity estimate of the robot base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Odometry {
    pub pose: Pose2D,
    pub twist: Twist,
    pub frame_id: String,
    pub child_frame_id: String,
    /// Timestamp in nanoseconds since epoch
    pub timestamp: u64,
}

impl Default for Odometry {
    fn default() -> Self {
        Self::new(Pose2D::origin(), Twist::stop())
    }
}

impl Odometry {
    /// Create an odometry message stamped now
    pub fn new(pose: Pose2D, twist: Twist) -> Self {
        Self {
            pose,
            twist,
            frame_id: "odom".to_string(),
            child_frame_id: "base_link".to_string(),
            timestamp: reflex_core::timestamp_now(),
        }
    }

    /// Forward (x) linear velocity in m/s
    pub fn forward_velocity(&self) -> f64 {
        self.twist.linear[0]
    }

    /// Lateral (y) linear velocity in m/s
    pub fn lateral_velocity(&self) -> f64 {
        self.twist.linear[1]
    }
}

impl LogSummary for LaserScan {
    fn log_summary(&self) -> String {
        match self.min_range() {
            Some(min) => format!(
                "LaserScan(n={}, valid={}, min={:.2})",
                self.len(),
                self.valid_count(),
                min
            ),
            None => format!("LaserScan(n={}, valid=0)", self.len()),
        }
    }
}

impl LogSummary for Odometry {
    fn log_summary(&self) -> String {
        format!(
            "Odometry(vx={:.2}, vy={:.2})",
            self.forward_velocity(),
            self.lateral_velocity()
        )
    }
}
