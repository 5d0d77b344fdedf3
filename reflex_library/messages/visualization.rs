//! Debug visualization messages

use crate::messages::geometry::{Point3, Vector3};
use reflex_core::core::LogSummary;
use serde::{Deserialize, Serialize};

/// RGBA color with components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRGBA {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRGBA {
    pub const RED: ColorRGBA = ColorRGBA::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: ColorRGBA = ColorRGBA::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: ColorRGBA = ColorRGBA::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Marker shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerType {
    /// Arrow drawn from `points[0]` to `points[1]`
    Arrow,
}

/// Single visualization marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: i32,
    pub marker_type: MarkerType,
    pub frame_id: String,
    /// Timestamp in nanoseconds since epoch
    pub timestamp: u64,
    pub points: Vec<Point3>,
    pub scale: Vector3,
    pub color: ColorRGBA,
}

impl Marker {
    /// Shaft diameter, head diameter, head length (0 = default)
    pub const ARROW_SCALE: Vector3 = Vector3 {
        x: 0.05,
        y: 0.1,
        z: 0.0,
    };

    /// Planar arrow from `start` to `end`
    pub fn arrow(
        id: i32,
        frame_id: &str,
        start: Point3,
        end: Point3,
        color: ColorRGBA,
        timestamp: u64,
    ) -> Self {
        Self {
            id,
            marker_type: MarkerType::Arrow,
            frame_id: frame_id.to_string(),
            timestamp,
            points: vec![start, end],
            scale: Self::ARROW_SCALE,
            color,
        }
    }
}

/// Collection of markers published together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MarkerArray {
    pub markers: Vec<Marker>,
}

impl MarkerArray {
    pub fn new(markers: Vec<Marker>) -> Self {
        Self { markers }
    }

    /// Look up a marker by id
    pub fn get(&self, id: i32) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }
}

impl LogSummary for MarkerArray {
    fn log_summary(&self) -> String {
        format!("MarkerArray({} markers)", self.markers.len())
    }
}
