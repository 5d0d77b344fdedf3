//! Message types for Reflex
//!
//! Messages are organized by domain:
//! - Geometry: Spatial primitives (Twist, Pose2D, Point3, Vector3)
//! - Sensor: Sensor data formats (LaserScan, Odometry)
//! - Command: Velocity commands (CmdVel)
//! - Visualization: Debug markers (Marker, MarkerArray)
//!
//! All message types are re-exported at the crate root for convenience.

pub mod cmd_vel;
pub mod geometry;
pub mod sensor;
pub mod visualization;

pub use cmd_vel::CmdVel;
pub use geometry::{Point3, Pose2D, Twist, Vector3};
pub use sensor::{LaserScan, Odometry, DEFAULT_SCAN_SAMPLES};
pub use visualization::{ColorRGBA, Marker, MarkerArray, MarkerType};
