//! Reflex Library Nodes
//!
//! All nodes follow the same simple API pattern: `NodeName::new()` for the
//! default topics or `NodeName::new_with_topics(...)` for custom topic names.
//!
//! ## Safety
//! - `SafetyBrakeNode` - time-to-collision emergency braking
//!
//! ## Navigation
//! - `VffAvoidanceNode` - virtual force field obstacle avoidance
//!
//! ## Simulation
//! - `SimulatedSensorsNode` - synthetic scan and odometry source
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use reflex_library::nodes::*;
//!
//! let brake = SafetyBrakeNode::new()?;               // "scan" + "diff_cont/odom" -> "brake"
//! let avoid = VffAvoidanceNode::new()?;              // "input_scan" -> "output_vel"
//!
//! // Or with custom topics
//! let brake = SafetyBrakeNode::new_with_topics("front/scan", "odom", "safety/brake")?;
//! ```

pub mod safety_brake_node;
pub mod simulated_sensors_node;
pub mod vff_avoidance_node;

pub use safety_brake_node::{SafetyBrakeNode, VelocitySnapshot, BRAKE_RATE_HZ};
pub use simulated_sensors_node::SimulatedSensorsNode;
pub use vff_avoidance_node::{VffAvoidanceNode, AVOIDANCE_RATE_HZ, SCAN_TIMEOUT};
