//! # Reflex Library
//!
//! Messages, algorithms and nodes for the two Reflex control loops.
//!
//! ## Structure
//!
//! ```text
//! reflex_library/
//! ── messages/       # LaserScan, Odometry, CmdVel, MarkerArray, ...
//! ── algorithms/     # Pure TTC and VFF computations
//! ── nodes/          # SafetyBrakeNode, VffAvoidanceNode, SimulatedSensorsNode
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reflex_library::{CmdVel, LaserScan, SafetyBrakeNode, VffAvoidanceNode};
//!
//! let brake = SafetyBrakeNode::new()?;   // scan + diff_cont/odom -> brake
//! let avoid = VffAvoidanceNode::new()?;  // input_scan -> output_vel (+ vff_debug)
//! ```

pub mod algorithms;
pub mod messages;
pub mod nodes;

// Re-export core traits needed for message types
pub use reflex_core::core::LogSummary;

// Re-export message types at the crate root for convenience
pub use messages::*;

pub use nodes::{SafetyBrakeNode, SimulatedSensorsNode, VffAvoidanceNode};

/// Commonly used items in one import
pub mod prelude {
    pub use crate::algorithms::ttc::{BrakeState, TtcEstimate};
    pub use crate::algorithms::vff::VffVectors;
    pub use crate::messages::*;
    pub use crate::nodes::{SafetyBrakeNode, SimulatedSensorsNode, VffAvoidanceNode};
    pub use reflex_core::{Hub, Node, NodeInfo, ReflexError, ReflexResult, RuntimeParams, Scheduler};
}
