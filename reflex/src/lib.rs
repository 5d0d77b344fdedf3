//! # Reflex - reactive braking and obstacle avoidance
//!
//! Two small control loops for mobile robots with a rotating range finder:
//!
//! - **Safety brake**: time-to-collision over the forward sector, publishing a
//!   zero velocity command every cycle while a collision is imminent.
//! - **VFF avoidance**: virtual force field steering away from the nearest
//!   obstacle while driving forward.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reflex::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut scheduler = Scheduler::new();
//!     scheduler
//!         .add(Box::new(SafetyBrakeNode::new()?), 0, Some(true))
//!         .set_node_rate("SafetyBrakeNode", 10.0);
//!     scheduler.run()?;
//!     Ok(())
//! }
//! ```

// Re-export core components
pub use reflex_core::{self, *};

// Re-export standard library with alias
pub use reflex_library as library;

pub mod launch;
pub mod monitor;

/// The Reflex prelude - everything you need to get started
pub mod prelude {
    // Core node types
    pub use reflex_core::core::{LogSummary, Node, NodeConfig, NodeInfo, NodeState};

    // Communication and scheduling
    pub use reflex_core::communication::Hub;
    pub use reflex_core::scheduling::Scheduler;

    // Parameters and errors
    pub use reflex_core::error::{ReflexError, ReflexResult};
    pub use reflex_core::params::RuntimeParams;
    pub type Result<T> = ReflexResult<T>;

    // Nodes and algorithms
    pub use reflex_library::algorithms::ttc::{BrakeState, TtcEstimate};
    pub use reflex_library::algorithms::vff::VffVectors;
    pub use reflex_library::nodes::{SafetyBrakeNode, SimulatedSensorsNode, VffAvoidanceNode};

    // Common std types
    pub use std::time::{Duration, Instant};

    // Common traits
    pub use serde::{Deserialize, Serialize};

    // Re-export anyhow for error handling
    pub use anyhow::{anyhow, bail, Context, Result as AnyResult};

    // Re-export all message types from reflex_library for convenience
    pub use reflex_library::messages::*;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get Reflex version
pub fn version() -> &'static str {
    VERSION
}
