//! # Reflex Core
//!
//! The node runtime underneath the Reflex control loops.
//!
//! - **Nodes**: Independent computational units with an `init`/`tick`/`shutdown` lifecycle
//! - **Communication**: In-process publish/subscribe between nodes
//! - **Parameters**: Shared runtime parameters, reloadable from YAML or TOML
//! - **Scheduling**: Rate-controlled, priority-ordered execution
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reflex_core::{Hub, Node, NodeInfo};
//!
//! struct ExampleNode {
//!     output: Hub<String>,
//! }
//!
//! impl Node for ExampleNode {
//!     fn name(&self) -> &'static str { "example" }
//!
//!     fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) {
//!         self.output.send("Hello Reflex!".into(), ctx.as_deref_mut());
//!     }
//! }
//! ```

pub mod communication;
pub mod core;
pub mod error;
pub mod params;
pub mod scheduling;

// Re-export commonly used types for easy access
pub use communication::Hub;
pub use core::{LogSummary, Node, NodeConfig, NodeInfo, NodeMetrics, NodeState, TopicMetadata};
pub use error::{ReflexError, ReflexResult};
pub use params::RuntimeParams;
pub use scheduling::Scheduler;

use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the UNIX epoch, used to stamp messages
pub fn timestamp_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
