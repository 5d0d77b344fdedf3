//! # Reflex Scheduling System
//!
//! Single-threaded scheduler that orchestrates node execution:
//!
//! - **Scheduler**: drives `init`, `tick` and `shutdown` of every node
//! - **Simple Priorities**: Numeric priorities (0 = highest)
//! - **Per-node rates**: each node can tick at its own frequency
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reflex_core::Scheduler;
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.add(Box::new(brake_node), 0, Some(true));
//! scheduler.set_node_rate("SafetyBrakeNode", 10.0);
//! scheduler.run()?;
//! ```

pub mod scheduler;

pub use scheduler::{Scheduler, DEFAULT_TICK_RATE_HZ};
