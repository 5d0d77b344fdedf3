//! # Core types and traits for Reflex
//!
//! - **Node**: The base trait for all computational units
//! - **NodeInfo**: Runtime context provided to nodes during execution
//! - **LogSummary**: Compact message descriptions for pub/sub logging
//!
//! ## Node Lifecycle
//!
//! 1. **Construction** - Node is created and opens its topics
//! 2. **Initialization** - `init()` is called once by the scheduler
//! 3. **Execution** - `tick()` is called at the node's rate
//! 4. **Shutdown** - `shutdown()` is called when the scheduler stops

pub mod node;

pub use node::{LogSummary, Node, NodeConfig, NodeInfo, NodeMetrics, NodeState, TopicMetadata};
