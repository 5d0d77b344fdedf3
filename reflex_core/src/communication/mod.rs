//! # Communication layer for Reflex
//!
//! In-process publish/subscribe. Each [`Hub`] is a handle on a named topic;
//! subscribers own a bounded inbox and receive a copy of every message that
//! another handle publishes.
//!
//! ```rust,ignore
//! use reflex_core::communication::Hub;
//!
//! let publisher: Hub<CmdVel> = Hub::new_publisher("brake")?;
//! let subscriber: Hub<CmdVel> = Hub::new("brake")?;
//! publisher.send(CmdVel::zero(), None);
//! assert!(subscriber.recv(None).is_some());
//! ```

pub mod hub;

pub use hub::{AtomicHubMetrics, Hub, HubMetrics, DEFAULT_CAPACITY};
