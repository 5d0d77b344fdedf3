//! Pure computational algorithms for the Reflex control loops
//!
//! No I/O: algorithms contain only computation logic and are tested in
//! isolation. Nodes feed them the latest sensor snapshot and publish what they
//! return.
//!
//! - **ttc**: forward-sector time-to-collision and the braking decision
//! - **vff**: virtual force field steering away from the nearest obstacle

pub mod ttc;
pub mod vff;
