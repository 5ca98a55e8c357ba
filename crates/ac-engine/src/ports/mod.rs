//! Ports layer for the configuration engine.
//!
//! Hexagonal architecture port traits:
//! - Inbound (Driving) ports: API exposed to callers
//! - Outbound (Driven) ports: dependencies on external collaborators

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
