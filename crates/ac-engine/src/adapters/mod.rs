//! Adapters layer for the configuration engine.
//!
//! Concrete implementations of the outbound ports: Ed25519 signature
//! verification and event publishing.

pub mod ed25519;
pub mod publisher;

pub use ed25519::{derive_address, Ed25519Verifier};
pub use publisher::{EngineEventPublisher, NoOpPublisher, PublishError, TracingPublisher};
