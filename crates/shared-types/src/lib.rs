//! # Shared Types Crate
//!
//! Primitive types, deterministic identifier derivation, and the canonical
//! meta-transaction request envelope shared across subsystem crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Pure derivation**: `role_hash` and `function_selector` are pure
//!   functions of the human-readable name; no storage round trip is needed
//!   to compute an identifier.
//! - **Canonical bytes**: `UnsignedConfigRequest::canonical_bytes` is the
//!   sole byte representation a signer ever signs.

pub mod entities;
pub mod ids;
pub mod request;

pub use entities::*;
pub use ids::*;
pub use request::*;
