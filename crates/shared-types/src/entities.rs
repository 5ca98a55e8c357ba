//! # Core Primitive Types
//!
//! Fixed-width primitives used by every subsystem crate.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `PublicKey`, `Signature`
//! - **Identifiers**: `Hash`, `Selector`, `RoleHash`, `TxId`
//! - **Time**: `Timestamp` (milliseconds since UNIX epoch)

use serde::{Deserialize, Serialize};

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// A 32-byte Keccak-256 hash.
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// A 20-byte account address (last 20 bytes of keccak256(public key)).
pub type Address = [u8; 20];

/// A 4-byte function selector (first 4 bytes of keccak256(signature string)).
pub type Selector = [u8; 4];

/// A 32-byte role identifier (keccak256 of the role name).
pub type RoleHash = Hash;

/// A 32-byte transaction identifier, derived from request parameters.
pub type TxId = Hash;

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

/// Operation-type tag carried in the canonical request structure.
///
/// Distinguishes the two execution paths that share the transaction ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    /// Direct time-delayed path (request, then approve/cancel after a wait).
    TimeDelay,
    /// Meta-transaction path (off-channel signer, separate broadcaster).
    Meta,
}

impl OperationType {
    /// Stable numeric tag used in identifier derivation.
    pub fn tag(self) -> u8 {
        match self {
            Self::TimeDelay => 1,
            Self::Meta => 2,
        }
    }
}
