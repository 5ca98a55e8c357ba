//! # Deterministic Identifier Derivation
//!
//! Pure functions mapping human-readable names to fixed-width identifiers.
//! No storage side effects: callers can derive an identifier for an
//! idempotent lookup without a round trip.
//!
//! - `role_hash("REGISTRY_ADMIN")` → 32-byte Keccak-256 digest
//! - `function_selector("mint(address,uint256)")` → first 4 bytes of the
//!   Keccak-256 digest of the canonical signature string

use crate::entities::{Hash, RoleHash, Selector};
use sha3::{Digest, Keccak256};

/// Keccak-256 digest of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derives the role identifier from its human-readable name.
///
/// Collision-free for distinct names (up to Keccak-256 collision
/// resistance). The name itself is stored alongside the hash at creation.
pub fn role_hash(name: &str) -> RoleHash {
    keccak256(name.as_bytes())
}

/// Derives the 4-byte selector from a canonical function signature string.
///
/// The signature must be canonical: no whitespace, no parameter names,
/// e.g. `"mint(address,uint256)"`.
pub fn function_selector(signature: &str) -> Selector {
    let digest = keccak256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}
