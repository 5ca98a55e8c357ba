//! # Canonical Meta-Transaction Request Envelope
//!
//! The to-be-signed structure assembled by the coordinator and the signed
//! wrapper submitted by a broadcaster.
//!
//! ## Canonical bytes
//!
//! A signer signs exactly `UnsignedConfigRequest::canonical_bytes()` — the
//! bincode encoding of the full unsigned structure. Any field change
//! invalidates the signature.
//!
//! ## Transaction identity
//!
//! `tx_id()` is a pure function of the request parameters (signer, target,
//! nonce, execution selector, deadline, operation type, action-batch
//! digest), so re-submitting an identical request is distinguishable from a
//! new one by callers.

use crate::entities::{Address, OperationType, PublicKey, Selector, Signature, Timestamp, TxId, U256};
use crate::ids::keccak256;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use thiserror::Error;

/// Failure to produce or consume a canonical byte encoding.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Decoding failed: {0}")]
    Decode(String),
}

/// Request parameters that influence authorization and fee accounting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParams {
    /// Deadline (ms since UNIX epoch) after which the request is rejected.
    pub deadline: Timestamp,
    /// Maximum gas price the signer authorizes.
    pub max_gas_price: U256,
    /// Per-signer nonce; consumed exactly once on admission.
    pub nonce: u64,
    /// Value attached to the request, in base units.
    pub value: U256,
    /// Gas limit the signer authorizes.
    pub gas_limit: u64,
}

/// The canonical, to-be-signed meta-transaction structure.
///
/// Assembled by `create_unsigned_request`; assembling one touches no
/// persistent state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedConfigRequest {
    /// Declared signer address; must match the address derived from the
    /// public key presented at submission.
    pub signer: Address,
    /// Target the batch is addressed to.
    pub target: Address,
    /// Fixed operation-type tag (always `Meta` on this path).
    pub operation_type: OperationType,
    /// Internal execution selector for the batch operation.
    pub execution_selector: Selector,
    /// Public handler selector the signer signs against.
    pub handler_selector: Selector,
    /// Byte-encoded action batch (bincode of `Vec<ConfigAction>`).
    pub encoded_actions: Vec<u8>,
    /// Request parameters (deadline, max gas price, nonce, value, gas limit).
    pub params: RequestParams,
}

impl UnsignedConfigRequest {
    /// The exact bytes a signer signs.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Deterministic transaction identifier.
    ///
    /// Keccak-256 over the fixed-width request provenance plus the digest
    /// of the encoded action batch.
    pub fn tx_id(&self) -> TxId {
        let mut preimage = Vec::with_capacity(96);
        preimage.extend_from_slice(&self.signer);
        preimage.extend_from_slice(&self.target);
        preimage.extend_from_slice(&self.params.nonce.to_be_bytes());
        preimage.extend_from_slice(&self.execution_selector);
        preimage.extend_from_slice(&self.handler_selector);
        preimage.extend_from_slice(&self.params.deadline.to_be_bytes());
        preimage.push(self.operation_type.tag());
        preimage.extend_from_slice(&keccak256(&self.encoded_actions));
        keccak256(&preimage)
    }
}

/// A signed request as delivered by a broadcaster.
///
/// The engine validates that `public_key` verifies `signature` over the
/// unsigned request's canonical bytes and that the key derives the declared
/// signer address.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedConfigRequest {
    /// The unsigned structure the signature covers.
    pub request: UnsignedConfigRequest,
    /// Signer's Ed25519 public key.
    pub public_key: PublicKey,
    /// Ed25519 signature over `request.canonical_bytes()`.
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}
