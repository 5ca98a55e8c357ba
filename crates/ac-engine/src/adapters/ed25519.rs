//! Ed25519 implementation of the `SignatureVerifier` port.
//!
//! Signer addresses are Ethereum-style: the last 20 bytes of
//! keccak256(public key). The engine compares the derived address against
//! the declared signer; key custody and the act of signing stay outside
//! the engine.

use crate::domain::EngineError;
use crate::ports::outbound::SignatureVerifier;
use ed25519_dalek::{Signature as DalekSignature, Verifier, VerifyingKey};
use shared_types::{keccak256, Address, PublicKey, Signature};

/// Derives the 20-byte address from an Ed25519 public key.
pub fn derive_address(public_key: &PublicKey) -> Address {
    let digest = keccak256(public_key);
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..]);
    address
}

/// Stateless Ed25519 signature verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(
        &self,
        message: &[u8],
        public_key: &PublicKey,
        signature: &Signature,
    ) -> Result<Address, EngineError> {
        let key =
            VerifyingKey::from_bytes(public_key).map_err(|_| EngineError::SignatureInvalid)?;
        let signature = DalekSignature::from_bytes(signature);
        key.verify(message, &signature)
            .map_err(|_| EngineError::SignatureInvalid)?;
        Ok(derive_address(public_key))
    }
}
