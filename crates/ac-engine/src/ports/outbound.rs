//! Outbound (Driven) ports for the configuration engine.
//!
//! External collaborators the engine depends on: signature verification
//! (key custody and cryptography live outside the engine) and a time
//! source (abstracted for deterministic deadline tests).

use crate::domain::EngineError;
use shared_types::{Address, PublicKey, Signature, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};

/// Signature verification collaborator.
///
/// Validates a signature over canonical request bytes and yields the
/// signer address derived from the public key. The engine never sees key
/// material beyond the public key presented at submission.
pub trait SignatureVerifier: Send + Sync {
    /// Verifies `signature` by `public_key` over `message`.
    ///
    /// # Errors
    /// - `SignatureInvalid` if the key is malformed or the signature does
    ///   not verify
    fn verify(
        &self,
        message: &[u8],
        public_key: &PublicKey,
        signature: &Signature,
    ) -> Result<Address, EngineError>;
}

/// Time source for consistent timestamp handling.
pub trait TimeSource: Send + Sync {
    /// Current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Manually driven time source for deterministic deadline tests.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    time: AtomicU64,
}

impl ManualTimeSource {
    /// Starts the clock at `initial`.
    pub fn new(initial: Timestamp) -> Self {
        Self { time: AtomicU64::new(initial) }
    }

    /// Advances the clock by `ms`.
    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute time.
    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}

/// Mock verifier for testing: accepts everything and derives the address
/// from the first 20 bytes of the public key.
#[cfg(test)]
pub struct AcceptAllVerifier;

#[cfg(test)]
impl SignatureVerifier for AcceptAllVerifier {
    fn verify(
        &self,
        _message: &[u8],
        public_key: &PublicKey,
        _signature: &Signature,
    ) -> Result<Address, EngineError> {
        let mut address = [0u8; 20];
        address.copy_from_slice(&public_key[..20]);
        Ok(address)
    }
}
