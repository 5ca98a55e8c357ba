//! Event publisher adapter for the configuration engine.
//!
//! The service publishes transaction lifecycle events through this seam;
//! deployments wire in whatever delivery they use. `TracingPublisher`
//! emits structured log events, `NoOpPublisher` discards everything.

use crate::events::payloads::{TransactionAdmittedPayload, TransactionFinalizedPayload};
use tracing::info;

/// Topics for engine events.
pub mod topics {
    /// Topic for admitted submissions entering the ledger.
    pub const TRANSACTION_ADMITTED: &str = "engine.transaction_admitted";
    /// Topic for terminal ledger statuses.
    pub const TRANSACTION_FINALIZED: &str = "engine.transaction_finalized";
}

/// Error type for publish operations.
#[derive(Debug, Clone)]
pub enum PublishError {
    /// The delivery channel is not connected.
    NotConnected,
    /// Failed to serialize the payload.
    SerializationError(String),
    /// Internal error.
    Internal(String),
}

impl std::fmt::Display for PublishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "Event channel not connected"),
            Self::SerializationError(e) => write!(f, "Serialization error: {}", e),
            Self::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

/// Event publisher trait for the engine.
pub trait EngineEventPublisher: Send + Sync {
    /// Publishes an admitted-submission event.
    fn publish_admitted(&self, payload: &TransactionAdmittedPayload) -> Result<(), PublishError>;

    /// Publishes a terminal-status event.
    fn publish_finalized(&self, payload: &TransactionFinalizedPayload) -> Result<(), PublishError>;
}

/// Publisher that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPublisher;

impl EngineEventPublisher for NoOpPublisher {
    fn publish_admitted(&self, _payload: &TransactionAdmittedPayload) -> Result<(), PublishError> {
        Ok(())
    }

    fn publish_finalized(
        &self,
        _payload: &TransactionFinalizedPayload,
    ) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Publisher that emits structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPublisher;

impl EngineEventPublisher for TracingPublisher {
    fn publish_admitted(&self, payload: &TransactionAdmittedPayload) -> Result<(), PublishError> {
        info!(
            topic = topics::TRANSACTION_ADMITTED,
            correlation_id = %payload.correlation_id,
            tx_id = %hex::encode(payload.tx_id),
            requester = %hex::encode(payload.requester),
            broadcaster = %hex::encode(payload.broadcaster),
            action_count = payload.action_count,
            "transaction admitted"
        );
        Ok(())
    }

    fn publish_finalized(&self, payload: &TransactionFinalizedPayload) -> Result<(), PublishError> {
        info!(
            topic = topics::TRANSACTION_FINALIZED,
            correlation_id = %payload.correlation_id,
            tx_id = %hex::encode(payload.tx_id),
            status_code = payload.status_code,
            success = payload.success,
            "transaction finalized"
        );
        Ok(())
    }
}
