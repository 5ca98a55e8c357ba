//! Serializable payloads for engine lifecycle events.
//!
//! Each payload carries a correlation id so downstream consumers can tie
//! the admitted and finalized events of one submission together.

use serde::{Deserialize, Serialize};
use shared_types::{Address, TxId};
use uuid::Uuid;

/// An admitted submission entered the ledger in `Pending`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAdmittedPayload {
    /// Correlates this event with the matching finalized event.
    pub correlation_id: Uuid,
    /// Deterministic transaction id.
    pub tx_id: TxId,
    /// The signer who authorized the request.
    pub requester: Address,
    /// The broadcaster who submitted it.
    pub broadcaster: Address,
    /// Number of top-level actions in the batch.
    pub action_count: usize,
}

/// A ledger record reached a terminal status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFinalizedPayload {
    /// Correlates this event with the matching admitted event.
    pub correlation_id: Uuid,
    /// Deterministic transaction id.
    pub tx_id: TxId,
    /// Terminal status code (5 = completed, 6 = failed).
    pub status_code: u8,
    /// True when every action in the batch applied.
    pub success: bool,
}
