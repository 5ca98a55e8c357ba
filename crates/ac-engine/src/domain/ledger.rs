//! # Transaction Ledger & State Machine
//!
//! Records every attempted mutation with a lifecycle status and outcome.
//!
//! ```text
//! [UNDEFINED(0)] ──open──→ [PENDING(1)] ──mark_executing──→ [EXECUTING(2)]
//!                                                                │
//!                                     finalize(Applied)  ──→ [COMPLETED(5)]
//!                                     finalize(Rejected) ──→ [FAILED(6)]
//! ```
//!
//! INVARIANT-6: a record is immutable once terminal. Codes 3/4 belong to
//! the sibling time-delay path and are never produced here.
//!
//! Only requests that reach dispatch produce a record; admission failures
//! never touch the ledger.

use super::entities::{
    Address, ExecutionOutcome, OperationType, Selector, TransactionRecord, TransactionStatus, TxId,
};
use super::errors::EngineError;
use std::collections::HashMap;

/// Ledger of transaction records indexed by deterministic id.
#[derive(Clone, Debug, Default)]
pub struct TransactionLedger {
    records: HashMap<TxId, TransactionRecord>,
    /// Insertion order, for stable pending/status listings.
    order: Vec<TxId>,
}

impl TransactionLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no records exist.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Opens a record in `Pending` for an admitted request.
    ///
    /// # Errors
    /// - `TransactionAlreadyRecorded` if the id is already present
    pub fn open(
        &mut self,
        tx_id: TxId,
        requester: Address,
        target: Address,
        execution_selector: Selector,
        operation_type: OperationType,
    ) -> Result<(), EngineError> {
        if self.records.contains_key(&tx_id) {
            return Err(EngineError::TransactionAlreadyRecorded { tx_id });
        }
        self.records.insert(
            tx_id,
            TransactionRecord {
                tx_id,
                requester,
                target,
                execution_selector,
                operation_type,
                status: TransactionStatus::Pending,
                result: None,
            },
        );
        self.order.push(tx_id);
        Ok(())
    }

    /// Moves a record from `Pending` to `Executing`.
    ///
    /// # Errors
    /// - `TransactionNotRecorded` if absent
    /// - `InvalidStatusTransition` from any status but `Pending`
    pub fn mark_executing(&mut self, tx_id: &TxId) -> Result<(), EngineError> {
        let record = self
            .records
            .get_mut(tx_id)
            .ok_or(EngineError::TransactionNotRecorded { tx_id: *tx_id })?;
        if record.status != TransactionStatus::Pending {
            return Err(EngineError::InvalidStatusTransition {
                tx_id: *tx_id,
                from: record.status.code(),
                to: TransactionStatus::Executing.code(),
            });
        }
        record.status = TransactionStatus::Executing;
        Ok(())
    }

    /// Finalizes a record from `Executing` into `Completed` or `Failed`,
    /// attaching the outcome payload.
    ///
    /// # Errors
    /// - `TransactionNotRecorded` if absent
    /// - `InvalidStatusTransition` from any status but `Executing`
    ///   (terminal records are immutable)
    pub fn finalize(
        &mut self,
        tx_id: &TxId,
        outcome: ExecutionOutcome,
    ) -> Result<TransactionStatus, EngineError> {
        let record = self
            .records
            .get_mut(tx_id)
            .ok_or(EngineError::TransactionNotRecorded { tx_id: *tx_id })?;
        let to = match outcome {
            ExecutionOutcome::Applied { .. } => TransactionStatus::Completed,
            ExecutionOutcome::Rejected { .. } => TransactionStatus::Failed,
        };
        if record.status != TransactionStatus::Executing {
            return Err(EngineError::InvalidStatusTransition {
                tx_id: *tx_id,
                from: record.status.code(),
                to: to.code(),
            });
        }
        record.status = to;
        record.result = Some(outcome);
        Ok(to)
    }

    /// Record lookup.
    pub fn get(&self, tx_id: &TxId) -> Option<&TransactionRecord> {
        self.records.get(tx_id)
    }

    /// All non-terminal records in insertion order.
    pub fn pending(&self) -> Vec<&TransactionRecord> {
        self.order
            .iter()
            .filter_map(|tx_id| self.records.get(tx_id))
            .filter(|record| !record.status.is_terminal())
            .collect()
    }

    /// All records with the given status, in insertion order.
    pub fn by_status(&self, status: TransactionStatus) -> Vec<&TransactionRecord> {
        self.order
            .iter()
            .filter_map(|tx_id| self.records.get(tx_id))
            .filter(|record| record.status == status)
            .collect()
    }
}
