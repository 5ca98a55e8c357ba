//! Core domain entities for the configuration engine.
//!
//! Defines the role/schema/permission data model, the action-kind bitmap,
//! and the transaction record lifecycle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// Re-export from shared-types for convenience
pub use shared_types::{
    Address, Hash, OperationType, RoleHash, Selector, Timestamp, TxId, U256,
};

/// One action kind, represented as a bit in a permission bitmap.
///
/// The first three bits belong to the direct time-delayed path, the next
/// two triples to the meta-transaction path (signer side, broadcaster
/// side), and the last bit to payment-parameter updates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TxAction {
    /// Request a time-delayed change.
    DelayRequest = 0,
    /// Approve a time-delayed change after the waiting period.
    DelayApprove = 1,
    /// Cancel a pending time-delayed change.
    DelayCancel = 2,
    /// Sign a meta-request that both requests and approves in one step.
    SignRequestAndApprove = 3,
    /// Sign a meta-approval for an existing request.
    SignApprove = 4,
    /// Sign a meta-cancellation.
    SignCancel = 5,
    /// Execute a meta request-and-approve on behalf of a signer.
    ExecuteRequestAndApprove = 6,
    /// Execute a meta-approval.
    ExecuteApprove = 7,
    /// Execute a meta-cancellation.
    ExecuteCancel = 8,
    /// Update payment parameters.
    UpdatePayment = 9,
}

impl TxAction {
    /// The bitmap bit for this action kind.
    pub const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// A set of action kinds, packed as a bitmap.
///
/// INVARIANT-2: a granted bitmap is always a subset of the referenced
/// schema's supported set (enforced by `PermissionTable::add`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionBitmap(pub u16);

impl ActionBitmap {
    /// Bits 3-5: the meta-signing class.
    pub const SIGN_CLASS: ActionBitmap = ActionBitmap(
        TxAction::SignRequestAndApprove.bit()
            | TxAction::SignApprove.bit()
            | TxAction::SignCancel.bit(),
    );

    /// Bits 6-8: the meta-execution class.
    pub const EXECUTE_CLASS: ActionBitmap = ActionBitmap(
        TxAction::ExecuteRequestAndApprove.bit()
            | TxAction::ExecuteApprove.bit()
            | TxAction::ExecuteCancel.bit(),
    );

    /// The empty bitmap.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds a bitmap from a list of action kinds.
    pub fn from_actions(actions: &[TxAction]) -> Self {
        Self(actions.iter().fold(0, |bits, action| bits | action.bit()))
    }

    /// True if the bit for `action` is set.
    pub const fn contains(self, action: TxAction) -> bool {
        self.0 & action.bit() != 0
    }

    /// True if every bit set here is also set in `other`.
    pub const fn is_subset_of(self, other: ActionBitmap) -> bool {
        self.0 & !other.0 == 0
    }

    /// True if any bit is shared with `other`.
    pub const fn intersects(self, other: ActionBitmap) -> bool {
        self.0 & other.0 != 0
    }

    /// Union of two bitmaps.
    pub const fn union(self, other: ActionBitmap) -> ActionBitmap {
        ActionBitmap(self.0 | other.0)
    }

    /// True if no bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// One capability a role can hold for a selector.
///
/// Asking for an operation (`Sign`) and performing it (`Execute`) are two
/// distinct tokens scoped to their own selectors, never one combined flag.
/// This is what makes signer/broadcaster separation of duties structural.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// May sign a meta-request against this selector.
    Sign(Selector),
    /// May execute a meta-request against this selector.
    Execute(Selector),
}

impl Capability {
    /// The action bit this capability maps to.
    pub fn action(self) -> TxAction {
        match self {
            Self::Sign(_) => TxAction::SignRequestAndApprove,
            Self::Execute(_) => TxAction::ExecuteRequestAndApprove,
        }
    }

    /// The selector this capability is scoped to.
    pub fn selector(self) -> Selector {
        match self {
            Self::Sign(selector) | Self::Execute(selector) => selector,
        }
    }
}

/// A named group of wallets sharing a permission set.
///
/// INVARIANT-1: `wallet_set.len() <= max_wallets` after every operation.
/// INVARIANT-3: a protected role is never deleted and never observed empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Deterministic identifier: keccak256(role_name).
    pub role_hash: RoleHash,
    /// Human-readable label, immutable after creation.
    pub role_name: String,
    /// Positive upper bound on concurrent wallet membership.
    pub max_wallets: usize,
    /// Member addresses.
    pub wallet_set: BTreeSet<Address>,
    /// Protected roles cannot be deleted and never drop to zero members.
    pub is_protected: bool,
}

impl Role {
    /// Current number of member wallets.
    pub fn wallet_count(&self) -> usize {
        self.wallet_set.len()
    }

    /// True if `address` is a member.
    pub fn has_wallet(&self, address: &Address) -> bool {
        self.wallet_set.contains(address)
    }

    /// Read-only summary for queries.
    pub fn info(&self) -> RoleInfo {
        RoleInfo {
            role_hash: self.role_hash,
            role_name: self.role_name.clone(),
            max_wallets: self.max_wallets,
            wallet_count: self.wallet_count(),
            is_protected: self.is_protected,
        }
    }
}

/// Query-facing role summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub role_hash: RoleHash,
    pub role_name: String,
    pub max_wallets: usize,
    pub wallet_count: usize,
    pub is_protected: bool,
}

/// Registration record declaring a callable operation's identity and which
/// action kinds it may ever grant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSchema {
    /// Deterministic identifier: first 4 bytes of keccak256(signature).
    pub selector: Selector,
    /// Canonical function signature string, e.g. `"mint(address,uint256)"`.
    pub signature: String,
    /// Descriptive operation name.
    pub operation_name: String,
    /// Action kinds this function may ever grant.
    pub supported_actions: ActionBitmap,
    /// Execution selectors this schema acts as the public entry point for.
    ///
    /// Pairs a public handler selector with the internal execution
    /// selector(s) of the same logical operation.
    pub handler_for: BTreeSet<Selector>,
}

/// A permission row: which action kinds a role may invoke on a selector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionPermission {
    /// The selector this row is scoped to.
    pub selector: Selector,
    /// Bit i set ⇒ the role may invoke action kind i on the selector.
    pub granted_actions: ActionBitmap,
}

/// Lifecycle status of a recorded transaction.
///
/// ```text
/// [UNDEFINED(0)] → [PENDING(1)] → [EXECUTING(2)] → [COMPLETED(5) | FAILED(6)]
/// ```
///
/// `Approved(3)` and `Cancelled(4)` belong to the sibling time-delay path
/// and are unreachable from the meta-transaction path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionStatus {
    #[default]
    Undefined = 0,
    Pending = 1,
    Executing = 2,
    Approved = 3,
    Cancelled = 4,
    Completed = 5,
    Failed = 6,
}

impl TransactionStatus {
    /// Stable numeric status code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// True once the record can no longer change.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Approved | Self::Cancelled | Self::Completed | Self::Failed
        )
    }
}

/// Outcome payload retained on a terminal record for diagnosis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionOutcome {
    /// Every action in the batch applied.
    Applied {
        /// Number of top-level actions applied.
        actions_applied: usize,
    },
    /// The batch aborted; no action's effects persist.
    Rejected {
        /// Index of the first failing top-level action.
        failed_action_index: usize,
        /// Rendered failure reason.
        reason: String,
    },
}

/// Durable record of one submitted request's lifecycle and outcome.
///
/// INVARIANT-6: immutable once `Completed` or `Failed`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Deterministic identifier derived from the request parameters.
    pub tx_id: TxId,
    /// The signer who authorized the request.
    pub requester: Address,
    /// Target the batch was addressed to.
    pub target: Address,
    /// Internal execution selector of the operation.
    pub execution_selector: Selector,
    /// Which execution path recorded this transaction.
    pub operation_type: OperationType,
    /// Current lifecycle status.
    pub status: TransactionStatus,
    /// Success/failure payload, set when the record turns terminal.
    pub result: Option<ExecutionOutcome>,
}

/// Engine bootstrap configuration.
///
/// Names the two protected roles and the handler/execution schema pair for
/// the configuration-batch operation itself. These must exist before any
/// other configuration can occur.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Name of the protected signer-class role.
    pub signer_role_name: String,
    /// Name of the protected broadcaster-class role.
    pub broadcaster_role_name: String,
    /// Wallet cap for the signer-class role.
    pub signer_role_max_wallets: usize,
    /// Wallet cap for the broadcaster-class role.
    pub broadcaster_role_max_wallets: usize,
    /// Canonical signature of the public handler entry point.
    pub handler_signature: String,
    /// Canonical signature of the internal execution operation.
    pub execution_signature: String,
    /// Target address batches are addressed to.
    pub target: Address,
    /// Initial signer-class members (at least one).
    pub seed_signers: Vec<Address>,
    /// Initial broadcaster-class members (at least one).
    pub seed_broadcasters: Vec<Address>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            signer_role_name: "CONFIG_SIGNER".to_string(),
            broadcaster_role_name: "CONFIG_BROADCASTER".to_string(),
            signer_role_max_wallets: 8,
            broadcaster_role_max_wallets: 8,
            handler_signature: "submitConfigBatch(bytes)".to_string(),
            execution_signature: "applyConfigBatch(bytes)".to_string(),
            target: [0u8; 20],
            seed_signers: Vec::new(),
            seed_broadcasters: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Minimal config for testing: one seed signer, one seed broadcaster.
    pub fn for_testing(seed_signer: Address, seed_broadcaster: Address) -> Self {
        Self {
            seed_signers: vec![seed_signer],
            seed_broadcasters: vec![seed_broadcaster],
            target: [0xE7; 20],
            ..Default::default()
        }
    }
}
