//! Error enumeration for the configuration engine.
//!
//! Kinds map onto a small taxonomy: already-exists, not-found, capacity,
//! protection, unsupported-action, conflicting-permissions, unauthorized,
//! expired, nonce-replay, plus codec and ledger bookkeeping failures.
//!
//! Admission errors (signature, deadline, nonce, authorization) are
//! returned synchronously from `submit` with no ledger side effect; batch
//! application errors surface only through the `Failed` ledger record.

use super::entities::{ActionBitmap, Address, RoleHash, Selector, Timestamp, TxId};
use shared_types::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    // -- already exists ------------------------------------------------------
    #[error("Role already exists: {role_hash:?}")]
    RoleAlreadyExists { role_hash: RoleHash },

    #[error("Wallet {address:?} already in role {role_hash:?}")]
    WalletAlreadyInRole { role_hash: RoleHash, address: Address },

    #[error("Function already registered: {selector:?}")]
    FunctionAlreadyRegistered { selector: Selector },

    #[error("Permission row already exists for role {role_hash:?}, selector {selector:?}")]
    PermissionAlreadyExists { role_hash: RoleHash, selector: Selector },

    // -- not found -----------------------------------------------------------
    #[error("Role not found: {role_hash:?}")]
    RoleNotFound { role_hash: RoleHash },

    #[error("Wallet {address:?} not in role {role_hash:?}")]
    WalletNotInRole { role_hash: RoleHash, address: Address },

    #[error("Function not found: {selector:?}")]
    FunctionNotFound { selector: Selector },

    #[error("No permission row for role {role_hash:?}, selector {selector:?}")]
    PermissionNotFound { role_hash: RoleHash, selector: Selector },

    // -- capacity / protection -----------------------------------------------
    #[error("Wallet capacity exceeded for role {role_hash:?}: max {max_wallets}")]
    WalletCapacityExceeded { role_hash: RoleHash, max_wallets: usize },

    #[error("Role {role_hash:?} is protected and cannot be removed")]
    ProtectedRole { role_hash: RoleHash },

    #[error("Removal would leave protected role {role_hash:?} with zero members")]
    ProtectedRoleWouldEmpty { role_hash: RoleHash },

    #[error("max_wallets must be positive")]
    InvalidMaxWallets,

    // -- schema / permission rules -------------------------------------------
    #[error(
        "Requested actions {requested:?} not a subset of supported {supported:?} for {selector:?}"
    )]
    UnsupportedAction {
        selector: Selector,
        requested: ActionBitmap,
        supported: ActionBitmap,
    },

    #[error(
        "Role {role_hash:?} would hold both sign-class and execute-class bits on {selector:?}"
    )]
    ConflictingPermissions { role_hash: RoleHash, selector: Selector },

    #[error("Function {selector:?} still referenced by role {role_hash:?}")]
    FunctionStillReferenced { selector: Selector, role_hash: RoleHash },

    // -- admission -----------------------------------------------------------
    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Declared signer {declared:?} does not match key-derived address {derived:?}")]
    SignerMismatch { declared: Address, derived: Address },

    #[error("Signer {signer:?} lacks SIGN authorization on selector {selector:?}")]
    SignerNotAuthorized { signer: Address, selector: Selector },

    #[error("Broadcaster {broadcaster:?} lacks EXECUTE authorization on selector {selector:?}")]
    BroadcasterNotAuthorized { broadcaster: Address, selector: Selector },

    #[error("Handler {handler:?} is not paired with execution selector {execution:?}")]
    SelectorsNotPaired { handler: Selector, execution: Selector },

    #[error("Request targets {actual:?}, engine serves {expected:?}")]
    UnexpectedTarget { expected: Address, actual: Address },

    #[error("Deadline {deadline} elapsed at {now}")]
    Expired { deadline: Timestamp, now: Timestamp },

    #[error("Nonce {nonce} already consumed for signer {signer:?}")]
    NonceReplay { signer: Address, nonce: u64 },

    // -- ledger bookkeeping --------------------------------------------------
    #[error("Transaction already recorded: {tx_id:?}")]
    TransactionAlreadyRecorded { tx_id: TxId },

    #[error("Transaction not found in ledger: {tx_id:?}")]
    TransactionNotRecorded { tx_id: TxId },

    #[error("Invalid status transition for {tx_id:?}: {from} -> {to}")]
    InvalidStatusTransition { tx_id: TxId, from: u8, to: u8 },

    // -- configuration / codec -----------------------------------------------
    #[error("Invalid engine configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    Codec(#[from] CodecError),
}
