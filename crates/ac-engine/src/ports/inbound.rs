//! # Inbound Port - ConfigEngineApi
//!
//! Primary driving port exposing the engine to callers.
//!
//! All mutations flow through the meta-transaction pair
//! (`create_unsigned_request` / `submit`); the remaining methods are
//! read-only queries with no side effects, idempotent across repeated
//! calls absent intervening mutations.

use crate::domain::{
    ConfigAction, EngineError, FunctionPermission, FunctionSchema, RoleInfo, TransactionRecord,
};
use shared_types::{
    Address, RoleHash, Selector, SignedConfigRequest, TxId, UnsignedConfigRequest, U256,
};

/// Caller-supplied request parameters; the engine fills in the nonce.
#[derive(Clone, Debug)]
pub struct RequestOptions {
    /// Deadline (ms since UNIX epoch) after which submission is rejected.
    pub deadline: u64,
    /// Maximum gas price the signer authorizes.
    pub max_gas_price: U256,
    /// Value attached to the request.
    pub value: U256,
    /// Gas limit the signer authorizes.
    pub gas_limit: u64,
}

/// Primary API for the configuration engine.
///
/// # Separation of duties
///
/// `create_unsigned_request` assembles the canonical structure a signer
/// signs off-channel; `submit` is invoked by a *different* party (the
/// broadcaster). The engine enforces that the signer's role holds SIGN on
/// both the handler and execution selectors and that the broadcaster's
/// role holds EXECUTE on the execution selector.
pub trait ConfigEngineApi: Send + Sync {
    /// Assembles the canonical, to-be-signed request skeleton (nonce,
    /// deadline, target, operation type, encoded action batch).
    ///
    /// Touches no persistent state.
    fn create_unsigned_request(
        &self,
        actions: Vec<ConfigAction>,
        signer: Address,
        options: RequestOptions,
    ) -> Result<UnsignedConfigRequest, EngineError>;

    /// Verifies and dispatches a signed request submitted by `broadcaster`.
    ///
    /// Admission failures (signature, deadline, nonce, authorization)
    /// reject synchronously with no ledger record. Once admitted, the
    /// outcome — including a failed batch — is reported only through the
    /// returned record id: `Ok(tx_id)` means "recorded", not "applied".
    ///
    /// # Errors
    /// - `SignatureInvalid` / `SignerMismatch`: signature does not verify
    /// - `Expired`: deadline elapsed
    /// - `NonceReplay`: nonce already consumed
    /// - `SignerNotAuthorized` / `BroadcasterNotAuthorized`: dual-selector
    ///   authorization failed
    fn submit(
        &mut self,
        signed: SignedConfigRequest,
        broadcaster: Address,
    ) -> Result<TxId, EngineError>;

    /// True if the role exists.
    fn role_exists(&self, role_hash: &RoleHash) -> bool;

    /// Role summary (name, cap, member count, protection flag).
    fn get_role(&self, role_hash: &RoleHash) -> Option<RoleInfo>;

    /// Member wallets of a role.
    fn get_wallets_in_role(&self, role_hash: &RoleHash) -> Option<Vec<Address>>;

    /// True if `address` is a member of the role.
    fn has_role(&self, role_hash: &RoleHash, address: &Address) -> bool;

    /// True if the selector has a registered schema.
    fn function_schema_exists(&self, selector: &Selector) -> bool;

    /// Schema record for a selector.
    fn get_function_schema(&self, selector: &Selector) -> Option<FunctionSchema>;

    /// All live permission rows for a role.
    fn get_active_role_permissions(&self, role_hash: &RoleHash) -> Vec<FunctionPermission>;

    /// Ledger record by id.
    fn get_transaction(&self, tx_id: &TxId) -> Option<TransactionRecord>;

    /// All non-terminal ledger records.
    fn get_pending_transactions(&self) -> Vec<TransactionRecord>;

    /// Next unconsumed nonce for a signer.
    fn next_nonce(&self, signer: &Address) -> u64;
}
