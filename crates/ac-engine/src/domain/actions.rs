//! # Configuration Actions
//!
//! The closed tagged union of every mutation the engine understands, plus
//! the bincode wire codec for action batches.
//!
//! A batch is an ordered `Vec<ConfigAction>`; ordering matters because a
//! later action may depend on an earlier one's postcondition (register a
//! function, then grant it, in the same batch).

use super::entities::{ActionBitmap, Address, RoleHash, Selector};
use super::errors::EngineError;
use serde::{Deserialize, Serialize};
use shared_types::CodecError;

/// One configuration action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigAction {
    /// Create an unprotected role.
    CreateRole { name: String, max_wallets: usize },
    /// Remove a role (rejected for protected roles). Drops the role's
    /// permission rows with it.
    RemoveRole { role_hash: RoleHash },
    /// Add a wallet to a role.
    AddWallet { role_hash: RoleHash, address: Address },
    /// Revoke a wallet's membership.
    RevokeWallet { role_hash: RoleHash, address: Address },
    /// Register a function schema. `handler_for` lists the execution
    /// selectors this function fronts as a public entry point.
    RegisterFunction {
        signature: String,
        operation_name: String,
        supported_actions: ActionBitmap,
        handler_for: Vec<Selector>,
    },
    /// Unregister a function schema. With `safe_removal`, refused while
    /// any role still references the selector.
    UnregisterFunction { selector: Selector, safe_removal: bool },
    /// Grant a role an action bitmap on a selector.
    AddFunctionToRole {
        role_hash: RoleHash,
        selector: Selector,
        granted_actions: ActionBitmap,
    },
    /// Revoke a role's permission row for a selector.
    RemoveFunctionFromRole { role_hash: RoleHash, selector: Selector },
    /// Batch-of-batches for bootstrapping: sub-batches flatten into the
    /// enclosing batch's ordered, all-or-nothing application.
    LoadDefinitions { batches: Vec<Vec<ConfigAction>> },
}

impl ConfigAction {
    /// Stable kind label for logging and events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateRole { .. } => "CREATE_ROLE",
            Self::RemoveRole { .. } => "REMOVE_ROLE",
            Self::AddWallet { .. } => "ADD_WALLET",
            Self::RevokeWallet { .. } => "REVOKE_WALLET",
            Self::RegisterFunction { .. } => "REGISTER_FUNCTION",
            Self::UnregisterFunction { .. } => "UNREGISTER_FUNCTION",
            Self::AddFunctionToRole { .. } => "ADD_FUNCTION_TO_ROLE",
            Self::RemoveFunctionFromRole { .. } => "REMOVE_FUNCTION_FROM_ROLE",
            Self::LoadDefinitions { .. } => "LOAD_DEFINITIONS",
        }
    }
}

/// Encodes an action batch for the wire (and for signing digests).
pub fn encode_batch(actions: &[ConfigAction]) -> Result<Vec<u8>, EngineError> {
    bincode::serialize(actions)
        .map_err(|e| EngineError::Codec(CodecError::Encode(e.to_string())))
}

/// Decodes an action batch from its wire form.
pub fn decode_batch(bytes: &[u8]) -> Result<Vec<ConfigAction>, EngineError> {
    bincode::deserialize(bytes)
        .map_err(|e| EngineError::Codec(CodecError::Decode(e.to_string())))
}
