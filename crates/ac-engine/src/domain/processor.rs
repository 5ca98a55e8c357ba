//! # Batch Action Processor
//!
//! Validates and applies an ordered list of configuration actions as a
//! single atomic unit.
//!
//! ## Contract
//!
//! Given a batch and a pre-state, `apply_batch` returns either a new state
//! with every action applied, or the original state untouched plus the
//! index and error of the first failing action. There is no partial
//! application and no skipping (INVARIANT-5).
//!
//! ## Mechanics
//!
//! Actions fold over a scratch clone of the three stores in array order;
//! the clone is discarded on the first failure and returned whole on
//! success. Strict ordering lets a batch register a function and grant it
//! in the same submission.

use super::actions::ConfigAction;
use super::entities::FunctionPermission;
use super::errors::EngineError;
use super::state::EngineState;
use std::collections::BTreeSet;

/// First failing action of an aborted batch.
#[derive(Debug)]
pub struct BatchFailure {
    /// Index of the failing top-level action.
    pub action_index: usize,
    /// Why it failed.
    pub error: EngineError,
}

/// Applies a batch against a pre-state.
///
/// On success the returned state has every action applied; on failure the
/// caller's pre-state is untouched and the failure names the first
/// offending action.
pub fn apply_batch(
    state: &EngineState,
    actions: &[ConfigAction],
) -> Result<EngineState, BatchFailure> {
    let mut scratch = state.clone();
    for (action_index, action) in actions.iter().enumerate() {
        apply_action(&mut scratch, action)
            .map_err(|error| BatchFailure { action_index, error })?;
    }
    Ok(scratch)
}

/// Applies one action to a (scratch) state.
fn apply_action(state: &mut EngineState, action: &ConfigAction) -> Result<(), EngineError> {
    match action {
        ConfigAction::CreateRole { name, max_wallets } => {
            state.roles.create_role(name, *max_wallets)?;
        }
        ConfigAction::RemoveRole { role_hash } => {
            state.roles.remove_role(role_hash)?;
            // A removed role leaves no orphaned permission rows behind.
            state.permissions.clear_role(role_hash);
        }
        ConfigAction::AddWallet { role_hash, address } => {
            state.roles.add_wallet(role_hash, *address)?;
        }
        ConfigAction::RevokeWallet { role_hash, address } => {
            state.roles.revoke_wallet(role_hash, address)?;
        }
        ConfigAction::RegisterFunction {
            signature,
            operation_name,
            supported_actions,
            handler_for,
        } => {
            state.schemas.register(
                signature,
                operation_name,
                *supported_actions,
                handler_for.iter().copied().collect::<BTreeSet<_>>(),
            )?;
        }
        ConfigAction::UnregisterFunction { selector, safe_removal } => {
            state
                .schemas
                .unregister(selector, *safe_removal, &state.permissions)?;
        }
        ConfigAction::AddFunctionToRole {
            role_hash,
            selector,
            granted_actions,
        } => {
            state.permissions.add(
                role_hash,
                FunctionPermission {
                    selector: *selector,
                    granted_actions: *granted_actions,
                },
                &state.roles,
                &state.schemas,
            )?;
        }
        ConfigAction::RemoveFunctionFromRole { role_hash, selector } => {
            state.permissions.remove(role_hash, selector)?;
        }
        ConfigAction::LoadDefinitions { batches } => {
            for batch in batches {
                for sub_action in batch {
                    apply_action(state, sub_action)?;
                }
            }
        }
    }
    Ok(())
}
