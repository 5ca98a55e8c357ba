//! # Ensure Planner
//!
//! Declarative layer over the strict mutation core.
//!
//! Every batch action is strictly non-idempotent: creating a role that
//! exists, or re-granting a permission row, fails the whole batch. That
//! strictness is what makes replayed batches detectable. Callers that
//! want converge-to-desired-state semantics instead use this planner: it
//! inspects current state through the read API and emits only the actions
//! whose preconditions hold, so the resulting batch applies cleanly. A
//! goal that can never apply, like granting a role the opposite action
//! class on a selector it already holds, is reported by `into_plan` as a
//! planning error rather than encoded into a doomed batch.
//!
//! Plans describe a snapshot. If another submission lands between
//! planning and applying, the plan can still fail strictly; the caller
//! re-plans and resubmits.

use crate::domain::{ActionBitmap, ConfigAction, EngineError, FunctionPermission};
use crate::ports::inbound::ConfigEngineApi;
use shared_types::{function_selector, role_hash, Address, RoleHash, Selector};

/// Builds a minimal action batch that converges engine state onto the
/// caller's desired shape.
pub struct EnsurePlanner<'a> {
    api: &'a dyn ConfigEngineApi,
    plan: Vec<ConfigAction>,
    error: Option<EngineError>,
}

impl<'a> EnsurePlanner<'a> {
    pub fn new(api: &'a dyn ConfigEngineApi) -> Self {
        Self {
            api,
            plan: Vec::new(),
            error: None,
        }
    }

    /// Records the first unsatisfiable goal; later goals still plan so
    /// the caller sees every error on re-planning after a fix.
    fn fail(&mut self, error: EngineError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Role exists with the given name. An existing role is left as-is
    /// even if its cap differs; caps are immutable once created.
    pub fn role(&mut self, name: &str, max_wallets: usize) -> &mut Self {
        if !self.api.role_exists(&role_hash(name)) {
            self.plan.push(ConfigAction::CreateRole {
                name: name.to_string(),
                max_wallets,
            });
        }
        self
    }

    /// Role no longer exists.
    pub fn role_absent(&mut self, role: RoleHash) -> &mut Self {
        if self.api.role_exists(&role) {
            self.plan.push(ConfigAction::RemoveRole { role_hash: role });
        }
        self
    }

    /// Wallet is a member of the role. Also plans the membership when the
    /// role itself is being created earlier in this plan.
    pub fn wallet_in_role(&mut self, role: RoleHash, address: Address) -> &mut Self {
        if !self.api.has_role(&role, &address) {
            self.plan.push(ConfigAction::AddWallet {
                role_hash: role,
                address,
            });
        }
        self
    }

    /// Wallet is not a member of the role.
    pub fn wallet_not_in_role(&mut self, role: RoleHash, address: Address) -> &mut Self {
        if self.api.has_role(&role, &address) {
            self.plan.push(ConfigAction::RevokeWallet {
                role_hash: role,
                address,
            });
        }
        self
    }

    /// Function schema exists for the signature. Existing schemas are
    /// left untouched; schema shape is immutable once registered.
    pub fn function(
        &mut self,
        signature: &str,
        operation_name: &str,
        supported_actions: ActionBitmap,
        handler_for: Vec<Selector>,
    ) -> &mut Self {
        if !self.api.function_schema_exists(&function_selector(signature)) {
            self.plan.push(ConfigAction::RegisterFunction {
                signature: signature.to_string(),
                operation_name: operation_name.to_string(),
                supported_actions,
                handler_for,
            });
        }
        self
    }

    /// Role holds at least `granted_actions` on the selector. A row whose
    /// bits already cover the request is a no-op; a row missing bits of
    /// the same class is replaced by its union with the request. A goal
    /// whose union with the existing row would mix the sign and execute
    /// classes can never apply; it becomes a planning error.
    pub fn permission(
        &mut self,
        role: RoleHash,
        selector: Selector,
        granted_actions: ActionBitmap,
    ) -> &mut Self {
        let existing = self
            .api
            .get_active_role_permissions(&role)
            .into_iter()
            .find(|row| row.selector == selector)
            .map(|row: FunctionPermission| row.granted_actions);

        // Same separation-of-duties rule the permission table enforces;
        // checked here so the conflict surfaces before signing.
        let combined = existing.unwrap_or_default().union(granted_actions);
        if combined.intersects(ActionBitmap::SIGN_CLASS)
            && combined.intersects(ActionBitmap::EXECUTE_CLASS)
        {
            self.fail(EngineError::ConflictingPermissions {
                role_hash: role,
                selector,
            });
            return self;
        }

        match existing {
            Some(current) if granted_actions.is_subset_of(current) => {}
            Some(_) => {
                self.plan.push(ConfigAction::RemoveFunctionFromRole {
                    role_hash: role,
                    selector,
                });
                self.plan.push(ConfigAction::AddFunctionToRole {
                    role_hash: role,
                    selector,
                    granted_actions: combined,
                });
            }
            None => {
                self.plan.push(ConfigAction::AddFunctionToRole {
                    role_hash: role,
                    selector,
                    granted_actions,
                });
            }
        }
        self
    }

    /// Role holds no permission row on the selector.
    pub fn permission_absent(&mut self, role: RoleHash, selector: Selector) -> &mut Self {
        if self
            .api
            .get_active_role_permissions(&role)
            .iter()
            .any(|row| row.selector == selector)
        {
            self.plan.push(ConfigAction::RemoveFunctionFromRole {
                role_hash: role,
                selector,
            });
        }
        self
    }

    /// True if every goal already holds and none was unsatisfiable.
    pub fn is_converged(&self) -> bool {
        self.error.is_none() && self.plan.is_empty()
    }

    /// Consumes the planner, yielding the batch to sign and submit.
    ///
    /// # Errors
    /// - `ConflictingPermissions` if a permission goal can never apply
    pub fn into_plan(self) -> Result<Vec<ConfigAction>, EngineError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.plan),
        }
    }
}
