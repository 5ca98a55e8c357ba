//! # Permission Table & Authorization Checks
//!
//! Maps (role, selector) → granted action bitmap. Every authorization
//! decision in the engine consults this table.
//!
//! ## Invariants Enforced
//!
//! - INVARIANT-2: a granted bitmap is a subset of the referenced schema's
//!   supported set (checked in `add()`)
//! - INVARIANT-4: no role ever holds both a sign-class and an
//!   execute-class bit on the same selector (checked in `add()` against
//!   the requested bitmap itself and against any existing row)
//!
//! The conflict check runs before the duplicate check: granting the
//! opposite class on a selector a role already signs for reports
//! `ConflictingPermissions`, not `PermissionAlreadyExists`.

use super::entities::{ActionBitmap, Capability, FunctionPermission, RoleHash, Selector, TxAction};
use super::errors::EngineError;
use super::roles::RoleRegistry;
use super::schemas::SchemaRegistry;
use std::collections::{BTreeMap, HashMap};

/// Permission rows grouped by role, selector-ordered within a role.
#[derive(Clone, Debug, Default)]
pub struct PermissionTable {
    by_role: HashMap<RoleHash, BTreeMap<Selector, ActionBitmap>>,
}

impl PermissionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of permission rows.
    pub fn len(&self) -> usize {
        self.by_role.values().map(BTreeMap::len).sum()
    }

    /// True if no rows exist.
    pub fn is_empty(&self) -> bool {
        self.by_role.values().all(BTreeMap::is_empty)
    }

    /// Adds a permission row for a role.
    ///
    /// # Errors
    /// - `RoleNotFound` / `FunctionNotFound` if either side is missing
    /// - `UnsupportedAction` if the bitmap exceeds the schema's support
    /// - `ConflictingPermissions` if the grant would give the role both
    ///   sign-class and execute-class bits on the selector
    /// - `PermissionAlreadyExists` if the row already exists
    pub fn add(
        &mut self,
        role_hash: &RoleHash,
        permission: FunctionPermission,
        roles: &RoleRegistry,
        schemas: &SchemaRegistry,
    ) -> Result<(), EngineError> {
        if !roles.role_exists(role_hash) {
            return Err(EngineError::RoleNotFound { role_hash: *role_hash });
        }
        let schema = schemas
            .get(&permission.selector)
            .ok_or(EngineError::FunctionNotFound {
                selector: permission.selector,
            })?;

        if !permission.granted_actions.is_subset_of(schema.supported_actions) {
            return Err(EngineError::UnsupportedAction {
                selector: permission.selector,
                requested: permission.granted_actions,
                supported: schema.supported_actions,
            });
        }

        // Separation of duties: evaluate against the union of the requested
        // bitmap and whatever the role already holds on this selector.
        let existing = self
            .by_role
            .get(role_hash)
            .and_then(|rows| rows.get(&permission.selector))
            .copied()
            .unwrap_or_default();
        let combined = permission.granted_actions.union(existing);
        if combined.intersects(ActionBitmap::SIGN_CLASS)
            && combined.intersects(ActionBitmap::EXECUTE_CLASS)
        {
            return Err(EngineError::ConflictingPermissions {
                role_hash: *role_hash,
                selector: permission.selector,
            });
        }

        let rows = self.by_role.entry(*role_hash).or_default();
        if rows.contains_key(&permission.selector) {
            return Err(EngineError::PermissionAlreadyExists {
                role_hash: *role_hash,
                selector: permission.selector,
            });
        }
        rows.insert(permission.selector, permission.granted_actions);
        Ok(())
    }

    /// Removes a permission row.
    ///
    /// # Errors
    /// - `PermissionNotFound` if no such row exists
    pub fn remove(
        &mut self,
        role_hash: &RoleHash,
        selector: &Selector,
    ) -> Result<ActionBitmap, EngineError> {
        let removed = self
            .by_role
            .get_mut(role_hash)
            .and_then(|rows| rows.remove(selector));
        match removed {
            Some(bitmap) => {
                if self.by_role.get(role_hash).is_some_and(BTreeMap::is_empty) {
                    self.by_role.remove(role_hash);
                }
                Ok(bitmap)
            }
            None => Err(EngineError::PermissionNotFound {
                role_hash: *role_hash,
                selector: *selector,
            }),
        }
    }

    /// All live permission rows for a role, selector-ordered.
    pub fn active_permissions(&self, role_hash: &RoleHash) -> Vec<FunctionPermission> {
        self.by_role
            .get(role_hash)
            .map(|rows| {
                rows.iter()
                    .map(|(selector, bitmap)| FunctionPermission {
                        selector: *selector,
                        granted_actions: *bitmap,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True if the role holds the action bit on the selector.
    pub fn has_action(&self, role_hash: &RoleHash, selector: &Selector, action: TxAction) -> bool {
        self.by_role
            .get(role_hash)
            .and_then(|rows| rows.get(selector))
            .is_some_and(|bitmap| bitmap.contains(action))
    }

    /// True if the role holds the capability's action bit on its selector.
    pub fn has_capability(&self, role_hash: &RoleHash, capability: Capability) -> bool {
        self.has_action(role_hash, &capability.selector(), capability.action())
    }

    /// Any role still holding a row for the selector (reference scan used
    /// by safe schema removal).
    pub fn any_role_referencing(&self, selector: &Selector) -> Option<RoleHash> {
        self.by_role
            .iter()
            .find(|(_, rows)| rows.contains_key(selector))
            .map(|(role_hash, _)| *role_hash)
    }

    /// Drops every row belonging to a role. Used when a role is removed.
    pub fn clear_role(&mut self, role_hash: &RoleHash) {
        self.by_role.remove(role_hash);
    }
}
