//! The three backing stores bundled into one cloneable state.
//!
//! All mutations flow through the batch processor; no other path writes
//! these stores. `Clone` exists so the processor can apply a batch to a
//! scratch copy and swap it in only on full success (INVARIANT-5).

use super::permissions::PermissionTable;
use super::roles::RoleRegistry;
use super::schemas::SchemaRegistry;

/// Shared role/schema/permission state.
#[derive(Clone, Debug, Default)]
pub struct EngineState {
    /// Role & wallet registry.
    pub roles: RoleRegistry,
    /// Function schema registry.
    pub schemas: SchemaRegistry,
    /// (role × selector) → action bitmap table.
    pub permissions: PermissionTable,
}

impl EngineState {
    /// Creates empty stores.
    pub fn new() -> Self {
        Self::default()
    }
}
