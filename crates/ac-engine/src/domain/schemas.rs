//! # Function Schema Registry
//!
//! Stores which callable operations exist and what action kinds each may
//! ever grant. Every permission row must reference a live schema, so this
//! registry gates what operations can be granted at all.
//!
//! Destruction with `safe_removal = true` scans the permission table for
//! live references and refuses to orphan them; `safe_removal = false`
//! removes unconditionally (a caller error to rely on).

use super::entities::{ActionBitmap, FunctionSchema, Selector};
use super::errors::EngineError;
use super::permissions::PermissionTable;
use shared_types::function_selector;
use std::collections::{BTreeSet, HashMap};

/// Registry of function schemas indexed by selector.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<Selector, FunctionSchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True if no schemas exist.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registers a function schema.
    ///
    /// The selector is derived from the canonical signature string.
    ///
    /// # Errors
    /// - `FunctionAlreadyRegistered` if the selector is already present
    pub fn register(
        &mut self,
        signature: &str,
        operation_name: &str,
        supported_actions: ActionBitmap,
        handler_for: BTreeSet<Selector>,
    ) -> Result<Selector, EngineError> {
        let selector = function_selector(signature);
        if self.schemas.contains_key(&selector) {
            return Err(EngineError::FunctionAlreadyRegistered { selector });
        }
        self.schemas.insert(
            selector,
            FunctionSchema {
                selector,
                signature: signature.to_string(),
                operation_name: operation_name.to_string(),
                supported_actions,
                handler_for,
            },
        );
        Ok(selector)
    }

    /// Unregisters a function schema.
    ///
    /// # Errors
    /// - `FunctionNotFound` if absent
    /// - `FunctionStillReferenced` if `safe_removal` and any role still
    ///   holds a permission row for the selector
    pub fn unregister(
        &mut self,
        selector: &Selector,
        safe_removal: bool,
        permissions: &PermissionTable,
    ) -> Result<FunctionSchema, EngineError> {
        if !self.schemas.contains_key(selector) {
            return Err(EngineError::FunctionNotFound { selector: *selector });
        }
        if safe_removal {
            if let Some(role_hash) = permissions.any_role_referencing(selector) {
                return Err(EngineError::FunctionStillReferenced {
                    selector: *selector,
                    role_hash,
                });
            }
        }
        self.schemas
            .remove(selector)
            .ok_or(EngineError::FunctionNotFound { selector: *selector })
    }

    /// True if the selector is registered.
    pub fn exists(&self, selector: &Selector) -> bool {
        self.schemas.contains_key(selector)
    }

    /// Schema record, if present.
    pub fn get(&self, selector: &Selector) -> Option<&FunctionSchema> {
        self.schemas.get(selector)
    }

    /// True if `handler` is registered and fronts `execution`.
    pub fn is_paired(&self, handler: &Selector, execution: &Selector) -> bool {
        self.schemas
            .get(handler)
            .is_some_and(|schema| schema.handler_for.contains(execution))
    }
}
