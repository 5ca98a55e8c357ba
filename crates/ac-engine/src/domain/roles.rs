//! # Role & Wallet Registry
//!
//! Stores roles and their wallet membership.
//!
//! ## Invariants Enforced
//!
//! - INVARIANT-1: `wallet_count <= max_wallets` (checked in `add_wallet()`)
//! - INVARIANT-3: protected roles are never deleted (`remove_role()`) and
//!   never drop to zero members (`revoke_wallet()`)
//!
//! Mutations are strict: re-issuing a create/add that already holds is a
//! failure, not a no-op. Callers wanting idempotence probe state first
//! (see the `ensure` module).

use super::entities::{Address, Role, RoleHash, RoleInfo};
use super::errors::EngineError;
use shared_types::role_hash;
use std::collections::{BTreeSet, HashMap};

/// Registry of roles indexed by their deterministic hash.
#[derive(Clone, Debug, Default)]
pub struct RoleRegistry {
    roles: HashMap<RoleHash, Role>,
}

impl RoleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// True if no roles exist.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Creates an unprotected role.
    ///
    /// # Errors
    /// - `RoleAlreadyExists` if the derived hash is already present
    /// - `InvalidMaxWallets` if `max_wallets` is zero
    pub fn create_role(&mut self, name: &str, max_wallets: usize) -> Result<RoleHash, EngineError> {
        self.insert_role(name, max_wallets, false, None)
    }

    /// Creates a protected role with its first member.
    ///
    /// Protected roles must never be observed empty, so creation takes the
    /// initial wallet in the same step. Used only by engine bootstrap.
    pub fn create_protected_role(
        &mut self,
        name: &str,
        max_wallets: usize,
        initial_wallet: Address,
    ) -> Result<RoleHash, EngineError> {
        self.insert_role(name, max_wallets, true, Some(initial_wallet))
    }

    fn insert_role(
        &mut self,
        name: &str,
        max_wallets: usize,
        is_protected: bool,
        initial_wallet: Option<Address>,
    ) -> Result<RoleHash, EngineError> {
        if max_wallets == 0 {
            return Err(EngineError::InvalidMaxWallets);
        }
        let hash = role_hash(name);
        if self.roles.contains_key(&hash) {
            return Err(EngineError::RoleAlreadyExists { role_hash: hash });
        }

        let mut wallet_set = BTreeSet::new();
        if let Some(wallet) = initial_wallet {
            wallet_set.insert(wallet);
        }
        self.roles.insert(
            hash,
            Role {
                role_hash: hash,
                role_name: name.to_string(),
                max_wallets,
                wallet_set,
                is_protected,
            },
        );
        Ok(hash)
    }

    /// Removes a role.
    ///
    /// # Errors
    /// - `RoleNotFound` if absent
    /// - `ProtectedRole` if the role is protected
    pub fn remove_role(&mut self, hash: &RoleHash) -> Result<Role, EngineError> {
        if self.roles.get(hash).is_some_and(|role| role.is_protected) {
            return Err(EngineError::ProtectedRole { role_hash: *hash });
        }
        self.roles
            .remove(hash)
            .ok_or(EngineError::RoleNotFound { role_hash: *hash })
    }

    /// Adds a wallet to a role.
    ///
    /// # Errors
    /// - `RoleNotFound` if the role is absent
    /// - `WalletCapacityExceeded` if the role is at `max_wallets`
    /// - `WalletAlreadyInRole` if the wallet is already a member
    pub fn add_wallet(&mut self, hash: &RoleHash, address: Address) -> Result<(), EngineError> {
        let role = self
            .roles
            .get_mut(hash)
            .ok_or(EngineError::RoleNotFound { role_hash: *hash })?;
        if role.wallet_set.contains(&address) {
            return Err(EngineError::WalletAlreadyInRole {
                role_hash: *hash,
                address,
            });
        }
        if role.wallet_set.len() == role.max_wallets {
            return Err(EngineError::WalletCapacityExceeded {
                role_hash: *hash,
                max_wallets: role.max_wallets,
            });
        }
        role.wallet_set.insert(address);
        Ok(())
    }

    /// Revokes a wallet's membership.
    ///
    /// # Errors
    /// - `RoleNotFound` if the role is absent
    /// - `WalletNotInRole` if the wallet is not a member
    /// - `ProtectedRoleWouldEmpty` if removal would empty a protected role
    pub fn revoke_wallet(&mut self, hash: &RoleHash, address: &Address) -> Result<(), EngineError> {
        let role = self
            .roles
            .get_mut(hash)
            .ok_or(EngineError::RoleNotFound { role_hash: *hash })?;
        if !role.wallet_set.contains(address) {
            return Err(EngineError::WalletNotInRole {
                role_hash: *hash,
                address: *address,
            });
        }
        if role.is_protected && role.wallet_set.len() == 1 {
            return Err(EngineError::ProtectedRoleWouldEmpty { role_hash: *hash });
        }
        role.wallet_set.remove(address);
        Ok(())
    }

    /// True if the role exists.
    pub fn role_exists(&self, hash: &RoleHash) -> bool {
        self.roles.contains_key(hash)
    }

    /// Full role record, if present.
    pub fn get(&self, hash: &RoleHash) -> Option<&Role> {
        self.roles.get(hash)
    }

    /// Query-facing summary, if present.
    pub fn get_info(&self, hash: &RoleHash) -> Option<RoleInfo> {
        self.roles.get(hash).map(Role::info)
    }

    /// Member wallets of a role, if present.
    pub fn wallets_in_role(&self, hash: &RoleHash) -> Option<Vec<Address>> {
        self.roles
            .get(hash)
            .map(|role| role.wallet_set.iter().copied().collect())
    }

    /// True if `address` is a member of the role.
    pub fn has_role(&self, hash: &RoleHash, address: &Address) -> bool {
        self.roles
            .get(hash)
            .is_some_and(|role| role.has_wallet(address))
    }

    /// All roles a wallet belongs to.
    pub fn roles_of_wallet(&self, address: &Address) -> Vec<RoleHash> {
        self.roles
            .values()
            .filter(|role| role.has_wallet(address))
            .map(|role| role.role_hash)
            .collect()
    }

    /// Iterates over all roles.
    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }
}
