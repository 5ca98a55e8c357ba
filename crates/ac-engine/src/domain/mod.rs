//! # Domain Layer - Configuration Engine
//!
//! Pure business logic: no I/O, no clocks, no cryptography.
//!
//! ## Components
//!
//! - `entities`: Role, FunctionSchema, FunctionPermission, TransactionRecord
//! - `roles`: Role & wallet registry with capacity and protection rules
//! - `schemas`: Function schema registry gating which operations exist
//! - `permissions`: (role × selector) → action bitmap table
//! - `actions`: closed tagged union of the nine configuration actions
//! - `processor`: ordered, all-or-nothing batch application
//! - `ledger`: transaction record state machine
//! - `state`: the three mutable stores bundled for scratch-copy commits
//! - `errors`: EngineError enumeration

pub mod actions;
pub mod entities;
pub mod errors;
pub mod ledger;
pub mod permissions;
pub mod processor;
pub mod roles;
pub mod schemas;
pub mod state;

pub use actions::*;
pub use entities::*;
pub use errors::*;
pub use ledger::*;
pub use permissions::*;
pub use processor::*;
pub use roles::*;
pub use schemas::*;
pub use state::*;
