//! # ac-engine
//!
//! Permissioned configuration engine for Access-Chain.
//!
//! ## Purpose
//!
//! A small set of authorized accounts mutates shared access-control state
//! (roles, wallet membership, callable-function registrations, per-role
//! permission bitmaps) through a meta-transaction path: a signer authorizes
//! an action batch off-channel, a separate broadcaster submits it, and the
//! engine applies the batch atomically while recording the outcome in a
//! transaction ledger.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | `wallet_count <= max_wallets` for every role | `domain/roles.rs` - `add_wallet()` |
//! | INVARIANT-2 | Granted bitmap ⊆ schema supported set | `domain/permissions.rs` - `add()` |
//! | INVARIANT-3 | Protected roles are never deleted or emptied | `domain/roles.rs` - `remove_role()`, `revoke_wallet()` |
//! | INVARIANT-4 | No role holds sign-class and execute-class bits on one selector | `domain/permissions.rs` - `add()` |
//! | INVARIANT-5 | Batches apply all-or-nothing | `domain/processor.rs` - scratch-copy commit |
//! | INVARIANT-6 | Ledger records are immutable once terminal | `domain/ledger.rs` - `finalize()` |
//!
//! ## Transaction State Machine
//!
//! ```text
//! [UNDEFINED(0)] ──admit──→ [PENDING(1)] ──authorize──→ [EXECUTING(2)]
//!                                                             │
//!                                     batch applied ──→ [COMPLETED(5)]
//!                                     batch failed  ──→ [FAILED(6)]
//! ```
//!
//! Codes 3/4 are reserved for the sibling time-delay path (approve/cancel)
//! and are never produced by the meta-transaction path.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - Ed25519 signature verification, event publishers   │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - ConfigEngineApi trait                      │
//! │  ports/outbound.rs - SignatureVerifier, TimeSource traits       │
//! │  service.rs        - ConfigEngineService (coordinator)          │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/entities.rs    - Role, FunctionSchema, TransactionRecord│
//! │  domain/roles.rs       - RoleRegistry (wallet membership)       │
//! │  domain/schemas.rs     - SchemaRegistry (callable operations)   │
//! │  domain/permissions.rs - PermissionTable (role × selector)      │
//! │  domain/actions.rs     - ConfigAction tagged union              │
//! │  domain/processor.rs   - atomic batch application               │
//! │  domain/ledger.rs      - TransactionLedger state machine        │
//! │  domain/errors.rs      - EngineError enum                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Separation of Duties
//!
//! Authorization to *request* a batch and authorization to *execute* one are
//! two independent capabilities scoped to two related selectors. A signer's
//! role must hold the SIGN bit on both the public handler selector and the
//! paired internal execution selector; the broadcaster's role must hold the
//! EXECUTE bit on the execution selector. No single role may hold both
//! classes on the same selector.

pub mod adapters;
pub mod domain;
pub mod ensure;
pub mod events;
pub mod ports;
pub mod service;

pub use domain::*;
pub use ports::*;
pub use service::ConfigEngineService;
