//! # Configuration Engine Service
//!
//! Application service implementing the inbound port. Owns the three
//! backing stores, the transaction ledger, and per-signer nonce
//! accounting, and hosts the meta-transaction coordinator.
//!
//! ## Control flow
//!
//! 1. A signer requests an unsigned skeleton (`create_unsigned_request`)
//!    and signs its canonical bytes off-channel.
//! 2. A broadcaster submits the signed payload (`submit`).
//! 3. Admission: signature, declared-signer match, deadline, nonce,
//!    dual-selector SIGN authorization for the signer, EXECUTE
//!    authorization for the broadcaster. Any failure rejects the
//!    submission synchronously — no ledger record.
//! 4. Dispatch: a `Pending` record opens, turns `Executing`, the batch
//!    processor applies the decoded actions against a scratch state, and
//!    the record finalizes `Completed` (state swapped in) or `Failed`
//!    (state untouched, failure payload retained).
//!
//! Submissions are serialized: each reaches a terminal status before the
//! next observes any side effect, giving linearizable semantics over the
//! shared stores.

use crate::adapters::publisher::{EngineEventPublisher, NoOpPublisher};
use crate::domain::{
    decode_batch, encode_batch, apply_batch, ActionBitmap, Capability, ConfigAction,
    EngineConfig, EngineError, EngineState, ExecutionOutcome, FunctionPermission,
    FunctionSchema, RoleInfo, TransactionLedger, TransactionRecord,
};
use crate::events::payloads::{TransactionAdmittedPayload, TransactionFinalizedPayload};
use crate::ports::inbound::{ConfigEngineApi, RequestOptions};
use crate::ports::outbound::{SignatureVerifier, TimeSource};
use shared_types::{
    function_selector, Address, OperationType, RequestParams, RoleHash, Selector,
    SignedConfigRequest, TxId, UnsignedConfigRequest,
};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The engine service.
///
/// Generic over the signature-verification and time collaborators so
/// tests can drive both deterministically.
pub struct ConfigEngineService<V: SignatureVerifier, T: TimeSource> {
    config: EngineConfig,
    handler_selector: Selector,
    execution_selector: Selector,
    state: EngineState,
    ledger: TransactionLedger,
    consumed_nonces: HashMap<Address, BTreeSet<u64>>,
    verifier: V,
    time: T,
    publisher: Box<dyn EngineEventPublisher>,
}

impl<V: SignatureVerifier, T: TimeSource> ConfigEngineService<V, T> {
    /// Bootstraps the engine: seeds the two protected roles and the
    /// handler/execution schema pair for the configuration-batch
    /// operation, then grants the seed roles their capabilities.
    ///
    /// This is the only write path that bypasses the batch processor; it
    /// runs once, before any submission can be admitted.
    ///
    /// # Errors
    /// - `InvalidConfig` if either seed list is empty
    /// - Registry errors if seeds exceed the configured caps
    pub fn bootstrap(config: EngineConfig, verifier: V, time: T) -> Result<Self, EngineError> {
        let (first_signer, rest_signers) =
            config
                .seed_signers
                .split_first()
                .ok_or_else(|| EngineError::InvalidConfig {
                    reason: "at least one seed signer is required".to_string(),
                })?;
        let (first_broadcaster, rest_broadcasters) = config
            .seed_broadcasters
            .split_first()
            .ok_or_else(|| EngineError::InvalidConfig {
                reason: "at least one seed broadcaster is required".to_string(),
            })?;

        let handler_selector = function_selector(&config.handler_signature);
        let execution_selector = function_selector(&config.execution_signature);

        let mut state = EngineState::new();
        state.schemas.register(
            &config.execution_signature,
            "CONFIG_BATCH_EXECUTE",
            ActionBitmap::SIGN_CLASS.union(ActionBitmap::EXECUTE_CLASS),
            BTreeSet::new(),
        )?;
        state.schemas.register(
            &config.handler_signature,
            "CONFIG_BATCH_HANDLER",
            ActionBitmap::SIGN_CLASS,
            BTreeSet::from([execution_selector]),
        )?;

        let signer_role = state.roles.create_protected_role(
            &config.signer_role_name,
            config.signer_role_max_wallets,
            *first_signer,
        )?;
        for wallet in rest_signers {
            state.roles.add_wallet(&signer_role, *wallet)?;
        }
        let broadcaster_role = state.roles.create_protected_role(
            &config.broadcaster_role_name,
            config.broadcaster_role_max_wallets,
            *first_broadcaster,
        )?;
        for wallet in rest_broadcasters {
            state.roles.add_wallet(&broadcaster_role, *wallet)?;
        }

        // Signer class signs against both selectors; broadcaster class
        // executes against the execution selector only.
        for selector in [handler_selector, execution_selector] {
            state.permissions.add(
                &signer_role,
                FunctionPermission {
                    selector,
                    granted_actions: ActionBitmap::SIGN_CLASS,
                },
                &state.roles,
                &state.schemas,
            )?;
        }
        state.permissions.add(
            &broadcaster_role,
            FunctionPermission {
                selector: execution_selector,
                granted_actions: ActionBitmap::EXECUTE_CLASS,
            },
            &state.roles,
            &state.schemas,
        )?;

        info!(
            signer_role = %config.signer_role_name,
            broadcaster_role = %config.broadcaster_role_name,
            handler = %hex::encode(handler_selector),
            execution = %hex::encode(execution_selector),
            "engine bootstrapped"
        );

        Ok(Self {
            config,
            handler_selector,
            execution_selector,
            state,
            ledger: TransactionLedger::new(),
            consumed_nonces: HashMap::new(),
            verifier,
            time,
            publisher: Box::new(NoOpPublisher),
        })
    }

    /// Replaces the event publisher.
    pub fn with_publisher(mut self, publisher: Box<dyn EngineEventPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    /// The configured handler selector.
    pub fn handler_selector(&self) -> Selector {
        self.handler_selector
    }

    /// The configured execution selector.
    pub fn execution_selector(&self) -> Selector {
        self.execution_selector
    }

    /// Admission checks shared by every submission. Nothing here mutates
    /// engine state.
    fn admit(
        &self,
        signed: &SignedConfigRequest,
        broadcaster: &Address,
    ) -> Result<(), EngineError> {
        let request = &signed.request;

        // (a) signature over the canonical structure
        let message = request.canonical_bytes()?;
        let derived = self
            .verifier
            .verify(&message, &signed.public_key, &signed.signature)?;
        if derived != request.signer {
            return Err(EngineError::SignerMismatch {
                declared: request.signer,
                derived,
            });
        }

        // Structural checks: target and selector pairing
        if request.target != self.config.target {
            return Err(EngineError::UnexpectedTarget {
                expected: self.config.target,
                actual: request.target,
            });
        }
        if request.handler_selector != self.handler_selector
            || request.execution_selector != self.execution_selector
            || !self
                .state
                .schemas
                .is_paired(&request.handler_selector, &request.execution_selector)
        {
            return Err(EngineError::SelectorsNotPaired {
                handler: request.handler_selector,
                execution: request.execution_selector,
            });
        }

        // (b) deadline
        let now = self.time.now();
        if now > request.params.deadline {
            return Err(EngineError::Expired {
                deadline: request.params.deadline,
                now,
            });
        }

        // (c) nonce not consumed
        if self
            .consumed_nonces
            .get(&request.signer)
            .is_some_and(|set| set.contains(&request.params.nonce))
        {
            return Err(EngineError::NonceReplay {
                signer: request.signer,
                nonce: request.params.nonce,
            });
        }

        // (d) dual-selector SIGN authorization: one of the signer's roles
        // must hold the SIGN bit on both the handler and the execution
        // selector.
        let signer_ok = self
            .state
            .roles
            .roles_of_wallet(&request.signer)
            .into_iter()
            .any(|role| {
                self.signs_both_selectors(&role, &request.handler_selector, &request.execution_selector)
            });
        if !signer_ok {
            return Err(EngineError::SignerNotAuthorized {
                signer: request.signer,
                selector: request.execution_selector,
            });
        }

        // (e) broadcaster EXECUTE authorization on the execution selector
        let broadcaster_ok = self
            .state
            .roles
            .roles_of_wallet(broadcaster)
            .into_iter()
            .any(|role| {
                self.state
                    .permissions
                    .has_capability(&role, Capability::Execute(request.execution_selector))
            });
        if !broadcaster_ok {
            return Err(EngineError::BroadcasterNotAuthorized {
                broadcaster: *broadcaster,
                selector: request.execution_selector,
            });
        }

        Ok(())
    }

    fn signs_both_selectors(
        &self,
        role: &RoleHash,
        handler: &Selector,
        execution: &Selector,
    ) -> bool {
        self.state
            .permissions
            .has_capability(role, Capability::Sign(*handler))
            && self
                .state
                .permissions
                .has_capability(role, Capability::Sign(*execution))
    }
}

impl<V: SignatureVerifier, T: TimeSource> ConfigEngineApi for ConfigEngineService<V, T> {
    fn create_unsigned_request(
        &self,
        actions: Vec<ConfigAction>,
        signer: Address,
        options: RequestOptions,
    ) -> Result<UnsignedConfigRequest, EngineError> {
        let encoded_actions = encode_batch(&actions)?;
        let request = UnsignedConfigRequest {
            signer,
            target: self.config.target,
            operation_type: OperationType::Meta,
            execution_selector: self.execution_selector,
            handler_selector: self.handler_selector,
            encoded_actions,
            params: RequestParams {
                deadline: options.deadline,
                max_gas_price: options.max_gas_price,
                nonce: self.next_nonce(&signer),
                value: options.value,
                gas_limit: options.gas_limit,
            },
        };
        debug!(
            signer = %hex::encode(signer),
            nonce = request.params.nonce,
            tx_id = %hex::encode(request.tx_id()),
            "assembled unsigned request"
        );
        Ok(request)
    }

    fn submit(
        &mut self,
        signed: SignedConfigRequest,
        broadcaster: Address,
    ) -> Result<TxId, EngineError> {
        if let Err(error) = self.admit(&signed, &broadcaster) {
            warn!(
                broadcaster = %hex::encode(broadcaster),
                %error,
                "submission rejected at admission"
            );
            return Err(error);
        }

        let request = &signed.request;
        // Structurally invalid batches are also a rejected submission:
        // decoding happens before any ledger side effect.
        let actions = decode_batch(&request.encoded_actions)?;

        // Admission passed: consume the nonce and open the record. From
        // here on, failures surface only through the ledger.
        self.consumed_nonces
            .entry(request.signer)
            .or_default()
            .insert(request.params.nonce);

        let tx_id = request.tx_id();
        let correlation_id = Uuid::new_v4();
        self.ledger.open(
            tx_id,
            request.signer,
            request.target,
            request.execution_selector,
            request.operation_type,
        )?;
        if let Err(publish_error) = self.publisher.publish_admitted(&TransactionAdmittedPayload {
            correlation_id,
            tx_id,
            requester: request.signer,
            broadcaster,
            action_count: actions.len(),
        }) {
            warn!(%publish_error, "failed to publish admitted event");
        }

        self.ledger.mark_executing(&tx_id)?;
        info!(
            tx_id = %hex::encode(tx_id),
            action_count = actions.len(),
            "dispatching batch"
        );

        let outcome = match apply_batch(&self.state, &actions) {
            Ok(next_state) => {
                self.state = next_state;
                ExecutionOutcome::Applied {
                    actions_applied: actions.len(),
                }
            }
            Err(failure) => {
                warn!(
                    tx_id = %hex::encode(tx_id),
                    action_index = failure.action_index,
                    error = %failure.error,
                    "batch aborted; discarding all effects"
                );
                ExecutionOutcome::Rejected {
                    failed_action_index: failure.action_index,
                    reason: failure.error.to_string(),
                }
            }
        };

        let status = self.ledger.finalize(&tx_id, outcome)?;
        if let Err(publish_error) =
            self.publisher
                .publish_finalized(&TransactionFinalizedPayload {
                    correlation_id,
                    tx_id,
                    status_code: status.code(),
                    success: status == crate::domain::TransactionStatus::Completed,
                })
        {
            warn!(%publish_error, "failed to publish finalized event");
        }
        info!(tx_id = %hex::encode(tx_id), status_code = status.code(), "submission finalized");
        Ok(tx_id)
    }

    fn role_exists(&self, role_hash: &RoleHash) -> bool {
        self.state.roles.role_exists(role_hash)
    }

    fn get_role(&self, role_hash: &RoleHash) -> Option<RoleInfo> {
        self.state.roles.get_info(role_hash)
    }

    fn get_wallets_in_role(&self, role_hash: &RoleHash) -> Option<Vec<Address>> {
        self.state.roles.wallets_in_role(role_hash)
    }

    fn has_role(&self, role_hash: &RoleHash, address: &Address) -> bool {
        self.state.roles.has_role(role_hash, address)
    }

    fn function_schema_exists(&self, selector: &Selector) -> bool {
        self.state.schemas.exists(selector)
    }

    fn get_function_schema(&self, selector: &Selector) -> Option<FunctionSchema> {
        self.state.schemas.get(selector).cloned()
    }

    fn get_active_role_permissions(&self, role_hash: &RoleHash) -> Vec<FunctionPermission> {
        self.state.permissions.active_permissions(role_hash)
    }

    fn get_transaction(&self, tx_id: &TxId) -> Option<TransactionRecord> {
        self.ledger.get(tx_id).cloned()
    }

    fn get_pending_transactions(&self) -> Vec<TransactionRecord> {
        self.ledger.pending().into_iter().cloned().collect()
    }

    fn next_nonce(&self, signer: &Address) -> u64 {
        self.consumed_nonces
            .get(signer)
            .and_then(|set| set.iter().next_back())
            .map(|highest| highest + 1)
            .unwrap_or(0)
    }
}
