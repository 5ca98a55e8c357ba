//! # Batch Atomicity
//!
//! A batch either applies every action in order or applies none of them.
//! These tests submit mixed batches through the full signed path and
//! assert that a mid-batch failure discards every earlier effect while
//! still producing a terminal `Failed` ledger record that names the
//! offending position.

#[cfg(test)]
mod tests {
    use ac_engine::adapters::ed25519::{derive_address, Ed25519Verifier};
    use ac_engine::domain::{
        ActionBitmap, ConfigAction, EngineConfig, ExecutionOutcome, TransactionStatus,
    };
    use ac_engine::ports::inbound::{ConfigEngineApi, RequestOptions};
    use ac_engine::ports::outbound::ManualTimeSource;
    use ac_engine::service::ConfigEngineService;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::rngs::OsRng;
    use shared_types::{function_selector, role_hash, Address, TxId, U256};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    type Engine = ConfigEngineService<Ed25519Verifier, ManualTimeSource>;

    struct Harness {
        engine: Engine,
        signer_key: SigningKey,
        signer: Address,
        broadcaster: Address,
    }

    impl Harness {
        fn new() -> Self {
            let signer_key = SigningKey::generate(&mut OsRng);
            let signer = derive_address(&signer_key.verifying_key().to_bytes());
            // The broadcaster never signs anything; only its address and
            // role membership matter.
            let broadcaster =
                derive_address(&SigningKey::generate(&mut OsRng).verifying_key().to_bytes());
            let engine = ConfigEngineService::bootstrap(
                EngineConfig::for_testing(signer, broadcaster),
                Ed25519Verifier,
                ManualTimeSource::new(1_000),
            )
            .unwrap();
            Self { engine, signer_key, signer, broadcaster }
        }

        /// Signs and submits a batch; admission is expected to succeed.
        fn submit(&mut self, actions: Vec<ConfigAction>) -> TxId {
            let unsigned = self
                .engine
                .create_unsigned_request(
                    actions,
                    self.signer,
                    RequestOptions {
                        deadline: 3_600_000,
                        max_gas_price: U256::from(2_000_000_000u64),
                        value: U256::zero(),
                        gas_limit: 500_000,
                    },
                )
                .unwrap();
            let message = unsigned.canonical_bytes().unwrap();
            let signed = shared_types::SignedConfigRequest {
                request: unsigned,
                public_key: self.signer_key.verifying_key().to_bytes(),
                signature: self.signer_key.sign(&message).to_bytes(),
            };
            self.engine.submit(signed, self.broadcaster).unwrap()
        }

        fn failure_of(&self, tx_id: &TxId) -> (usize, String) {
            let record = self.engine.get_transaction(tx_id).unwrap();
            assert_eq!(record.status, TransactionStatus::Failed);
            match record.result.unwrap() {
                ExecutionOutcome::Rejected { failed_action_index, reason } => {
                    (failed_action_index, reason)
                }
                other => panic!("expected rejection, got {:?}", other),
            }
        }
    }

    fn create_role(name: &str, max_wallets: usize) -> ConfigAction {
        ConfigAction::CreateRole { name: name.to_string(), max_wallets }
    }

    // =============================================================================
    // ALL-OR-NOTHING APPLICATION
    // =============================================================================

    #[test]
    fn test_failure_at_position_k_discards_earlier_effects() {
        let mut h = Harness::new();

        let tx_id = h.submit(vec![
            create_role("A", 2),                                            // 0: valid
            create_role("B", 2),                                            // 1: valid
            ConfigAction::AddWallet {
                role_hash: role_hash("MISSING"),                            // 2: fails
                address: [0x01; 20],
            },
            create_role("C", 2),                                            // 3: never reached
        ]);

        let (index, reason) = h.failure_of(&tx_id);
        assert_eq!(index, 2);
        assert!(reason.contains("Role not found"));

        // Positions 0 and 1 applied to the scratch copy only.
        assert!(!h.engine.role_exists(&role_hash("A")));
        assert!(!h.engine.role_exists(&role_hash("B")));
        assert!(!h.engine.role_exists(&role_hash("C")));
    }

    #[test]
    fn test_duplicate_creation_fails_whole_batch() {
        let mut h = Harness::new();
        let tx_id = h.submit(vec![create_role("OPS", 2)]);
        assert_eq!(
            h.engine.get_transaction(&tx_id).unwrap().status,
            TransactionStatus::Completed
        );

        // Strict non-idempotence: a replayed creation is an error, and it
        // takes the unrelated action at position 1 down with it.
        let tx_id = h.submit(vec![
            create_role("OPS", 2),
            create_role("SECURITY", 2),
        ]);
        let (index, reason) = h.failure_of(&tx_id);
        assert_eq!(index, 0);
        assert!(reason.contains("already exists"));
        assert!(!h.engine.role_exists(&role_hash("SECURITY")));

        // The failed submission still consumed its nonce.
        assert_eq!(h.engine.next_nonce(&h.signer), 2);
    }

    #[test]
    fn test_later_actions_see_earlier_postconditions() {
        let mut h = Harness::new();
        let ops = role_hash("OPS");
        let pause = function_selector("pause()");

        // Register-then-grant within one batch: the grant's schema lookup
        // must observe the registration two positions earlier.
        let tx_id = h.submit(vec![
            create_role("OPS", 2),
            ConfigAction::RegisterFunction {
                signature: "pause()".to_string(),
                operation_name: "PAUSE".to_string(),
                supported_actions: ActionBitmap::SIGN_CLASS,
                handler_for: vec![],
            },
            ConfigAction::AddFunctionToRole {
                role_hash: ops,
                selector: pause,
                granted_actions: ActionBitmap::SIGN_CLASS,
            },
        ]);

        let record = h.engine.get_transaction(&tx_id).unwrap();
        assert_eq!(record.status, TransactionStatus::Completed);
        assert_eq!(h.engine.get_active_role_permissions(&ops).len(), 1);
    }

    #[test]
    fn test_nested_definitions_share_the_batch_fate() {
        let mut h = Harness::new();

        // A failure inside the second sub-batch discards the first
        // sub-batch and the enclosing action alike.
        let tx_id = h.submit(vec![ConfigAction::LoadDefinitions {
            batches: vec![
                vec![create_role("A", 2), create_role("B", 2)],
                vec![ConfigAction::RemoveRole { role_hash: role_hash("MISSING") }],
            ],
        }]);

        let (index, _) = h.failure_of(&tx_id);
        assert_eq!(index, 0);
        assert!(!h.engine.role_exists(&role_hash("A")));
        assert!(!h.engine.role_exists(&role_hash("B")));
    }

    #[test]
    fn test_protected_roles_survive_batch_attacks() {
        let mut h = Harness::new();
        let signer_role = role_hash("CONFIG_SIGNER");

        let tx_id = h.submit(vec![ConfigAction::RemoveRole { role_hash: signer_role }]);
        let (_, reason) = h.failure_of(&tx_id);
        assert!(reason.contains("protected"));

        // Nor can the last member of a protected role be revoked.
        let tx_id = h.submit(vec![ConfigAction::RevokeWallet {
            role_hash: signer_role,
            address: h.signer,
        }]);
        let (_, reason) = h.failure_of(&tx_id);
        assert!(reason.contains("zero members"));
        assert!(h.engine.has_role(&signer_role, &h.signer));
    }

    #[test]
    fn test_safe_unregister_blocked_while_referenced() {
        let mut h = Harness::new();
        let ops = role_hash("OPS");
        let pause = function_selector("pause()");

        h.submit(vec![
            create_role("OPS", 2),
            ConfigAction::RegisterFunction {
                signature: "pause()".to_string(),
                operation_name: "PAUSE".to_string(),
                supported_actions: ActionBitmap::SIGN_CLASS,
                handler_for: vec![],
            },
            ConfigAction::AddFunctionToRole {
                role_hash: ops,
                selector: pause,
                granted_actions: ActionBitmap::SIGN_CLASS,
            },
        ]);

        // safe_removal scans the live permission table and refuses.
        let tx_id = h.submit(vec![ConfigAction::UnregisterFunction {
            selector: pause,
            safe_removal: true,
        }]);
        let (_, reason) = h.failure_of(&tx_id);
        assert!(reason.contains("still referenced"));
        assert!(h.engine.function_schema_exists(&pause));

        // Dropping the referencing row first makes the removal apply.
        let tx_id = h.submit(vec![
            ConfigAction::RemoveFunctionFromRole { role_hash: ops, selector: pause },
            ConfigAction::UnregisterFunction { selector: pause, safe_removal: true },
        ]);
        assert_eq!(
            h.engine.get_transaction(&tx_id).unwrap().status,
            TransactionStatus::Completed
        );
        assert!(!h.engine.function_schema_exists(&pause));
    }

    #[test]
    fn test_capacity_cap_enforced_mid_batch() {
        let mut h = Harness::new();
        let small = role_hash("SMALL");

        let tx_id = h.submit(vec![
            create_role("SMALL", 1),
            ConfigAction::AddWallet { role_hash: small, address: [0x01; 20] },
            ConfigAction::AddWallet { role_hash: small, address: [0x02; 20] },
        ]);

        let (index, reason) = h.failure_of(&tx_id);
        assert_eq!(index, 2);
        assert!(reason.contains("capacity"));
        assert!(!h.engine.role_exists(&small));
    }
}
