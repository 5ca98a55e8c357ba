//! # End-to-End Meta-Transaction Flows
//!
//! Exercises the full signer/broadcaster choreography against a
//! bootstrapped engine with real Ed25519 signatures:
//!
//! 1. **Signer**: assembles an unsigned request and signs its canonical
//!    bytes with a key the engine never sees.
//! 2. **Broadcaster**: a different party submits the signed payload.
//! 3. **Engine**: verifies, authorizes both parties, applies the batch
//!    atomically, and records the terminal outcome in the ledger.

#[cfg(test)]
mod tests {
    use ac_engine::adapters::ed25519::{derive_address, Ed25519Verifier};
    use ac_engine::domain::{
        ActionBitmap, ConfigAction, EngineConfig, EngineError, ExecutionOutcome,
        TransactionStatus, TxAction,
    };
    use ac_engine::ensure::EnsurePlanner;
    use ac_engine::ports::inbound::{ConfigEngineApi, RequestOptions};
    use ac_engine::ports::outbound::ManualTimeSource;
    use ac_engine::service::ConfigEngineService;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::rngs::OsRng;
    use shared_types::{
        function_selector, role_hash, Address, SignedConfigRequest, UnsignedConfigRequest, U256,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// A key-holding participant: the engine only ever sees the address
    /// and, at submission time, the public key.
    struct Actor {
        signing_key: SigningKey,
        address: Address,
    }

    impl Actor {
        fn generate() -> Self {
            let signing_key = SigningKey::generate(&mut OsRng);
            let address = derive_address(&signing_key.verifying_key().to_bytes());
            Self { signing_key, address }
        }

        /// Signs the canonical bytes of an unsigned request.
        fn sign(&self, request: UnsignedConfigRequest) -> SignedConfigRequest {
            let message = request.canonical_bytes().unwrap();
            let signature = self.signing_key.sign(&message).to_bytes();
            SignedConfigRequest {
                request,
                public_key: self.signing_key.verifying_key().to_bytes(),
                signature,
            }
        }
    }

    type Engine = ConfigEngineService<Ed25519Verifier, ManualTimeSource>;

    fn bootstrap() -> (Engine, Actor, Actor) {
        crate::init_tracing();
        let signer = Actor::generate();
        let broadcaster = Actor::generate();
        let engine = ConfigEngineService::bootstrap(
            EngineConfig::for_testing(signer.address, broadcaster.address),
            Ed25519Verifier,
            ManualTimeSource::new(1_000),
        )
        .unwrap();
        (engine, signer, broadcaster)
    }

    fn options() -> RequestOptions {
        RequestOptions {
            deadline: 3_600_000,
            max_gas_price: U256::from(2_000_000_000u64),
            value: U256::zero(),
            gas_limit: 500_000,
        }
    }

    /// Sign-and-submit helper for the happy path.
    fn run_batch(
        engine: &mut Engine,
        signer: &Actor,
        broadcaster: &Actor,
        actions: Vec<ConfigAction>,
    ) -> TransactionStatus {
        let unsigned = engine
            .create_unsigned_request(actions, signer.address, options())
            .unwrap();
        let tx_id = engine
            .submit(signer.sign(unsigned), broadcaster.address)
            .unwrap();
        engine.get_transaction(&tx_id).unwrap().status
    }

    // =============================================================================
    // HAPPY PATH
    // =============================================================================

    #[test]
    fn test_signed_batch_lifecycle_end_to_end() {
        let (mut engine, signer, broadcaster) = bootstrap();

        let treasury = role_hash("TREASURY");
        let set_limit = function_selector("setLimit(uint256)");
        let unsigned = engine
            .create_unsigned_request(
                vec![
                    ConfigAction::CreateRole { name: "TREASURY".to_string(), max_wallets: 2 },
                    ConfigAction::AddWallet { role_hash: treasury, address: [0x11; 20] },
                    ConfigAction::RegisterFunction {
                        signature: "setLimit(uint256)".to_string(),
                        operation_name: "SET_LIMIT".to_string(),
                        supported_actions: ActionBitmap::SIGN_CLASS
                            .union(ActionBitmap::EXECUTE_CLASS),
                        handler_for: vec![],
                    },
                    ConfigAction::AddFunctionToRole {
                        role_hash: treasury,
                        selector: set_limit,
                        granted_actions: ActionBitmap::SIGN_CLASS,
                    },
                ],
                signer.address,
                options(),
            )
            .unwrap();
        let expected_id = unsigned.tx_id();

        let tx_id = engine
            .submit(signer.sign(unsigned), broadcaster.address)
            .unwrap();
        assert_eq!(tx_id, expected_id);

        // Terminal record with the applied count
        let record = engine.get_transaction(&tx_id).unwrap();
        assert_eq!(record.status, TransactionStatus::Completed);
        assert_eq!(record.requester, signer.address);
        assert_eq!(
            record.result,
            Some(ExecutionOutcome::Applied { actions_applied: 4 })
        );
        assert!(engine.get_pending_transactions().is_empty());

        // Queries observe every effect of the batch
        assert!(engine.has_role(&treasury, &[0x11; 20]));
        assert_eq!(engine.get_role(&treasury).unwrap().wallet_count, 1);
        assert!(engine.function_schema_exists(&set_limit));
        let rows = engine.get_active_role_permissions(&treasury);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].granted_actions.contains(TxAction::SignRequestAndApprove));
    }

    #[test]
    fn test_sequential_batches_consume_increasing_nonces() {
        let (mut engine, signer, broadcaster) = bootstrap();

        for i in 0..3u64 {
            assert_eq!(engine.next_nonce(&signer.address), i);
            let status = run_batch(
                &mut engine,
                &signer,
                &broadcaster,
                vec![ConfigAction::CreateRole {
                    name: format!("ROLE_{i}"),
                    max_wallets: 1,
                }],
            );
            assert_eq!(status, TransactionStatus::Completed);
        }
        assert_eq!(engine.next_nonce(&signer.address), 3);
    }

    // =============================================================================
    // SEPARATION OF DUTIES
    // =============================================================================

    #[test]
    fn test_signer_cannot_broadcast_own_request() {
        let (mut engine, signer, _broadcaster) = bootstrap();
        let unsigned = engine
            .create_unsigned_request(
                vec![ConfigAction::CreateRole { name: "OPS".to_string(), max_wallets: 1 }],
                signer.address,
                options(),
            )
            .unwrap();

        // The seed signer role holds SIGN only, never EXECUTE.
        assert!(matches!(
            engine.submit(signer.sign(unsigned), signer.address),
            Err(EngineError::BroadcasterNotAuthorized { .. })
        ));
    }

    #[test]
    fn test_broadcaster_cannot_sign_requests() {
        let (mut engine, _signer, broadcaster) = bootstrap();
        let unsigned = engine
            .create_unsigned_request(
                vec![ConfigAction::CreateRole { name: "OPS".to_string(), max_wallets: 1 }],
                broadcaster.address,
                options(),
            )
            .unwrap();
        let tx_id = unsigned.tx_id();

        assert!(matches!(
            engine.submit(broadcaster.sign(unsigned), broadcaster.address),
            Err(EngineError::SignerNotAuthorized { .. })
        ));
        // Rejected submissions leave no ledger record.
        assert!(engine.get_transaction(&tx_id).is_none());
    }

    // =============================================================================
    // SIGNATURE AND REPLAY DEFENSES
    // =============================================================================

    #[test]
    fn test_tampered_payload_fails_verification() {
        let (mut engine, signer, broadcaster) = bootstrap();
        let unsigned = engine
            .create_unsigned_request(
                vec![ConfigAction::CreateRole { name: "OPS".to_string(), max_wallets: 1 }],
                signer.address,
                options(),
            )
            .unwrap();

        let mut signed = signer.sign(unsigned);
        // Swap the batch after signing: signature no longer covers it.
        signed.request.encoded_actions = bincode::serialize(&vec![ConfigAction::RemoveRole {
            role_hash: role_hash("CONFIG_SIGNER"),
        }])
        .unwrap();

        assert!(matches!(
            engine.submit(signed, broadcaster.address),
            Err(EngineError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_wrong_key_yields_signer_mismatch() {
        let (mut engine, signer, broadcaster) = bootstrap();
        let impostor = Actor::generate();
        let unsigned = engine
            .create_unsigned_request(
                vec![ConfigAction::CreateRole { name: "OPS".to_string(), max_wallets: 1 }],
                signer.address,
                options(),
            )
            .unwrap();

        // Valid signature by the impostor's key, but the request declares
        // the real signer.
        assert!(matches!(
            engine.submit(impostor.sign(unsigned), broadcaster.address),
            Err(EngineError::SignerMismatch { .. })
        ));
    }

    #[test]
    fn test_replayed_submission_is_rejected() {
        let (mut engine, signer, broadcaster) = bootstrap();
        let unsigned = engine
            .create_unsigned_request(
                vec![ConfigAction::CreateRole { name: "OPS".to_string(), max_wallets: 1 }],
                signer.address,
                options(),
            )
            .unwrap();
        let signed = signer.sign(unsigned);

        engine.submit(signed.clone(), broadcaster.address).unwrap();
        assert!(matches!(
            engine.submit(signed, broadcaster.address),
            Err(EngineError::NonceReplay { nonce: 0, .. })
        ));
    }

    #[test]
    fn test_deadline_enforced_against_engine_clock() {
        let signer = Actor::generate();
        let broadcaster = Actor::generate();
        let mut engine = ConfigEngineService::bootstrap(
            EngineConfig::for_testing(signer.address, broadcaster.address),
            Ed25519Verifier,
            ManualTimeSource::new(10_000),
        )
        .unwrap();

        // A correctly-signed request whose deadline already elapsed never
        // reaches the ledger.
        let unsigned = engine
            .create_unsigned_request(
                vec![ConfigAction::CreateRole { name: "OPS".to_string(), max_wallets: 1 }],
                signer.address,
                RequestOptions { deadline: 5_000, ..options() },
            )
            .unwrap();
        let tx_id = unsigned.tx_id();
        assert!(matches!(
            engine.submit(signer.sign(unsigned), broadcaster.address),
            Err(EngineError::Expired { deadline: 5_000, now: 10_000 })
        ));
        assert!(engine.get_transaction(&tx_id).is_none());

        // The same deadline is fine while the clock still sits before it.
        let unsigned = engine
            .create_unsigned_request(
                vec![ConfigAction::CreateRole { name: "OPS".to_string(), max_wallets: 1 }],
                signer.address,
                RequestOptions { deadline: 15_000, ..options() },
            )
            .unwrap();
        engine
            .submit(signer.sign(unsigned), broadcaster.address)
            .unwrap();
    }

    // =============================================================================
    // PERMISSION CONFLICT PRECEDENCE
    // =============================================================================

    #[test]
    fn test_cross_class_regrant_reports_conflict_not_duplicate() {
        let (mut engine, signer, broadcaster) = bootstrap();
        let treasury = role_hash("TREASURY");
        let set_limit = function_selector("setLimit(uint256)");

        let status = run_batch(
            &mut engine,
            &signer,
            &broadcaster,
            vec![
                ConfigAction::CreateRole { name: "TREASURY".to_string(), max_wallets: 2 },
                ConfigAction::RegisterFunction {
                    signature: "setLimit(uint256)".to_string(),
                    operation_name: "SET_LIMIT".to_string(),
                    supported_actions: ActionBitmap::SIGN_CLASS
                        .union(ActionBitmap::EXECUTE_CLASS),
                    handler_for: vec![],
                },
                ConfigAction::AddFunctionToRole {
                    role_hash: treasury,
                    selector: set_limit,
                    granted_actions: ActionBitmap::SIGN_CLASS,
                },
            ],
        );
        assert_eq!(status, TransactionStatus::Completed);

        // Granting the opposite class on the same selector is a conflict,
        // reported ahead of the duplicate-row check.
        let unsigned = engine
            .create_unsigned_request(
                vec![ConfigAction::AddFunctionToRole {
                    role_hash: treasury,
                    selector: set_limit,
                    granted_actions: ActionBitmap::EXECUTE_CLASS,
                }],
                signer.address,
                options(),
            )
            .unwrap();
        let tx_id = engine
            .submit(signer.sign(unsigned), broadcaster.address)
            .unwrap();

        let record = engine.get_transaction(&tx_id).unwrap();
        assert_eq!(record.status, TransactionStatus::Failed);
        match record.result.unwrap() {
            ExecutionOutcome::Rejected { failed_action_index, reason } => {
                assert_eq!(failed_action_index, 0);
                assert!(reason.contains("sign-class and execute-class"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    // =============================================================================
    // ENSURE PLANNER OVER THE SIGNED PATH
    // =============================================================================

    #[test]
    fn test_planned_batch_converges_then_plans_nothing() {
        let (mut engine, signer, broadcaster) = bootstrap();
        let ops = role_hash("OPS");
        let pause = function_selector("pause()");

        let mut planner = EnsurePlanner::new(&engine);
        planner
            .role("OPS", 4)
            .wallet_in_role(ops, [0x21; 20])
            .function("pause()", "PAUSE", ActionBitmap::SIGN_CLASS, vec![])
            .permission(ops, pause, ActionBitmap::from_actions(&[TxAction::SignRequestAndApprove]));
        let plan = planner.into_plan().unwrap();
        assert_eq!(plan.len(), 4);

        let status = run_batch(&mut engine, &signer, &broadcaster, plan);
        assert_eq!(status, TransactionStatus::Completed);

        // Re-planning the same desired state finds nothing to do.
        let mut replanner = EnsurePlanner::new(&engine);
        replanner
            .role("OPS", 4)
            .wallet_in_role(ops, [0x21; 20])
            .function("pause()", "PAUSE", ActionBitmap::SIGN_CLASS, vec![])
            .permission(ops, pause, ActionBitmap::from_actions(&[TxAction::SignRequestAndApprove]));
        assert!(replanner.is_converged());
    }

    #[test]
    fn test_planned_widening_applies_through_the_signed_path() {
        let (mut engine, signer, broadcaster) = bootstrap();
        let ops = role_hash("OPS");
        let pause = function_selector("pause()");

        let mut planner = EnsurePlanner::new(&engine);
        planner
            .role("OPS", 4)
            .function("pause()", "PAUSE", ActionBitmap::SIGN_CLASS, vec![])
            .permission(ops, pause, ActionBitmap::from_actions(&[TxAction::SignRequestAndApprove]));
        let plan = planner.into_plan().unwrap();
        let status = run_batch(&mut engine, &signer, &broadcaster, plan);
        assert_eq!(status, TransactionStatus::Completed);

        // Widening within the sign class plans a replacement row that the
        // strict path accepts, so the batch completes rather than failing.
        let mut widening = EnsurePlanner::new(&engine);
        widening.permission(ops, pause, ActionBitmap::from_actions(&[TxAction::SignApprove]));
        let plan = widening.into_plan().unwrap();
        assert_eq!(plan.len(), 2);

        let status = run_batch(&mut engine, &signer, &broadcaster, plan);
        assert_eq!(status, TransactionStatus::Completed);
        let rows = engine.get_active_role_permissions(&ops);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].granted_actions.contains(TxAction::SignRequestAndApprove));
        assert!(rows[0].granted_actions.contains(TxAction::SignApprove));
    }

    #[test]
    fn test_cross_class_widening_never_reaches_the_ledger() {
        let (engine, signer, _broadcaster) = bootstrap();

        // The seed broadcaster role holds execute-class bits on the
        // execution selector; asking for a sign bit on top can never
        // apply, so planning reports the conflict instead of producing
        // a batch that is doomed to finalize as failed.
        let mut planner = EnsurePlanner::new(&engine);
        planner.permission(
            role_hash("CONFIG_BROADCASTER"),
            engine.execution_selector(),
            ActionBitmap::from_actions(&[TxAction::SignApprove]),
        );
        assert!(!planner.is_converged());
        assert!(matches!(
            planner.into_plan(),
            Err(EngineError::ConflictingPermissions { .. })
        ));
        assert_eq!(engine.next_nonce(&signer.address), 0);
    }
}
