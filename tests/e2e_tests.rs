//! End-to-end integration tests
//!
//! These tests drive the contract the way the hosting ledger does: every call
//! is a separate transaction submitted by some identity, committed only if it
//! succeeds. They cover:
//! - the full payment lifecycle and its audit trail
//! - the cancellation path after a failed debit
//! - agent registry management
//! - ownership checks between agents and between banks
//! - atomicity of rejected and conflicting transactions
//! - determinism across replicas
//!
//! The fixture-driven tests at the bottom replay `tests/fixtures/<name>/script.csv`
//! and compare the outcome of every invocation with `expected.txt`.

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use std::fs;
    use std::path::{Path, PathBuf};
    use ticket_payments::config::ContractConfig;
    use ticket_payments::ledger::sandbox::fixtures;
    use ticket_payments::replay::{replay, ReplayOptions};
    use ticket_payments::types::KeyModification;
    use ticket_payments::{
        Chaincode, ContractError, Invocation, LedgerStub, Member, Payment, PaymentState, Sandbox,
        StateChangedEvent,
    };

    fn create(sandbox: &Sandbox, creator: &str, id: &str, agent: &str) -> Invocation {
        let payload = serde_json::to_string(&fixtures::create_payload(id, agent)).unwrap();
        sandbox.invoke(creator, "/create", &[&payload])
    }

    fn move_to(sandbox: &Sandbox, creator: &str, id: &str, state: PaymentState) -> Invocation {
        sandbox.invoke(creator, "/updateState", &[&fixtures::update_state(id, state)])
    }

    fn get(sandbox: &Sandbox, id: &str) -> Payment {
        let invocation = sandbox.invoke(fixtures::BANK, "/get", &[id]);
        assert!(invocation.response.is_ok(), "{}", invocation.response.message);
        serde_json::from_slice(&invocation.response.payload).unwrap()
    }

    fn history(sandbox: &Sandbox, id: &str) -> Vec<Payment> {
        let invocation = sandbox.invoke(fixtures::BANK, "/history", &[id]);
        assert!(invocation.response.is_ok(), "{}", invocation.response.message);
        let entries: Vec<KeyModification> = serde_json::from_slice(&invocation.response.payload).unwrap();
        entries
            .iter()
            .map(|entry| serde_json::from_slice(&entry.payload).unwrap())
            .collect()
    }

    fn event(invocation: &Invocation) -> (String, StateChangedEvent) {
        let event = invocation.event.as_ref().expect("invocation published no event");
        (event.name.clone(), serde_json::from_slice(&event.payload).unwrap())
    }

    fn assert_ok(invocation: &Invocation) {
        assert!(
            invocation.response.is_ok(),
            "expected success, got: {}",
            invocation.response.message
        );
    }

    #[test]
    fn test_full_payment_lifecycle() {
        let sandbox = fixtures::deployed_sandbox();

        let created = create(&sandbox, fixtures::AGENT, "p-1", fixtures::AGENT);
        assert_ok(&created);
        let (name, created_event) = event(&created);
        assert_eq!(name, "TicketPaymentCreated");
        assert_eq!(created_event.previous_state, None);
        assert_eq!(created_event.current_state, PaymentState::CheckFundsRequest);
        assert_eq!(created_event.payment_key, "PAYMENT_p-1");
        assert_eq!(created_event.to.organization_id, fixtures::MERCHANT);
        assert_eq!(created_event.from.organization_id, fixtures::AGENT);

        let steps = [
            (fixtures::BANK, PaymentState::CheckFundsRequest, PaymentState::CheckFundsInProgress),
            (fixtures::BANK, PaymentState::CheckFundsInProgress, PaymentState::CheckFundsSuccess),
            (fixtures::AGENT, PaymentState::CheckFundsSuccess, PaymentState::DebitRequest),
            (fixtures::BANK, PaymentState::DebitRequest, PaymentState::DebitInProgress),
            (fixtures::BANK, PaymentState::DebitInProgress, PaymentState::DebitSuccess),
        ];
        for (creator, from, to) in steps {
            let moved = move_to(&sandbox, creator, "p-1", to);
            assert_ok(&moved);
            let (name, changed) = event(&moved);
            assert_eq!(name, "TicketPaymentStateChanged");
            assert_eq!(changed.previous_state, Some(from));
            assert_eq!(changed.current_state, to);
            assert_eq!(changed.amount, fixtures::AMOUNT);
            assert_eq!(changed.from.organization_id, fixtures::AGENT);
            assert_eq!(get(&sandbox, "p-1").state, to);
        }

        // creation plus five transitions, newest first
        let states: Vec<PaymentState> = history(&sandbox, "p-1").iter().map(|p| p.state).collect();
        assert_eq!(
            states,
            vec![
                PaymentState::DebitSuccess,
                PaymentState::DebitInProgress,
                PaymentState::DebitRequest,
                PaymentState::CheckFundsSuccess,
                PaymentState::CheckFundsInProgress,
                PaymentState::CheckFundsRequest,
            ]
        );

        // the refund edge exists but no role may take it
        for creator in [fixtures::MERCHANT, fixtures::AGENT, fixtures::BANK] {
            let refund = move_to(&sandbox, creator, "p-1", PaymentState::Refunded);
            assert!(refund.response.message.starts_with("role can't change from state: DebitSuccess"));
        }
    }

    #[test]
    fn test_cancellation_after_failed_debit() {
        let sandbox = fixtures::deployed_sandbox();
        assert_ok(&create(&sandbox, fixtures::AGENT, "p-1", fixtures::AGENT));
        for (creator, to) in [
            (fixtures::BANK, PaymentState::CheckFundsInProgress),
            (fixtures::BANK, PaymentState::CheckFundsSuccess),
            (fixtures::AGENT, PaymentState::DebitRequest),
            (fixtures::BANK, PaymentState::DebitInProgress),
            (fixtures::BANK, PaymentState::DebitFail),
        ] {
            assert_ok(&move_to(&sandbox, creator, "p-1", to));
        }

        // only the paying agent may cancel
        let by_bank = move_to(&sandbox, fixtures::BANK, "p-1", PaymentState::TicketCanceled);
        assert_eq!(
            by_bank.response.message,
            "role can't change from state: DebitFail, role: BANK"
        );
        assert_ok(&move_to(&sandbox, fixtures::AGENT, "p-1", PaymentState::TicketCanceled));

        let after = move_to(&sandbox, fixtures::AGENT, "p-1", PaymentState::DebitRequest);
        assert_eq!(
            after.response.message,
            "role can't change from state: TicketCanceled, role: AGENT"
        );
        assert_eq!(get(&sandbox, "p-1").state, PaymentState::TicketCanceled);
    }

    #[test]
    fn test_failed_funds_check_is_final() {
        let sandbox = fixtures::deployed_sandbox();
        assert_ok(&create(&sandbox, fixtures::AGENT, "p-1", fixtures::AGENT));
        assert_ok(&move_to(&sandbox, fixtures::BANK, "p-1", PaymentState::CheckFundsInProgress));
        assert_ok(&move_to(&sandbox, fixtures::BANK, "p-1", PaymentState::CheckFundsFail));

        let retry = move_to(&sandbox, fixtures::BANK, "p-1", PaymentState::CheckFundsInProgress);
        assert_eq!(
            retry.response.message,
            "role can't change from state: CheckFundsFail, role: BANK"
        );
    }

    #[test]
    fn test_illegal_edge_by_the_right_role() {
        let sandbox = fixtures::deployed_sandbox();
        assert_ok(&create(&sandbox, fixtures::AGENT, "p-1", fixtures::AGENT));

        let skip = move_to(&sandbox, fixtures::BANK, "p-1", PaymentState::DebitSuccess);
        assert_eq!(
            skip.response.message,
            "can't change payment state from: CheckFundsRequest, to: DebitSuccess, role: BANK"
        );
        assert!(skip.event.is_none());
        assert_eq!(history(&sandbox, "p-1").len(), 1);
    }

    #[test]
    fn test_agent_registry_management() {
        let sandbox = fixtures::sandbox();
        assert_ok(&sandbox.deploy(fixtures::MERCHANT, &[]));

        let forbidden = sandbox.invoke(fixtures::AGENT, "/agent/add", &[fixtures::AGENT]);
        assert_eq!(
            forbidden.response.message,
            "only merchant can add agent, your role is: UNKNOWN"
        );

        assert_ok(&sandbox.invoke(fixtures::MERCHANT, "/agent/add", &[fixtures::AGENT]));
        assert_ok(&sandbox.invoke(fixtures::MERCHANT, "/agent/add", &[fixtures::AGENT]));

        let listed = sandbox.invoke(fixtures::BANK, "/agent/list", &[]);
        let agents: Vec<Member> = serde_json::from_slice(&listed.response.payload).unwrap();
        let ids: Vec<&str> = agents.iter().map(|a| a.organization_id.as_str()).collect();
        assert_eq!(ids, vec![fixtures::AGENT]);

        // now an agent, but still not the merchant
        let still_forbidden = sandbox.invoke(fixtures::AGENT, "/agent/add", &[fixtures::AGENT2]);
        assert_eq!(
            still_forbidden.response.message,
            "only merchant can add agent, your role is: AGENT"
        );
    }

    #[test]
    fn test_agent_added_before_joining_the_network() {
        let sandbox = fixtures::deployed_sandbox();

        let added = sandbox.invoke(fixtures::MERCHANT, "/agent/add", &["NewAgentMSP"]);
        assert_ok(&added);
        assert!(added.response.payload.is_empty());

        let listed = sandbox.invoke(fixtures::BANK, "/agent/list", &[]);
        assert_eq!(listed.response.message, "member not found: NewAgentMSP");
    }

    #[test]
    fn test_agent_acts_once_its_bank_confirms() {
        let sandbox = fixtures::deployed_sandbox();
        assert_ok(&sandbox.invoke(fixtures::MERCHANT, "/agent/add", &[fixtures::UNCONFIRMED]));

        let listed = sandbox.invoke(fixtures::BANK, "/agent/list", &[]);
        assert_eq!(
            listed.response.message,
            "member is not confirmed by bank: SomeMSP"
        );
        let early = create(&sandbox, fixtures::UNCONFIRMED, "p-1", fixtures::AGENT);
        assert_eq!(
            early.response.message,
            "only agent can add payment, your role is: UNKNOWN, id: SomeMSP"
        );

        assert!(sandbox.organizations().confirm(fixtures::UNCONFIRMED));
        let listed = sandbox.invoke(fixtures::BANK, "/agent/list", &[]);
        let agents: Vec<Member> = serde_json::from_slice(&listed.response.payload).unwrap();
        assert_eq!(agents.len(), 3);

        let late = create(&sandbox, fixtures::UNCONFIRMED, "p-1", fixtures::AGENT);
        assert_eq!(
            late.response.message,
            "agent itn mismatch in payment attributes AgentMSP"
        );
    }

    #[test]
    fn test_agents_cannot_touch_each_others_payments() {
        let sandbox = fixtures::deployed_sandbox();
        assert_ok(&create(&sandbox, fixtures::AGENT, "p-1", fixtures::AGENT));
        assert_ok(&move_to(&sandbox, fixtures::BANK, "p-1", PaymentState::CheckFundsInProgress));
        assert_ok(&move_to(&sandbox, fixtures::BANK, "p-1", PaymentState::CheckFundsSuccess));

        let foreign = move_to(&sandbox, fixtures::AGENT2, "p-1", PaymentState::DebitRequest);
        assert_eq!(
            foreign.response.message,
            "agent can't operate with payment of another agent. try to updatestate from: Agent2MSP, payment originally from: AgentMSP"
        );

        let meta = sandbox.invoke(fixtures::AGENT2, "/meta/set", &["p-1", "pnr", "EVIL"]);
        assert!(!meta.response.is_ok());
    }

    #[test]
    fn test_banks_cannot_touch_each_others_payments() {
        let sandbox = fixtures::deployed_sandbox();
        assert_ok(&create(&sandbox, fixtures::AGENT2, "p-2", fixtures::AGENT2));

        let foreign = move_to(&sandbox, fixtures::BANK, "p-2", PaymentState::CheckFundsInProgress);
        assert_eq!(foreign.response.message, "bank can't process payment of another bank");
        assert_ok(&move_to(&sandbox, fixtures::BANK2, "p-2", PaymentState::CheckFundsInProgress));
    }

    #[rstest]
    #[case::merchant(fixtures::MERCHANT, "only agent can add payment, your role is: MERCHANT, id: MerchantMSP")]
    #[case::bank(fixtures::BANK, "only agent can add payment, your role is: BANK, id: BankMSP")]
    #[case::stranger("GhostMSP", "only agent can add payment, your role is: UNKNOWN, id: GhostMSP")]
    fn test_only_agents_create_payments(#[case] creator: &str, #[case] expected: &str) {
        let sandbox = fixtures::deployed_sandbox();
        let invocation = create(&sandbox, creator, "p-1", fixtures::AGENT);
        assert_eq!(invocation.response.message, expected);
        assert!(invocation.event.is_none());
    }

    #[test]
    fn test_duplicate_creation_leaves_the_payment_unchanged() {
        let sandbox = fixtures::deployed_sandbox();
        assert_ok(&create(&sandbox, fixtures::AGENT, "p-1", fixtures::AGENT));
        let original = get(&sandbox, "p-1");

        let duplicate = create(&sandbox, fixtures::AGENT, "p-1", fixtures::AGENT);
        assert_eq!(duplicate.response.message, "payment already exists");
        assert!(duplicate.event.is_none());
        assert_eq!(get(&sandbox, "p-1"), original);
        assert_eq!(history(&sandbox, "p-1").len(), 1);
    }

    #[rstest]
    #[case::empty_state(r#"{"payment_id":"p-1","state":""}"#, "state is empty")]
    #[case::empty_id(r#"{"payment_id":"","state":"DebitRequest"}"#, "paymentId is empty")]
    #[case::missing_payment(r#"{"payment_id":"nope","state":"DebitRequest"}"#, "payment not found with id nope")]
    fn test_bad_state_requests(#[case] request: &str, #[case] expected: &str) {
        let sandbox = fixtures::deployed_sandbox();
        let invocation = sandbox.invoke(fixtures::BANK, "/updateState", &[request]);
        assert_eq!(invocation.response.message, expected);
    }

    #[test]
    fn test_rejected_invocations_write_nothing() {
        let sandbox = fixtures::deployed_sandbox();
        let keys_before = sandbox.ledger().len();

        let rejected = [
            sandbox.invoke(fixtures::MERCHANT, "/init", &[fixtures::AGENT]),
            create(&sandbox, fixtures::BANK, "p-1", fixtures::AGENT),
            move_to(&sandbox, fixtures::BANK, "p-1", PaymentState::CheckFundsInProgress),
            sandbox.invoke(fixtures::AGENT, "/agent/add", &["GhostMSP"]),
        ];

        for invocation in &rejected {
            assert!(!invocation.response.is_ok());
            assert!(invocation.event.is_none());
        }
        assert_eq!(sandbox.ledger().len(), keys_before);
        assert_eq!(
            sandbox.ledger().state("MERCHANT"),
            Some(fixtures::MERCHANT.as_bytes().to_vec())
        );
    }

    #[test]
    fn test_concurrent_creation_of_the_same_payment() {
        let sandbox = fixtures::deployed_sandbox();
        let payload = serde_json::to_string(&fixtures::create_payload("p-1", fixtures::AGENT)).unwrap();
        let args = vec![payload];

        // both transactions are prepared before either commits
        let mut first = sandbox.ledger().begin(fixtures::AGENT, "/create", &args);
        let mut second = sandbox.ledger().begin(fixtures::AGENT, "/create", &args);
        assert!(sandbox.contract().invoke(&mut first).is_ok());
        assert!(sandbox.contract().invoke(&mut second).is_ok());
        let second_tx = second.tx_id().to_string();

        assert!(sandbox.ledger().commit(first).unwrap().is_some());
        let conflict = sandbox.ledger().commit(second).unwrap_err();
        assert_eq!(
            conflict,
            ContractError::ReadConflict {
                key: "PAYMENT_p-1".to_string()
            }
        );

        let versions = history(&sandbox, "p-1");
        assert_eq!(versions.len(), 1);
        let raw = sandbox.invoke(fixtures::BANK, "/history", &["p-1"]);
        assert!(!String::from_utf8_lossy(&raw.response.payload).contains(&second_tx));
    }

    #[test]
    fn test_replicas_produce_identical_results() {
        let run = || {
            let sandbox = fixtures::deployed_sandbox();
            vec![
                create(&sandbox, fixtures::AGENT, "p-1", fixtures::AGENT),
                move_to(&sandbox, fixtures::BANK, "p-1", PaymentState::CheckFundsInProgress),
                sandbox.invoke(fixtures::AGENT, "/meta/set", &["p-1", "pnr", "ABC123"]),
                move_to(&sandbox, fixtures::BANK2, "p-1", PaymentState::CheckFundsSuccess),
                sandbox.invoke(fixtures::BANK, "/history", &["p-1"]),
            ]
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_registry_on_a_custom_channel() {
        let sandbox = Sandbox::new(ContractConfig::new("orgs", "system"));
        sandbox.register_members(fixtures::members());
        assert_ok(&sandbox.deploy(fixtures::MERCHANT, &[]));

        let merchant = sandbox.invoke(fixtures::BANK, "/merchant", &[]);
        assert_ok(&merchant);
    }

    /// Replay a fixture script and compare each outcome with expected.txt
    ///
    /// `expected.txt` holds one line per script invocation: `OK`, or `ERROR `
    /// followed by the exact error message.
    fn run_test_fixture(fixture_name: &str) {
        let fixture_dir = PathBuf::from(format!("tests/fixtures/{}", fixture_name));
        let script = fixture_dir.join("script.csv");
        let expected_path = fixture_dir.join("expected.txt");
        assert!(script.exists(), "Script not found: {}", script.display());

        let options = ReplayOptions {
            script,
            members: Path::new("tests/fixtures/members.json").to_path_buf(),
            merchant: None,
            deployer: fixtures::MERCHANT.to_string(),
            config: ContractConfig::default(),
            genesis_time: 0,
        };

        let mut output = Vec::new();
        replay(&options, &mut output).unwrap_or_else(|e| panic!("Replay failed: {}", e));

        let actual: Vec<String> = String::from_utf8(output)
            .unwrap()
            .lines()
            .skip(1)
            .map(|line| {
                let report: serde_json::Value = serde_json::from_str(line).unwrap();
                match report["status"].as_str() {
                    Some("OK") => "OK".to_string(),
                    _ => format!("ERROR {}", report["message"].as_str().unwrap_or_default()),
                }
            })
            .collect();

        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", expected_path.display(), e));
        let expected: Vec<String> = expected_output.lines().map(str::to_string).collect();

        assert_eq!(
            actual, expected,
            "\n\nOutcome mismatch for fixture: {}\n",
            fixture_name
        );
    }

    #[rstest]
    #[case("happy_path")]
    #[case("cancellation")]
    #[case("authorization")]
    #[case("payload_validation")]
    fn test_fixtures(#[case] fixture: &str) {
        run_test_fixture(fixture);
    }
}
