/// END-TO-END BOOTSTRAP TESTS
///
/// Configuration file -> registry -> token ledger -> event log.

#[cfg(test)]
mod bootstrap_tests {
    use std::fs;
    use std::sync::Arc;
    use verireg_root::registry::{
        CallerContext, JsonLinesEventSink, MemoryEventSink, RegistryEvent, ShardId, VerifierRecord,
    };
    use verireg_root::token::{Address, StandardToken, TokenLedger};
    use verireg_root::{bootstrap, init_logging};

    fn write_config(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_bootstrap_from_toml() {
        init_logging();
        let path = write_config(
            "verireg-bootstrap",
            r#"
token_ledger_address = "0xtoken"
owner = "0xowner"
custody_address = "0xregistry"
verifiers_per_shard = 2
"#,
        );
        let sink = Arc::new(MemoryEventSink::new());
        let mut registry = bootstrap(Some(path.as_path()), sink.clone()).unwrap();
        fs::remove_file(&path).ok();

        let alice = Address::from("0xa");
        let ctx = CallerContext::new(alice.clone());
        let mut token = StandardToken::new("0xtoken", "Human Standard Token", 18);
        token.mint(&alice, 500).unwrap();

        registry.create(&ctx, "127.0.0.1").unwrap();
        token.approve_and_call(&alice, &mut registry, 500, b"").unwrap();
        registry.withdraw(&ctx, 200, &mut token).unwrap();

        assert_eq!(registry.get_verifier(&alice).unwrap().balance, 300);
        assert_eq!(token.balance_of(&alice), 200);
        let names: Vec<_> = sink.events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["VerifierRegistered", "StakeDeposited", "StakeWithdrawn"]);
    }

    #[test]
    fn test_bootstrap_rejects_zero_capacity() {
        let path = write_config(
            "verireg-zero",
            r#"
token_ledger_address = "0xtoken"
owner = "0xowner"
custody_address = "0xregistry"
verifiers_per_shard = 0
"#,
        );
        let result = bootstrap(Some(path.as_path()), Arc::new(MemoryEventSink::new()));
        fs::remove_file(&path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn test_event_log_written_as_json_lines() {
        let path = write_config(
            "verireg-jsonl",
            r#"
token_ledger_address = "0xtoken"
owner = "0xowner"
custody_address = "0xregistry"
"#,
        );
        let sink = Arc::new(JsonLinesEventSink::new(Vec::new()));
        let mut registry = bootstrap(Some(path.as_path()), sink.clone()).unwrap();
        fs::remove_file(&path).ok();

        let alice = Address::from("0xa");
        let ctx = CallerContext::new(alice.clone());
        let mut token = StandardToken::new("0xtoken", "Human Standard Token", 18);
        token.mint(&alice, 1000).unwrap();

        registry.create(&ctx, "127.0.0.1").unwrap();
        registry.update(&ctx, "1.1.1.1").unwrap();
        token.approve_and_call(&alice, &mut registry, 1000, b"").unwrap();
        registry.withdraw(&ctx, 50, &mut token).unwrap();
        drop(registry);

        let sink = Arc::try_unwrap(sink).ok().unwrap();
        let log = String::from_utf8(sink.into_inner()).unwrap();
        let events: Vec<RegistryEvent> = log
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        let names: Vec<_> = events.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["VerifierRegistered", "VerifierUpdated", "StakeDeposited", "StakeWithdrawn"]
        );
        assert_eq!(events[1].verifier().unwrap().location, "1.1.1.1");
        assert_eq!(
            events[3],
            RegistryEvent::StakeWithdrawn {
                amount: 50,
                verifier: VerifierRecord {
                    id: alice,
                    location: "1.1.1.1".to_string(),
                    created: true,
                    balance: 950,
                    shard: ShardId(0),
                },
            }
        );
    }
}
