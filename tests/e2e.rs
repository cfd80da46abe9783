//! End-to-end integration tests for the parallel tree-PIR benchmark
//!
//! Tests the full pipeline: planner -> round controller -> workers -> engine

use std::io::Cursor;

use treepir_bench::{run_menu, BenchError, RoundController};
use treepir_core::{BenchConfig, PirParams, Strategy};
use treepir_engine::{
    build_params, plaintext_to_bytes, ItemLocation, LwePirEngine, PirClient, PirEngine, PirServer,
    PirSession, PlainEngine,
};

fn lwe_controller() -> RoundController<LwePirEngine> {
    let config = BenchConfig::default().with_pir_params(PirParams::insecure_test());
    RoundController::new(LwePirEngine::new(config.pir_params.clone()), config).unwrap()
}

/// Flips the first byte of every decoded plaintext
struct FlipFirstByte<E>(E);

struct FlipSession<S>(S);

impl<E: PirEngine> PirEngine for FlipFirstByte<E> {
    type Session = FlipSession<E::Session>;

    fn name(&self) -> &'static str {
        "flip-first-byte"
    }

    fn open_session(
        &self,
        item_count: u64,
        item_size: usize,
    ) -> treepir_engine::Result<Self::Session> {
        Ok(FlipSession(self.0.open_session(item_count, item_size)?))
    }
}

impl<S: PirSession> PirSession for FlipSession<S> {
    fn load_database(&mut self, database: Vec<u8>) -> treepir_engine::Result<()> {
        self.0.load_database(database)
    }

    fn locate(&self, index: u64) -> treepir_engine::Result<ItemLocation> {
        self.0.locate(index)
    }

    fn round_trip(&mut self, location: &ItemLocation) -> treepir_engine::Result<Vec<u8>> {
        let mut bytes = self.0.round_trip(location)?;
        if let Some(first) = bytes.get_mut(0) {
            *first = first.wrapping_add(1);
        }
        Ok(bytes)
    }
}

/// Every strategy retrieves correctly through the LWE engine
#[test]
fn test_lwe_rounds_all_strategies_e2e() {
    let controller = lwe_controller();

    for strategy in Strategy::ALL {
        for k in 1..=4 {
            let report = controller.run_round(strategy, k).unwrap();
            assert_eq!(report.outcomes.len(), k as usize);
            assert!(
                report.all_match(),
                "{strategy} k={k}: {:?}",
                report
                    .outcomes
                    .iter()
                    .map(|o| &o.mismatches)
                    .collect::<Vec<_>>()
            );
        }
    }
}

/// Outcomes carry the decoded item and the plan's item counts
#[test]
fn test_outcomes_match_plan_e2e() {
    let report = lwe_controller().run_round(Strategy::PerLayer, 4).unwrap();

    assert_eq!(report.plan.item_counts(), &[16, 8, 4, 2]);
    for (outcome, &count) in report.outcomes.iter().zip(report.plan.item_counts()) {
        assert_eq!(outcome.item_count, count);
        assert!(outcome.index < count);
        assert_eq!(outcome.decoded.len(), 32);
        assert!(outcome.mismatches.is_empty());
    }

    let summary = report.summary();
    assert_eq!(summary.workers, 4);
    assert_eq!(summary.total_items, 30);
    assert_eq!(summary.matched, 4);
}

/// The engine API driven by hand, as a worker does
#[test]
fn test_engine_flow_e2e() {
    let item_count = 100u64;
    let item_size = 32usize;
    let database: Vec<u8> = (0..item_count as usize * item_size)
        .map(|i| (i * 7 % 251) as u8)
        .collect();

    let ctx = build_params(&PirParams::insecure_test(), item_count, item_size).unwrap();
    let mut server = PirServer::new(ctx.clone());
    let mut client = PirClient::new(ctx).unwrap();

    server
        .set_evaluation_key(0, client.evaluation_key())
        .unwrap();
    server
        .set_database(database.clone(), item_count, item_size)
        .unwrap();
    server.preprocess_database().unwrap();
    client.set_hint(server.hint(0).unwrap()).unwrap();

    for index in [0u64, 9, 10, 57, 99] {
        let query = client
            .generate_query(client.plaintext_index(index).unwrap())
            .unwrap();
        let reply = server.generate_reply(&query, 0).unwrap();
        let bytes = plaintext_to_bytes(&client.decode_reply(&reply).unwrap());

        let offset = client.plaintext_offset(index).unwrap() * item_size;
        let start = index as usize * item_size;
        assert_eq!(
            &bytes[offset..offset + item_size],
            &database[start..start + item_size]
        );
    }
}

/// A corrupted reply is reported per worker and the round still completes
#[test]
fn test_corrupted_reply_reported_e2e() {
    let controller =
        RoundController::new(FlipFirstByte(PlainEngine), BenchConfig::default()).unwrap();
    let report = controller
        .run_round(Strategy::BalancedPartition, 4)
        .unwrap();

    assert!(!report.all_match());
    for outcome in &report.outcomes {
        assert_eq!(outcome.mismatches.len(), 1);
        assert_eq!(outcome.mismatches[0].position, 0);
    }
    assert_eq!(report.summary().mismatched, 4);
}

/// The plain engine runs large plans cheaply
#[test]
fn test_plain_engine_large_round_e2e() {
    let controller = RoundController::new(PlainEngine, BenchConfig::default()).unwrap();
    let report = controller.run_round(Strategy::WholeTree, 12).unwrap();
    assert_eq!(report.outcomes.len(), 12);
    assert!(report.outcomes.iter().all(|o| o.item_count == 8191));
    assert!(report.all_match());
}

/// Degenerate exponent is rejected before anything runs
#[test]
fn test_zero_exponent_rejected_e2e() {
    let result = lwe_controller().run_round(Strategy::PerLayer, 0);
    assert!(matches!(result, Err(BenchError::Core(_))));
}

/// Menu session over the LWE engine, with invalid input in between
#[test]
fn test_menu_session_e2e() {
    let controller = lwe_controller();
    let mut out = Vec::new();
    let stats = run_menu(&controller, Cursor::new("1\n2\nx\n3\n3\n4\n"), &mut out).unwrap();

    assert_eq!(stats.rounds, 2);
    assert_eq!(stats.invalid_inputs, 1);
    assert_eq!(stats.mismatched_workers, 0);

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("***** Menu - Parallel *****").count(), 4);
}

/// Config file drives the controller
#[test]
fn test_config_file_e2e() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.json");

    BenchConfig::default()
        .with_item_size(8)
        .with_pir_params(PirParams::insecure_test())
        .save(&path)
        .unwrap();

    let config = BenchConfig::load(&path).unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["item_size"], 8);

    let controller =
        RoundController::new(LwePirEngine::new(config.pir_params.clone()), config).unwrap();
    let report = controller.run_round(Strategy::WholeTree, 2).unwrap();
    assert!(report.outcomes.iter().all(|o| o.decoded.len() == 8));
    assert!(report.all_match());
}
