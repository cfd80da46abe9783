use criterion::{BatchSize, BenchmarkId, Criterion, Throughput};
use rand::{thread_rng, Rng};
use treepir_core::{PartitionPlan, PirParams, Strategy};
use treepir_engine::{LwePirEngine, PirEngine, PirSession};

const ITEM_SIZE: usize = 32;

fn round_trip(criterion: &mut Criterion, strategy: Strategy, size_exponent: u32) {
    let plan = PartitionPlan::new(strategy, size_exponent).unwrap();
    let item_count = plan.max_items();
    let engine = LwePirEngine::new(PirParams::default());

    let mut rng = thread_rng();
    let mut database = vec![0u8; item_count as usize * ITEM_SIZE];
    rng.fill(database.as_mut_slice());

    let mut session = engine.open_session(item_count, ITEM_SIZE).unwrap();
    session.load_database(database.clone()).unwrap();

    let mut group = criterion.benchmark_group("round_trip");
    group.throughput(Throughput::Bytes(database.len() as u64));
    group.bench_function(
        BenchmarkId::new(strategy.to_string(), format!("k{size_exponent}")),
        |b| {
            b.iter_batched(
                || thread_rng().gen_range(0..item_count),
                |index| {
                    let location = session.locate(index).unwrap();
                    session.round_trip(&location).unwrap()
                },
                BatchSize::SmallInput,
            )
        },
    );
    group.finish();
}

fn main() {
    let mut criterion = Criterion::default().configure_from_args();

    for k in [8, 10, 12] {
        for strategy in Strategy::ALL {
            round_trip(&mut criterion, strategy, k);
        }
    }

    criterion.final_summary();
}
