//! One worker's share of a round: build a database slice, retrieve one random
//! item through the engine, verify it

use rand::{thread_rng, Rng};
use std::time::{Duration, Instant};

use treepir_engine::{EngineError, PirEngine, PirSession};

use crate::error::Result;
use crate::timer::RoundTimer;

/// What a worker is asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSpec {
    pub worker: usize,
    pub item_count: u64,
    pub item_size: usize,
}

/// A decoded byte that differs from the reference copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteMismatch {
    /// Byte position inside the item
    pub position: usize,
    pub expected: u8,
    pub actual: u8,
}

/// Result of a worker's retrieval
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    pub worker: usize,
    pub item_count: u64,
    /// Queried item index
    pub index: u64,
    /// Item bytes as decoded by the client
    pub decoded: Vec<u8>,
    pub mismatches: Vec<ByteMismatch>,
    pub matches: bool,
    /// Setup time before the start barrier (session, database, preprocessing)
    pub setup: Duration,
    /// Query to decoded bytes, measured by this worker alone
    pub retrieval: Duration,
}

/// A finished worker
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub outcome: RetrievalOutcome,
    /// Set only for the worker that completed last
    pub round_elapsed: Option<Duration>,
}

/// Aborts the round timer unless the worker made it past the start barrier,
/// so latch waiters never wait on a worker that is gone.
struct BarrierGuard<'a> {
    timer: &'a RoundTimer,
    armed: bool,
}

impl<'a> BarrierGuard<'a> {
    fn new(timer: &'a RoundTimer) -> Self {
        Self { timer, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for BarrierGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.timer.abort();
        }
    }
}

/// Run one worker to completion
pub fn run_session<E: PirEngine>(
    engine: &E,
    spec: &WorkerSpec,
    timer: &RoundTimer,
) -> Result<WorkerReport> {
    let mut guard = BarrierGuard::new(timer);
    let setup_start = Instant::now();

    let mut session = engine.open_session(spec.item_count, spec.item_size)?;

    let mut rng = thread_rng();
    let (database, reference) = random_database(spec.item_count, spec.item_size, &mut rng)?;

    session.load_database(database)?;

    let index = rng.gen_range(0..spec.item_count);
    let location = session.locate(index)?;
    let setup = setup_start.elapsed();

    tracing::debug!(
        worker = spec.worker,
        item_count = spec.item_count,
        index,
        setup_ms = setup.as_millis() as u64,
        "Worker ready"
    );

    timer.wait_for_start(spec.worker)?;
    guard.disarm();

    let retrieval_start = Instant::now();
    let plaintext = session.round_trip(&location)?;
    let retrieval = retrieval_start.elapsed();

    let round_elapsed = timer.complete(spec.worker)?;

    let start = location.offset * spec.item_size;
    let decoded = plaintext
        .get(start..start + spec.item_size)
        .ok_or(EngineError::LengthMismatch {
            what: "decoded plaintext",
            expected: start + spec.item_size,
            actual: plaintext.len(),
        })?
        .to_vec();

    let expected_start = index as usize * spec.item_size;
    let expected = &reference[expected_start..expected_start + spec.item_size];
    let mismatches = compare(expected, &decoded);
    let matches = mismatches.is_empty();

    report(spec.worker, index, &mismatches);

    Ok(WorkerReport {
        outcome: RetrievalOutcome {
            worker: spec.worker,
            item_count: spec.item_count,
            index,
            decoded,
            mismatches,
            matches,
            setup,
            retrieval,
        },
        round_elapsed,
    })
}

/// Random database plus its verification copy
///
/// Both buffers are reserved up front so an oversized round fails with
/// [`EngineError::TooLarge`] instead of aborting the process.
fn random_database(
    item_count: u64,
    item_size: usize,
    rng: &mut impl Rng,
) -> Result<(Vec<u8>, Vec<u8>)> {
    let too_large = || EngineError::TooLarge { item_count };
    let len = usize::try_from(item_count)
        .ok()
        .and_then(|count| count.checked_mul(item_size))
        .ok_or_else(too_large)?;

    let mut database = Vec::new();
    database.try_reserve_exact(len).map_err(|_| too_large())?;
    database.resize(len, 0);
    rng.fill(database.as_mut_slice());

    let mut reference = Vec::new();
    reference.try_reserve_exact(len).map_err(|_| too_large())?;
    reference.extend_from_slice(&database);

    Ok((database, reference))
}

/// Byte-by-byte comparison of a decoded item against its reference
pub fn compare(expected: &[u8], decoded: &[u8]) -> Vec<ByteMismatch> {
    let mut mismatches: Vec<ByteMismatch> = expected
        .iter()
        .zip(decoded)
        .enumerate()
        .filter(|(_, (e, d))| e != d)
        .map(|(position, (&expected, &actual))| ByteMismatch {
            position,
            expected,
            actual,
        })
        .collect();

    // A short decode leaves the trailing bytes unmatched.
    for (position, &byte) in expected.iter().enumerate().skip(decoded.len()) {
        mismatches.push(ByteMismatch {
            position,
            expected: byte,
            actual: 0,
        });
    }
    mismatches
}

fn report(worker: usize, index: u64, mismatches: &[ByteMismatch]) {
    if mismatches.is_empty() {
        println!("Worker {worker}: PIR result correct!");
        return;
    }

    for m in mismatches {
        println!("Worker {worker}: elems {}, db {}", m.actual, m.expected);
        tracing::warn!(
            worker,
            index,
            position = m.position,
            expected = m.expected,
            actual = m.actual,
            "Decoded byte differs from database"
        );
    }
    println!("Worker {worker}: PIR result wrong!");
}
