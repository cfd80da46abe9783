//! Round timer: start barrier and completion accounting shared by the
//! workers of one round
//!
//! All fields live behind one mutex. The clock starts once the barrier
//! releases and stops when the last worker completes; that worker reports
//! the elapsed time and resets the timer so it can serve another round.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use treepir_core::{BarrierMode, BenchConfig, Strategy};

use crate::error::{BenchError, Result};

/// How workers are held at the start of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartBarrier {
    /// Wait until every worker is ready; the last arrival starts the clock
    Latch,
    /// The first arrival sleeps for `delay` while holding the lock, then
    /// starts the clock. Later arrivals do not wait for each other.
    Heuristic { delay: Duration },
}

impl StartBarrier {
    pub fn for_round(config: &BenchConfig, strategy: Strategy, size_exponent: u32) -> Self {
        match config.barrier {
            BarrierMode::Latch => StartBarrier::Latch,
            BarrierMode::Heuristic => StartBarrier::Heuristic {
                delay: config.heuristic.for_round(strategy, size_exponent),
            },
        }
    }
}

#[derive(Debug, Default)]
struct TimerState {
    started: bool,
    start: Option<Instant>,
    arrived: usize,
    completed: usize,
    aborted: bool,
}

/// Point-in-time copy of the timer counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub started: bool,
    pub arrived: usize,
    pub completed: usize,
    pub aborted: bool,
}

pub struct RoundTimer {
    worker_count: usize,
    barrier: StartBarrier,
    state: Mutex<TimerState>,
    ready: Condvar,
}

impl RoundTimer {
    pub fn new(worker_count: usize, barrier: StartBarrier) -> Self {
        Self {
            worker_count,
            barrier,
            state: Mutex::new(TimerState::default()),
            ready: Condvar::new(),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn barrier(&self) -> StartBarrier {
        self.barrier
    }

    /// Block until the round clock is running
    pub fn wait_for_start(&self, worker: usize) -> Result<()> {
        let mut state = self.lock()?;
        if state.aborted {
            return Err(BenchError::RoundAborted);
        }

        match self.barrier {
            StartBarrier::Heuristic { delay } => {
                if !state.started {
                    state.started = true;
                    announce_wait(worker);
                    // Holding the lock here is what keeps the other workers out.
                    thread::sleep(delay);
                    state.start = Some(Instant::now());
                }
                Ok(())
            }
            StartBarrier::Latch => {
                state.arrived += 1;
                if state.arrived == 1 {
                    announce_wait(worker);
                }
                if state.arrived == self.worker_count {
                    state.started = true;
                    state.start = Some(Instant::now());
                    tracing::debug!(worker, "Last worker ready, releasing round");
                    self.ready.notify_all();
                    return Ok(());
                }

                let state = self
                    .ready
                    .wait_while(state, |s| !s.started && !s.aborted)
                    .map_err(|_| BenchError::TimerPoisoned)?;
                if state.aborted && !state.started {
                    return Err(BenchError::RoundAborted);
                }
                Ok(())
            }
        }
    }

    /// Count one finished worker
    ///
    /// Returns the round's elapsed time for the worker whose completion makes
    /// the count reach `worker_count`, `None` for everyone else.
    pub fn complete(&self, worker: usize) -> Result<Option<Duration>> {
        let mut state = self.lock()?;
        state.completed += 1;
        if state.completed < self.worker_count {
            return Ok(None);
        }

        let elapsed = state.start.map(|start| start.elapsed()).unwrap_or_default();
        println!("Total PIR time: {} ms", elapsed.as_millis());
        tracing::info!(
            worker,
            workers = self.worker_count,
            elapsed_ms = elapsed.as_millis() as u64,
            "Round complete"
        );

        state.started = false;
        state.start = None;
        state.arrived = 0;
        state.completed = 0;
        Ok(Some(elapsed))
    }

    /// Wake every waiter with [`BenchError::RoundAborted`]
    pub fn abort(&self) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.aborted = true;
        self.ready.notify_all();
    }

    pub fn snapshot(&self) -> Result<TimerSnapshot> {
        let state = self.lock()?;
        Ok(TimerSnapshot {
            started: state.started,
            arrived: state.arrived,
            completed: state.completed,
            aborted: state.aborted,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, TimerState>> {
        self.state.lock().map_err(|_| BenchError::TimerPoisoned)
    }
}

fn announce_wait(worker: usize) {
    println!();
    println!("Waiting for other threads before continuing...");
    println!();
    tracing::debug!(worker, "First worker at the start barrier");
}
