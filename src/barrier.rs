//! Reusable all-parties barrier with cooperative abort
//!
//! `std::sync::Barrier` has no way to signal failure, so a party that dies
//! would leave everyone else blocked forever. [`CycleBarrier`] adds an
//! explicit [`abort`](CycleBarrier::abort): once any party aborts, every
//! waiter (current and future) gets [`Error::BrokenBarrier`] instead of
//! blocking. The broken state is sticky for the remainder of the run.

use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};

/// A cyclic barrier for a fixed number of parties
///
/// Parties call [`wait`](CycleBarrier::wait) once per phase; when the last
/// party arrives, the whole generation is released and the barrier resets
/// for the next phase.
pub struct CycleBarrier {
    parties: usize,
    state: Mutex<BarrierState>,
    cond: Condvar,
}

struct BarrierState {
    arrived: usize,
    generation: u64,
    broken: bool,
}

impl CycleBarrier {
    /// Create a barrier for `parties` participants
    ///
    /// # Panics
    /// Panics if `parties` is zero.
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "barrier needs at least one party");
        Self {
            parties,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                broken: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Number of participating parties
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Block until all parties have arrived, or the barrier is aborted
    ///
    /// Returns `Err(BrokenBarrier)` immediately if the barrier was already
    /// aborted, or as soon as any party aborts while waiting.
    pub fn wait(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.broken {
            return Err(Error::BrokenBarrier);
        }

        state.arrived += 1;
        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.cond.notify_all();
            return Ok(());
        }

        let generation = state.generation;
        while state.generation == generation && !state.broken {
            self.cond.wait(&mut state);
        }

        if state.broken {
            Err(Error::BrokenBarrier)
        } else {
            Ok(())
        }
    }

    /// Break the barrier, releasing every current and future waiter
    ///
    /// Idempotent. Waiters observe the break as `Err(BrokenBarrier)`.
    pub fn abort(&self) {
        let mut state = self.state.lock();
        state.broken = true;
        self.cond.notify_all();
    }

    /// Whether the barrier has been aborted
    pub fn is_broken(&self) -> bool {
        self.state.lock().broken
    }
}
