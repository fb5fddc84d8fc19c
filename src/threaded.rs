//! Shared-memory parallel solver
//!
//! One worker thread per row band, all synchronized with the main thread
//! through a shared [`CycleBarrier`]. Each iteration has two barrier
//! phases: phase one ends when every band has been written into `next`,
//! phase two ends when the main thread has swapped the buffers and
//! re-applied the boundary and hotspot. No worker can read `current` for
//! iteration i+1 before the swap for iteration i has fully completed.
//!
//! Workers never write shared state directly: each computes its band into a
//! private scratch grid against the read-locked `current`, then splices the
//! finished rows into `next` under a short lock. Bands are disjoint, so the
//! writes never overlap.

use crate::barrier::CycleBarrier;
use crate::grid::{Grid, GridBuffer};
use crate::params::{Hotspot, SimulationParameters};
use crate::partition::{partition_interior, RowBand};
use crate::report::SolveReport;
use crate::stencil::Stencil;
use crate::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::thread;
use std::time::Instant;

/// Options for a threaded run
#[derive(Debug, Clone)]
pub struct ThreadedOptions {
    /// Number of worker threads to spawn
    pub num_threads: usize,

    /// Pin each worker thread to a CPU core
    pub pin_workers: bool,
}

impl ThreadedOptions {
    /// Create options for the given thread count
    pub fn new(num_threads: usize) -> Self {
        Self {
            num_threads,
            pin_workers: false,
        }
    }

    /// Enable CPU core pinning for worker threads
    pub fn with_pinned_workers(mut self, pin: bool) -> Self {
        self.pin_workers = pin;
        self
    }
}

/// Multi-threaded heat diffusion solver over shared memory
pub struct ThreadedSolver {
    params: SimulationParameters,
    initial_temp: f64,
    hotspot: Option<Hotspot>,
}

impl ThreadedSolver {
    /// Create a solver for the given parameters and initial conditions
    pub fn new(
        params: SimulationParameters,
        initial_temp: f64,
        hotspot: Option<Hotspot>,
    ) -> Result<Self> {
        if let Some(hotspot) = &hotspot {
            hotspot.validate(&params)?;
        }
        Ok(Self {
            params,
            initial_temp,
            hotspot,
        })
    }

    /// Run the simulation for `num_iterations` time steps
    ///
    /// The thread count is capped at the number of interior rows (a worker
    /// with zero rows is never spawned); a reduction is reported as a
    /// warning. On a broken barrier the run ends early and the report
    /// carries whatever `current` held after the last completed iteration.
    pub fn solve(&self, num_iterations: usize, options: &ThreadedOptions) -> Result<SolveReport> {
        if options.num_threads == 0 {
            return Err(Error::InvalidConfig(
                "num_threads must be at least 1".to_string(),
            ));
        }

        let interior_rows = self.params.interior_rows();
        let num_threads = if options.num_threads > interior_rows {
            eprintln!(
                "Warning: reducing thread count from {} to {}: only {} interior rows to assign",
                options.num_threads, interior_rows, interior_rows
            );
            interior_rows
        } else {
            options.num_threads
        };
        let bands = partition_interior(interior_rows, num_threads)?;

        let buffer = GridBuffer::new(
            self.params.grid_size(),
            self.initial_temp,
            self.params.boundary_temp(),
            self.hotspot.as_ref(),
        );
        let (current_grid, next_grid) = buffer.into_parts();
        let current = RwLock::new(current_grid);
        let next = Mutex::new(next_grid);
        let barrier = CycleBarrier::new(num_threads + 1);
        let stencil = Stencil::new(&self.params);

        let started = Instant::now();
        let mut completed = 0;

        thread::scope(|scope| {
            for band in &bands {
                scope.spawn(|| {
                    if options.pin_workers {
                        pin_to_core(band.id);
                    }
                    self.band_worker(*band, &stencil, &current, &next, &barrier, num_iterations);
                });
            }

            for _ in 0..num_iterations {
                // Phase one: every band has been written into `next`
                if barrier.wait().is_err() {
                    break;
                }
                {
                    let mut current = current.write();
                    let mut next = next.lock();
                    std::mem::swap(&mut *current, &mut *next);
                    current.apply_boundary(self.params.boundary_temp());
                    if let Some(hotspot) = &self.hotspot {
                        current.apply_hotspot(hotspot);
                    }
                }
                completed += 1;
                // Phase two: workers may now read the swapped `current`
                if barrier.wait().is_err() {
                    break;
                }
            }
        });

        Ok(SolveReport {
            grid: current.into_inner(),
            iterations_completed: completed,
            iterations_requested: num_iterations,
            elapsed: started.elapsed(),
        })
    }

    /// Iteration loop of one band worker
    fn band_worker(
        &self,
        band: RowBand,
        stencil: &Stencil,
        current: &RwLock<Grid>,
        next: &Mutex<Grid>,
        barrier: &CycleBarrier,
        num_iterations: usize,
    ) {
        let grid_size = self.params.grid_size();
        let last_col = grid_size - 1;
        let mut scratch = Grid::filled(band.num_rows(), grid_size, self.params.boundary_temp());

        for _ in 0..num_iterations {
            {
                let current = current.read();
                for row in band.start_row..band.end_row {
                    let local_row = row - band.start_row;
                    for col in 1..last_col {
                        let value = match self.hotspot {
                            Some(h) if h.row == row && h.col == col => h.temp,
                            _ => stencil.update_cell(&current, row, col),
                        };
                        scratch.set(local_row, col, value);
                    }
                }
            }
            next.lock().write_rows(band.start_row, &scratch);

            // Phase one: this band is done computing
            if barrier.wait().is_err() {
                return;
            }
            // Phase two: wait for the main thread's swap to complete
            if barrier.wait().is_err() {
                return;
            }
        }
    }
}

/// Pin the calling thread to a core chosen by worker id
fn pin_to_core(worker_id: usize) {
    if let Some(core_ids) = core_affinity::get_core_ids() {
        if !core_ids.is_empty() {
            core_affinity::set_for_current(core_ids[worker_id % core_ids.len()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequential::SequentialSolver;

    const TOLERANCE: f64 = 1e-8;

    fn compare_with_sequential(
        grid_size: usize,
        hotspot: Option<Hotspot>,
        num_iterations: usize,
        num_threads: usize,
    ) {
        let params = SimulationParameters::new(grid_size, 0.1, 0.1, 1.0, 0.0).unwrap();
        let mut sequential = SequentialSolver::new(params, 20.0, hotspot).unwrap();
        let expected = sequential.solve(num_iterations);

        let threaded = ThreadedSolver::new(params, 20.0, hotspot).unwrap();
        let report = threaded
            .solve(num_iterations, &ThreadedOptions::new(num_threads))
            .unwrap();

        assert!(report.is_complete());
        assert!(
            expected.grid.max_abs_diff(&report.grid) <= TOLERANCE,
            "threaded result diverged with {} threads",
            num_threads
        );
    }

    #[test]
    fn test_matches_sequential_all_thread_counts() {
        // Every legal thread count for a 5x5 grid (3 interior rows)
        for num_threads in 1..=3 {
            compare_with_sequential(5, None, 25, num_threads);
        }
    }

    #[test]
    fn test_matches_sequential_with_hotspot() {
        let hotspot = Some(Hotspot::new(6, 6, 100.0));
        for num_threads in [1, 2, 5, 10] {
            compare_with_sequential(12, hotspot, 40, num_threads);
        }
    }

    #[test]
    fn test_thread_count_reduced_to_interior_rows() {
        // 8 threads requested, 3 interior rows: capped, still correct
        compare_with_sequential(5, Some(Hotspot::new(2, 2, 100.0)), 15, 8);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let params = SimulationParameters::new(5, 0.1, 0.1, 1.0, 0.0).unwrap();
        let solver = ThreadedSolver::new(params, 20.0, None).unwrap();
        assert!(matches!(
            solver.solve(1, &ThreadedOptions::new(0)),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invariants_after_run() {
        let params = SimulationParameters::new(9, 0.1, 0.1, 1.0, 0.0).unwrap();
        let hotspot = Hotspot::new(4, 4, 100.0);
        let solver = ThreadedSolver::new(params, 20.0, Some(hotspot)).unwrap();
        let report = solver.solve(30, &ThreadedOptions::new(3)).unwrap();

        for i in 0..9 {
            assert_eq!(report.grid.get(0, i), 0.0);
            assert_eq!(report.grid.get(8, i), 0.0);
            assert_eq!(report.grid.get(i, 0), 0.0);
            assert_eq!(report.grid.get(i, 8), 0.0);
        }
        assert_eq!(report.grid.get(4, 4), 100.0);
    }

    #[test]
    fn test_pinned_workers_run() {
        let params = SimulationParameters::new(6, 0.1, 0.1, 1.0, 0.0).unwrap();
        let solver = ThreadedSolver::new(params, 20.0, None).unwrap();
        let options = ThreadedOptions::new(2).with_pinned_workers(true);
        let report = solver.solve(5, &options).unwrap();
        assert!(report.is_complete());
    }
}
