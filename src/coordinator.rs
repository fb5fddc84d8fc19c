//! Master side of the distributed solver
//!
//! The coordinator owns the global grid pair, accepts exactly
//! `num_workers` connections, assigns one row band per worker in accept
//! order, and drives one handler thread per connection. Every iteration,
//! each handler copies its band and halo rows out of the global `current`
//! grid (workers never observe a live reference), ships an
//! `ITERATION_UPDATE`, blocks on the `SUB_GRID_RESULT`, and splices the
//! returned rows into the global `next` grid. All handlers and the main
//! thread then meet at a shared two-phase barrier; the main thread swaps
//! the buffers and re-applies boundary and hotspot between the phases.
//!
//! Any transport or protocol error in a handler aborts the barrier, so no
//! sibling and not the main thread can block forever on a partner that
//! will never arrive. The run then ends early with the grid as of the last
//! fully completed iteration; handlers send `TERMINATE` best-effort on
//! every exit path.

use crate::barrier::CycleBarrier;
use crate::grid::{Grid, GridBuffer};
use crate::params::{Hotspot, SimulationParameters};
use crate::partition::{partition_interior, RowBand};
use crate::report::SolveReport;
use crate::wire::{read_message, write_message, Message};
use crate::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Instant;

/// Configuration of a distributed run
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Address to listen on; port 0 picks an ephemeral port
    pub bind_addr: String,

    /// Number of worker connections to wait for
    pub num_workers: usize,
}

impl CoordinatorConfig {
    /// Create a configuration expecting `num_workers` workers
    pub fn new(num_workers: usize) -> Self {
        Self {
            bind_addr: "127.0.0.1:12345".to_string(),
            num_workers,
        }
    }

    /// Set the listen address
    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }
}

/// One connected worker: id, assigned band, and its transport
///
/// The coordinator exclusively owns the worker-to-transport mapping; each
/// link is handed to exactly one handler thread.
struct WorkerLink {
    id: usize,
    band: RowBand,
    stream: TcpStream,
    addr: SocketAddr,
}

/// A handler-reported worker failure, delivered to the main thread
struct WorkerFailure {
    worker_id: usize,
    error: Error,
}

/// Master of a distributed heat diffusion run
pub struct Coordinator {
    params: SimulationParameters,
    initial_temp: f64,
    hotspot: Option<Hotspot>,
    config: CoordinatorConfig,
    listener: TcpListener,
}

impl Coordinator {
    /// Bind the listening socket and validate the initial conditions
    pub fn bind(
        params: SimulationParameters,
        initial_temp: f64,
        hotspot: Option<Hotspot>,
        config: CoordinatorConfig,
    ) -> Result<Self> {
        if let Some(hotspot) = &hotspot {
            hotspot.validate(&params)?;
        }
        if config.num_workers == 0 {
            return Err(Error::InvalidConfig(
                "num_workers must be at least 1".to_string(),
            ));
        }
        let listener = TcpListener::bind(&config.bind_addr)?;
        Ok(Self {
            params,
            initial_temp,
            hotspot,
            config,
            listener,
        })
    }

    /// The bound listen address (useful with an ephemeral port)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the distributed simulation for `num_iterations` time steps
    ///
    /// Partitioning is checked before any worker is accepted, so an
    /// impossible worker count fails fast. Returns the final grid along
    /// with how many iterations actually completed; lost workers shorten
    /// the run but never corrupt it.
    pub fn run(&self, num_iterations: usize) -> Result<SolveReport> {
        let bands = partition_interior(self.params.interior_rows(), self.config.num_workers)?;

        let mut links = Vec::with_capacity(self.config.num_workers);
        for (id, band) in bands.into_iter().enumerate() {
            let (stream, addr) = self.listener.accept()?;
            eprintln!(
                "Coordinator: worker {} connected from {}, assigned rows [{}, {})",
                id, addr, band.start_row, band.end_row
            );
            links.push(WorkerLink {
                id,
                band,
                stream,
                addr,
            });
        }

        let buffer = GridBuffer::new(
            self.params.grid_size(),
            self.initial_temp,
            self.params.boundary_temp(),
            self.hotspot.as_ref(),
        );
        let (current_grid, next_grid) = buffer.into_parts();
        let current = RwLock::new(current_grid);
        let next = Mutex::new(next_grid);
        let barrier = CycleBarrier::new(self.config.num_workers + 1);
        let (failure_tx, failure_rx) = flume::unbounded::<WorkerFailure>();

        let started = Instant::now();
        let mut completed = 0;

        thread::scope(|scope| {
            for link in links {
                let failure_tx = failure_tx.clone();
                scope.spawn(|| {
                    self.worker_handler(link, &barrier, &current, &next, failure_tx, num_iterations);
                });
            }
            drop(failure_tx);

            for _ in 0..num_iterations {
                // Phase one: every band result has landed in `next`
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
                // Phase two: handlers may now slice the swapped `current`
                if barrier.wait().is_err() {
                    break;
                }
            }
        });

        for failure in failure_rx.try_iter() {
            eprintln!(
                "Coordinator: worker {} failed: {}",
                failure.worker_id, failure.error
            );
        }

        Ok(SolveReport {
            grid: current.into_inner(),
            iterations_completed: completed,
            iterations_requested: num_iterations,
            elapsed: started.elapsed(),
        })
    }

    /// Full lifecycle of one worker connection
    ///
    /// Aborts the shared barrier on any failure of its own, stays quiet
    /// when a sibling broke the barrier first, and always attempts a final
    /// `TERMINATE` so the remote side can exit gracefully.
    fn worker_handler(
        &self,
        link: WorkerLink,
        barrier: &CycleBarrier,
        current: &RwLock<Grid>,
        next: &Mutex<Grid>,
        failure_tx: flume::Sender<WorkerFailure>,
        num_iterations: usize,
    ) {
        let WorkerLink {
            id,
            band,
            mut stream,
            addr,
        } = link;

        match self.drive_worker(&mut stream, band, barrier, current, next, num_iterations) {
            Ok(()) => {}
            Err(Error::BrokenBarrier) => {
                // A sibling already failed and aborted; just unwind
            }
            Err(error) => {
                barrier.abort();
                let _ = failure_tx.send(WorkerFailure {
                    worker_id: id,
                    error,
                });
            }
        }

        let _ = write_message(&mut stream, &Message::Terminate);
        eprintln!("Coordinator: connection to worker {} ({}) closed", id, addr);
    }

    /// Per-iteration exchange with one worker
    fn drive_worker(
        &self,
        stream: &mut TcpStream,
        band: RowBand,
        barrier: &CycleBarrier,
        current: &RwLock<Grid>,
        next: &Mutex<Grid>,
        num_iterations: usize,
    ) -> Result<()> {
        let grid_size = self.params.grid_size();

        write_message(
            stream,
            &Message::InitialConfig {
                grid_size,
                alpha: self.params.alpha(),
                dt: self.params.dt(),
                dx: self.params.dx(),
                boundary_temp: self.params.boundary_temp(),
            },
        )?;

        for _ in 0..num_iterations {
            // Copies, not references: the worker must never observe grid
            // memory the main thread mutates between barrier phases.
            let (sub_grid, halo_top, halo_bottom) = {
                let current = current.read();
                let sub_grid = current.row_band(band.start_row, band.end_row);
                let halo_top = if band.start_row > 1 {
                    Some(current.copy_row(band.start_row - 1))
                } else {
                    None
                };
                let halo_bottom = if band.end_row < grid_size - 1 {
                    Some(current.copy_row(band.end_row))
                } else {
                    None
                };
                (sub_grid, halo_top, halo_bottom)
            };
            let hotspot = self
                .hotspot
                .and_then(|h| h.relative_to(band.start_row, band.end_row));

            write_message(
                stream,
                &Message::IterationUpdate {
                    sub_grid,
                    halo_top,
                    halo_bottom,
                    hotspot,
                },
            )?;

            match read_message(stream)? {
                Message::SubGridResult { sub_grid } => {
                    if sub_grid.rows() != band.num_rows() || sub_grid.cols() != grid_size {
                        return Err(Error::ProtocolViolation(format!(
                            "result shape {}x{} does not match band of {} rows",
                            sub_grid.rows(),
                            sub_grid.cols(),
                            band.num_rows()
                        )));
                    }
                    next.lock().write_rows(band.start_row, &sub_grid);
                }
                other => {
                    return Err(Error::ProtocolViolation(format!(
                        "expected SUB_GRID_RESULT, got {}",
                        other.kind()
                    )));
                }
            }

            // Phase one: result delivered. Phase two: swap completed.
            barrier.wait()?;
            barrier.wait()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequential::SequentialSolver;
    use crate::worker::WorkerNode;
    use std::io::Write as _;
    use std::time::Duration;

    const TOLERANCE: f64 = 1e-8;

    fn params(grid_size: usize) -> SimulationParameters {
        SimulationParameters::new(grid_size, 0.1, 0.1, 1.0, 0.0).unwrap()
    }

    fn run_distributed(
        grid_size: usize,
        hotspot: Option<Hotspot>,
        num_iterations: usize,
        num_workers: usize,
    ) -> SolveReport {
        let config = CoordinatorConfig::new(num_workers).with_bind_addr("127.0.0.1:0");
        let coordinator =
            Coordinator::bind(params(grid_size), 20.0, hotspot, config).unwrap();
        let addr = coordinator.local_addr().unwrap();

        let mut worker_threads = Vec::new();
        for _ in 0..num_workers {
            worker_threads.push(std::thread::spawn(move || {
                WorkerNode::new(addr)
                    .with_connect_timeout(Duration::from_secs(5))
                    .run()
            }));
        }

        let report = coordinator.run(num_iterations).unwrap();
        for handle in worker_threads {
            handle.join().unwrap().unwrap();
        }
        report
    }

    #[test]
    fn test_matches_sequential_all_worker_counts() {
        let mut sequential = SequentialSolver::new(params(5), 20.0, None).unwrap();
        let expected = sequential.solve(10);

        // Every legal worker count for a 5x5 grid (3 interior rows)
        for num_workers in 1..=3 {
            let report = run_distributed(5, None, 10, num_workers);
            assert!(report.is_complete());
            assert!(
                expected.grid.max_abs_diff(&report.grid) <= TOLERANCE,
                "distributed result diverged with {} workers",
                num_workers
            );
        }
    }

    #[test]
    fn test_matches_sequential_with_hotspot() {
        let hotspot = Some(Hotspot::new(5, 5, 100.0));
        let mut sequential = SequentialSolver::new(params(10), 20.0, hotspot).unwrap();
        let expected = sequential.solve(20);

        let report = run_distributed(10, hotspot, 20, 3);
        assert!(report.is_complete());
        assert!(expected.grid.max_abs_diff(&report.grid) <= TOLERANCE);
        assert_eq!(report.grid.get(5, 5), 100.0);
    }

    #[test]
    fn test_too_many_workers_fails_before_accepting() {
        let config = CoordinatorConfig::new(5).with_bind_addr("127.0.0.1:0");
        let coordinator = Coordinator::bind(params(5), 20.0, None, config).unwrap();
        // No workers connect; partitioning must fail before the accept loop
        assert!(matches!(
            coordinator.run(10),
            Err(Error::TooManyWorkers {
                workers: 5,
                interior_rows: 3
            })
        ));
    }

    #[test]
    fn test_zero_workers_rejected_at_bind() {
        let config = CoordinatorConfig::new(0).with_bind_addr("127.0.0.1:0");
        assert!(matches!(
            Coordinator::bind(params(5), 20.0, None, config),
            Err(Error::InvalidConfig(_))
        ));
    }

    /// A worker that behaves correctly for a fixed number of iterations,
    /// then drops its connection mid-run.
    fn flaky_worker(addr: SocketAddr, good_iterations: usize) {
        let mut stream = TcpStream::connect(addr).unwrap();
        let config = read_message(&mut stream).unwrap();
        let params = match config {
            Message::InitialConfig {
                grid_size,
                alpha,
                dt,
                dx,
                boundary_temp,
            } => SimulationParameters::new(grid_size, alpha, dt, dx, boundary_temp).unwrap(),
            other => panic!("unexpected first message: {}", other.kind()),
        };
        let stencil = crate::stencil::Stencil::new(&params);

        for _ in 0..good_iterations {
            let update = read_message(&mut stream).unwrap();
            if let Message::IterationUpdate {
                sub_grid,
                halo_top,
                halo_bottom,
                hotspot,
            } = update
            {
                let reply = crate::worker::compute_band(
                    &params, &stencil, &sub_grid, halo_top, halo_bottom, hotspot,
                )
                .unwrap();
                write_message(&mut stream, &Message::SubGridResult { sub_grid: reply }).unwrap();
            } else {
                panic!("unexpected message: {}", update.kind());
            }
        }
        // Drop the stream without a reply: simulated mid-run crash
        let _ = stream.flush();
    }

    #[test]
    fn test_worker_disconnect_returns_partial_result() {
        const GOOD_ITERATIONS: usize = 2;
        let config = CoordinatorConfig::new(2).with_bind_addr("127.0.0.1:0");
        let coordinator = Coordinator::bind(params(6), 20.0, None, config).unwrap();
        let addr = coordinator.local_addr().unwrap();

        let healthy = std::thread::spawn(move || WorkerNode::new(addr).run());
        let flaky = std::thread::spawn(move || flaky_worker(addr, GOOD_ITERATIONS));

        let report = coordinator.run(10).unwrap();

        // The run stopped after the last iteration both workers finished,
        // and matches the sequential oracle at that point.
        assert_eq!(report.iterations_completed, GOOD_ITERATIONS);
        assert!(!report.is_complete());

        let mut sequential = SequentialSolver::new(params(6), 20.0, None).unwrap();
        let expected = sequential.solve(GOOD_ITERATIONS);
        assert!(expected.grid.max_abs_diff(&report.grid) <= TOLERANCE);

        // Neither worker hangs: the healthy one is terminated, the flaky
        // one already exited.
        healthy.join().unwrap().unwrap();
        flaky.join().unwrap();
    }
}
