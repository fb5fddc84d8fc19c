//! Distributed solver demo: a coordinator and its workers in one process.
//!
//! The workers run in threads here for convenience, but they speak to the
//! coordinator only over TCP, exactly as separate processes would.

use heat_lattice::prelude::*;
use std::thread;

const GRID_SIZE: usize = 200;
const INITIAL_TEMP: f64 = 20.0;
const BOUNDARY_TEMP: f64 = 0.0;
const HOTSPOT_TEMP: f64 = 100.0;
const ALPHA: f64 = 0.1;
const DX: f64 = 1.0;
const DT: f64 = 0.1;
const ITERATIONS: usize = 200;
const NUM_WORKERS: usize = 3;

fn main() -> Result<()> {
    println!("=== Distributed Heat Diffusion ===\n");

    let params = SimulationParameters::new(GRID_SIZE, ALPHA, DT, DX, BOUNDARY_TEMP)?;
    let hotspot = Hotspot::new(GRID_SIZE / 2, GRID_SIZE / 2, HOTSPOT_TEMP);

    let config = CoordinatorConfig::new(NUM_WORKERS).with_bind_addr("127.0.0.1:0");
    let coordinator = Coordinator::bind(params, INITIAL_TEMP, Some(hotspot), config)?;
    let addr = coordinator.local_addr()?;
    println!("Coordinator listening on {}, waiting for {} workers", addr, NUM_WORKERS);

    let mut workers = Vec::new();
    for id in 0..NUM_WORKERS {
        workers.push(thread::spawn(move || {
            let served = WorkerNode::new(addr).run()?;
            println!("Worker {} served {} iterations", id, served);
            Ok::<_, Error>(served)
        }));
    }

    let report = coordinator.run(ITERATIONS)?;
    println!(
        "Distributed ({} workers): {} of {} iterations in {:?}",
        NUM_WORKERS, report.iterations_completed, report.iterations_requested, report.elapsed
    );

    for handle in workers {
        if let Err(error) = handle.join().expect("worker thread panicked") {
            eprintln!("Worker failed: {}", error);
        }
    }

    let mut sequential = SequentialSolver::new(params, INITIAL_TEMP, Some(hotspot))?;
    let baseline = sequential.solve(ITERATIONS);
    println!(
        "Max absolute difference vs sequential: {:e}",
        baseline.grid.max_abs_diff(&report.grid)
    );

    Ok(())
}
