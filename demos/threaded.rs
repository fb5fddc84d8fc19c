//! Threaded solver demo: run the same simulation sequentially and with a
//! pool of worker threads, then compare the results cell for cell.

use heat_lattice::prelude::*;

const GRID_SIZE: usize = 200;
const INITIAL_TEMP: f64 = 20.0;
const BOUNDARY_TEMP: f64 = 0.0;
const HOTSPOT_TEMP: f64 = 100.0;
const ALPHA: f64 = 0.1;
const DX: f64 = 1.0;
const DT: f64 = 0.1;
const ITERATIONS: usize = 500;
const NUM_THREADS: usize = 4;

fn main() -> Result<()> {
    println!("=== Threaded Heat Diffusion ===\n");

    let params = SimulationParameters::new(GRID_SIZE, ALPHA, DT, DX, BOUNDARY_TEMP)?;
    let hotspot = Hotspot::new(GRID_SIZE / 2, GRID_SIZE / 2, HOTSPOT_TEMP);
    println!(
        "Grid {}x{}, c = {:.4}, hotspot at ({}, {}), {} iterations",
        GRID_SIZE,
        GRID_SIZE,
        params.c(),
        hotspot.row,
        hotspot.col,
        ITERATIONS
    );

    let mut sequential = SequentialSolver::new(params, INITIAL_TEMP, Some(hotspot))?;
    let baseline = sequential.solve(ITERATIONS);
    println!("Sequential: {:?}", baseline.elapsed);

    let solver = ThreadedSolver::new(params, INITIAL_TEMP, Some(hotspot))?;
    let options = ThreadedOptions::new(NUM_THREADS).with_pinned_workers(true);
    let report = solver.solve(ITERATIONS, &options)?;
    println!("Threaded ({} threads): {:?}", NUM_THREADS, report.elapsed);

    let diff = baseline.grid.max_abs_diff(&report.grid);
    println!("Max absolute difference vs sequential: {:e}", diff);
    println!(
        "Speedup: {:.2}x",
        baseline.elapsed.as_secs_f64() / report.elapsed.as_secs_f64()
    );

    Ok(())
}
