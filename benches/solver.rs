//! Benchmarks for the sequential and threaded solvers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use heat_lattice::prelude::*;

const ITERATIONS: usize = 50;

fn bench_sequential_grid_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_grid_sizes");

    for grid_size in [50, 100, 200].iter() {
        let cells = (grid_size - 2) * (grid_size - 2) * ITERATIONS;
        group.throughput(Throughput::Elements(cells as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(grid_size),
            grid_size,
            |b, &grid_size| {
                let params = SimulationParameters::new(grid_size, 0.1, 0.1, 1.0, 0.0).unwrap();
                let hotspot = Hotspot::new(grid_size / 2, grid_size / 2, 100.0);
                let mut solver = SequentialSolver::new(params, 20.0, Some(hotspot)).unwrap();

                b.iter(|| black_box(solver.solve(black_box(ITERATIONS))));
            },
        );
    }

    group.finish();
}

fn bench_threaded_thread_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("threaded_thread_counts");
    let grid_size = 200;
    let cells = (grid_size - 2) * (grid_size - 2) * ITERATIONS;

    for num_threads in [1, 2, 4, 8].iter() {
        group.throughput(Throughput::Elements(cells as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(num_threads),
            num_threads,
            |b, &num_threads| {
                let params = SimulationParameters::new(grid_size, 0.1, 0.1, 1.0, 0.0).unwrap();
                let hotspot = Hotspot::new(grid_size / 2, grid_size / 2, 100.0);
                let solver = ThreadedSolver::new(params, 20.0, Some(hotspot)).unwrap();
                let options = ThreadedOptions::new(num_threads);

                b.iter(|| black_box(solver.solve(black_box(ITERATIONS), &options).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_stencil_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("stencil_sweep");

    for grid_size in [100, 400].iter() {
        let cells = (grid_size - 2) * (grid_size - 2);
        group.throughput(Throughput::Elements(cells as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(grid_size),
            grid_size,
            |b, &grid_size| {
                let params = SimulationParameters::new(grid_size, 0.1, 0.1, 1.0, 0.0).unwrap();
                let stencil = heat_lattice::stencil::Stencil::new(&params);
                let current = Grid::filled(grid_size, grid_size, 20.0);
                let mut next = current.clone();

                b.iter(|| {
                    for row in 1..grid_size - 1 {
                        for col in 1..grid_size - 1 {
                            next.set(row, col, stencil.update_cell(black_box(&current), row, col));
                        }
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_grid_sizes,
    bench_threaded_thread_counts,
    bench_stencil_sweep
);
criterion_main!(benches);
