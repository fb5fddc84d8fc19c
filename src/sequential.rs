//! Single-threaded reference solver
//!
//! Iterates the whole interior each step. This is the correctness oracle
//! the threaded and distributed solvers are compared against.

use crate::grid::GridBuffer;
use crate::params::{Hotspot, SimulationParameters};
use crate::report::SolveReport;
use crate::stencil::Stencil;
use crate::Result;
use std::time::Instant;

/// Sequential heat diffusion solver
pub struct SequentialSolver {
    params: SimulationParameters,
    initial_temp: f64,
    hotspot: Option<Hotspot>,
    buffer: GridBuffer,
}

impl SequentialSolver {
    /// Create a solver for the given parameters and initial conditions
    pub fn new(
        params: SimulationParameters,
        initial_temp: f64,
        hotspot: Option<Hotspot>,
    ) -> Result<Self> {
        if let Some(hotspot) = &hotspot {
            hotspot.validate(&params)?;
        }
        let buffer = GridBuffer::new(
            params.grid_size(),
            initial_temp,
            params.boundary_temp(),
            hotspot.as_ref(),
        );
        Ok(Self {
            params,
            initial_temp,
            hotspot,
            buffer,
        })
    }

    /// The parameter set this solver runs with
    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Run the simulation for `num_iterations` time steps
    ///
    /// State is re-initialized at the start of every call, so repeated
    /// solves start from identical initial conditions.
    pub fn solve(&mut self, num_iterations: usize) -> SolveReport {
        self.buffer.reset(
            self.initial_temp,
            self.params.boundary_temp(),
            self.hotspot.as_ref(),
        );

        let stencil = Stencil::new(&self.params);
        let last = self.params.grid_size() - 1;
        let started = Instant::now();

        for _ in 0..num_iterations {
            let (current, next) = self.buffer.split();
            for row in 1..last {
                for col in 1..last {
                    let value = match self.hotspot {
                        Some(h) if h.row == row && h.col == col => h.temp,
                        _ => stencil.update_cell(current, row, col),
                    };
                    next.set(row, col, value);
                }
            }

            self.buffer.swap();
            let current = self.buffer.current_mut();
            current.apply_boundary(self.params.boundary_temp());
            if let Some(hotspot) = &self.hotspot {
                current.apply_hotspot(hotspot);
            }
        }

        SolveReport {
            grid: self.buffer.current().clone(),
            iterations_completed: num_iterations,
            iterations_requested: num_iterations,
            elapsed: started.elapsed(),
        }
    }
}
