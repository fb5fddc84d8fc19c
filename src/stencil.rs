//! The 5-point explicit finite-difference stencil
//!
//! Single source of numerical truth: the sequential, threaded and
//! distributed solvers all call [`Stencil::update_cell`], so their results
//! agree bit for bit.

use crate::grid::Grid;
use crate::params::SimulationParameters;

/// Explicit update rule for the 2D heat equation
///
/// `T_new(i,j) = T(i,j) + c * (T(i-1,j) + T(i+1,j) + T(i,j+1) + T(i,j-1) - 4*T(i,j))`
#[derive(Debug, Clone, Copy)]
pub struct Stencil {
    c: f64,
}

impl Stencil {
    /// Build a stencil from the shared parameter set
    pub fn new(params: &SimulationParameters) -> Self {
        Self { c: params.c() }
    }

    /// Compute one cell's next temperature from its current neighborhood
    ///
    /// Pure function of the five stencil inputs and `c`. `(row, col)` must
    /// have all four neighbors inside `grid`.
    #[inline]
    pub fn update_cell(&self, grid: &Grid, row: usize, col: usize) -> f64 {
        let center = grid.get(row, col);
        let north = grid.get(row - 1, col);
        let south = grid.get(row + 1, col);
        let east = grid.get(row, col + 1);
        let west = grid.get(row, col - 1);
        center + self.c * (north + south + east + west - 4.0 * center)
    }
}
