//! Temperature grids and the double-buffered grid pair
//!
//! A [`Grid`] is a row-major `f64` matrix. The global simulation grid is
//! square, but sub-grids exchanged with workers are rectangular slices of
//! it, so rows and columns are tracked separately.

use crate::params::Hotspot;
use serde::{Deserialize, Serialize};

/// A 2D temperature field stored as a flat row-major vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Grid {
    /// Create a grid filled with a uniform temperature
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Read the temperature at `(row, col)`
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Write the temperature at `(row, col)`
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Borrow one row as a slice
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Copy one row out of the grid
    pub fn copy_row(&self, row: usize) -> Vec<f64> {
        self.row(row).to_vec()
    }

    /// Overwrite one row from a slice
    ///
    /// # Panics
    /// Panics if `values` is not exactly one row wide.
    pub fn set_row(&mut self, row: usize, values: &[f64]) {
        assert_eq!(values.len(), self.cols, "row width mismatch");
        self.data[row * self.cols..(row + 1) * self.cols].copy_from_slice(values);
    }

    /// Copy the row range `[start_row, end_row)` into a new grid
    pub fn row_band(&self, start_row: usize, end_row: usize) -> Grid {
        Grid {
            rows: end_row - start_row,
            cols: self.cols,
            data: self.data[start_row * self.cols..end_row * self.cols].to_vec(),
        }
    }

    /// Overwrite rows starting at `start_row` with the contents of `band`
    ///
    /// # Panics
    /// Panics if `band` has a different column count or does not fit.
    pub fn write_rows(&mut self, start_row: usize, band: &Grid) {
        assert_eq!(band.cols, self.cols, "column count mismatch");
        let start = start_row * self.cols;
        let end = start + band.data.len();
        self.data[start..end].copy_from_slice(&band.data);
    }

    /// Set the four border lines to a fixed temperature, in place
    pub fn apply_boundary(&mut self, boundary_temp: f64) {
        let (rows, cols) = (self.rows, self.cols);
        for col in 0..cols {
            self.data[col] = boundary_temp;
            self.data[(rows - 1) * cols + col] = boundary_temp;
        }
        for row in 0..rows {
            self.data[row * cols] = boundary_temp;
            self.data[row * cols + cols - 1] = boundary_temp;
        }
    }

    /// Pin the hotspot cell to its temperature, if the cell is interior
    pub fn apply_hotspot(&mut self, hotspot: &Hotspot) {
        if hotspot.row > 0
            && hotspot.row < self.rows - 1
            && hotspot.col > 0
            && hotspot.col < self.cols - 1
        {
            self.set(hotspot.row, hotspot.col, hotspot.temp);
        }
    }

    /// Largest absolute cell-wise difference between two grids
    ///
    /// Returns `f64::INFINITY` when the shapes differ.
    pub fn max_abs_diff(&self, other: &Grid) -> f64 {
        if self.rows != other.rows || self.cols != other.cols {
            return f64::INFINITY;
        }
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

/// The double-buffered pair of grids a solver iterates over
///
/// `current` holds the authoritative state at time t; every stencil update
/// for time t+1 is written into `next`. [`GridBuffer::swap`] exchanges the
/// two roles in O(1).
#[derive(Debug, Clone)]
pub struct GridBuffer {
    current: Grid,
    next: Grid,
}

impl GridBuffer {
    /// Build a freshly initialized buffer pair
    ///
    /// Both grids are filled with `initial_temp`, then the hotspot is
    /// applied, then the boundary. Boundary goes last so it wins if the two
    /// ever conflict.
    pub fn new(
        grid_size: usize,
        initial_temp: f64,
        boundary_temp: f64,
        hotspot: Option<&Hotspot>,
    ) -> Self {
        let mut buffer = Self {
            current: Grid::filled(grid_size, grid_size, initial_temp),
            next: Grid::filled(grid_size, grid_size, initial_temp),
        };
        buffer.reset(initial_temp, boundary_temp, hotspot);
        buffer
    }

    /// Re-initialize both grids to the same starting state
    ///
    /// Lets one solver instance run several simulations from identical
    /// initial conditions.
    pub fn reset(&mut self, initial_temp: f64, boundary_temp: f64, hotspot: Option<&Hotspot>) {
        for grid in [&mut self.current, &mut self.next] {
            grid.data.iter_mut().for_each(|cell| *cell = initial_temp);
            if let Some(hotspot) = hotspot {
                grid.apply_hotspot(hotspot);
            }
            grid.apply_boundary(boundary_temp);
        }
    }

    /// Exchange the `current` and `next` roles in O(1)
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// The authoritative grid for the current time step
    pub fn current(&self) -> &Grid {
        &self.current
    }

    /// Mutable access to the current grid (boundary/hotspot re-application)
    pub fn current_mut(&mut self) -> &mut Grid {
        &mut self.current
    }

    /// The grid being written for the next time step
    pub fn next(&self) -> &Grid {
        &self.next
    }

    /// Mutable access to the next grid
    pub fn next_mut(&mut self) -> &mut Grid {
        &mut self.next
    }

    /// Consume the buffer, keeping only the current grid
    pub fn into_current(self) -> Grid {
        self.current
    }

    /// Consume the buffer into its `(current, next)` grids
    ///
    /// The threaded and distributed solvers place the two grids behind
    /// separate locks for the duration of a run.
    pub fn into_parts(self) -> (Grid, Grid) {
        (self.current, self.next)
    }

    /// Split into `(current, next)` references for simultaneous access
    pub fn split(&mut self) -> (&Grid, &mut Grid) {
        (&self.current, &mut self.next)
    }
}
