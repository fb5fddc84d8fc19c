//! Validated simulation parameters shared by every solver variant
//!
//! The diffusion factor `c = alpha * dt / dx^2` is derived exactly once at
//! construction. The coordinator sends the raw fields over the wire and the
//! remote worker rebuilds the same type, so no component re-derives `c` on
//! its own.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on `c` for a stable explicit 2D scheme (CFL condition)
pub const CFL_LIMIT: f64 = 0.25;

/// Physical and discretization parameters of a heat diffusion run
///
/// Immutable after construction. `grid_size` is the side length of the
/// square grid, and must be at least 3 so at least one interior cell exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParameters {
    grid_size: usize,
    alpha: f64,
    dt: f64,
    dx: f64,
    boundary_temp: f64,
    c: f64,
}

impl SimulationParameters {
    /// Validate the inputs and derive the diffusion factor
    ///
    /// `alpha`, `dt` and `dx` must be finite and positive. A violated CFL
    /// condition (`c > 0.25`) is reported as a warning, not an error: the
    /// simulation proceeds but may diverge.
    pub fn new(
        grid_size: usize,
        alpha: f64,
        dt: f64,
        dx: f64,
        boundary_temp: f64,
    ) -> Result<Self> {
        if grid_size < 3 {
            return Err(Error::InvalidConfig(format!(
                "grid_size must be at least 3 to have interior cells, got {}",
                grid_size
            )));
        }
        for (name, value) in [("alpha", alpha), ("dt", dt), ("dx", dx)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        if !boundary_temp.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "boundary_temp must be finite, got {}",
                boundary_temp
            )));
        }

        let c = alpha * dt / (dx * dx);
        if c > CFL_LIMIT {
            eprintln!(
                "Warning: CFL condition violated (c = {:.4} > {}); the explicit scheme \
                 may be numerically unstable. Decrease dt or increase dx.",
                c, CFL_LIMIT
            );
        }

        Ok(Self {
            grid_size,
            alpha,
            dt,
            dx,
            boundary_temp,
            c,
        })
    }

    /// Side length of the square grid
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Thermal diffusivity
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Time step
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Grid spacing (dx = dy)
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Fixed border temperature (Dirichlet condition)
    pub fn boundary_temp(&self) -> f64 {
        self.boundary_temp
    }

    /// Precomputed diffusion factor `alpha * dt / dx^2`
    pub fn c(&self) -> f64 {
        self.c
    }

    /// Number of interior rows, i.e. rows updated by the stencil
    pub fn interior_rows(&self) -> usize {
        self.grid_size - 2
    }

    /// Whether the explicit scheme satisfies the CFL stability bound
    pub fn is_stable(&self) -> bool {
        self.c <= CFL_LIMIT
    }
}

/// A single interior cell held at a constant temperature
///
/// Bundling position and temperature in one type makes the "both or
/// neither" rule structural. The cell is excluded from stencil updates and
/// written directly after every buffer swap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    /// Row index of the heated cell
    pub row: usize,
    /// Column index of the heated cell
    pub col: usize,
    /// Constant temperature of the heated cell
    pub temp: f64,
}

impl Hotspot {
    /// Create a hotspot at the given cell
    pub fn new(row: usize, col: usize, temp: f64) -> Self {
        Self { row, col, temp }
    }

    /// Check that the hotspot lies strictly inside the grid
    ///
    /// Border cells carry the boundary temperature, so a hotspot on the
    /// border would be contradictory.
    pub fn validate(&self, params: &SimulationParameters) -> Result<()> {
        let last = params.grid_size() - 1;
        if self.row == 0 || self.row >= last || self.col == 0 || self.col >= last {
            return Err(Error::InvalidConfig(format!(
                "hotspot ({}, {}) must lie in the interior of a {}x{} grid",
                self.row,
                self.col,
                params.grid_size(),
                params.grid_size()
            )));
        }
        Ok(())
    }

    /// Shift the hotspot row into a band-local frame, if it falls inside
    /// the band's global row range `[start_row, end_row)`
    pub fn relative_to(&self, start_row: usize, end_row: usize) -> Option<Hotspot> {
        if (start_row..end_row).contains(&self.row) {
            Some(Hotspot::new(self.row - start_row, self.col, self.temp))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_parameters() {
        let params = SimulationParameters::new(100, 0.1, 0.1, 1.0, 0.0).unwrap();
        assert_eq!(params.grid_size(), 100);
        assert_eq!(params.interior_rows(), 98);
        assert!((params.c() - 0.01).abs() < 1e-15);
        assert!(params.is_stable());
    }

    #[test]
    fn test_grid_size_too_small() {
        assert!(matches!(
            SimulationParameters::new(2, 0.1, 0.1, 1.0, 0.0),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_non_positive_physics() {
        assert!(SimulationParameters::new(10, 0.0, 0.1, 1.0, 0.0).is_err());
        assert!(SimulationParameters::new(10, 0.1, -0.1, 1.0, 0.0).is_err());
        assert!(SimulationParameters::new(10, 0.1, 0.1, 0.0, 0.0).is_err());
        assert!(SimulationParameters::new(10, f64::NAN, 0.1, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_cfl_violation_is_not_fatal() {
        // c = 0.8 * 1.0 / 1.0 = 0.8 > 0.25: warns, still constructs
        let params = SimulationParameters::new(10, 0.8, 1.0, 1.0, 0.0).unwrap();
        assert!(!params.is_stable());
        assert!((params.c() - 0.8).abs() < 1e-15);
    }

    #[test]
    fn test_hotspot_validation() {
        let params = SimulationParameters::new(5, 0.1, 0.1, 1.0, 0.0).unwrap();
        assert!(Hotspot::new(2, 2, 100.0).validate(&params).is_ok());
        assert!(Hotspot::new(0, 2, 100.0).validate(&params).is_err());
        assert!(Hotspot::new(2, 4, 100.0).validate(&params).is_err());
        assert!(Hotspot::new(4, 4, 100.0).validate(&params).is_err());
    }

    #[test]
    fn test_hotspot_relative_position() {
        let hotspot = Hotspot::new(5, 3, 100.0);
        let relative = hotspot.relative_to(4, 7).unwrap();
        assert_eq!(relative.row, 1);
        assert_eq!(relative.col, 3);
        assert!(hotspot.relative_to(6, 9).is_none());
        assert!(hotspot.relative_to(1, 5).is_none());
    }
}
