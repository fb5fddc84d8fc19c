//! Remote worker process logic
//!
//! A worker connects to the coordinator, receives the simulation
//! parameters once, then serves iteration updates until it is told to
//! terminate or the connection closes. For every update it pads the
//! received band with halo rows (or the boundary temperature where a halo
//! is absent), computes the band's next state into a second local buffer,
//! and replies with the halo-stripped rows. Errors are fatal: the worker
//! closes its connection and exits, it never retries.

use crate::grid::Grid;
use crate::params::{Hotspot, SimulationParameters};
use crate::stencil::Stencil;
use crate::wire::{read_message, write_message, Message};
use crate::{Error, Result};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

/// Default bound on how long a worker waits to reach the coordinator
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// A single distributed worker
pub struct WorkerNode {
    coordinator_addr: SocketAddr,
    connect_timeout: Duration,
}

impl WorkerNode {
    /// Create a worker that will connect to the given coordinator address
    pub fn new(coordinator_addr: SocketAddr) -> Self {
        Self {
            coordinator_addr,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Connect and serve iterations until termination
    ///
    /// Returns the number of iteration updates served. A closed connection
    /// or an explicit `TERMINATE` is a graceful exit; anything else that
    /// goes wrong is an error.
    pub fn run(&self) -> Result<usize> {
        let mut stream = TcpStream::connect_timeout(&self.coordinator_addr, self.connect_timeout)
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                    Error::ConnectTimeout
                }
                _ => Error::Io(err),
            })?;
        // The timeout governs only the connect; steady-state receives block
        // indefinitely (the barrier discipline has no timeouts).

        let params = match read_message(&mut stream)? {
            Message::InitialConfig {
                grid_size,
                alpha,
                dt,
                dx,
                boundary_temp,
            } => SimulationParameters::new(grid_size, alpha, dt, dx, boundary_temp)?,
            other => {
                return Err(Error::ProtocolViolation(format!(
                    "expected INITIAL_CONFIG first, got {}",
                    other.kind()
                )));
            }
        };
        let stencil = Stencil::new(&params);

        let mut iterations_served = 0;
        loop {
            let message = match read_message(&mut stream) {
                Ok(message) => message,
                // Coordinator went away without a TERMINATE; still graceful
                Err(Error::ConnectionClosed) => break,
                Err(err) => return Err(err),
            };

            match message {
                Message::Terminate => break,
                Message::IterationUpdate {
                    sub_grid,
                    halo_top,
                    halo_bottom,
                    hotspot,
                } => {
                    let reply =
                        compute_band(&params, &stencil, &sub_grid, halo_top, halo_bottom, hotspot)?;
                    write_message(&mut stream, &Message::SubGridResult { sub_grid: reply })?;
                    iterations_served += 1;
                }
                other => {
                    return Err(Error::ProtocolViolation(format!(
                        "expected ITERATION_UPDATE or TERMINATE, got {}",
                        other.kind()
                    )));
                }
            }
        }

        Ok(iterations_served)
    }
}

/// Compute one band's next state from its sub-grid and halo rows
///
/// Builds a `(band_rows + 2) x grid_size` working grid: row 0 is the top
/// halo, the last row the bottom halo, with the boundary temperature
/// substituted where a halo is absent (the band touches a global border).
/// Every interior cell of the band is written into a second local buffer,
/// with the hotspot override applied by band-relative position. Returns
/// only the computed band rows, halos stripped.
pub fn compute_band(
    params: &SimulationParameters,
    stencil: &Stencil,
    sub_grid: &Grid,
    halo_top: Option<Vec<f64>>,
    halo_bottom: Option<Vec<f64>>,
    hotspot: Option<Hotspot>,
) -> Result<Grid> {
    let grid_size = params.grid_size();
    let band_rows = sub_grid.rows();
    if sub_grid.cols() != grid_size || band_rows == 0 {
        return Err(Error::ProtocolViolation(format!(
            "sub-grid shape {}x{} does not fit a {}-wide grid",
            band_rows,
            sub_grid.cols(),
            grid_size
        )));
    }

    let mut local = Grid::filled(band_rows + 2, grid_size, params.boundary_temp());
    if let Some(row) = &halo_top {
        if row.len() != grid_size {
            return Err(Error::ProtocolViolation(format!(
                "top halo of {} values in a {}-wide grid",
                row.len(),
                grid_size
            )));
        }
        local.set_row(0, row);
    }
    local.write_rows(1, sub_grid);
    if let Some(row) = &halo_bottom {
        if row.len() != grid_size {
            return Err(Error::ProtocolViolation(format!(
                "bottom halo of {} values in a {}-wide grid",
                row.len(),
                grid_size
            )));
        }
        local.set_row(band_rows + 1, row);
    }

    let mut next_local = local.clone();
    for local_row in 1..=band_rows {
        for col in 1..grid_size - 1 {
            let value = match hotspot {
                Some(h) if h.row == local_row - 1 && h.col == col => h.temp,
                _ => stencil.update_cell(&local, local_row, col),
            };
            next_local.set(local_row, col, value);
        }
    }

    Ok(next_local.row_band(1, band_rows + 1))
}
