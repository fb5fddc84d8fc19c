//! # Heat Lattice
//!
//! A 2D transient heat diffusion simulator with three interchangeable
//! execution modes that produce numerically identical results:
//!
//! - **Sequential**: one thread sweeps the whole grid each time step
//! - **Threaded**: one worker thread per row band over shared memory,
//!   synchronized with a cyclic barrier
//! - **Distributed**: a coordinator ships row bands to remote workers over
//!   a length-prefixed binary TCP protocol
//!
//! ## Model
//!
//! The square grid evolves under an explicit five-point stencil with a
//! fixed-temperature (Dirichlet) border and an optional interior hotspot
//! cell held at a constant temperature. The interior rows are partitioned
//! into contiguous bands, one per worker; each iteration every band is
//! computed against the same frozen snapshot of the grid, then a single
//! buffer swap publishes the new state.
//!
//! ```text
//! ┌──────────────────────────┐
//! │ boundary (fixed)         │
//! │ ┌──────────────────────┐ │
//! │ │ band 0   (worker 0)  │ │
//! │ ├──────────────────────┤ │
//! │ │ band 1   (worker 1)  │ │
//! │ ├──────────────────────┤ │
//! │ │ band 2   (worker 2)  │ │
//! │ └──────────────────────┘ │
//! │                          │
//! └──────────────────────────┘
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod barrier;
pub mod coordinator;
pub mod error;
pub mod grid;
pub mod params;
pub mod partition;
pub mod report;
pub mod sequential;
pub mod stencil;
pub mod threaded;
pub mod wire;
pub mod worker;

// Re-exports
pub use coordinator::{Coordinator, CoordinatorConfig};
pub use error::{Error, Result};
pub use grid::{Grid, GridBuffer};
pub use params::{Hotspot, SimulationParameters, CFL_LIMIT};
pub use partition::{partition_interior, RowBand};
pub use report::SolveReport;
pub use sequential::SequentialSolver;
pub use threaded::{ThreadedOptions, ThreadedSolver};
pub use worker::WorkerNode;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::coordinator::{Coordinator, CoordinatorConfig};
    pub use crate::error::{Error, Result};
    pub use crate::grid::Grid;
    pub use crate::params::{Hotspot, SimulationParameters};
    pub use crate::report::SolveReport;
    pub use crate::sequential::SequentialSolver;
    pub use crate::threaded::{ThreadedOptions, ThreadedSolver};
    pub use crate::worker::WorkerNode;
}
