//! Row-band partitioning of the grid interior
//!
//! Interior rows `[1, grid_size - 2]` are divided into contiguous,
//! near-equal bands, one per worker. The split is deterministic so thread
//! and process counts can vary without changing which rows belong together,
//! which keeps runs reproducible and comparable.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A contiguous range of global interior rows assigned to one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowBand {
    /// Worker index this band is assigned to
    pub id: usize,
    /// First global row of the band (inclusive)
    pub start_row: usize,
    /// One past the last global row of the band (exclusive)
    pub end_row: usize,
}

impl RowBand {
    /// Number of rows in the band
    pub fn num_rows(&self) -> usize {
        self.end_row - self.start_row
    }
}

/// Divide `interior_rows` interior rows among `num_workers` workers
///
/// Bands are ordered, non-overlapping and cover exactly the global rows
/// `[1, interior_rows]`. Each band gets `interior_rows / num_workers` rows;
/// the first `interior_rows % num_workers` bands get one extra. A worker
/// with zero rows is never created: requesting more workers than interior
/// rows fails with [`Error::TooManyWorkers`] before any work is dispatched.
pub fn partition_interior(interior_rows: usize, num_workers: usize) -> Result<Vec<RowBand>> {
    if num_workers == 0 {
        return Err(Error::InvalidConfig(
            "num_workers must be at least 1".to_string(),
        ));
    }
    if num_workers > interior_rows {
        return Err(Error::TooManyWorkers {
            workers: num_workers,
            interior_rows,
        });
    }

    let rows_per_worker = interior_rows / num_workers;
    let remainder = interior_rows % num_workers;

    let mut bands = Vec::with_capacity(num_workers);
    let mut start_row = 1; // global row 0 is the fixed border
    for id in 0..num_workers {
        let extra = if id < remainder { 1 } else { 0 };
        let end_row = start_row + rows_per_worker + extra;
        bands.push(RowBand {
            id,
            start_row,
            end_row,
        });
        start_row = end_row;
    }

    Ok(bands)
}
