//! Length-prefixed binary wire protocol
//!
//! Every frame is a 4-byte unsigned big-endian length prefix followed by
//! exactly that many bytes of bincode-encoded [`Message`]. Sends either
//! write the whole frame or fail; partial frames never succeed silently.
//! Receives distinguish a cleanly closed connection (nothing, or a short
//! length prefix) from a stream that died mid-payload and from a payload
//! that does not decode.

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::params::Hotspot;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Messages exchanged between coordinator and worker
///
/// Optional halo rows are explicit: `None` means the band touches a global
/// border, and the receiver substitutes the boundary temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Simulation parameters, sent once after a worker connects
    InitialConfig {
        /// Side length of the full global grid
        grid_size: usize,
        /// Thermal diffusivity
        alpha: f64,
        /// Time step
        dt: f64,
        /// Grid spacing
        dx: f64,
        /// Fixed border temperature
        boundary_temp: f64,
    },

    /// Per-iteration work unit for one row band
    IterationUpdate {
        /// The band rows copied from the coordinator's current grid
        sub_grid: Grid,
        /// Row above the band, absent at the top global border
        halo_top: Option<Vec<f64>>,
        /// Row below the band, absent at the bottom global border
        halo_bottom: Option<Vec<f64>>,
        /// Hotspot in band-local coordinates, if it falls inside the band
        hotspot: Option<Hotspot>,
    },

    /// The band's updated rows, halos stripped
    SubGridResult {
        /// Updated band rows
        sub_grid: Grid,
    },

    /// End of run; the worker exits gracefully
    Terminate,
}

impl Message {
    /// Short tag for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Message::InitialConfig { .. } => "INITIAL_CONFIG",
            Message::IterationUpdate { .. } => "ITERATION_UPDATE",
            Message::SubGridResult { .. } => "SUB_GRID_RESULT",
            Message::Terminate => "TERMINATE",
        }
    }
}

/// Serialize a message and write it as one length-prefixed frame
pub fn write_message<W: Write>(writer: &mut W, message: &Message) -> Result<()> {
    let payload = bincode::serialize(message)?;
    let length = u32::try_from(payload.len())
        .map_err(|_| Error::Serialize(format!("payload of {} bytes exceeds u32", payload.len())))?;
    writer.write_all(&length.to_be_bytes())?;
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}

/// Read one length-prefixed frame and decode it
///
/// Fails with [`Error::ConnectionClosed`] if the stream ends cleanly before
/// a full length prefix arrives, [`Error::IncompleteMessage`] if it ends
/// inside the payload, and [`Error::ProtocolViolation`] if the payload does
/// not decode as a [`Message`]. A hard transport error (reset, broken pipe)
/// is never conflated with a clean close: it surfaces as [`Error::Io`].
pub fn read_message<R: Read>(reader: &mut R) -> Result<Message> {
    let mut prefix = [0u8; 4];
    read_full(reader, &mut prefix).map_err(|failure| match failure {
        ReadFailure::Eof(_) => Error::ConnectionClosed,
        ReadFailure::Io(err) => Error::Io(err),
    })?;
    let length = u32::from_be_bytes(prefix) as usize;

    let mut payload = vec![0u8; length];
    read_full(reader, &mut payload).map_err(|failure| match failure {
        ReadFailure::Eof(received) => Error::IncompleteMessage {
            expected: length,
            received,
        },
        ReadFailure::Io(err) => Error::Io(err),
    })?;

    bincode::deserialize(&payload)
        .map_err(|err| Error::ProtocolViolation(format!("undecodable payload: {}", err)))
}

/// Why a full read could not be satisfied
enum ReadFailure {
    /// The stream ended cleanly after this many bytes
    Eof(usize),
    /// The transport failed outright
    Io(std::io::Error),
}

/// Fill `buf` completely, or report why that was impossible
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::result::Result<(), ReadFailure> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Err(ReadFailure::Eof(filled)),
            Ok(n) => filled += n,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(ReadFailure::Io(err)),
        }
    }
    Ok(())
}
