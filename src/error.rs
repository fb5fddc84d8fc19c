//! Error types for the heat-lattice solvers

use std::fmt;

/// Result type alias for solver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while configuring or running a simulation
#[derive(Debug)]
pub enum Error {
    /// Construction parameters are physically or structurally invalid
    InvalidConfig(String),

    /// More workers requested than interior rows available to assign
    TooManyWorkers {
        /// Requested worker count
        workers: usize,
        /// Interior rows available for partitioning
        interior_rows: usize,
    },

    /// Worker could not reach the coordinator within the connect timeout
    ConnectTimeout,

    /// Peer closed the connection before a full length prefix arrived
    ConnectionClosed,

    /// Stream ended before the announced payload length was received
    IncompleteMessage {
        /// Payload bytes announced by the length prefix
        expected: usize,
        /// Payload bytes actually received
        received: usize,
    },

    /// Peer sent a message that violates the protocol state machine
    ProtocolViolation(String),

    /// The iteration barrier was aborted by another party
    BrokenBarrier,

    /// Underlying transport error
    Io(std::io::Error),

    /// Message payload could not be encoded or decoded
    Serialize(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::TooManyWorkers {
                workers,
                interior_rows,
            } => write!(
                f,
                "{} workers exceed the {} interior rows available",
                workers, interior_rows
            ),
            Error::ConnectTimeout => write!(f, "Timed out connecting to coordinator"),
            Error::ConnectionClosed => write!(f, "Connection closed by peer"),
            Error::IncompleteMessage { expected, received } => write!(
                f,
                "Incomplete message: expected {} payload bytes, received {}",
                expected, received
            ),
            Error::ProtocolViolation(msg) => write!(f, "Protocol violation: {}", msg),
            Error::BrokenBarrier => write!(f, "Iteration barrier aborted"),
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serialize(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}
