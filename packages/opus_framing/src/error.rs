//! Error types for packet framing and decoding.

use thiserror::Error;

/// Packet framing errors.
///
/// Returned by the framing parser. A framing failure never yields a partial
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FramingError {
    /// The packet contains no bytes at all
    #[error("Empty packet")]
    Empty,

    /// The packet structure violates RFC 6716 framing rules
    #[error("Invalid packet format")]
    InvalidPacket,
}

/// Opus decoder errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid argument, such as an unsupported sample rate or channel count
    #[error("Bad argument: {0}")]
    BadArgument(String),

    /// Output buffer cannot hold the decoded samples
    #[error("Buffer too small: need {needed} samples per channel, have {available}")]
    BufferTooSmall {
        /// Samples per channel the packet decodes to
        needed: usize,
        /// Samples per channel the caller provided room for
        available: usize,
    },

    /// The external frame decoder failed
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Packet framing is invalid
    #[error(transparent)]
    InvalidPacket(#[from] FramingError),

    /// Decoder scratch memory could not be reserved
    #[error("Allocation failure")]
    AllocationFailure,

    /// Request not supported by the frame decoder
    #[error("Unimplemented: {0}")]
    Unimplemented(&'static str),
}

impl Error {
    /// Legacy negative error code for this error.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::BadArgument(_) => -1,
            Self::BufferTooSmall { .. } => -2,
            Self::InternalError(_) => -3,
            Self::InvalidPacket(_) => -4,
            Self::Unimplemented(_) => -5,
            Self::AllocationFailure => -7,
        }
    }
}

/// Result type for Opus operations.
pub type Result<T> = std::result::Result<T, Error>;
