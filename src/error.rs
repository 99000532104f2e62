//! Our error types for the PSP-603.

use thiserror::Error;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Error type for PSP-603 communications.
///
/// `I` is the error type of the underlying transport.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    #[error("Serial communication error")]
    SerialError(I),
    /// The reply was too short for the field being decoded.
    #[error("Invalid response received")]
    InvalidResponse,
    #[error("Could not parse numeric field: {0}")]
    ParseFloat(core::num::ParseFloatError),
    /// A setpoint rendered wider than the command buffer. (NaN, infinities or absurd values.)
    #[error("Command does not fit the command buffer")]
    CommandTooLong,
}

/// Failure to decode a reply line, independent of any transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Response too short: needed {needed} bytes, got {len}")]
    Truncated { needed: usize, len: usize },
    /// Replies are plain ASCII. Anything else would shift the fixed offsets.
    #[error("Response contains a non-ASCII byte at {index}")]
    NotAscii { index: usize },
    #[error("Could not parse numeric field: {0}")]
    ParseFloat(#[from] core::num::ParseFloatError),
}

impl<I: embedded_io::Error> From<DecodeError> for Error<I> {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Truncated { .. } | DecodeError::NotAscii { .. } => {
                Error::InvalidResponse
            }
            DecodeError::ParseFloat(err) => Error::ParseFloat(err),
        }
    }
}
