use core::{error, fmt};

/// Errors raised by the free-function API of afe-rs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Argument parsed into function were invalid.
    InvalidArg {
        /// The invalid arg
        arg: String,
        /// Explaining why arg is invalid.
        reason: String,
    },
    /// An argument had the wrong length for the requested operation.
    DimensionMismatch {
        /// The offending arg.
        arg: String,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArg { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            Error::DimensionMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Dimension mismatch on `{arg}`. Expected length {expected}, got {got}."
                )
            }
        }
    }
}

impl error::Error for Error {}

/// Result alias over [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
