use core::fmt;

/// Validation errors raised at kernel construction or adapter binding time.
///
/// Construction never leaves a half-built kernel behind: when one of these is
/// returned no state has been mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required input or configuration field is empty.
    EmptyInput {
        /// Name of the argument that is empty.
        arg: &'static str,
    },
    /// A configuration argument value is invalid.
    InvalidArgument {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
    /// A filter structure other than direct-form II transposed was requested.
    UnsupportedStructure {
        /// The structure tag that was given.
        name: String,
    },
    /// A frame scaling mode other than `magnitude` or `power` was requested.
    UnsupportedScaling {
        /// The scaling name that was given.
        name: String,
    },
    /// The window function name is not recognized.
    UnknownWindow {
        /// The window name that was given.
        name: String,
    },
    /// None of the accepted parameter combinations could be satisfied.
    InsufficientParameters {
        /// Human readable reason.
        reason: &'static str,
    },
    /// A contiguous 1D slice view could not be obtained.
    NonContiguous {
        /// Name of the argument that is non-contiguous.
        arg: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyInput { arg } => write!(f, "Input `{arg}` was empty."),
            ConfigError::InvalidArgument { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            ConfigError::UnsupportedStructure { name } => {
                write!(f, "Unsupported filter structure `{name}`.")
            }
            ConfigError::UnsupportedScaling { name } => {
                write!(f, "Unsupported scaling mode `{name}`.")
            }
            ConfigError::UnknownWindow { name } => write!(f, "Unknown window `{name}`."),
            ConfigError::InsufficientParameters { reason } => {
                write!(f, "Insufficient parameters: {reason}")
            }
            ConfigError::NonContiguous { arg } => {
                write!(f, "Argument `{arg}` is not contiguous in memory.")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Runtime execution invariant violations for checked kernel entrypoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecInvariantViolation {
    /// The filter has no coefficients, so its order is undefined.
    UndefinedOrder,
    /// A buffer or state length mismatched the expected runtime shape.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// A single-channel entry point received multichannel input.
    NotSingleChannel {
        /// Number of channels received.
        channels: usize,
    },
    /// An execution precondition was violated.
    InvalidState {
        /// Human readable reason.
        reason: &'static str,
    },
    /// Adapter binding/configuration failure.
    Config(ConfigError),
}

impl From<ConfigError> for ExecInvariantViolation {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl fmt::Display for ExecInvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecInvariantViolation::UndefinedOrder => {
                write!(f, "Filter order is undefined: no coefficients are set.")
            }
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Execution length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
            ExecInvariantViolation::NotSingleChannel { channels } => {
                write!(f, "Expected single-channel input, got {channels} channels.")
            }
            ExecInvariantViolation::InvalidState { reason } => {
                write!(f, "Execution invariant violation: {reason}")
            }
            ExecInvariantViolation::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ExecInvariantViolation {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecInvariantViolation::Config(err) => Some(err),
            _ => None,
        }
    }
}
