//! Coefficient providers for the filterbank and framing stages.
//!
//! The stages only depend on the [`FilterDesign`] and [`IntegratorDesign`]
//! traits; [`GammatoneDesign`] and [`LeakyIntegratorDesign`] are the default
//! providers.

mod gammatone;
mod leaky;

pub use gammatone::*;
pub use leaky::*;

use crate::kernel::ConfigError;
use crate::signal::filter::Filter;
use core::{fmt, str::FromStr};
use serde::{Deserialize, Serialize};

/// Impulse-response type of a filterbank channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IrType {
    /// Truncated impulse response applied as a real FIR.
    #[default]
    Fir,
    /// Recursive (infinite impulse response) realization.
    Iir,
}

impl FromStr for IrType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FIR" => Ok(IrType::Fir),
            "IIR" => Ok(IrType::Iir),
            _ => Err(ConfigError::InvalidArgument {
                arg: "ir_type",
                reason: "expected `FIR` or `IIR`",
            }),
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Fir => write!(f, "FIR"),
            IrType::Iir => write!(f, "IIR"),
        }
    }
}

/// Everything a filterbank asks of its design collaborator for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelRequest<F> {
    /// Center frequency in Hz.
    pub fc: F,
    /// Sampling frequency in Hz.
    pub fs: F,
    /// Impulse-response type.
    pub ir_type: IrType,
    /// Filter order.
    pub order: usize,
    /// Bandwidth in ERB.
    pub bandwidth_erb: F,
    /// Phase alignment across channels. Accepted but not implemented.
    pub align: bool,
    /// Impulse-response duration in seconds, used by FIR designs.
    pub duration_sec: F,
}

/// Filter-design collaborator of the filterbank: one ready-to-use filter
/// (coefficients plus zeroed state) per channel request.
pub trait FilterDesign<F> {
    /// Design the filter for one channel.
    fn design(&self, request: &ChannelRequest<F>) -> Result<Filter<F>, ConfigError>;
}

impl<F, T> FilterDesign<F> for T
where
    T: Fn(&ChannelRequest<F>) -> Result<Filter<F>, ConfigError>,
{
    fn design(&self, request: &ChannelRequest<F>) -> Result<Filter<F>, ConfigError> {
        self(request)
    }
}

/// Leaky-integrator collaborator of the framing stage.
pub trait IntegratorDesign<F> {
    /// Design a one-pole smoother with the given decay time constant.
    fn design(&self, fs: F, decay_sec: F) -> Result<Filter<F>, ConfigError>;
}
