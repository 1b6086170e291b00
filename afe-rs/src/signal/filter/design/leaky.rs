use super::IntegratorDesign;
use crate::kernel::{ConfigError, KernelLifecycle};
use crate::signal::filter::{Filter, FilterConfig, FilterSpec};
use crate::signal::FloatSample;

/// One-pole low-pass `y[n] = (1 - d) x[n] + d y[n-1]` with
/// `d = exp(-1 / (fs * decay_sec))`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeakyIntegratorDesign;

impl LeakyIntegratorDesign {
    /// Pole location `d` for the given time constant.
    pub fn decay<F: FloatSample>(fs: F, decay_sec: F) -> F {
        (-(fs * decay_sec).recip()).exp()
    }
}

impl<F> IntegratorDesign<F> for LeakyIntegratorDesign
where
    F: FloatSample,
{
    fn design(&self, fs: F, decay_sec: F) -> Result<Filter<F>, ConfigError> {
        if !(fs > F::zero()) || !fs.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "fs",
                reason: "sampling frequency must be positive and finite",
            });
        }
        if !(decay_sec > F::zero()) || !decay_sec.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "decay_sec",
                reason: "decay time constant must be positive and finite",
            });
        }
        let d = Self::decay(fs, decay_sec);
        Filter::try_new(FilterConfig {
            spec: FilterSpec::new(vec![F::one() - d], vec![F::one(), -d]).with_fs(fs),
        })
    }
}
