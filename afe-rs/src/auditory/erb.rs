use crate::kernel::ConfigError;
use crate::signal::{cast, FloatSample};
use afe_rs_core::num_rs::{arange_inclusive, linspace};

/// Hz to ERB-rate (Glasberg & Moore 1990), odd-symmetric around 0 Hz.
pub fn hz_to_erb<F: FloatSample>(f_hz: F) -> F {
    cast::<F>(9.2645) * f_hz.signum() * (F::one() + cast::<F>(0.00437) * f_hz.abs()).ln()
}

/// ERB-rate back to Hz.
pub fn erb_to_hz<F: FloatSample>(erb: F) -> F {
    erb.signum() * ((erb.abs() / cast::<F>(9.2645)).exp() - F::one()) / cast::<F>(0.00437)
}

/// Equivalent rectangular bandwidth in Hz at `f_hz`.
#[inline]
pub fn erb_bandwidth<F: FloatSample>(f_hz: F) -> F {
    cast::<F>(24.7) + f_hz / cast::<F>(9.265)
}

fn check_range<F: FloatSample>(low_hz: F, high_hz: F) -> Result<(), ConfigError> {
    if !(low_hz >= F::zero()) || !low_hz.is_finite() {
        return Err(ConfigError::InvalidArgument {
            arg: "low_hz",
            reason: "lower frequency bound must be non-negative and finite",
        });
    }
    if !(high_hz > low_hz) || !high_hz.is_finite() {
        return Err(ConfigError::InvalidArgument {
            arg: "high_hz",
            reason: "upper frequency bound must exceed the lower bound",
        });
    }
    Ok(())
}

/// `n` frequencies evenly spaced on the ERB-rate scale from `low_hz` to
/// `high_hz` inclusive.
///
/// # Examples
/// ```
/// use afe_rs::auditory::erb::erb_space_count;
///
/// let cfs = erb_space_count(80.0f64, 8000.0, 32).unwrap();
/// assert_eq!(cfs.len(), 32);
/// assert!((cfs[0] - 80.0).abs() < 1e-9);
/// assert!((cfs[31] - 8000.0).abs() < 1e-6);
/// ```
pub fn erb_space_count<F: FloatSample>(
    low_hz: F,
    high_hz: F,
    n: usize,
) -> Result<Vec<F>, ConfigError> {
    check_range(low_hz, high_hz)?;
    if n == 0 {
        return Err(ConfigError::InvalidArgument {
            arg: "num_channels",
            reason: "at least one channel is required",
        });
    }
    Ok(linspace(hz_to_erb(low_hz), hz_to_erb(high_hz), n)
        .into_iter()
        .map(erb_to_hz)
        .collect())
}

/// Frequencies from `low_hz` stepping `spacing` ERB at a time, not exceeding
/// `high_hz`.
pub fn erb_space_step<F: FloatSample>(
    low_hz: F,
    high_hz: F,
    spacing: F,
) -> Result<Vec<F>, ConfigError> {
    check_range(low_hz, high_hz)?;
    let erbs = arange_inclusive(hz_to_erb(low_hz), hz_to_erb(high_hz), spacing).map_err(|_| {
        ConfigError::InvalidArgument {
            arg: "erb_spacing",
            reason: "ERB spacing must be positive and finite",
        }
    })?;
    Ok(erbs.into_iter().map(erb_to_hz).collect())
}
