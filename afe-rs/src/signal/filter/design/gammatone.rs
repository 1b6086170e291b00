use super::{ChannelRequest, FilterDesign, IrType};
use crate::auditory::erb::erb_bandwidth;
use crate::kernel::{ConfigError, KernelLifecycle};
use crate::signal::filter::{Filter, FilterConfig, FilterSpec};
use crate::signal::{cast, FloatSample};
use afe_rs_core::num_rs::polypow;
use core::f64::consts::PI;
use nalgebra::Complex;
use ndarray::array;
use tracing::warn;

/// Gammatone channel design.
///
/// Each channel is an `order`-fold cascade of the complex one-pole section
///
/// ```text
///            1 - |p|
/// H1(z) = -------------,   p = exp(-(bw + j 2π fc) / fs),   bw = 2π · bandwidth_erb · ERB(fc)
///          1 - p z^-1
/// ```
///
/// which has unit gain at `fc`. The IIR variant keeps that complex transfer
/// function; the FIR variant takes `2 · re(h)` of its impulse response over
/// `round(duration_sec · fs)` taps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GammatoneDesign;

impl GammatoneDesign {
    fn validate<F: FloatSample>(request: &ChannelRequest<F>) -> Result<(), ConfigError> {
        let half = cast::<F>(0.5);
        if !(request.fs > F::zero()) || !request.fs.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "fs",
                reason: "sampling frequency must be positive and finite",
            });
        }
        if !(request.fc > F::zero()) || !(request.fc < request.fs * half) {
            return Err(ConfigError::InvalidArgument {
                arg: "fc",
                reason: "center frequency must lie in (0, fs/2)",
            });
        }
        if request.order == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "order",
                reason: "gammatone order must be at least 1",
            });
        }
        if !(request.bandwidth_erb > F::zero()) || !request.bandwidth_erb.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "bandwidth_erb",
                reason: "bandwidth must be positive and finite",
            });
        }
        Ok(())
    }

    /// Complex all-pole transfer function of one channel.
    pub fn complex_spec<F: FloatSample>(
        request: &ChannelRequest<F>,
    ) -> Result<FilterSpec<F>, ConfigError> {
        Self::validate(request)?;
        let two_pi = cast::<F>(2.0 * PI);
        let bw = two_pi * request.bandwidth_erb * erb_bandwidth(request.fc);
        let radius = (-bw / request.fs).exp();
        let theta = two_pi * request.fc / request.fs;
        let pole = Complex::from_polar(radius, theta);

        let one = Complex::new(F::one(), F::zero());
        let section = array![one, -pole];
        let a = polypow(section.view(), request.order).map_err(|_| {
            ConfigError::InvalidArgument {
                arg: "order",
                reason: "could not expand the denominator polynomial",
            }
        })?;
        let gain = (F::one() - radius).powi(request.order as i32);
        let b = vec![Complex::new(gain, F::zero())];

        Ok(FilterSpec::complex(b, a.to_vec()).with_fs(request.fs))
    }
}

impl<F> FilterDesign<F> for GammatoneDesign
where
    F: FloatSample,
{
    fn design(&self, request: &ChannelRequest<F>) -> Result<Filter<F>, ConfigError> {
        if request.align {
            warn!(
                fc = ?request.fc,
                "gammatone phase alignment is not implemented; ignoring align = true"
            );
        }
        let iir = Filter::try_new(FilterConfig {
            spec: Self::complex_spec(request)?,
        })?;

        match request.ir_type {
            IrType::Iir => Ok(iir),
            IrType::Fir => {
                if !(request.duration_sec > F::zero()) || !request.duration_sec.is_finite() {
                    return Err(ConfigError::InvalidArgument {
                        arg: "duration_sec",
                        reason: "impulse-response duration must be positive and finite",
                    });
                }
                let taps = (request.duration_sec * request.fs)
                    .round()
                    .to_usize()
                    .filter(|&n| n > 0)
                    .ok_or(ConfigError::InvalidArgument {
                        arg: "duration_sec",
                        reason: "impulse response must span at least one sample",
                    })?;
                let b = iir.impulse_response(taps).map_err(|_| ConfigError::InvalidArgument {
                    arg: "order",
                    reason: "could not compute the gammatone impulse response",
                })?;
                Filter::try_new(FilterConfig {
                    spec: FilterSpec::new(b, vec![F::one()]).with_fs(request.fs),
                })
            }
        }
    }
}
