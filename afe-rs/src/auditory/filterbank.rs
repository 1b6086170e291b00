use super::erb::{erb_space_count, erb_space_step};
use super::near_eq;
use crate::kernel::{
    channel_samples, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D,
};
use crate::signal::filter::design::{ChannelRequest, FilterDesign, GammatoneDesign, IrType};
use crate::signal::filter::Filter;
use crate::signal::traits::{ChunkProcessor, HasParameters, StreamFilter1D};
use crate::signal::{cast, FloatSample};
use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default ERB step between channels for the range + spacing form.
pub const DEFAULT_ERB_SPACING: f64 = 1.0;
/// Default gammatone order.
pub const DEFAULT_ORDER: usize = 4;
/// Default channel bandwidth in ERB.
pub const DEFAULT_BANDWIDTH_ERB: f64 = 1.08;
/// Default impulse-response duration in seconds.
pub const DEFAULT_DURATION_SEC: f64 = 0.128;

/// Filterbank parameters as supplied by an orchestration layer.
///
/// Channel placement comes from the first satisfiable form, in order:
/// 1. `center_freqs`,
/// 2. `low_hz` + `high_hz` + `num_channels`,
/// 3. `low_hz` + `high_hz` + `erb_spacing` (1 ERB when unset).
///
/// Unknown keys are rejected when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterbankParams<F> {
    /// Explicit center frequencies in Hz.
    pub center_freqs: Option<Vec<F>>,
    /// Lower frequency bound in Hz.
    pub low_hz: Option<F>,
    /// Upper frequency bound in Hz.
    pub high_hz: Option<F>,
    /// Number of channels between the bounds.
    pub num_channels: Option<usize>,
    /// Channel spacing in ERB between the bounds.
    pub erb_spacing: Option<F>,
    /// Impulse-response type.
    pub ir_type: Option<IrType>,
    /// Gammatone order.
    pub order: Option<usize>,
    /// Channel bandwidth in ERB.
    pub bandwidth_erb: Option<F>,
    /// Cross-channel phase alignment (accepted, not implemented).
    pub align: Option<bool>,
    /// Impulse-response duration in seconds.
    pub duration_sec: Option<F>,
    /// Decimation ratio.
    pub decimation: Option<usize>,
}

impl<F> FilterbankParams<F>
where
    F: FloatSample,
{
    /// Copy with every defaultable field filled in. Frequency bounds and
    /// explicit center frequencies are left as they are.
    pub fn resolved(&self) -> Self {
        Self {
            center_freqs: self.center_freqs.clone(),
            low_hz: self.low_hz,
            high_hz: self.high_hz,
            num_channels: self.num_channels,
            erb_spacing: Some(self.erb_spacing.unwrap_or_else(|| cast(DEFAULT_ERB_SPACING))),
            ir_type: Some(self.ir_type.unwrap_or_default()),
            order: Some(self.order.unwrap_or(DEFAULT_ORDER)),
            bandwidth_erb: Some(
                self.bandwidth_erb
                    .unwrap_or_else(|| cast(DEFAULT_BANDWIDTH_ERB)),
            ),
            align: Some(self.align.unwrap_or(false)),
            duration_sec: Some(self.duration_sec.unwrap_or_else(|| cast(DEFAULT_DURATION_SEC))),
            decimation: Some(self.decimation.unwrap_or(1)),
        }
    }
}

/// Where the channels of a filterbank sit.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelLayout<F> {
    /// Explicit center frequencies in Hz, used as-is.
    CenterFrequencies(Vec<F>),
    /// `num_channels` points evenly spaced in ERB between the bounds.
    RangeCount {
        /// Lower bound in Hz.
        low_hz: F,
        /// Upper bound in Hz.
        high_hz: F,
        /// Number of channels.
        num_channels: usize,
    },
    /// Steps of `erb_spacing` ERB from the lower bound up to the upper one.
    RangeSpacing {
        /// Lower bound in Hz.
        low_hz: F,
        /// Upper bound in Hz.
        high_hz: F,
        /// Spacing in ERB.
        erb_spacing: F,
    },
}

impl<F> ChannelLayout<F>
where
    F: FloatSample,
{
    /// Pick the first satisfiable form from `params`.
    ///
    /// # Errors
    /// [`ConfigError::InsufficientParameters`] when neither explicit center
    /// frequencies nor both frequency bounds are given.
    pub fn from_params(params: &FilterbankParams<F>) -> Result<Self, ConfigError> {
        if let Some(cfs) = params.center_freqs.as_ref().filter(|c| !c.is_empty()) {
            return Ok(ChannelLayout::CenterFrequencies(cfs.clone()));
        }
        let (Some(low_hz), Some(high_hz)) = (params.low_hz, params.high_hz) else {
            return Err(ConfigError::InsufficientParameters {
                reason: "need center frequencies, or a low/high frequency range",
            });
        };
        Ok(match params.num_channels {
            Some(num_channels) => ChannelLayout::RangeCount {
                low_hz,
                high_hz,
                num_channels,
            },
            None => ChannelLayout::RangeSpacing {
                low_hz,
                high_hz,
                erb_spacing: params
                    .erb_spacing
                    .unwrap_or_else(|| cast(DEFAULT_ERB_SPACING)),
            },
        })
    }

    /// Center frequencies in Hz, ascending for the range forms.
    pub fn center_frequencies(&self) -> Result<Vec<F>, ConfigError> {
        match self {
            ChannelLayout::CenterFrequencies(cfs) => {
                if cfs.is_empty() {
                    return Err(ConfigError::EmptyInput {
                        arg: "center_freqs",
                    });
                }
                Ok(cfs.clone())
            }
            ChannelLayout::RangeCount {
                low_hz,
                high_hz,
                num_channels,
            } => erb_space_count(*low_hz, *high_hz, *num_channels),
            ChannelLayout::RangeSpacing {
                low_hz,
                high_hz,
                erb_spacing,
            } => erb_space_step(*low_hz, *high_hz, *erb_spacing),
        }
    }

    /// Frequency bounds used at construction, if any.
    pub fn bounds(&self) -> Option<(F, F)> {
        match self {
            ChannelLayout::CenterFrequencies(_) => None,
            ChannelLayout::RangeCount {
                low_hz, high_hz, ..
            }
            | ChannelLayout::RangeSpacing {
                low_hz, high_hz, ..
            } => Some((*low_hz, *high_hz)),
        }
    }

    /// ERB spacing, for the range + spacing form.
    pub fn erb_spacing(&self) -> Option<F> {
        match self {
            ChannelLayout::RangeSpacing { erb_spacing, .. } => Some(*erb_spacing),
            _ => None,
        }
    }
}

/// Constructor config for [`Filterbank`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterbankConfig<F> {
    /// Sampling frequency in Hz shared by all channels.
    pub fs: F,
    /// Channel placement.
    pub layout: ChannelLayout<F>,
    /// Impulse-response type.
    pub ir_type: IrType,
    /// Gammatone order.
    pub order: usize,
    /// Channel bandwidth in ERB.
    pub bandwidth_erb: F,
    /// Cross-channel phase alignment (accepted, not implemented).
    pub align: bool,
    /// Impulse-response duration in seconds.
    pub duration_sec: F,
    /// Decimation ratio, reported but not applied by the filterbank.
    pub decimation: usize,
}

impl<F> FilterbankConfig<F>
where
    F: FloatSample,
{
    /// Resolve orchestration parameters, filling in defaults.
    pub fn from_params(fs: F, params: &FilterbankParams<F>) -> Result<Self, ConfigError> {
        let layout = ChannelLayout::from_params(params)?;
        let params = params.resolved();
        Ok(Self {
            fs,
            layout,
            ir_type: params.ir_type.unwrap_or_default(),
            order: params.order.unwrap_or(DEFAULT_ORDER),
            bandwidth_erb: params
                .bandwidth_erb
                .unwrap_or_else(|| cast(DEFAULT_BANDWIDTH_ERB)),
            align: params.align.unwrap_or(false),
            duration_sec: params
                .duration_sec
                .unwrap_or_else(|| cast(DEFAULT_DURATION_SEC)),
            decimation: params.decimation.unwrap_or(1),
        })
    }
}

/// Parallel bank of independently parameterized filters driven by one
/// single-channel input.
///
/// Output of every call is a `samples x channels` matrix; filter state carries
/// over between calls, so chunked and one-shot processing agree.
///
/// # Examples
/// ```
/// use afe_rs::auditory::{ChannelLayout, Filterbank, FilterbankConfig};
/// use afe_rs::kernel::KernelLifecycle;
/// use afe_rs::signal::filter::design::IrType;
///
/// let mut bank = Filterbank::try_new(FilterbankConfig {
///     fs: 16000.0f64,
///     layout: ChannelLayout::CenterFrequencies(vec![100.0, 200.0, 400.0]),
///     ir_type: IrType::Iir,
///     order: 4,
///     bandwidth_erb: 1.08,
///     align: false,
///     duration_sec: 0.128,
///     decimation: 1,
/// })
/// .unwrap();
/// let out = bank.process_signal(&vec![0.0; 64]).unwrap();
/// assert_eq!(out.dim(), (64, 3));
/// ```
#[derive(Debug, Clone)]
pub struct Filterbank<F> {
    fs: F,
    filters: Vec<Filter<F>>,
    center_freqs: Vec<F>,
    layout: ChannelLayout<F>,
    ir_type: IrType,
    order: usize,
    bandwidth_erb: F,
    align: bool,
    duration_sec: F,
    decimation: usize,
}

impl<F> KernelLifecycle for Filterbank<F>
where
    F: FloatSample,
{
    type Config = FilterbankConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        Self::with_design(config, &GammatoneDesign)
    }
}

impl<F> Filterbank<F>
where
    F: FloatSample,
{
    /// Build the bank with a custom filter-design collaborator.
    pub fn with_design<D>(config: FilterbankConfig<F>, design: &D) -> Result<Self, ConfigError>
    where
        D: FilterDesign<F> + ?Sized,
    {
        let fs = config.fs;
        if !(fs > F::zero()) || !fs.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "fs",
                reason: "sampling frequency must be positive and finite",
            });
        }
        if config.decimation == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "decimation",
                reason: "decimation ratio must be at least 1",
            });
        }
        let center_freqs = config.layout.center_frequencies()?;
        let nyquist = fs * cast(0.5);
        if center_freqs.iter().any(|&fc| !(fc > F::zero() && fc < nyquist)) {
            return Err(ConfigError::InvalidArgument {
                arg: "center_freqs",
                reason: "center frequencies must lie in (0, fs/2)",
            });
        }

        let filters = center_freqs
            .iter()
            .map(|&fc| {
                design.design(&ChannelRequest {
                    fc,
                    fs,
                    ir_type: config.ir_type,
                    order: config.order,
                    bandwidth_erb: config.bandwidth_erb,
                    align: config.align,
                    duration_sec: config.duration_sec,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            channels = filters.len(),
            fs = ?fs,
            ir_type = %config.ir_type,
            order = config.order,
            "built filterbank"
        );

        Ok(Self {
            fs,
            filters,
            center_freqs,
            layout: config.layout,
            ir_type: config.ir_type,
            order: config.order,
            bandwidth_erb: config.bandwidth_erb,
            align: config.align,
            duration_sec: config.duration_sec,
            decimation: config.decimation,
        })
    }

    /// Filter one chunk of a single-channel signal through every channel.
    pub fn process_signal<I>(&mut self, input: &I) -> Result<Array2<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let x = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let mut out = Array2::zeros((x.len(), self.filters.len()));
        for (filter, mut column) in self.filters.iter_mut().zip(out.columns_mut()) {
            let y = filter.run_alloc(x)?;
            column.assign(&ArrayView1::from(&y));
        }
        Ok(out)
    }

    /// Sampling frequency in Hz.
    pub fn fs(&self) -> F {
        self.fs
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.filters.len()
    }

    /// Center frequency of every channel in Hz.
    pub fn center_frequencies(&self) -> &[F] {
        &self.center_freqs
    }

    /// Per-channel filters.
    pub fn filters(&self) -> &[Filter<F>] {
        &self.filters
    }

    /// Channel placement the bank was built from.
    pub fn layout(&self) -> &ChannelLayout<F> {
        &self.layout
    }

    /// Frequency bounds used at construction, if any.
    pub fn bounds(&self) -> Option<(F, F)> {
        self.layout.bounds()
    }

    /// ERB spacing used at construction, if any.
    pub fn erb_spacing(&self) -> Option<F> {
        self.layout.erb_spacing()
    }

    /// Impulse-response type.
    pub fn ir_type(&self) -> IrType {
        self.ir_type
    }

    /// Gammatone order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Channel bandwidth in ERB.
    pub fn bandwidth_erb(&self) -> F {
        self.bandwidth_erb
    }

    /// Whether alignment was requested.
    pub fn align(&self) -> bool {
        self.align
    }

    /// Impulse-response duration in seconds.
    pub fn duration_sec(&self) -> F {
        self.duration_sec
    }

    /// Decimation ratio.
    pub fn decimation(&self) -> usize {
        self.decimation
    }
}

impl<F> ChunkProcessor<F> for Filterbank<F>
where
    F: FloatSample,
{
    /// The input must have exactly one column.
    fn process_chunk(
        &mut self,
        input: ArrayView2<F>,
    ) -> Result<Array2<F>, ExecInvariantViolation> {
        if input.ncols() != 1 {
            return Err(ExecInvariantViolation::NotSingleChannel {
                channels: input.ncols(),
            });
        }
        self.process_signal(&*channel_samples(input.column(0)))
    }

    fn reset(&mut self) -> Result<(), ExecInvariantViolation> {
        self.filters.iter_mut().try_for_each(Filter::reset)
    }
}

impl<F> HasParameters<FilterbankParams<F>> for Filterbank<F>
where
    F: FloatSample,
{
    /// Recomputes the candidate center frequencies with the same priority
    /// rules and compares them, the order and the bandwidth.
    fn has_parameters(&self, params: &FilterbankParams<F>) -> bool {
        let candidate =
            match ChannelLayout::from_params(params).and_then(|l| l.center_frequencies()) {
                Ok(cfs) => cfs,
                Err(err) => {
                    warn!(%err, "filterbank parameters do not yield center frequencies");
                    return false;
                }
            };
        if candidate.len() != self.center_freqs.len()
            || !candidate
                .iter()
                .zip(self.center_freqs.iter())
                .all(|(&a, &b)| near_eq(a, b))
        {
            return false;
        }

        let Some(order) = params.order else {
            warn!(field = "order", "missing filterbank parameter");
            return false;
        };
        let Some(bandwidth_erb) = params.bandwidth_erb else {
            warn!(field = "bandwidth_erb", "missing filterbank parameter");
            return false;
        };
        order == self.order && near_eq(bandwidth_erb, self.bandwidth_erb)
    }
}
