use super::buffer::CarryBuffer;
use super::near_eq;
use crate::kernel::{channel_samples, ConfigError, ExecInvariantViolation, KernelLifecycle};
use crate::signal::filter::design::{IntegratorDesign, LeakyIntegratorDesign};
use crate::signal::filter::Filter;
use crate::signal::traits::{ChunkProcessor, HasParameters, StreamFilter1D};
use crate::signal::windows::{FrameWindow, WindowName};
use crate::signal::{cast, FloatSample};
use core::{fmt, str::FromStr};
use ndarray::{s, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default frame window.
pub const DEFAULT_WINDOW: &str = "hann";
/// Default frame duration in seconds.
pub const DEFAULT_WINDOW_SEC: f64 = 0.02;
/// Default hop duration in seconds.
pub const DEFAULT_HOP_SEC: f64 = 0.01;
/// Default frame scaling.
pub const DEFAULT_SCALING: &str = "power";
/// Default leaky-integrator time constant in seconds.
pub const DEFAULT_DECAY_SEC: f64 = 0.008;

/// Reduction applied to each windowed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scaling {
    /// Mean of the windowed samples.
    Magnitude,
    /// Mean of the squared windowed samples.
    #[default]
    Power,
}

impl FromStr for Scaling {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "magnitude" => Ok(Scaling::Magnitude),
            "power" => Ok(Scaling::Power),
            _ => Err(ConfigError::UnsupportedScaling { name: s.into() }),
        }
    }
}

impl fmt::Display for Scaling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scaling::Magnitude => f.write_str("magnitude"),
            Scaling::Power => f.write_str("power"),
        }
    }
}

/// Ratemap parameters as supplied by an orchestration layer.
///
/// Names stay strings so that an unreadable value shows up as a mismatch in
/// [`HasParameters`] rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RatemapParams<F> {
    /// Window function name.
    pub window_name: Option<String>,
    /// Frame duration in seconds.
    pub window_sec: Option<F>,
    /// Hop duration in seconds.
    pub hop_sec: Option<F>,
    /// `magnitude` or `power`.
    pub scaling: Option<String>,
    /// Leaky-integrator time constant in seconds.
    pub decay_sec: Option<F>,
}

impl<F> RatemapParams<F>
where
    F: FloatSample,
{
    /// Copy with every unset field replaced by its default.
    pub fn resolved(&self) -> Self {
        Self {
            window_name: Some(
                self.window_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_WINDOW.into()),
            ),
            window_sec: Some(self.window_sec.unwrap_or_else(|| cast(DEFAULT_WINDOW_SEC))),
            hop_sec: Some(self.hop_sec.unwrap_or_else(|| cast(DEFAULT_HOP_SEC))),
            scaling: Some(
                self.scaling
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SCALING.into()),
            ),
            decay_sec: Some(self.decay_sec.unwrap_or_else(|| cast(DEFAULT_DECAY_SEC))),
        }
    }
}

/// Constructor config for [`Ratemap`].
#[derive(Debug, Clone, PartialEq)]
pub struct RatemapConfig<F> {
    /// Sampling frequency of the incoming samples in Hz.
    pub fs: F,
    /// Window function.
    pub window: WindowName,
    /// Frame duration in seconds.
    pub window_sec: F,
    /// Hop duration in seconds.
    pub hop_sec: F,
    /// Frame reduction.
    pub scaling: Scaling,
    /// Leaky-integrator time constant in seconds.
    pub decay_sec: F,
}

impl<F> RatemapConfig<F>
where
    F: FloatSample,
{
    /// Resolve orchestration parameters, filling in defaults.
    ///
    /// # Errors
    /// [`ConfigError::UnknownWindow`] or [`ConfigError::UnsupportedScaling`]
    /// for unrecognized names.
    pub fn from_params(fs: F, params: &RatemapParams<F>) -> Result<Self, ConfigError> {
        let params = params.resolved();
        Ok(Self {
            fs,
            window: params.window_name.as_deref().unwrap_or(DEFAULT_WINDOW).parse()?,
            window_sec: params.window_sec.unwrap_or_else(|| cast(DEFAULT_WINDOW_SEC)),
            hop_sec: params.hop_sec.unwrap_or_else(|| cast(DEFAULT_HOP_SEC)),
            scaling: params.scaling.as_deref().unwrap_or(DEFAULT_SCALING).parse()?,
            decay_sec: params.decay_sec.unwrap_or_else(|| cast(DEFAULT_DECAY_SEC)),
        })
    }
}

/// Framing and integration stage.
///
/// Each channel is smoothed by its own leaky integrator, appended to the
/// samples left over from the previous call, and cut into windowed frames of
/// `window_len` samples every `hop_len` samples. Every frame is reduced to
/// one value per channel, so a call returns a `frames x channels` matrix.
///
/// The frame count of a call is
/// `max(floor((total - (window_len - hop_len)) / hop_len), 1)` where `total`
/// counts carried plus new samples. The one-frame floor means an input
/// shorter than a window still yields a frame; samples past the end of the
/// available data read as zero and the mean is still taken over the full
/// window length. A call with nothing carried and no new samples yields no
/// frames.
///
/// Integrators are created on the first call, once the channel count is
/// known. A later call with a different channel count rebuilds them and drops
/// the carried samples, with a warning.
///
/// # Examples
/// ```
/// use afe_rs::auditory::{Ratemap, RatemapConfig, Scaling};
/// use afe_rs::kernel::KernelLifecycle;
/// use afe_rs::signal::traits::ChunkProcessor;
/// use afe_rs::signal::windows::WindowName;
/// use ndarray::Array2;
///
/// let mut ratemap = Ratemap::try_new(RatemapConfig {
///     fs: 16000.0f64,
///     window: WindowName::Hann,
///     window_sec: 0.025,
///     hop_sec: 0.01,
///     scaling: Scaling::Power,
///     decay_sec: 0.008,
/// })
/// .unwrap();
/// let frames = ratemap.process_chunk(Array2::zeros((2000, 1)).view()).unwrap();
/// assert_eq!(frames.dim(), (11, 1));
/// assert_eq!(ratemap.buffered_samples(), 240);
/// ```
#[derive(Debug, Clone)]
pub struct Ratemap<F, D = LeakyIntegratorDesign> {
    fs: F,
    frame: FrameWindow<F>,
    scaling: Scaling,
    decay_sec: F,
    design: D,
    integrators: Vec<Filter<F>>,
    buffer: CarryBuffer<F>,
}

impl<F> KernelLifecycle for Ratemap<F>
where
    F: FloatSample,
{
    type Config = RatemapConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        Self::with_design(config, LeakyIntegratorDesign)
    }
}

impl<F, D> Ratemap<F, D>
where
    F: FloatSample,
    D: IntegratorDesign<F>,
{
    /// Build the stage with a custom integrator collaborator.
    pub fn with_design(config: RatemapConfig<F>, design: D) -> Result<Self, ConfigError> {
        let frame = FrameWindow::new(config.window, config.window_sec, config.hop_sec, config.fs)?;
        if !(config.decay_sec > F::zero()) || !config.decay_sec.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "decay_sec",
                reason: "decay time constant must be positive and finite",
            });
        }
        Ok(Self {
            fs: config.fs,
            frame,
            scaling: config.scaling,
            decay_sec: config.decay_sec,
            design,
            integrators: Vec::new(),
            buffer: CarryBuffer::new(),
        })
    }

    fn ensure_integrators(&mut self, channels: usize) -> Result<(), ConfigError> {
        if self.integrators.len() == channels {
            return Ok(());
        }
        if !self.integrators.is_empty() {
            warn!(
                previous = self.integrators.len(),
                channels,
                "channel count changed, rebuilding leaky integrators and dropping carried samples"
            );
            self.buffer.clear();
        }
        self.integrators = (0..channels)
            .map(|_| self.design.design(self.fs, self.decay_sec))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(channels, decay_sec = ?self.decay_sec, "instantiated leaky integrators");
        Ok(())
    }

    fn integrate(&mut self, input: ArrayView2<F>) -> Result<Array2<F>, ExecInvariantViolation> {
        let mut smoothed = Array2::zeros(input.raw_dim());
        for ((filter, column), mut out) in self
            .integrators
            .iter_mut()
            .zip(input.columns())
            .zip(smoothed.columns_mut())
        {
            let y = filter.run_alloc(&*channel_samples(column))?;
            out.assign(&ArrayView1::from(&y));
        }
        Ok(smoothed)
    }

    fn frame_count(&self, total: usize) -> usize {
        if total == 0 {
            return 0;
        }
        let (w, h) = (self.frame.window_len(), self.frame.hop_len());
        ((total + h).saturating_sub(w) / h).max(1)
    }

    fn reduce_frames(&self, combined: &Array2<F>, frames: usize) -> Array2<F> {
        let (w, h) = (self.frame.window_len(), self.frame.hop_len());
        let total = combined.nrows();
        let window = self.frame.samples();
        let norm: F = cast(w as f64);
        let mut out = Array2::zeros((frames, combined.ncols()));
        for (i, mut row) in out.rows_mut().into_iter().enumerate() {
            let start = i * h;
            let end = (start + w).min(total);
            let segment = combined.slice(s![start..end, ..]);
            for (value, column) in row.iter_mut().zip(segment.columns()) {
                let sum = column
                    .iter()
                    .zip(window.iter())
                    .fold(F::zero(), |acc, (&x, &g)| {
                        let v = x * g;
                        match self.scaling {
                            Scaling::Magnitude => acc + v,
                            Scaling::Power => acc + v * v,
                        }
                    });
                *value = sum / norm;
            }
        }
        out
    }

    /// Sampling frequency of the incoming samples in Hz.
    pub fn fs(&self) -> F {
        self.fs
    }

    /// Frame shape.
    pub fn frame_window(&self) -> &FrameWindow<F> {
        &self.frame
    }

    /// Frame reduction.
    pub fn scaling(&self) -> Scaling {
        self.scaling
    }

    /// Leaky-integrator time constant in seconds.
    pub fn decay_sec(&self) -> F {
        self.decay_sec
    }

    /// Output frames per second.
    pub fn frame_rate(&self) -> F {
        self.fs / cast(self.frame.hop_len() as f64)
    }

    /// Samples per channel carried into the next call.
    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }

    /// Channel count, `None` until the first call.
    pub fn num_channels(&self) -> Option<usize> {
        self.is_initialized().then_some(self.integrators.len())
    }

    /// `true` once the integrators exist.
    pub fn is_initialized(&self) -> bool {
        !self.integrators.is_empty()
    }

    /// Per-channel leaky integrators.
    pub fn integrators(&self) -> &[Filter<F>] {
        &self.integrators
    }
}

impl<F, D> ChunkProcessor<F> for Ratemap<F, D>
where
    F: FloatSample,
    D: IntegratorDesign<F>,
{
    fn process_chunk(
        &mut self,
        input: ArrayView2<F>,
    ) -> Result<Array2<F>, ExecInvariantViolation> {
        if input.ncols() == 0 {
            return Err(ExecInvariantViolation::InvalidState {
                reason: "input has no channels",
            });
        }
        self.ensure_integrators(input.ncols())?;
        let smoothed = self.integrate(input)?;
        let combined = self.buffer.take_prepended(smoothed.view())?;

        let frames = self.frame_count(combined.nrows());
        let out = self.reduce_frames(&combined, frames);
        self.buffer
            .retain_from(&combined, frames * self.frame.hop_len());
        Ok(out)
    }

    /// Zero every integrator and drop the carried samples. Integrators, once
    /// created, are kept.
    fn reset(&mut self) -> Result<(), ExecInvariantViolation> {
        self.integrators.iter_mut().try_for_each(Filter::reset)?;
        self.buffer.clear();
        Ok(())
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        warn!(field, "missing ratemap parameter");
    }
    value
}

fn parsed<T: FromStr<Err = ConfigError>>(field: &'static str, value: Option<&str>) -> Option<T> {
    match required(field, value)?.parse() {
        Ok(v) => Some(v),
        Err(err) => {
            warn!(field, %err, "unreadable ratemap parameter");
            None
        }
    }
}

impl<F, D> HasParameters<RatemapParams<F>> for Ratemap<F, D>
where
    F: FloatSample,
    D: IntegratorDesign<F>,
{
    /// Window and scaling names compare by what they denote, so `hanning`
    /// matches a stage built with `hann`.
    fn has_parameters(&self, params: &RatemapParams<F>) -> bool {
        let window = parsed::<WindowName>("window_name", params.window_name.as_deref());
        let window_sec = required("window_sec", params.window_sec);
        let hop_sec = required("hop_sec", params.hop_sec);
        let scaling = parsed::<Scaling>("scaling", params.scaling.as_deref());
        let decay_sec = required("decay_sec", params.decay_sec);

        let (Some(window), Some(window_sec), Some(hop_sec), Some(scaling), Some(decay_sec)) =
            (window, window_sec, hop_sec, scaling, decay_sec)
        else {
            return false;
        };
        window == self.frame.name()
            && near_eq(window_sec, self.frame.window_sec())
            && near_eq(hop_sec, self.frame.hop_sec())
            && scaling == self.scaling
            && near_eq(decay_sec, self.decay_sec)
    }
}
