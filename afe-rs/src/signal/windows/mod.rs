//! Window functions and the frame shape used by the framing stage.

mod kernels;

pub use kernels::*;

use crate::kernel::{ConfigError, KernelLifecycle};
use crate::signal::traits::WindowGenerate;
use crate::signal::{cast, FloatSample};
use core::f64::consts::PI;
use core::{fmt, str::FromStr};
use ndarray::Array1;

/// Window function family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowName {
    /// Hann (raised cosine) window.
    Hann,
    /// Hamming window.
    Hamming,
    /// Rectangular window.
    Rectangular,
    /// Triangular window.
    Triangular,
    /// Blackman window.
    Blackman,
}

impl FromStr for WindowName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hann" | "hanning" => Ok(WindowName::Hann),
            "hamming" => Ok(WindowName::Hamming),
            "rectwin" | "boxcar" | "rect" | "rectangular" => Ok(WindowName::Rectangular),
            "triang" | "triangle" | "triangular" => Ok(WindowName::Triangular),
            "blackman" => Ok(WindowName::Blackman),
            _ => Err(ConfigError::UnknownWindow { name: s.into() }),
        }
    }
}

impl fmt::Display for WindowName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WindowName::Hann => "hann",
            WindowName::Hamming => "hamming",
            WindowName::Rectangular => "rectwin",
            WindowName::Triangular => "triang",
            WindowName::Blackman => "blackman",
        };
        f.write_str(name)
    }
}

/// Symmetric window of length `nx` (`w[k] == w[nx - 1 - k]`).
///
/// # Examples
/// ```
/// use afe_rs::signal::windows::{get_window, WindowName};
///
/// let w: Vec<f64> = get_window(WindowName::Hann, 5);
/// assert_eq!(w.len(), 5);
/// assert_eq!((w[0], w[2], w[4]), (0.0, 1.0, 0.0));
/// assert!((w[1] - 0.5).abs() < 1e-12);
/// ```
pub fn get_window<F: FloatSample>(name: WindowName, nx: usize) -> Vec<F> {
    if nx == 0 {
        return Vec::new();
    }
    if nx == 1 {
        return vec![F::one()];
    }
    let m = (nx - 1) as f64;
    let general_cosine = |weights: &[f64]| -> Vec<F> {
        (0..nx)
            .map(|k| {
                let phase = 2.0 * PI * k as f64 / m;
                let v = weights
                    .iter()
                    .enumerate()
                    .fold(0.0, |acc, (i, w)| {
                        let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
                        acc + sign * w * (phase * i as f64).cos()
                    });
                cast(v)
            })
            .collect()
    };
    match name {
        WindowName::Hann => {
            let mut w = general_cosine(&[0.5, 0.5]);
            // Exact zeros at the edges instead of cos() rounding residue.
            w[0] = F::zero();
            w[nx - 1] = F::zero();
            if nx % 2 == 1 {
                w[nx / 2] = F::one();
            }
            w
        }
        WindowName::Hamming => general_cosine(&[0.54, 0.46]),
        WindowName::Blackman => {
            let mut w = general_cosine(&[0.42, 0.5, 0.08]);
            w[0] = F::zero();
            w[nx - 1] = F::zero();
            w
        }
        WindowName::Rectangular => vec![F::one(); nx],
        WindowName::Triangular => {
            let n = nx as f64;
            let denom = if nx % 2 == 0 { n } else { n + 1.0 };
            (0..nx)
                .map(|k| cast(1.0 - (2.0 * k as f64 - (n - 1.0)).abs() / denom))
                .collect()
        }
    }
}

/// Frame shape: window samples plus hop, in samples, at a given rate.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameWindow<F> {
    name: WindowName,
    window_sec: F,
    hop_sec: F,
    window_len: usize,
    hop_len: usize,
    samples: Array1<F>,
}

impl<F> FrameWindow<F>
where
    F: FloatSample,
{
    /// Window length is rounded to the nearest even number of samples, the
    /// hop to the nearest sample.
    ///
    /// # Errors
    /// [`ConfigError::InvalidArgument`] when `fs` is not positive, the window
    /// is shorter than 2 samples or the hop rounds to zero.
    ///
    /// # Examples
    /// ```
    /// use afe_rs::signal::windows::{FrameWindow, WindowName};
    ///
    /// let frame = FrameWindow::new(WindowName::Hann, 0.02, 0.01, 44100.0f64).unwrap();
    /// assert_eq!(frame.window_len(), 882);
    /// assert_eq!(frame.hop_len(), 441);
    /// ```
    pub fn new(name: WindowName, window_sec: F, hop_sec: F, fs: F) -> Result<Self, ConfigError> {
        if !(fs > F::zero()) || !fs.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "fs",
                reason: "sampling frequency must be positive and finite",
            });
        }
        let two = F::one() + F::one();
        let window_len = ((window_sec * fs / two).round() * two)
            .to_usize()
            .filter(|&n| n >= 2)
            .ok_or(ConfigError::InvalidArgument {
                arg: "window_sec",
                reason: "window must span at least 2 samples",
            })?;
        let hop_len = (hop_sec * fs)
            .round()
            .to_usize()
            .filter(|&n| n >= 1)
            .ok_or(ConfigError::InvalidArgument {
                arg: "hop_sec",
                reason: "hop must span at least 1 sample",
            })?;

        let kernel = WindowKernel::try_new(WindowConfig {
            name,
            nx: window_len,
        })?;
        let samples: Vec<F> =
            WindowGenerate::<F>::run_alloc(&kernel).map_err(|_| ConfigError::InvalidArgument {
                arg: "window_sec",
                reason: "window generation failed",
            })?;
        let samples = Array1::from(samples);

        Ok(Self {
            name,
            window_sec,
            hop_sec,
            window_len,
            hop_len,
            samples,
        })
    }

    /// Window family.
    pub fn name(&self) -> WindowName {
        self.name
    }

    /// Requested window duration in seconds.
    pub fn window_sec(&self) -> F {
        self.window_sec
    }

    /// Requested hop duration in seconds.
    pub fn hop_sec(&self) -> F {
        self.hop_sec
    }

    /// Window length in samples (even).
    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Hop length in samples.
    pub fn hop_len(&self) -> usize {
        self.hop_len
    }

    /// Window samples.
    pub fn samples(&self) -> &Array1<F> {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn names_parse_with_aliases() {
        assert_eq!("hann".parse(), Ok(WindowName::Hann));
        assert_eq!("Hanning".parse(), Ok(WindowName::Hann));
        assert_eq!("boxcar".parse(), Ok(WindowName::Rectangular));
        assert_eq!("rectwin".parse(), Ok(WindowName::Rectangular));
        assert_eq!(
            "kaiser".parse::<WindowName>(),
            Err(ConfigError::UnknownWindow {
                name: "kaiser".into()
            })
        );
        assert_eq!(WindowName::Hann.to_string(), "hann");
    }

    #[test]
    fn windows_are_symmetric() {
        for name in [
            WindowName::Hann,
            WindowName::Hamming,
            WindowName::Rectangular,
            WindowName::Triangular,
            WindowName::Blackman,
        ] {
            for nx in [2usize, 7, 16] {
                let w: Vec<f64> = get_window(name, nx);
                assert_eq!(w.len(), nx);
                (0..nx).for_each(|k| assert_abs_diff_eq!(w[k], w[nx - 1 - k], epsilon = 1e-12));
            }
        }
    }

    #[test]
    fn hamming_and_triangle_values() {
        let w: Vec<f64> = get_window(WindowName::Hamming, 3);
        assert_abs_diff_eq!(w[0], 0.08, epsilon = 1e-12);
        assert_abs_diff_eq!(w[1], 1.0, epsilon = 1e-12);

        let w: Vec<f64> = get_window(WindowName::Triangular, 4);
        [0.25, 0.75, 0.75, 0.25]
            .iter()
            .zip(w.iter())
            .for_each(|(e, a)| assert_abs_diff_eq!(*a, *e, epsilon = 1e-12));

        let w: Vec<f64> = get_window(WindowName::Triangular, 3);
        [0.5, 1.0, 0.5]
            .iter()
            .zip(w.iter())
            .for_each(|(e, a)| assert_abs_diff_eq!(*a, *e, epsilon = 1e-12));
    }

    #[test]
    fn frame_window_lengths() {
        let frame = FrameWindow::new(WindowName::Hann, 0.025, 0.01, 16000.0f64).unwrap();
        assert_eq!(frame.window_len(), 400);
        assert_eq!(frame.hop_len(), 160);
        assert_eq!(frame.samples().len(), 400);

        // 21.3 samples rounds to the nearest even count.
        let frame = FrameWindow::new(WindowName::Rectangular, 0.0213, 0.0104, 1000.0f64).unwrap();
        assert_eq!(frame.window_len(), 22);
        assert_eq!(frame.hop_len(), 10);
    }

    #[test]
    fn frame_window_rejects_degenerate_shapes() {
        assert!(matches!(
            FrameWindow::new(WindowName::Hann, 0.0, 0.01, 16000.0f64),
            Err(ConfigError::InvalidArgument {
                arg: "window_sec",
                ..
            })
        ));
        assert!(matches!(
            FrameWindow::new(WindowName::Hann, 0.02, 0.00001, 16000.0f64),
            Err(ConfigError::InvalidArgument { arg: "hop_sec", .. })
        ));
        assert!(matches!(
            FrameWindow::new(WindowName::Hann, 0.02, 0.01, -1.0f64),
            Err(ConfigError::InvalidArgument { arg: "fs", .. })
        ));
    }
}
