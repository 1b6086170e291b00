//! Trait-first stateful filter kernel.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::signal::traits::StreamFilter1D;
use crate::signal::FloatSample;
use nalgebra::Complex;
use ndarray::{Array1, ArrayView2};

use super::lfilter::Normalized;
use super::{FilterSpec, FilterState, TransferFunction};

/// Constructor config for [`Filter`].
#[derive(Debug, Clone)]
pub struct FilterConfig<F> {
    /// Coefficients, sampling frequency and structure.
    pub spec: FilterSpec<F>,
}

#[derive(Debug, Clone, PartialEq)]
enum Prepared<F> {
    Real(Normalized<F>),
    Complex(Normalized<Complex<F>>),
}

impl<F> Prepared<F>
where
    F: FloatSample,
{
    /// `Ok(None)` while the order is undefined.
    fn from_tf(tf: &TransferFunction<F>) -> Result<Option<Self>, ConfigError> {
        if tf.order().is_none() {
            return Ok(None);
        }
        let prepared = match tf {
            TransferFunction::Real { b, a } => Normalized::new(b, a).map(Prepared::Real),
            TransferFunction::Complex { b, a } => Normalized::new(b, a).map(Prepared::Complex),
        };
        prepared.map(Some).ok_or(ConfigError::InvalidArgument {
            arg: "a",
            reason: "leading denominator coefficient must be nonzero",
        })
    }

    fn order(&self) -> usize {
        match self {
            Prepared::Real(c) => c.order(),
            Prepared::Complex(c) => c.order(),
        }
    }
}

/// One causal linear filter with exclusively owned, persistent state.
///
/// The state is zero-initialized lazily on the first call and mutated by
/// every subsequent one, so a signal fed through the same instance in pieces
/// is filtered exactly as if it were fed at once.
///
/// Complex transfer functions run their recursion in the complex domain and
/// emit `2 * re(y)`, so the output is always real.
///
/// # Examples
/// ```
/// use afe_rs::kernel::KernelLifecycle;
/// use afe_rs::signal::filter::{Filter, FilterConfig, FilterSpec};
/// use afe_rs::signal::traits::StreamFilter1D;
///
/// let mut filter = Filter::try_new(FilterConfig {
///     spec: FilterSpec::new(vec![0.5, 0.5], vec![1.0]),
/// })
/// .unwrap();
/// assert_eq!(filter.run_alloc(&[2.0, 4.0]).unwrap(), vec![1.0, 3.0]);
/// // The second call sees the last sample of the first one.
/// assert_eq!(filter.run_alloc(&[0.0]).unwrap(), vec![2.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Filter<F> {
    spec: FilterSpec<F>,
    prepared: Option<Prepared<F>>,
    state: FilterState<F>,
}

impl<F> KernelLifecycle for Filter<F>
where
    F: FloatSample,
{
    type Config = FilterConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let spec = config.spec;
        if let Some(fs) = spec.fs() {
            if !(fs > F::zero()) || !fs.is_finite() {
                return Err(ConfigError::InvalidArgument {
                    arg: "fs",
                    reason: "sampling frequency must be positive and finite",
                });
            }
        }
        let prepared = Prepared::from_tf(spec.transfer_function())?;
        let state = FilterState::unset(spec.transfer_function());
        Ok(Self {
            spec,
            prepared,
            state,
        })
    }
}

impl<F> Filter<F>
where
    F: FloatSample,
{
    /// Filter descriptor.
    pub fn spec(&self) -> &FilterSpec<F> {
        &self.spec
    }

    /// Derived order, `None` when no coefficients are set.
    pub fn order(&self) -> Option<usize> {
        self.spec.order()
    }

    /// Current delay state. Empty until the first call or [`Filter::reset`].
    pub fn state(&self) -> &FilterState<F> {
        &self.state
    }

    /// Zero the state.
    ///
    /// # Errors
    /// [`ExecInvariantViolation::UndefinedOrder`] when no coefficients are set.
    pub fn reset(&mut self) -> Result<(), ExecInvariantViolation> {
        let order = self.order().ok_or(ExecInvariantViolation::UndefinedOrder)?;
        self.state = FilterState::zeros(self.spec.transfer_function(), order);
        Ok(())
    }

    /// Replace the state, e.g. to resume from a saved one. An empty state is
    /// accepted and means "start from rest".
    pub fn set_state(&mut self, state: FilterState<F>) -> Result<(), ExecInvariantViolation> {
        let tf = self.spec.transfer_function();
        if !state.matches_kind(tf) {
            return Err(ExecInvariantViolation::InvalidState {
                reason: "state kind does not match the transfer function",
            });
        }
        if !state.is_empty() {
            let order = tf.order().ok_or(ExecInvariantViolation::UndefinedOrder)?;
            if state.len() != order {
                return Err(ExecInvariantViolation::LengthMismatch {
                    arg: "state",
                    expected: order,
                    got: state.len(),
                });
            }
        }
        self.state = state;
        Ok(())
    }

    /// Swap in new coefficients. The order is re-derived and the state is
    /// cleared; on error the filter is left untouched.
    pub fn set_transfer_function(&mut self, tf: TransferFunction<F>) -> Result<(), ConfigError> {
        let prepared = Prepared::from_tf(&tf)?;
        self.state = FilterState::unset(&tf);
        self.spec = FilterSpec::from_transfer_function(tf)
            .with_structure(self.spec.structure())
            .with_fs_opt(self.spec.fs());
        self.prepared = prepared;
        Ok(())
    }

    /// Filter one column of a `samples x channels` matrix.
    ///
    /// # Errors
    /// [`ExecInvariantViolation::NotSingleChannel`] for more than one column.
    pub fn apply_2d(&mut self, input: ArrayView2<F>) -> Result<Array1<F>, ExecInvariantViolation> {
        if input.ncols() != 1 {
            return Err(ExecInvariantViolation::NotSingleChannel {
                channels: input.ncols(),
            });
        }
        let column = input.column(0).to_vec();
        self.run_alloc(&column).map(Array1::from)
    }

    /// First `n` samples of the impulse response, computed from rest without
    /// touching this filter's state.
    pub fn impulse_response(&self, n: usize) -> Result<Vec<F>, ExecInvariantViolation> {
        let mut fresh = Self {
            spec: self.spec.clone(),
            prepared: self.prepared.clone(),
            state: FilterState::unset(self.spec.transfer_function()),
        };
        let mut impulse = vec![F::zero(); n];
        if let Some(first) = impulse.first_mut() {
            *first = F::one();
        }
        fresh.run_alloc(&impulse)
    }

    fn filter_slice(&mut self, input: &[F], out: &mut [F]) -> Result<(), ExecInvariantViolation> {
        let prepared = self
            .prepared
            .as_ref()
            .ok_or(ExecInvariantViolation::UndefinedOrder)?;
        let order = prepared.order();
        if self.state.is_empty() {
            self.state = FilterState::zeros(self.spec.transfer_function(), order);
        } else if self.state.len() != order {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "state",
                expected: order,
                got: self.state.len(),
            });
        }

        let mut n = 0;
        match (prepared, &mut self.state) {
            (Prepared::Real(c), FilterState::Real(z)) => {
                c.run(z, input.iter().copied(), |y| {
                    out[n] = y;
                    n += 1;
                });
            }
            (Prepared::Complex(c), FilterState::Complex(z)) => {
                let two = F::one() + F::one();
                c.run(z, input.iter().copied(), |y: Complex<F>| {
                    out[n] = two * y.re;
                    n += 1;
                });
            }
            _ => {
                return Err(ExecInvariantViolation::InvalidState {
                    reason: "state kind does not match the transfer function",
                })
            }
        }
        Ok(())
    }
}

impl<F> FilterSpec<F>
where
    F: FloatSample,
{
    fn with_fs_opt(self, fs: Option<F>) -> Self {
        match fs {
            Some(fs) => self.with_fs(fs),
            None => self,
        }
    }
}

impl<F> StreamFilter1D<F> for Filter<F>
where
    F: FloatSample,
{
    fn run_into<I, O>(&mut self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let out_slice = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out_slice.len() != input.len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: input.len(),
                got: out_slice.len(),
            });
        }
        self.filter_slice(input, out_slice)
    }

    fn run_alloc<I>(&mut self, input: &I) -> Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let mut out = vec![F::zero(); input.len()];
        self.filter_slice(input, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::filter::lfilter_dyn;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn real_filter(b: Vec<f64>, a: Vec<f64>) -> Filter<f64> {
        Filter::try_new(FilterConfig {
            spec: FilterSpec::new(b, a),
        })
        .expect("filter should initialize")
    }

    fn complex_resonator() -> Filter<f64> {
        let p = Complex::from_polar(0.95, 0.3);
        let b = vec![Complex::new(0.05, 0.0)];
        let a = vec![
            Complex::new(1.0, 0.0),
            -p * 2.0,
            p * p,
        ];
        Filter::try_new(FilterConfig {
            spec: FilterSpec::complex(b, a),
        })
        .expect("complex filter should initialize")
    }

    fn noise(rng: &mut StdRng, n: usize) -> Vec<f64> {
        (0..n).map(|_| rng.random_range(-1.0..1.0)).collect()
    }

    fn feed_in_chunks(filter: &mut Filter<f64>, x: &[f64], rng: &mut StdRng) -> Vec<f64> {
        let mut out = Vec::with_capacity(x.len());
        let mut start = 0;
        while start < x.len() {
            let end = (start + rng.random_range(1..40)).min(x.len());
            out.extend(filter.run_alloc(&x[start..end]).expect("chunk should filter"));
            start = end;
        }
        out
    }

    #[test]
    fn chunked_output_matches_single_call() {
        let mut rng = StdRng::seed_from_u64(7);
        let x = noise(&mut rng, 500);

        let mut whole = real_filter(vec![0.1, 0.2, 0.1], vec![1.0, -1.1, 0.4]);
        let expected = whole.run_alloc(&x).unwrap();

        let mut chunked = real_filter(vec![0.1, 0.2, 0.1], vec![1.0, -1.1, 0.4]);
        let actual = feed_in_chunks(&mut chunked, &x, &mut rng);

        assert_eq!(actual.len(), expected.len());
        actual
            .iter()
            .zip(expected.iter())
            .for_each(|(a, e)| assert_abs_diff_eq!(*a, *e, epsilon = 1e-12));
        assert_eq!(chunked.state(), whole.state());
    }

    #[test]
    fn complex_chunked_output_matches_single_call() {
        let mut rng = StdRng::seed_from_u64(11);
        let x = noise(&mut rng, 400);

        let mut whole = complex_resonator();
        let expected = whole.run_alloc(&x).unwrap();
        let mut chunked = complex_resonator();
        let actual = feed_in_chunks(&mut chunked, &x, &mut rng);

        actual
            .iter()
            .zip(expected.iter())
            .for_each(|(a, e)| assert_abs_diff_eq!(*a, *e, epsilon = 1e-12));
    }

    #[test]
    fn complex_output_is_twice_the_real_part() {
        let mut filter = complex_resonator();
        let x = [1.0, 0.0, 0.0, 0.0, 0.0];
        let y = filter.run_alloc(&x).unwrap();

        // h[0] = 0.05, h[1] = 0.05 * 2p, h[2] = 0.05 * (4p^2 - p^2)
        let p = Complex::from_polar(0.95f64, 0.3);
        assert_abs_diff_eq!(y[0], 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(y[1], 2.0 * (p * 0.1).re, epsilon = 1e-12);
        assert_abs_diff_eq!(y[2], 2.0 * (p * p * 0.15).re, epsilon = 1e-12);
        assert!(y.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn matches_free_function() {
        let b = array![0.3, -0.1, 0.05, 0.2];
        let a = array![1.0, -0.3];
        let x: Vec<f64> = (0..32).map(|i| (i as f64 * 0.37).sin()).collect();
        let (expected, zf) =
            lfilter_dyn(b.view(), a.view(), ndarray::ArrayView1::from(&x), None).unwrap();

        let mut filter = real_filter(b.to_vec(), a.to_vec());
        let mut out = vec![0.0; x.len()];
        filter.run_into(&x, &mut out).unwrap();
        assert_eq!(out, expected.to_vec());
        assert_eq!(filter.state(), &FilterState::Real(zf.to_vec()));
    }

    #[test]
    fn instances_do_not_share_state() {
        let mut left = real_filter(vec![1.0], vec![1.0, -0.9]);
        let mut right = left.clone();
        left.run_alloc(&[1.0, 1.0, 1.0]).unwrap();
        right.run_alloc(&[-2.0]).unwrap();

        assert_eq!(right.state(), &FilterState::Real(vec![-1.8]));
        let y = right.run_alloc(&[0.0]).unwrap();
        assert_abs_diff_eq!(y[0], -1.8, epsilon = 1e-12);
        assert_ne!(left.state(), right.state());
    }

    #[test]
    fn state_is_lazily_initialized_and_reset_is_idempotent() {
        let mut filter = real_filter(vec![1.0, 1.0, 1.0], vec![1.0]);
        assert!(filter.state().is_empty());
        filter.run_alloc(&[1.0, 2.0]).unwrap();
        assert_eq!(filter.state().len(), 2);
        assert!(!filter.state().is_zero());

        filter.reset().unwrap();
        let once = filter.state().clone();
        filter.reset().unwrap();
        assert_eq!(filter.state(), &once);
        assert_eq!(once, FilterState::Real(vec![0.0, 0.0]));
    }

    #[test]
    fn undefined_order_is_an_error() {
        let mut filter = real_filter(vec![], vec![1.0]);
        assert_eq!(filter.order(), None);
        assert_eq!(filter.reset(), Err(ExecInvariantViolation::UndefinedOrder));
        assert_eq!(
            filter.run_alloc(&[1.0]),
            Err(ExecInvariantViolation::UndefinedOrder)
        );
    }

    #[test]
    fn mismatched_state_is_a_dimension_error() {
        let mut filter = real_filter(vec![1.0, 0.5], vec![1.0]);
        assert_eq!(
            filter.set_state(FilterState::Real(vec![0.0, 0.0, 0.0])),
            Err(ExecInvariantViolation::LengthMismatch {
                arg: "state",
                expected: 1,
                got: 3
            })
        );
        assert!(matches!(
            filter.set_state(FilterState::Complex(vec![Complex::new(0.0, 0.0)])),
            Err(ExecInvariantViolation::InvalidState { .. })
        ));
        filter.set_state(FilterState::Real(vec![2.0])).unwrap();
        assert_eq!(filter.run_alloc(&[0.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn output_length_is_checked() {
        let mut filter = real_filter(vec![1.0], vec![1.0]);
        let mut short = [0.0; 2];
        assert_eq!(
            filter.run_into(&[1.0, 2.0, 3.0], &mut short),
            Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn multichannel_input_is_rejected() {
        let mut filter = real_filter(vec![1.0], vec![1.0]);
        let stereo = Array2::<f64>::zeros((8, 2));
        assert_eq!(
            filter.apply_2d(stereo.view()),
            Err(ExecInvariantViolation::NotSingleChannel { channels: 2 })
        );
        let mono = Array2::from_shape_vec((3, 1), vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(filter.apply_2d(mono.view()).unwrap(), array![1.0, 2.0, 3.0]);
    }

    #[test]
    fn constructor_validation() {
        let err = Filter::try_new(FilterConfig {
            spec: FilterSpec::new(vec![1.0f64], vec![0.0, 1.0]),
        })
        .expect_err("zero leading denominator must fail");
        assert!(matches!(err, ConfigError::InvalidArgument { arg: "a", .. }));

        let err = Filter::try_new(FilterConfig {
            spec: FilterSpec::new(vec![1.0f64], vec![1.0]).with_fs(0.0),
        })
        .expect_err("zero fs must fail");
        assert!(matches!(err, ConfigError::InvalidArgument { arg: "fs", .. }));
    }

    #[test]
    fn replacing_coefficients_rederives_order() {
        let mut filter = real_filter(vec![1.0], vec![1.0]);
        filter.run_alloc(&[1.0]).unwrap();
        filter
            .set_transfer_function(TransferFunction::Real {
                b: vec![1.0, 0.0, 0.0],
                a: vec![1.0],
            })
            .unwrap();
        assert_eq!(filter.order(), Some(2));
        assert!(filter.state().is_empty());
        assert_eq!(filter.run_alloc(&[3.0]).unwrap(), vec![3.0]);
    }

    #[test]
    fn impulse_response_leaves_state_alone() {
        let mut filter = real_filter(vec![1.0], vec![1.0, -0.5]);
        filter.run_alloc(&[4.0]).unwrap();
        let before = filter.state().clone();
        let h = filter.impulse_response(3).unwrap();
        assert_eq!(h, vec![1.0, 0.5, 0.25]);
        assert_eq!(filter.state(), &before);
    }
}
