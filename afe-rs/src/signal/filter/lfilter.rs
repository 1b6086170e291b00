use afe_rs_core::{Error, Result};
use ndarray::{Array1, ArrayView1};
use num_traits::Num;

use crate::signal::FloatSample;

/// Coefficients normalized by `a[0]` and zero-padded to `order + 1` taps.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Normalized<T> {
    pub(crate) b: Vec<T>,
    pub(crate) a: Vec<T>,
}

impl<T> Normalized<T>
where
    T: Num + Copy,
{
    /// `None` when either sequence is empty or `a[0]` is zero.
    pub(crate) fn new(b: &[T], a: &[T]) -> Option<Self> {
        let a0 = *a.first()?;
        if b.is_empty() || a0.is_zero() {
            return None;
        }
        let n = b.len().max(a.len());
        let pad = |c: &[T]| -> Vec<T> {
            let mut out: Vec<T> = c.iter().map(|&v| v / a0).collect();
            out.resize(n, T::zero());
            out
        };
        Some(Self { b: pad(b), a: pad(a) })
    }

    pub(crate) fn order(&self) -> usize {
        self.b.len() - 1
    }

    /// Direct form II transposed over `x`, updating `z` in place.
    ///
    /// `z.len()` must equal [`Self::order`].
    pub(crate) fn run<S, I>(&self, z: &mut [T], x: I, mut emit: impl FnMut(T))
    where
        I: IntoIterator<Item = S>,
        S: Into<T>,
    {
        let (b, a) = (&self.b, &self.a);
        let order = z.len();
        debug_assert_eq!(order, self.order());
        for xi in x {
            let xi: T = xi.into();
            if order == 0 {
                emit(b[0] * xi);
                continue;
            }
            let y = b[0] * xi + z[0];
            for k in 1..order {
                z[k - 1] = b[k] * xi + z[k] - a[k] * y;
            }
            z[order - 1] = b[order] * xi - a[order] * y;
            emit(y);
        }
    }
}

/// Filter data `x` with an IIR or FIR filter, carrying delay state in and out.
///
/// The filter is a direct form II transposed implementation of the standard
/// difference equation
///
/// ```text
/// a[0]*y[n] = b[0]*x[n] + b[1]*x[n-1] + ... + b[M]*x[n-M]
///                       - a[1]*y[n-1] - ... - a[N]*y[n-N]
/// ```
///
/// ## Parameters
/// * `b` : The numerator coefficient vector.
/// * `a` : The denominator coefficient vector. If `a[0]` is not 1, both `a`
///   and `b` are normalized by `a[0]`.
/// * `x` : The input signal.
/// * `zi`: Initial conditions for the filter delays, of length
///   `max(len(a), len(b)) - 1`. `None` or an empty view means initial rest.
///
/// ## Returns
/// * `y` : The output of the digital filter.
/// * `zf` : The final filter delay values. Passing `zf` as `zi` of the next
///   call continues the filtering seamlessly.
///
/// # Examples
/// ```
/// use ndarray::array;
/// use afe_rs::signal::filter::lfilter_dyn;
///
/// let b = array![5., 4., 1., 2.];
/// let a = array![1.];
/// let x = array![1., 2., 3., 4., 3., 5., 6.];
/// let (y, zf) = lfilter_dyn(b.view(), a.view(), x.view(), None).unwrap();
/// assert_eq!(y, array![5., 14., 24., 36., 38., 47., 61.]);
/// assert_eq!(zf.len(), 3);
/// ```
///
/// # Errors
/// [`Error::InvalidArg`] for empty coefficients or `a[0] == 0`,
/// [`Error::DimensionMismatch`] when `zi` has the wrong length.
pub fn lfilter_dyn<F>(
    b: ArrayView1<F>,
    a: ArrayView1<F>,
    x: ArrayView1<F>,
    zi: Option<ArrayView1<F>>,
) -> Result<(Array1<F>, Array1<F>)>
where
    F: FloatSample,
{
    if b.is_empty() {
        return Err(Error::InvalidArg {
            arg: "b".into(),
            reason: "numerator has no coefficients".into(),
        });
    }
    if a.is_empty() {
        return Err(Error::InvalidArg {
            arg: "a".into(),
            reason:
                "Empty 1D array will result in inf/nan result. Consider setting to `array![1.]`."
                    .into(),
        });
    }
    let b = b.to_vec();
    let a = a.to_vec();
    let coeffs = Normalized::new(&b, &a).ok_or_else(|| Error::InvalidArg {
        arg: "a".into(),
        reason: "First element of a found to be zero.".into(),
    })?;

    let order = coeffs.order();
    let mut z = match zi {
        Some(zi) if !zi.is_empty() => {
            if zi.len() != order {
                return Err(Error::DimensionMismatch {
                    arg: "zi".into(),
                    expected: order,
                    got: zi.len(),
                });
            }
            zi.to_vec()
        }
        _ => vec![F::zero(); order],
    };

    let mut y = Vec::with_capacity(x.len());
    coeffs.run(&mut z, x.iter().copied(), |v| y.push(v));
    Ok((Array1::from(y), Array1::from(z)))
}
