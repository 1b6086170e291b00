use crate::{Error, Result};
use ndarray::{Array1, ArrayView1};
use num_traits::Num;

/// Full discrete linear convolution of two one-dimensional sequences, like
/// `np.convolve(a, v, mode="full")`.
///
/// Works for any ring-like element type, which makes it usable for expanding
/// products of complex polynomials in `z^-1`.
///
/// Output length is `a.len() + v.len() - 1`.
///
/// # Errors
/// [`Error::InvalidArg`] when either input is empty.
///
/// # Examples
/// ```
/// use ndarray::array;
/// use afe_rs_core::num_rs::convolve;
///
/// let a = array![1., 2., 3.];
/// let v = array![0., 1., 0.5];
///
/// let result = convolve(a.view(), v.view()).unwrap();
/// assert_eq!(result, array![0., 1., 2.5, 4., 1.5]);
/// ```
pub fn convolve<T>(a: ArrayView1<T>, v: ArrayView1<T>) -> Result<Array1<T>>
where
    T: Num + Copy,
{
    if a.is_empty() {
        return Err(Error::InvalidArg {
            arg: "a".into(),
            reason: "cannot convolve an empty sequence".into(),
        });
    }
    if v.is_empty() {
        return Err(Error::InvalidArg {
            arg: "v".into(),
            reason: "cannot convolve an empty sequence".into(),
        });
    }

    let mut out = Array1::from_elem(a.len() + v.len() - 1, T::zero());
    for (i, &ai) in a.iter().enumerate() {
        for (j, &vj) in v.iter().enumerate() {
            out[i + j] = out[i + j] + ai * vj;
        }
    }
    Ok(out)
}

/// Raise the polynomial `p` (coefficients in ascending powers of `z^-1`) to
/// the `n`-th power by repeated convolution. `p^0` is `[1]`.
///
/// # Errors
/// [`Error::InvalidArg`] when `p` is empty.
pub fn polypow<T>(p: ArrayView1<T>, n: usize) -> Result<Array1<T>>
where
    T: Num + Copy,
{
    if p.is_empty() {
        return Err(Error::InvalidArg {
            arg: "p".into(),
            reason: "polynomial has no coefficients".into(),
        });
    }
    (0..n).try_fold(Array1::from_elem(1, T::one()), |acc, _| {
        convolve(acc.view(), p)
    })
}
