use crate::{Error, Result};
use num_traits::{Float, FromPrimitive};

/// `n` evenly spaced samples over the closed interval `[start, stop]`.
///
/// `n == 1` returns `[start]`, `n == 0` returns an empty vector.
pub fn linspace<F>(start: F, stop: F, n: usize) -> Vec<F>
where
    F: Float + FromPrimitive,
{
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let denom = F::from_usize(n - 1).unwrap_or_else(F::one);
            let step = (stop - start) / denom;
            (0..n)
                .map(|i| start + step * F::from_usize(i).unwrap_or_else(F::zero))
                .collect()
        }
    }
}

/// Values `start, start + step, ...` not exceeding `stop`, like MATLAB's
/// `start:step:stop`.
///
/// Each value is computed as `start + i * step` so rounding does not
/// accumulate.
///
/// # Errors
/// [`Error::InvalidArg`] when `step` is not strictly positive and finite.
pub fn arange_inclusive<F>(start: F, stop: F, step: F) -> Result<Vec<F>>
where
    F: Float + FromPrimitive,
{
    if !(step > F::zero()) || !step.is_finite() {
        return Err(Error::InvalidArg {
            arg: "step".into(),
            reason: "step must be positive and finite".into(),
        });
    }
    if stop < start {
        return Ok(Vec::new());
    }
    // Absorb rounding in `(stop - start) / step` the way MATLAB's colon does.
    let tol = F::from_f64(1e-10).unwrap_or_else(F::epsilon);
    let count = ((stop - start) / step + tol).floor().to_usize().unwrap_or(0) + 1;
    Ok((0..count)
        .map(|i| start + step * F::from_usize(i).unwrap_or_else(F::zero))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn linspace_endpoints() {
        let v = linspace(1.0f64, 3.0, 5);
        assert_eq!(v.len(), 5);
        assert_abs_diff_eq!(v[0], 1.0);
        assert_abs_diff_eq!(v[2], 2.0);
        assert_abs_diff_eq!(v[4], 3.0);
        assert_eq!(linspace(2.0f64, 5.0, 1), vec![2.0]);
        assert!(linspace(2.0f64, 5.0, 0).is_empty());
    }

    #[test]
    fn arange_inclusive_includes_stop() {
        let v = arange_inclusive(0.0f64, 2.0, 0.5).unwrap();
        assert_eq!(v, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        let v = arange_inclusive(0.0f64, 2.2, 1.0).unwrap();
        assert_eq!(v, vec![0.0, 1.0, 2.0]);
        assert!(arange_inclusive(3.0f64, 2.0, 1.0).unwrap().is_empty());
    }

    #[test]
    fn arange_inclusive_rejects_bad_step() {
        assert!(arange_inclusive(0.0f64, 1.0, 0.0).is_err());
        assert!(arange_inclusive(0.0f64, 1.0, -1.0).is_err());
    }
}
