use super::ConfigError;

use ndarray::{ArrayBase, ArrayView1, Data, DataMut, Ix1};
use std::borrow::Cow;

/// Contiguous 1D sample input.
pub trait Read1D<T> {
    /// Borrow the samples as a slice.
    fn read_slice(&self) -> Result<&[T], ConfigError>;
}

/// Contiguous 1D sample output.
pub trait Write1D<T> {
    /// Borrow the destination as a mutable slice.
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError>;
}

impl<T> Read1D<T> for [T] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T> Write1D<T> for [T] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

impl<T, const N: usize> Read1D<T> for [T; N] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self.as_slice())
    }
}

impl<T, const N: usize> Write1D<T> for [T; N] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self.as_mut_slice())
    }
}

impl<T> Read1D<T> for Vec<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self.as_slice())
    }
}

impl<T> Write1D<T> for Vec<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self.as_mut_slice())
    }
}

/// Owned arrays, views and cow arrays alike. Only standard-layout storage
/// reads as a slice; strided views (a column of a row-major
/// `samples x channels` matrix, say) go through [`channel_samples`].
impl<S, T> Read1D<T> for ArrayBase<S, Ix1>
where
    S: Data<Elem = T>,
{
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        self.as_slice()
            .ok_or(ConfigError::NonContiguous { arg: "input" })
    }
}

impl<S, T> Write1D<T> for ArrayBase<S, Ix1>
where
    S: DataMut<Elem = T>,
{
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut()
            .ok_or(ConfigError::NonContiguous { arg: "output" })
    }
}

/// Samples of one channel as a slice, copied only when the view is strided.
pub fn channel_samples<'a, T: Clone>(channel: ArrayView1<'a, T>) -> Cow<'a, [T]> {
    match channel.to_slice() {
        Some(samples) => Cow::Borrowed(samples),
        None => Cow::Owned(channel.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, Array1, Array2, ShapeBuilder};

    #[test]
    fn std_containers() {
        let fixed = [1.0f32, 2.0, 3.0];
        assert_eq!(fixed.read_slice().unwrap(), &[1.0, 2.0, 3.0]);

        let mut v = vec![0.0f32; 2];
        v.write_slice_mut().unwrap().copy_from_slice(&[4.0, 5.0]);
        assert_eq!(v, vec![4.0, 5.0]);
    }

    #[test]
    fn owned_and_viewed_arrays() {
        let arr = Array1::from(vec![1.0f64, 2.0, 3.0]);
        assert_eq!(arr.view().read_slice().unwrap()[2], 3.0);

        let mut out = Array1::<f64>::zeros(3);
        out.slice_mut(s![1..])
            .write_slice_mut()
            .unwrap()
            .copy_from_slice(&[7.0, 8.0]);
        assert_eq!(out.to_vec(), vec![0.0, 7.0, 8.0]);
    }

    #[test]
    fn strided_channel_is_rejected_but_copyable() {
        let m = Array2::from_shape_fn((4, 3), |(i, c)| (10 * c + i) as f64);
        let column = m.column(1);
        assert_eq!(
            column.read_slice().expect_err("row-major column is strided"),
            ConfigError::NonContiguous { arg: "input" }
        );
        let samples = channel_samples(column);
        assert!(matches!(samples, Cow::Owned(_)));
        assert_eq!(&*samples, &[10.0, 11.0, 12.0, 13.0]);
    }

    #[test]
    fn column_major_channel_is_borrowed() {
        let m = Array2::from_shape_fn((4, 2).f(), |(i, c)| (10 * c + i) as f64);
        let samples = channel_samples(m.column(1));
        assert!(matches!(samples, Cow::Borrowed(_)));
        assert_eq!(&*samples, &[10.0, 11.0, 12.0, 13.0]);
    }
}
