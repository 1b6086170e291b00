use core::fmt;
use num_traits::{Float, FromPrimitive, NumAssign};

/// Trait interfaces for signal-processing capabilities.
pub mod traits;

/// Stateful linear filtering and filter design.
pub mod filter;

/// Window functions and frame shapes.
pub mod windows;

/// Floating point sample type accepted by the kernels (`f32` or `f64`).
pub trait FloatSample: Float + FromPrimitive + NumAssign + fmt::Debug + 'static {}

impl<T> FloatSample for T where T: Float + FromPrimitive + NumAssign + fmt::Debug + 'static {}

/// Convert an `f64` constant into the working float type.
#[inline]
pub(crate) fn cast<F: FloatSample>(v: f64) -> F {
    F::from_f64(v).unwrap_or_else(F::nan)
}
