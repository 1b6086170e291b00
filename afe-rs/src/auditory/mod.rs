//! Auditory front-end stages: ERB scale, gammatone filterbank and ratemap.
//!
//! Data flows `raw chunk -> Filterbank -> Ratemap -> frames x channels`.
//! Both stages keep their state between calls and expect one writer at a
//! time; a chunk call must not be interleaved with another on the same
//! instance.

/// ERB-rate scale conversions and channel spacing.
pub mod erb;

mod buffer;
mod filterbank;
mod ratemap;

pub use buffer::*;
pub use filterbank::*;
pub use ratemap::*;

use crate::signal::{cast, FloatSample};

/// Numeric parameter equality tolerant to representation noise only.
pub(crate) fn near_eq<F: FloatSample>(a: F, b: F) -> bool {
    let scale = a.abs().max(b.abs()).max(F::one());
    (a - b).abs() <= cast::<F>(1e-10) * scale
}
