//! Causal linear filtering with persistent state.

/// Filter coefficient design collaborators.
pub mod design;

mod kernels;
mod lfilter;
mod spec;

pub use kernels::*;
pub use lfilter::*;
pub use spec::*;
