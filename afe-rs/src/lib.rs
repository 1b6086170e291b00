//! Chunked auditory front-end.
//!
//! Stateful linear filtering, gammatone filterbanks and ratemap framing that
//! produce identical results whether a signal is fed in one piece or in
//! arbitrarily sized chunks.
//!
//! The building blocks, leaves first:
//! * [`signal::filter::Filter`] runs one causal linear filter with persistent state.
//! * [`auditory::Filterbank`] drives one filter per channel from a single input.
//! * [`auditory::Ratemap`] smooths each channel with a leaky integrator and
//!   reduces fixed-hop frames to one value per channel.

#![deny(missing_docs)]

/// Shared trait-first kernel substrate.
pub mod kernel;

/// Signal processing primitives: filters, filter design and windows.
pub mod signal;

/// Auditory front-end stages built on the signal primitives.
pub mod auditory;

pub use afe_rs_core::{Error, Result};

#[cfg(test)]
mod test_util;
