//! Shared error type and numeric helpers for `afe-rs`.

#![deny(missing_docs)]

mod error;

/// Numpy-flavoured numeric helpers.
pub mod num_rs;

pub use error::{Error, Result};
