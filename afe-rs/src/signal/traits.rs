//! Trait interfaces for signal-processing capabilities.
//!
//! These traits define the trait-first API shape shared by the filter,
//! filterbank and framing kernels.

use crate::kernel::{ExecInvariantViolation, Read1D, Write1D};
use ndarray::{Array2, ArrayView2};

/// Stateful 1D filtering capability.
///
/// Implementors carry state between calls: feeding a signal in successive
/// pieces yields the same output as feeding it at once.
pub trait StreamFilter1D<T> {
    /// Run filtering into a caller-provided output buffer.
    fn run_into<I, O>(&mut self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Run filtering and allocate output.
    fn run_alloc<I>(&mut self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Chunk-wise processing of a `samples x channels` matrix.
pub trait ChunkProcessor<T> {
    /// Process one chunk, carrying state into the next call.
    fn process_chunk(&mut self, input: ArrayView2<T>)
        -> Result<Array2<T>, ExecInvariantViolation>;

    /// Drop all carried state, as if no chunk had been processed.
    fn reset(&mut self) -> Result<(), ExecInvariantViolation>;
}

/// Parameter comparison used to decide whether a stage can be reused.
///
/// Never fails: fields that are missing or cannot be interpreted count as a
/// mismatch and are reported through `tracing`.
pub trait HasParameters<P: ?Sized> {
    /// `true` iff every compared parameter matches the stage's own.
    fn has_parameters(&self, params: &P) -> bool;
}

/// Window generation capability.
pub trait WindowGenerate<T> {
    /// Run window generation into a caller-provided output buffer.
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<T> + ?Sized;

    /// Run window generation and allocate output samples.
    fn run_alloc(&self) -> Result<Vec<T>, ExecInvariantViolation>;
}
