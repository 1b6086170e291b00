use crate::kernel::ExecInvariantViolation;
use crate::signal::FloatSample;
use ndarray::{concatenate, s, Array2, ArrayView2, Axis};

/// Unconsumed `samples x channels` tail carried between chunk calls.
///
/// When the next frame starts past the end of the data seen so far, the
/// distance is kept as a pending skip and that many leading samples of the
/// next input are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CarryBuffer<F> {
    samples: Array2<F>,
    skip: usize,
}

impl<F> Default for CarryBuffer<F>
where
    F: FloatSample,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<F> CarryBuffer<F>
where
    F: FloatSample,
{
    /// Empty buffer.
    pub fn new() -> Self {
        Self {
            samples: Array2::zeros((0, 0)),
            skip: 0,
        }
    }

    /// Number of buffered samples per channel.
    pub fn len(&self) -> usize {
        self.samples.nrows()
    }

    /// `true` when nothing is carried.
    pub fn is_empty(&self) -> bool {
        self.samples.nrows() == 0
    }

    /// Channel count of the carried samples, `None` while empty.
    pub fn channels(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.samples.ncols())
    }

    /// Carried samples.
    pub fn view(&self) -> ArrayView2<'_, F> {
        self.samples.view()
    }

    /// Leading samples still to be dropped from the next input.
    pub fn pending_skip(&self) -> usize {
        self.skip
    }

    /// Drop all carried samples and any pending skip.
    pub fn clear(&mut self) {
        self.samples = Array2::zeros((0, 0));
        self.skip = 0;
    }

    /// Take the carried samples out, followed by `input` minus any pending
    /// skip. The buffer is left empty.
    ///
    /// # Errors
    /// [`ExecInvariantViolation::LengthMismatch`] when `input` has a different
    /// channel count than the carried samples.
    pub fn take_prepended(
        &mut self,
        input: ArrayView2<F>,
    ) -> Result<Array2<F>, ExecInvariantViolation> {
        if self.is_empty() {
            let dropped = self.skip.min(input.nrows());
            self.skip -= dropped;
            return Ok(input.slice(s![dropped.., ..]).to_owned());
        }
        if self.samples.ncols() != input.ncols() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "channels",
                expected: self.samples.ncols(),
                got: input.ncols(),
            });
        }
        let carried = core::mem::replace(&mut self.samples, Array2::zeros((0, 0)));
        concatenate(Axis(0), &[carried.view(), input.view()]).map_err(|_| {
            ExecInvariantViolation::InvalidState {
                reason: "carry buffer concatenation failed",
            }
        })
    }

    /// Keep the rows of `combined` from `start` onward for the next call.
    /// A `start` past the end becomes a pending skip.
    pub fn retain_from(&mut self, combined: &Array2<F>, start: usize) {
        self.skip = start.saturating_sub(combined.nrows());
        let start = start.min(combined.nrows());
        self.samples = combined.slice(s![start.., ..]).to_owned();
    }
}
