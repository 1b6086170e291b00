//! Trait-first window generation kernel.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Write1D};
use crate::signal::traits::WindowGenerate;
use crate::signal::FloatSample;

use super::{get_window, WindowName};

/// Constructor config for [`WindowKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// Window family.
    pub name: WindowName,
    /// Output length.
    pub nx: usize,
}

/// Trait-first window generation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowKernel {
    name: WindowName,
    nx: usize,
}

impl KernelLifecycle for WindowKernel {
    type Config = WindowConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.nx <= 1 {
            return Err(ConfigError::InvalidArgument {
                arg: "nx",
                reason: "window length must be greater than 1",
            });
        }
        Ok(Self {
            name: config.name,
            nx: config.nx,
        })
    }
}

impl<F> WindowGenerate<F> for WindowKernel
where
    F: FloatSample,
{
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<F> + ?Sized,
    {
        let generated: Vec<F> = WindowGenerate::<F>::run_alloc(self)?;
        let out_slice = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out_slice.len() != generated.len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: generated.len(),
                got: out_slice.len(),
            });
        }
        out_slice.copy_from_slice(&generated);
        Ok(())
    }

    fn run_alloc(&self) -> Result<Vec<F>, ExecInvariantViolation> {
        Ok(get_window(self.name, self.nx))
    }
}

#[cfg(test)]
mod tests {
    use super::{WindowConfig, WindowKernel};
    use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle};
    use crate::signal::traits::WindowGenerate;
    use crate::signal::windows::WindowName;
    use ndarray::Array1;

    #[test]
    fn window_kernel_run_into_ndarray() {
        let kernel = WindowKernel::try_new(WindowConfig {
            name: WindowName::Rectangular,
            nx: 8,
        })
        .expect("window kernel should initialize");

        let mut out = Array1::<f64>::zeros(8);
        kernel
            .run_into(&mut out)
            .expect("window run_into should succeed");
        assert!(out.iter().all(|&v| v == 1.0));

        let mut short = vec![0.0f64; 3];
        assert_eq!(
            kernel.run_into(&mut short),
            Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: 8,
                got: 3
            })
        );
    }

    #[test]
    fn window_kernel_rejects_short_lengths() {
        let err = WindowKernel::try_new(WindowConfig {
            name: WindowName::Hann,
            nx: 1,
        })
        .expect_err("length 1 must fail");
        assert!(matches!(err, ConfigError::InvalidArgument { arg: "nx", .. }));
    }
}
