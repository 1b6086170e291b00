use crate::kernel::ConfigError;
use crate::signal::FloatSample;
use core::{fmt, str::FromStr};
use nalgebra::Complex;

/// Realization structure of a linear filter.
///
/// Only direct form II transposed is implemented. Parsing any other tag
/// fails with [`ConfigError::UnsupportedStructure`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterStructure {
    /// Direct form II transposed, storing `order` state values.
    #[default]
    DirectFormIITransposed,
}

impl FromStr for FilterStructure {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "df2t" | "directformiitransposed" | "directform2transposed" => {
                Ok(Self::DirectFormIITransposed)
            }
            _ => Err(ConfigError::UnsupportedStructure { name: s.into() }),
        }
    }
}

impl fmt::Display for FilterStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStructure::DirectFormIITransposed => write!(f, "Direct-Form II Transposed"),
        }
    }
}

/// Numerator/denominator coefficients of a transfer function.
///
/// `Complex` holds one half of a conjugate-paired design: the filter runs in
/// the complex domain and reports `2 * re(y)`.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferFunction<F> {
    /// Real-valued transfer function.
    Real {
        /// Numerator coefficients.
        b: Vec<F>,
        /// Denominator coefficients.
        a: Vec<F>,
    },
    /// Complex-valued transfer function.
    Complex {
        /// Numerator coefficients.
        b: Vec<Complex<F>>,
        /// Denominator coefficients.
        a: Vec<Complex<F>>,
    },
}

impl<F> TransferFunction<F> {
    /// Lengths of the numerator and denominator.
    pub fn lens(&self) -> (usize, usize) {
        match self {
            TransferFunction::Real { b, a } => (b.len(), a.len()),
            TransferFunction::Complex { b, a } => (b.len(), a.len()),
        }
    }

    /// `max(len(b), len(a)) - 1`, or `None` while either sequence is empty.
    pub fn order(&self) -> Option<usize> {
        match self.lens() {
            (0, _) | (_, 0) => None,
            (nb, na) => Some(nb.max(na) - 1),
        }
    }

    /// Whether the represented transfer function is real-valued.
    pub fn is_real(&self) -> bool {
        matches!(self, TransferFunction::Real { .. })
    }
}

/// Immutable filter descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec<F> {
    tf: TransferFunction<F>,
    fs: Option<F>,
    structure: FilterStructure,
}

impl<F> FilterSpec<F>
where
    F: FloatSample,
{
    /// Real transfer function `b(z) / a(z)`.
    pub fn new(b: Vec<F>, a: Vec<F>) -> Self {
        Self::from_transfer_function(TransferFunction::Real { b, a })
    }

    /// Complex transfer function, see [`TransferFunction::Complex`].
    pub fn complex(b: Vec<Complex<F>>, a: Vec<Complex<F>>) -> Self {
        Self::from_transfer_function(TransferFunction::Complex { b, a })
    }

    /// Wrap existing coefficients.
    pub fn from_transfer_function(tf: TransferFunction<F>) -> Self {
        Self {
            tf,
            fs: None,
            structure: FilterStructure::default(),
        }
    }

    /// Attach the sampling frequency the coefficients were designed for.
    pub fn with_fs(mut self, fs: F) -> Self {
        self.fs = Some(fs);
        self
    }

    /// Set the realization structure.
    pub fn with_structure(mut self, structure: FilterStructure) -> Self {
        self.structure = structure;
        self
    }

    /// Coefficients.
    pub fn transfer_function(&self) -> &TransferFunction<F> {
        &self.tf
    }

    /// Sampling frequency, if known.
    pub fn fs(&self) -> Option<F> {
        self.fs
    }

    /// Realization structure.
    pub fn structure(&self) -> FilterStructure {
        self.structure
    }

    /// Whether the transfer function is real-valued.
    pub fn real_tf(&self) -> bool {
        self.tf.is_real()
    }

    /// Derived filter order; `None` when no coefficients are set.
    pub fn order(&self) -> Option<usize> {
        self.tf.order()
    }
}

/// Delay-line state of a single filter, `order` values long.
///
/// An empty state means "not yet initialized" and is zero-filled on first use.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterState<F> {
    /// State of a real transfer function.
    Real(Vec<F>),
    /// State of a complex transfer function.
    Complex(Vec<Complex<F>>),
}

impl<F> FilterState<F>
where
    F: FloatSample,
{
    /// All-zero state matching `tf`, of length `order`.
    pub fn zeros(tf: &TransferFunction<F>, order: usize) -> Self {
        match tf {
            TransferFunction::Real { .. } => FilterState::Real(vec![F::zero(); order]),
            TransferFunction::Complex { .. } => {
                FilterState::Complex(vec![Complex::new(F::zero(), F::zero()); order])
            }
        }
    }

    /// Unset state for `tf`.
    pub fn unset(tf: &TransferFunction<F>) -> Self {
        Self::zeros(tf, 0)
    }

    /// Number of stored delay values.
    pub fn len(&self) -> usize {
        match self {
            FilterState::Real(z) => z.len(),
            FilterState::Complex(z) => z.len(),
        }
    }

    /// `true` while the state is unset.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when every stored value is zero.
    pub fn is_zero(&self) -> bool {
        match self {
            FilterState::Real(z) => z.iter().all(|v| v.is_zero()),
            FilterState::Complex(z) => z.iter().all(|v| v.re.is_zero() && v.im.is_zero()),
        }
    }

    pub(crate) fn matches_kind(&self, tf: &TransferFunction<F>) -> bool {
        matches!(
            (self, tf),
            (FilterState::Real(_), TransferFunction::Real { .. })
                | (FilterState::Complex(_), TransferFunction::Complex { .. })
        )
    }
}
