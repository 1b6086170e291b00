mod convolve;
mod space;

pub use convolve::*;
pub use space::*;
