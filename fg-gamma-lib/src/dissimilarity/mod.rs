//! Dissimilarities score how far apart two units are.  Every dissimilarity also carries the
//! cost of pairing a unit with nothing (`delta_empty`), which bounds what a useful pairing
//! may cost.
pub mod categorical;
pub mod combined;
pub mod positional;

pub use categorical::CategoricalDissimilarity;
pub use combined::CombinedDissimilarity;
pub use positional::PositionalDissimilarity;

use crate::continuum::Unit;

/// The default cost of aligning a unit with the empty unit.
pub const DEFAULT_DELTA_EMPTY: f64 = 1.0;

/// A dissimilarity between two units.  Implementations must be non-negative and symmetric.
pub trait Dissimilarity: Send + Sync {
    /// The cost of aligning a unit with the empty unit.
    fn delta_empty(&self) -> f64;

    fn dissimilarity(&self, a: &Unit, b: &Unit) -> f64;
}

impl<D: Dissimilarity + ?Sized> Dissimilarity for &D {
    fn delta_empty(&self) -> f64 {
        (**self).delta_empty()
    }

    fn dissimilarity(&self, a: &Unit, b: &Unit) -> f64 {
        (**self).dissimilarity(a, b)
    }
}

impl<D: Dissimilarity + ?Sized> Dissimilarity for Box<D> {
    fn delta_empty(&self) -> f64 {
        (**self).delta_empty()
    }

    fn dissimilarity(&self, a: &Unit, b: &Unit) -> f64 {
        (**self).dissimilarity(a, b)
    }
}
