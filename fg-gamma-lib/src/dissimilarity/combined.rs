use anyhow::{ensure, Result};

use super::{CategoricalDissimilarity, Dissimilarity, PositionalDissimilarity};
use crate::continuum::{Continuum, Unit};

/// A weighted sum of a positional and a categorical dissimilarity:
/// `alpha * positional + beta * categorical`.
#[derive(Clone, Debug, PartialEq)]
pub struct CombinedDissimilarity {
    alpha: f64,
    beta: f64,
    positional: PositionalDissimilarity,
    categorical: CategoricalDissimilarity,
}

impl CombinedDissimilarity {
    pub fn new(
        alpha: f64,
        beta: f64,
        positional: PositionalDissimilarity,
        categorical: CategoricalDissimilarity,
    ) -> Result<Self> {
        ensure!(
            alpha.is_finite() && alpha >= 0.0 && beta.is_finite() && beta >= 0.0,
            "alpha and beta must be non-negative: alpha={} beta={}",
            alpha,
            beta
        );
        ensure!(
            alpha + beta > 0.0,
            "At least one of alpha and beta must be positive"
        );
        ensure!(
            positional.delta_empty() == categorical.delta_empty(),
            "The positional and categorical dissimilarities must share delta_empty: {} != {}",
            positional.delta_empty(),
            categorical.delta_empty()
        );
        Ok(Self {
            alpha,
            beta,
            positional,
            categorical,
        })
    }

    /// Builds the default combination (`alpha = beta = 1`) over the continuum's categories.
    pub fn from_continuum(continuum: &Continuum) -> Result<Self> {
        Self::new(
            1.0,
            1.0,
            PositionalDissimilarity::default(),
            CategoricalDissimilarity::from_continuum(continuum)?,
        )
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl Dissimilarity for CombinedDissimilarity {
    /// Aligning with nothing costs the same as in either part, independent of `alpha` and `beta`.
    fn delta_empty(&self) -> f64 {
        self.positional.delta_empty()
    }

    fn dissimilarity(&self, a: &Unit, b: &Unit) -> f64 {
        self.alpha * self.positional.dissimilarity(a, b)
            + self.beta * self.categorical.dissimilarity(a, b)
    }
}
