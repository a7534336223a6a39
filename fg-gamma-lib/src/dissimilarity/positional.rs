use anyhow::{ensure, Result};

use super::{Dissimilarity, DEFAULT_DELTA_EMPTY};
use crate::continuum::Unit;

/// Positional dissimilarity: the squared sum of the start and end offsets of the two units,
/// relative to their summed durations, scaled by `delta_empty`:
///
/// `delta_empty * ((|s1 - s2| + |e1 - e2|) / (d1 + d2))^2`
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PositionalDissimilarity {
    delta_empty: f64,
}

impl PositionalDissimilarity {
    pub fn new(delta_empty: f64) -> Result<Self> {
        ensure!(
            delta_empty.is_finite() && delta_empty > 0.0,
            "delta_empty must be positive: {}",
            delta_empty
        );
        Ok(Self { delta_empty })
    }
}

impl Default for PositionalDissimilarity {
    fn default() -> Self {
        Self {
            delta_empty: DEFAULT_DELTA_EMPTY,
        }
    }
}

impl Dissimilarity for PositionalDissimilarity {
    fn delta_empty(&self) -> f64 {
        self.delta_empty
    }

    fn dissimilarity(&self, a: &Unit, b: &Unit) -> f64 {
        let (a, b) = (a.segment(), b.segment());
        let offsets = (a.start() - b.start()).abs() + (a.end() - b.end()).abs();
        let ratio = offsets / (a.duration() + b.duration());
        self.delta_empty * ratio * ratio
    }
}
