use anyhow::{Context, Result};
use rand::{rngs::StdRng, Rng};

use super::ContinuumSampler;
use crate::continuum::{Continuum, Unit};

/// Samples continuums by reusing the reference's annotations at random positions.
///
/// Each sampled annotator takes the units of a reference annotator chosen uniformly at random
/// (with replacement).  Every unit keeps its duration and category and is moved to a uniformly
/// random start such that it stays within the reference's bounds.
#[derive(Clone, Debug)]
pub struct ShuffleSampler {
    annotators: Vec<String>,
    units: Vec<Vec<Unit>>,
    bounds: (f64, f64),
}

impl ShuffleSampler {
    pub fn from_continuum(reference: &Continuum) -> Result<Self> {
        let bounds = reference
            .bounds()
            .context("Cannot sample continuums from a reference without units")?;
        Ok(Self {
            annotators: reference.annotators().clone(),
            units: (0..reference.num_annotators())
                .map(|annotator_idx| reference.units(annotator_idx).to_vec())
                .collect(),
            bounds,
        })
    }
}

impl ContinuumSampler for ShuffleSampler {
    fn sample(&self, rng: &mut StdRng) -> Result<Continuum> {
        let (lo, hi) = self.bounds;
        let mut continuum = Continuum::new();
        for annotator in &self.annotators {
            continuum.add_annotator(annotator);
            let source = rng.gen_range(0..self.units.len());
            for unit in &self.units[source] {
                let latest = hi - unit.segment().duration();
                let start = if latest > lo {
                    rng.gen_range(lo..=latest)
                } else {
                    lo
                };
                let segment = unit.segment().moved_to(start)?;
                continuum.add_unit(annotator, Unit::new(segment, unit.annotation().clone()));
            }
        }
        Ok(continuum)
    }
}
