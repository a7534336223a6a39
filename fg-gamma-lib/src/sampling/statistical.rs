use anyhow::{ensure, Result};
use itertools::Itertools;
use rand::{
    distributions::{Distribution, WeightedIndex},
    rngs::StdRng,
};

use super::{ContinuumSampler, Spread};
use crate::continuum::{Continuum, Segment, Unit};

/// The shortest duration given to a sampled unit.
pub const MIN_DURATION: f64 = 1e-3;

/// Samples continuums from normal distributions fitted to a reference continuum: the number of
/// units per annotator, the unit durations and the gaps between consecutive units.  Categories
/// are drawn with the frequencies observed in the reference.
#[derive(Clone, Debug)]
pub struct StatisticalSampler {
    annotators: Vec<String>,
    units_per_annotator: Spread,
    durations: Spread,
    gaps: Spread,
    categories: Vec<String>,
    category_weights: Option<WeightedIndex<usize>>,
    start: f64,
}

impl StatisticalSampler {
    pub fn from_continuum(reference: &Continuum) -> Result<Self> {
        ensure!(
            !reference.is_empty(),
            "Cannot sample continuums from a reference without units"
        );
        let counts = (0..reference.num_annotators())
            .map(|annotator_idx| reference.units(annotator_idx).len() as f64)
            .collect_vec();
        let weights = reference.category_weights();
        let categories = weights.keys().cloned().collect_vec();
        let category_weights = if weights.is_empty() {
            None
        } else {
            Some(WeightedIndex::new(weights.values().copied())?)
        };
        let start = reference.bounds().map_or(0.0, |(start, _)| start);
        Ok(Self {
            annotators: reference.annotators().clone(),
            units_per_annotator: Spread::of(&counts),
            durations: Spread::of(&reference.durations()),
            gaps: Spread::of(&reference.gaps()),
            categories,
            category_weights,
            start,
        })
    }

    /// Draws a unit duration, clamping draws below [`MIN_DURATION`] up to it.
    fn sample_duration(&self, rng: &mut StdRng) -> f64 {
        self.durations.sample(rng).max(MIN_DURATION)
    }
}

impl ContinuumSampler for StatisticalSampler {
    fn sample(&self, rng: &mut StdRng) -> Result<Continuum> {
        let mut continuum = Continuum::new();
        for annotator in &self.annotators {
            continuum.add_annotator(annotator);
            let num_units = self.units_per_annotator.sample(rng).round().max(1.0) as usize;
            let mut last_start = f64::NEG_INFINITY;
            let mut last_end = self.start;
            for _ in 0..num_units {
                let gap = self.gaps.sample(rng);
                let duration = self.sample_duration(rng);
                let start = (last_end + gap).max(last_start);
                let segment = Segment::new(start, start + duration)?;
                let annotation = self
                    .category_weights
                    .as_ref()
                    .map(|weights| self.categories[weights.sample(rng)].clone());
                continuum.add_unit(annotator, Unit::new(segment, annotation));
                last_start = start;
                last_end = start + duration;
            }
        }
        Ok(continuum)
    }
}

#[cfg(test)]
pub mod tests {
    use float_cmp::assert_approx_eq;
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::{fixture, rstest};

    use super::{StatisticalSampler, MIN_DURATION};
    use crate::{
        continuum::{Continuum, Segment},
        sampling::{ContinuumSampler, Spread},
    };

    fn seg(start: f64, end: f64) -> Segment {
        Segment::new(start, end).unwrap()
    }

    #[fixture]
    fn reference() -> Continuum {
        let mut continuum = Continuum::new();
        for annotator in ["a", "b", "c"] {
            continuum.add(annotator, seg(0.0, 2.0), "x");
            continuum.add(annotator, seg(3.0, 5.0), "y");
            continuum.add(annotator, seg(6.0, 8.0), "x");
        }
        continuum
    }

    #[rstest]
    fn test_constant_reference_is_reproduced(reference: Continuum) {
        // Every statistic has zero spread, so the sample reproduces the reference shifted by the
        // mean gap: the first unit starts one gap after the reference's start.
        let sampler = StatisticalSampler::from_continuum(&reference).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let sample = sampler.sample(&mut rng).unwrap();
        assert_eq!(sample.annotators(), reference.annotators());
        for annotator_idx in 0..3 {
            let starts = sample
                .units(annotator_idx)
                .iter()
                .map(|u| u.segment().start())
                .collect::<Vec<_>>();
            assert_eq!(starts.len(), 3);
            assert_approx_eq!(f64, starts[0], 1.0);
            assert_approx_eq!(f64, starts[1], 4.0);
            assert_approx_eq!(f64, starts[2], 7.0);
        }
        for category in sample.categories() {
            assert!(category == "x" || category == "y");
        }
    }

    #[rstest]
    fn test_short_durations_are_clamped(reference: Continuum) {
        let mut sampler = StatisticalSampler::from_continuum(&reference).unwrap();
        sampler.durations = Spread {
            mean: 1.0,
            std_dev: 10.0,
        };
        let mut rng = StdRng::seed_from_u64(17);
        let mut num_clamped = 0;
        for _ in 0..200 {
            let raw = sampler.durations.sample(&mut rng.clone());
            let duration = sampler.sample_duration(&mut rng);
            if raw < MIN_DURATION {
                assert_eq!(duration, MIN_DURATION);
                num_clamped += 1;
            } else {
                assert_eq!(duration, raw);
            }
        }
        // About half of the draws from N(1, 10) are negative.
        assert!(num_clamped > 50);
        assert!(num_clamped < 150);
    }

    #[rstest]
    fn test_sampling_is_seeded(mut reference: Continuum) {
        reference.add("a", seg(10.0, 15.5), "z");
        reference.add("b", seg(9.0, 9.5), "y");
        let sampler = StatisticalSampler::from_continuum(&reference).unwrap();
        let first = sampler.sample(&mut StdRng::seed_from_u64(3)).unwrap();
        let second = sampler.sample(&mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.num_annotators(), 3);
        for (_, _, unit) in first.iter_units() {
            assert!(unit.segment().duration() > 0.0);
            assert!(unit.annotation().is_some());
        }
    }

    #[rstest]
    fn test_unlabeled_reference() {
        let mut reference = Continuum::new();
        reference.add_unlabeled("a", seg(0.0, 1.0));
        reference.add_unlabeled("b", seg(0.5, 2.0));
        let sampler = StatisticalSampler::from_continuum(&reference).unwrap();
        let sample = sampler.sample(&mut StdRng::seed_from_u64(5)).unwrap();
        assert!(sample.num_units() >= 2);
        assert!(sample.categories().is_empty());
    }

    #[rstest]
    fn test_empty_reference() {
        let mut reference = Continuum::new();
        reference.add_annotator("a");
        reference.add_annotator("b");
        assert!(StatisticalSampler::from_continuum(&reference).is_err());
    }
}
