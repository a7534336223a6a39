//! The continuum: every annotator's units over a single corpus item.
pub mod segment;

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use derive_getters::Getters;
use itertools::Itertools;
use serde::Serialize;

pub use segment::Segment;

use crate::util::stats;

/// A single annotation: a segment of the timeline with an optional category label.
#[derive(Clone, Debug, PartialEq, Getters, Serialize)]
pub struct Unit {
    segment: Segment,
    annotation: Option<String>,
}

impl Unit {
    pub fn new(segment: Segment, annotation: Option<String>) -> Self {
        Self {
            segment,
            annotation,
        }
    }

    pub fn labeled(segment: Segment, annotation: &str) -> Self {
        Self::new(segment, Some(annotation.to_string()))
    }

    pub fn unlabeled(segment: Segment) -> Self {
        Self::new(segment, None)
    }

    /// Units sort by segment position and then by annotation (unlabeled first).
    pub fn cmp_position(&self, other: &Self) -> Ordering {
        self.segment
            .cmp_position(&other.segment)
            .then_with(|| self.annotation.cmp(&other.annotation))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.annotation {
            Some(annotation) => write!(f, "{} {}", self.segment, annotation),
            None => write!(f, "{}", self.segment),
        }
    }
}

/// The set of units placed by each annotator on a shared timeline.
///
/// Annotators are kept in insertion order and addressed by their index.  The units of each
/// annotator are kept sorted (see [`Unit::cmp_position`]), so a unit is addressed by the pair
/// `(annotator index, unit index)`.
#[derive(Clone, Debug, Default, PartialEq, Getters, Serialize)]
pub struct Continuum {
    annotators: Vec<String>,
    #[getter(skip)]
    units: Vec<Vec<Unit>>,
}

impl Continuum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an annotator without any units, returning its index.  Adding an existing annotator
    /// returns the existing index.
    pub fn add_annotator(&mut self, annotator: &str) -> usize {
        if let Some(index) = self.annotator_index(annotator) {
            index
        } else {
            self.annotators.push(annotator.to_string());
            self.units.push(Vec::new());
            self.annotators.len() - 1
        }
    }

    /// Adds a unit to the given annotator, creating the annotator if needed.
    pub fn add_unit(&mut self, annotator: &str, unit: Unit) {
        let index = self.add_annotator(annotator);
        let units = &mut self.units[index];
        let position = units.partition_point(|u| u.cmp_position(&unit) != Ordering::Greater);
        units.insert(position, unit);
    }

    /// Adds a labeled unit to the given annotator.
    pub fn add(&mut self, annotator: &str, segment: Segment, annotation: &str) {
        self.add_unit(annotator, Unit::labeled(segment, annotation));
    }

    /// Adds a unit without a category to the given annotator.
    pub fn add_unlabeled(&mut self, annotator: &str, segment: Segment) {
        self.add_unit(annotator, Unit::unlabeled(segment));
    }

    pub fn annotator_index(&self, annotator: &str) -> Option<usize> {
        self.annotators.iter().position(|a| a == annotator)
    }

    pub fn units(&self, annotator_idx: usize) -> &[Unit] {
        &self.units[annotator_idx]
    }

    pub fn unit(&self, annotator_idx: usize, unit_idx: usize) -> &Unit {
        &self.units[annotator_idx][unit_idx]
    }

    /// Iterates over all units as `(annotator index, unit index, unit)`.
    pub fn iter_units(&self) -> impl Iterator<Item = (usize, usize, &Unit)> + '_ {
        self.units.iter().enumerate().flat_map(|(annotator_idx, units)| {
            units
                .iter()
                .enumerate()
                .map(move |(unit_idx, unit)| (annotator_idx, unit_idx, unit))
        })
    }

    pub fn num_annotators(&self) -> usize {
        self.annotators.len()
    }

    pub fn num_units(&self) -> usize {
        self.units.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.num_units() == 0
    }

    /// The distinct category labels used by any unit, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.iter_units()
            .filter_map(|(_, _, unit)| unit.annotation.clone())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }

    /// The number of units carrying each category label.
    pub fn category_weights(&self) -> BTreeMap<String, usize> {
        let mut weights = BTreeMap::new();
        for (_, _, unit) in self.iter_units() {
            if let Some(annotation) = &unit.annotation {
                *weights.entry(annotation.clone()).or_insert(0) += 1;
            }
        }
        weights
    }

    /// The earliest start and latest end across all units, or `None` if there are no units.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.iter_units().fold(None, |bounds, (_, _, unit)| {
            let (start, end) = (unit.segment.start(), unit.segment.end());
            match bounds {
                None => Some((start, end)),
                Some((lo, hi)) => Some((f64::min(lo, start), f64::max(hi, end))),
            }
        })
    }

    pub fn avg_num_units_per_annotator(&self) -> f64 {
        if self.annotators.is_empty() {
            0.0
        } else {
            self.num_units() as f64 / self.num_annotators() as f64
        }
    }

    pub fn std_num_units_per_annotator(&self) -> f64 {
        let counts = self.units.iter().map(|u| u.len() as f64).collect_vec();
        stats::std_dev(&counts)
    }

    /// The duration of every unit.
    pub fn durations(&self) -> Vec<f64> {
        self.iter_units()
            .map(|(_, _, unit)| unit.segment.duration())
            .collect()
    }

    /// The gap between each pair of consecutive units of the same annotator.  Overlapping units
    /// yield negative gaps.
    pub fn gaps(&self) -> Vec<f64> {
        self.units
            .iter()
            .flat_map(|units| {
                units
                    .iter()
                    .tuple_windows()
                    .map(|(prev, next)| next.segment.start() - prev.segment.end())
            })
            .collect()
    }
}

impl fmt::Display for Continuum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Continuum ({} annotators, {} units)",
            self.num_annotators(),
            self.num_units()
        )?;
        for (annotator, units) in self.annotators.iter().zip(&self.units) {
            writeln!(f, "  {}: {}", annotator, units.iter().join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use float_cmp::assert_approx_eq;
    use rstest::{fixture, rstest};

    use super::{Continuum, Segment};

    fn seg(start: f64, end: f64) -> Segment {
        Segment::new(start, end).unwrap()
    }

    #[fixture]
    fn continuum() -> Continuum {
        let mut continuum = Continuum::new();
        continuum.add("liza", seg(12.0, 18.0), "Carol");
        continuum.add("liza", seg(2.0, 9.0), "Alice");
        continuum.add("liza", seg(10.0, 11.5), "Bob");
        continuum.add("pierrot", seg(2.5, 9.0), "Alice");
        continuum.add("pierrot", seg(12.5, 19.0), "Carol");
        continuum.add_unlabeled("hadrien", seg(3.0, 8.0));
        continuum
    }

    #[rstest]
    fn test_units_are_sorted(continuum: Continuum) {
        let starts = continuum
            .units(0)
            .iter()
            .map(|u| u.segment().start())
            .collect::<Vec<_>>();
        assert_eq!(starts, vec![2.0, 10.0, 12.0]);
    }

    #[rstest]
    fn test_counts(continuum: Continuum) {
        assert_eq!(continuum.num_annotators(), 3);
        assert_eq!(continuum.num_units(), 6);
        assert!(!continuum.is_empty());
        assert_approx_eq!(f64, continuum.avg_num_units_per_annotator(), 2.0);
        assert_approx_eq!(f64, continuum.std_num_units_per_annotator(), 1.0);
    }

    #[rstest]
    fn test_add_existing_annotator_is_noop(mut continuum: Continuum) {
        assert_eq!(continuum.add_annotator("pierrot"), 1);
        assert_eq!(continuum.add_annotator("newcomer"), 3);
        assert_eq!(continuum.num_annotators(), 4);
        assert!(continuum.units(3).is_empty());
    }

    #[rstest]
    fn test_categories(continuum: Continuum) {
        assert_eq!(continuum.categories(), vec!["Alice", "Bob", "Carol"]);
        let weights = continuum.category_weights();
        assert_eq!(weights["Alice"], 2);
        assert_eq!(weights["Bob"], 1);
        assert_eq!(weights["Carol"], 2);
    }

    #[rstest]
    fn test_bounds(continuum: Continuum) {
        assert_eq!(continuum.bounds(), Some((2.0, 19.0)));
        assert_eq!(Continuum::new().bounds(), None);
    }

    #[rstest]
    fn test_gaps_and_durations(continuum: Continuum) {
        let gaps = continuum.gaps();
        assert_eq!(gaps.len(), 3);
        assert_approx_eq!(f64, gaps[0], 1.0);
        assert_approx_eq!(f64, gaps[1], 0.5);
        assert_approx_eq!(f64, gaps[2], 3.5);
        assert_eq!(continuum.durations().len(), 6);
    }

    #[rstest]
    fn test_display(continuum: Continuum) {
        let text = continuum.to_string();
        assert!(text.starts_with("Continuum (3 annotators, 6 units)"));
        assert!(text.contains("  liza: [2.000, 9.000] Alice, [10.000, 11.500] Bob"));
        assert!(text.contains("  hadrien: [3.000, 8.000]"));
    }
}
