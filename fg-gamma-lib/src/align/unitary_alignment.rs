use std::fmt;

use anyhow::Result;
use itertools::Itertools;
use serde::Serialize;

use crate::{continuum::Continuum, dissimilarity::Dissimilarity, errors::AlignmentError};

/// A unitary alignment: one slot per annotator, each holding the index of one of that
/// annotator's units or `None` for the empty unit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnitaryAlignment {
    n_tuple: Vec<Option<usize>>,
    disorder: f64,
}

impl UnitaryAlignment {
    /// Builds the unitary alignment and computes its disorder: the mean dissimilarity over all
    /// pairs of slots, where any pair involving an empty slot costs `delta_empty`.  At least one
    /// slot must hold a unit.
    pub fn new<D: Dissimilarity + ?Sized>(
        continuum: &Continuum,
        n_tuple: Vec<Option<usize>>,
        dissimilarity: &D,
    ) -> Result<Self> {
        let num_annotators = continuum.num_annotators();
        if num_annotators < 2 {
            return Err(AlignmentError::TooFewAnnotators(num_annotators).into());
        }
        if n_tuple.len() != num_annotators {
            return Err(AlignmentError::TupleLengthMismatch {
                expected: num_annotators,
                found: n_tuple.len(),
            }
            .into());
        }
        for (annotator_idx, slot) in n_tuple.iter().enumerate() {
            if let Some(unit) = *slot {
                if unit >= continuum.units(annotator_idx).len() {
                    return Err(AlignmentError::UnknownUnit {
                        annotator: continuum.annotators()[annotator_idx].clone(),
                        unit,
                    }
                    .into());
                }
            }
        }
        if n_tuple.iter().all(Option::is_none) {
            return Err(AlignmentError::EmptyUnitaryAlignment.into());
        }
        let disorder = tuple_disorder(continuum, &n_tuple, dissimilarity);
        Ok(Self { n_tuple, disorder })
    }

    /// Builds a unitary alignment whose disorder is already known.
    pub(crate) fn with_disorder(n_tuple: Vec<Option<usize>>, disorder: f64) -> Self {
        Self { n_tuple, disorder }
    }

    pub fn n_tuple(&self) -> &[Option<usize>] {
        &self.n_tuple
    }

    pub fn disorder(&self) -> f64 {
        self.disorder
    }

    /// The number of non-empty slots.
    pub fn num_units(&self) -> usize {
        self.n_tuple.iter().flatten().count()
    }

    /// The `(annotator index, unit index)` pairs of the non-empty slots.
    pub fn units(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.n_tuple
            .iter()
            .enumerate()
            .filter_map(|(annotator_idx, slot)| slot.map(|unit_idx| (annotator_idx, unit_idx)))
    }
}

impl fmt::Display for UnitaryAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self
            .n_tuple
            .iter()
            .map(|slot| match slot {
                Some(unit) => unit.to_string(),
                None => "-".to_string(),
            })
            .join(", ");
        write!(f, "({}) disorder={:.4}", slots, self.disorder)
    }
}

/// The number of unordered pairs among `n` slots.
pub(crate) fn num_pairs(n: usize) -> f64 {
    (n * n.saturating_sub(1)) as f64 / 2.0
}

/// The cost of pairing slot `a` with slot `b` of the given annotators.
pub(crate) fn pair_cost<D: Dissimilarity + ?Sized>(
    continuum: &Continuum,
    dissimilarity: &D,
    a: (usize, Option<usize>),
    b: (usize, Option<usize>),
) -> f64 {
    match (a, b) {
        ((annotator_a, Some(unit_a)), (annotator_b, Some(unit_b))) => dissimilarity.dissimilarity(
            continuum.unit(annotator_a, unit_a),
            continuum.unit(annotator_b, unit_b),
        ),
        _ => dissimilarity.delta_empty(),
    }
}

fn tuple_disorder<D: Dissimilarity + ?Sized>(
    continuum: &Continuum,
    n_tuple: &[Option<usize>],
    dissimilarity: &D,
) -> f64 {
    let mut total = 0.0;
    for (i, slot_i) in n_tuple.iter().enumerate() {
        for (j, slot_j) in n_tuple.iter().enumerate().skip(i + 1) {
            total += pair_cost(continuum, dissimilarity, (i, *slot_i), (j, *slot_j));
        }
    }
    total / num_pairs(n_tuple.len())
}
