use std::fmt;

use anyhow::Result;
use serde::Serialize;

use super::{best::BestAlignmentSearch, unitary_alignment::UnitaryAlignment};
use crate::{continuum::Continuum, dissimilarity::Dissimilarity, errors::AlignmentError};

/// An alignment of a continuum: a set of unitary alignments in which every unit of every
/// annotator appears exactly once.
///
/// The disorder of an alignment is the sum of the disorders of its unitary alignments divided by
/// the average number of units per annotator.  It is zero for a continuum without units.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Alignment {
    unitary_alignments: Vec<UnitaryAlignment>,
    disorder: f64,
}

impl Alignment {
    /// Builds an alignment, checking that the unitary alignments partition the continuum's units.
    pub fn new(continuum: &Continuum, unitary_alignments: Vec<UnitaryAlignment>) -> Result<Self> {
        let mut counts = (0..continuum.num_annotators())
            .map(|annotator_idx| vec![0usize; continuum.units(annotator_idx).len()])
            .collect::<Vec<_>>();
        for unitary_alignment in &unitary_alignments {
            if unitary_alignment.n_tuple().len() != continuum.num_annotators() {
                return Err(AlignmentError::TupleLengthMismatch {
                    expected: continuum.num_annotators(),
                    found: unitary_alignment.n_tuple().len(),
                }
                .into());
            }
            for (annotator_idx, unit_idx) in unitary_alignment.units() {
                match counts[annotator_idx].get_mut(unit_idx) {
                    Some(count) => *count += 1,
                    None => {
                        return Err(AlignmentError::UnknownUnit {
                            annotator: continuum.annotators()[annotator_idx].clone(),
                            unit: unit_idx,
                        }
                        .into())
                    }
                }
            }
        }
        for (annotator_idx, unit_counts) in counts.iter().enumerate() {
            for (unit_idx, count) in unit_counts.iter().enumerate() {
                let annotator = continuum.annotators()[annotator_idx].clone();
                match count {
                    0 => {
                        return Err(AlignmentError::UnitNotAligned {
                            annotator,
                            unit: unit_idx,
                        }
                        .into())
                    }
                    1 => (),
                    _ => {
                        return Err(AlignmentError::UnitAlignedTwice {
                            annotator,
                            unit: unit_idx,
                        }
                        .into())
                    }
                }
            }
        }

        let total = unitary_alignments
            .iter()
            .map(UnitaryAlignment::disorder)
            .sum::<f64>();
        let avg_units = continuum.avg_num_units_per_annotator();
        let disorder = if avg_units > 0.0 { total / avg_units } else { 0.0 };
        Ok(Self {
            unitary_alignments,
            disorder,
        })
    }

    /// Finds the alignment of minimal disorder.  See [`BestAlignmentSearch`].
    pub fn best<D: Dissimilarity + ?Sized>(continuum: &Continuum, dissimilarity: &D) -> Result<Self> {
        BestAlignmentSearch::default().run(continuum, dissimilarity)
    }

    pub fn unitary_alignments(&self) -> &[UnitaryAlignment] {
        &self.unitary_alignments
    }

    pub fn num_alignments(&self) -> usize {
        self.unitary_alignments.len()
    }

    pub fn disorder(&self) -> f64 {
        self.disorder
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Alignment ({} unitary alignments, disorder={:.4})",
            self.num_alignments(),
            self.disorder
        )?;
        for unitary_alignment in &self.unitary_alignments {
            writeln!(f, "  {unitary_alignment}")?;
        }
        Ok(())
    }
}
