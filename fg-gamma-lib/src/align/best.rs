use anyhow::Result;
use log::debug;

use super::{
    alignment::Alignment,
    solver::SetPartitionSolver,
    unitary_alignment::{num_pairs, pair_cost, UnitaryAlignment},
};
use crate::{continuum::Continuum, dissimilarity::Dissimilarity, errors::AlignmentError};

/// Searches for the alignment of a continuum with minimal disorder.
///
/// Candidate unitary alignments are taken from the Cartesian product of each annotator's units
/// plus the empty unit, keeping only those with a disorder below `num_annotators * delta_empty`.
/// Any unitary alignment at or above that bound is never worth more than splitting its units
/// into singletons, each of which costs exactly `delta_empty`.  The candidates that partition the
/// units at minimal total disorder are then found exactly by branch and bound.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BestAlignmentSearch {
    max_candidates: Option<usize>,
}

impl BestAlignmentSearch {
    /// Fails the search instead of keeping more than `max_candidates` candidates.
    pub fn with_max_candidates(max_candidates: Option<usize>) -> Self {
        Self { max_candidates }
    }

    pub fn run<D: Dissimilarity + ?Sized>(
        &self,
        continuum: &Continuum,
        dissimilarity: &D,
    ) -> Result<Alignment> {
        let num_annotators = continuum.num_annotators();
        if num_annotators < 2 {
            return Err(AlignmentError::TooFewAnnotators(num_annotators).into());
        }

        let candidates = CandidateEnumerator::new(continuum, dissimilarity, self.max_candidates)
            .enumerate()?;
        debug!(
            "Found {} candidate unitary alignments for {} units across {} annotators",
            candidates.len(),
            continuum.num_units(),
            num_annotators
        );

        // Give every unit a global index: the annotator's offset plus the unit's index.
        let mut offsets = Vec::with_capacity(num_annotators);
        let mut num_units = 0;
        for annotator_idx in 0..num_annotators {
            offsets.push(num_units);
            num_units += continuum.units(annotator_idx).len();
        }
        let members = candidates
            .iter()
            .map(|candidate| {
                candidate
                    .units()
                    .map(|(annotator_idx, unit_idx)| offsets[annotator_idx] + unit_idx)
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let costs = candidates
            .iter()
            .map(UnitaryAlignment::disorder)
            .collect::<Vec<_>>();

        let (chosen, _) = SetPartitionSolver::new(num_units, &costs, &members)?.solve()?;
        let mut candidates = candidates.into_iter().map(Some).collect::<Vec<_>>();
        let unitary_alignments = chosen
            .into_iter()
            .filter_map(|index| candidates[index].take())
            .collect();
        Alignment::new(continuum, unitary_alignments)
    }
}

/// Depth-first enumeration of the candidate n-tuples, one annotator at a time.  All pair costs
/// are non-negative, so a partial tuple is abandoned as soon as its summed pair costs reach the
/// bound.
struct CandidateEnumerator<'a, D: Dissimilarity + ?Sized> {
    continuum: &'a Continuum,
    dissimilarity: &'a D,
    max_candidates: Option<usize>,
    /// The bound on the summed pair costs of a tuple: `num_annotators * delta_empty * num_pairs`.
    bound: f64,
    pairs: f64,
    tuple: Vec<Option<usize>>,
    candidates: Vec<UnitaryAlignment>,
}

impl<'a, D: Dissimilarity + ?Sized> CandidateEnumerator<'a, D> {
    fn new(continuum: &'a Continuum, dissimilarity: &'a D, max_candidates: Option<usize>) -> Self {
        let num_annotators = continuum.num_annotators();
        let pairs = num_pairs(num_annotators);
        Self {
            continuum,
            dissimilarity,
            max_candidates,
            bound: num_annotators as f64 * dissimilarity.delta_empty() * pairs,
            pairs,
            tuple: Vec::with_capacity(num_annotators),
            candidates: Vec::new(),
        }
    }

    fn enumerate(mut self) -> Result<Vec<UnitaryAlignment>> {
        self.extend(0.0)?;
        Ok(self.candidates)
    }

    fn extend(&mut self, partial: f64) -> Result<()> {
        let annotator_idx = self.tuple.len();
        if annotator_idx == self.continuum.num_annotators() {
            if self.tuple.iter().any(Option::is_some) {
                if let Some(limit) = self.max_candidates {
                    if self.candidates.len() >= limit {
                        return Err(AlignmentError::TooManyCandidates { limit }.into());
                    }
                }
                self.candidates.push(UnitaryAlignment::with_disorder(
                    self.tuple.clone(),
                    partial / self.pairs,
                ));
            }
            return Ok(());
        }

        let num_units = self.continuum.units(annotator_idx).len();
        for slot in (0..num_units).map(Some).chain(std::iter::once(None)) {
            let added = self
                .tuple
                .iter()
                .enumerate()
                .map(|(other_idx, other)| {
                    pair_cost(
                        self.continuum,
                        self.dissimilarity,
                        (other_idx, *other),
                        (annotator_idx, slot),
                    )
                })
                .sum::<f64>();
            if partial + added < self.bound {
                self.tuple.push(slot);
                self.extend(partial + added)?;
                self.tuple.pop();
            }
        }
        Ok(())
    }
}
