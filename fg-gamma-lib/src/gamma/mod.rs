//! The gamma agreement: `1 - observed disorder / expected disorder`, where the expected disorder
//! is the mean best-alignment disorder of chance continuums sampled from the observed one.
pub mod options;

pub use options::{Builder, Options, SamplerKind};

use std::ops::Range;

use anyhow::{ensure, Result};
use flume::unbounded;
use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

use crate::{
    align::{Alignment, BestAlignmentSearch},
    continuum::Continuum,
    dissimilarity::Dissimilarity,
    errors::AlignmentError,
    sampling::ContinuumSampler,
    util::stats::ConfidenceInterval,
};

/// Mixes the sample index into the run's seed, so each chance continuum has its own stream.
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// The outcome of a gamma computation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GammaResults {
    /// The gamma agreement.
    pub gamma: f64,
    /// The confidence interval of gamma, derived from that of the expected disorder.  The low end
    /// is negative infinity when the expected disorder's interval reaches zero.
    pub gamma_ci: (f64, f64),
    /// The disorder of the best alignment of the observed continuum.
    pub observed_disorder: f64,
    /// The mean best-alignment disorder of the chance continuums.
    pub expected_disorder: f64,
    /// The best-alignment disorder of each chance continuum, in sampling order.
    pub expected_disorders: Vec<f64>,
    pub num_samples: usize,
    /// The seed from which the chance continuums were sampled.
    pub seed: u64,
    pub best_alignment: Alignment,
}

/// Computes the gamma agreement of a continuum.
///
/// Chance continuums are sampled in batches until the expected disorder's confidence interval
/// is within `options.precision_level` of its mean, or `options.max_samples` is reached.
pub fn compute_gamma<D: Dissimilarity + ?Sized>(
    continuum: &Continuum,
    dissimilarity: &D,
    options: &Options,
) -> Result<GammaResults> {
    let num_annotators = continuum.num_annotators();
    if num_annotators < 2 {
        return Err(AlignmentError::TooFewAnnotators(num_annotators).into());
    }
    ensure!(
        !continuum.is_empty(),
        "Cannot compute gamma for a continuum without units"
    );

    info!(
        "Computing gamma for {} units across {} annotators",
        continuum.num_units(),
        num_annotators
    );
    let search = BestAlignmentSearch::with_max_candidates(options.max_candidates);
    let best_alignment = search.run(continuum, dissimilarity)?;
    let observed_disorder = best_alignment.disorder();
    info!(
        "Observed disorder: {:.6} over {} unitary alignments",
        observed_disorder,
        best_alignment.num_alignments()
    );

    let sampler = options.sampler.build(continuum)?;
    let seed = options.seed.unwrap_or_else(|| rand::thread_rng().gen());
    debug!("Sampling chance continuums with the {} sampler (seed: {})", options.sampler, seed);
    let sampling = ChanceSampling {
        sampler: sampler.as_ref(),
        dissimilarity,
        search,
        seed,
        threads: options.threads,
    };

    let mut expected_disorders = sampling.disorders(0..options.min_samples)?;
    let mut ci = ConfidenceInterval::of_mean(&expected_disorders, options.confidence_level)?;
    while ci.relative_half_width() > options.precision_level
        && expected_disorders.len() < options.max_samples
    {
        let next = expected_disorders.len();
        let end = (next + options.batch_size).min(options.max_samples);
        expected_disorders.extend(sampling.disorders(next..end)?);
        ci = ConfidenceInterval::of_mean(&expected_disorders, options.confidence_level)?;
        debug!(
            "Expected disorder after {} samples: {:.6} +/- {:.6}",
            expected_disorders.len(),
            ci.mean,
            ci.half_width
        );
    }
    if ci.relative_half_width() > options.precision_level {
        warn!(
            "Precision level {} not reached after {} samples (relative half width: {:.4})",
            options.precision_level,
            expected_disorders.len(),
            ci.relative_half_width()
        );
    }

    let expected_disorder = ci.mean;
    ensure!(
        expected_disorder > 0.0,
        "The expected disorder is zero: gamma is undefined"
    );
    let gamma = 1.0 - observed_disorder / expected_disorder;
    let gamma_low = if ci.low() > 0.0 {
        1.0 - observed_disorder / ci.low()
    } else {
        f64::NEG_INFINITY
    };
    let gamma_high = 1.0 - observed_disorder / ci.high();
    info!(
        "Gamma: {:.4} ({:.0}% CI: [{:.4}, {:.4}]) from {} chance continuums",
        gamma,
        options.confidence_level * 100.0,
        gamma_low,
        gamma_high,
        expected_disorders.len()
    );

    Ok(GammaResults {
        gamma,
        gamma_ci: (gamma_low, gamma_high),
        observed_disorder,
        expected_disorder,
        num_samples: expected_disorders.len(),
        expected_disorders,
        seed,
        best_alignment,
    })
}

/// Samples chance continuums and finds their best-alignment disorders across worker threads.
struct ChanceSampling<'a, D: Dissimilarity + ?Sized> {
    sampler: &'a dyn ContinuumSampler,
    dissimilarity: &'a D,
    search: BestAlignmentSearch,
    seed: u64,
    threads: usize,
}

impl<'a, D: Dissimilarity + ?Sized> ChanceSampling<'a, D> {
    /// The disorders of the chance continuums with the given sample indices, in index order.
    /// Sample `i` is always drawn from the same random stream, whatever thread computes it.
    fn disorders(&self, indices: Range<usize>) -> Result<Vec<f64>> {
        let (job_tx, job_rx) = unbounded::<usize>();
        let (result_tx, result_rx) = unbounded::<(usize, Result<f64>)>();
        for index in indices.clone() {
            job_tx.send(index)?;
        }
        drop(job_tx);

        let num_workers = self.threads.min(indices.len()).max(1);
        std::thread::scope(|scope| {
            for _ in 0..num_workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for index in job_rx.iter() {
                        if result_tx.send((index, self.disorder(index))).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        let mut disorders = Vec::with_capacity(indices.len());
        for (index, disorder) in result_rx.iter() {
            disorders.push((index, disorder?));
        }
        disorders.sort_unstable_by_key(|(index, _)| *index);
        ensure!(
            disorders.len() == indices.len(),
            "Expected {} chance disorders, found {}",
            indices.len(),
            disorders.len()
        );
        Ok(disorders.into_iter().map(|(_, disorder)| disorder).collect())
    }

    fn disorder(&self, index: usize) -> Result<f64> {
        let mut rng = StdRng::seed_from_u64(self.seed ^ (index as u64).wrapping_mul(SEED_MIX));
        let continuum = self.sampler.sample(&mut rng)?;
        Ok(self.search.run(&continuum, self.dissimilarity)?.disorder())
    }
}
