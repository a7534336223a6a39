use std::{fmt::Display, str::FromStr};

use anyhow::{anyhow, Error, Result};
use derive_builder::Builder;

use crate::{
    continuum::Continuum,
    sampling::{ContinuumSampler, ShuffleSampler, StatisticalSampler},
};

pub const DEFAULT_PRECISION_LEVEL: f64 = 0.02;
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;
pub const DEFAULT_MIN_SAMPLES: usize = 30;
pub const DEFAULT_MAX_SAMPLES: usize = 1000;
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// How chance continuums are generated from the observed continuum.
///
/// The default sampler is Statistical.
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone)]
pub enum SamplerKind {
    /// Draws units from normal distributions fitted to the observed continuum.
    #[default]
    Statistical,
    /// Moves the observed annotators' units to random positions.
    Shuffle,
}

impl SamplerKind {
    pub fn build(&self, continuum: &Continuum) -> Result<Box<dyn ContinuumSampler>> {
        Ok(match self {
            Self::Statistical => Box::new(StatisticalSampler::from_continuum(continuum)?),
            Self::Shuffle => Box::new(ShuffleSampler::from_continuum(continuum)?),
        })
    }
}

impl Display for SamplerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Statistical => write!(f, "statistical"),
            Self::Shuffle => write!(f, "shuffle"),
        }
    }
}

impl FromStr for SamplerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "statistical" | "stat" => Ok(SamplerKind::Statistical),
            "shuffle" => Ok(SamplerKind::Shuffle),
            _ => Err(anyhow!("Invalid sampler: {}", s)),
        }
    }
}

/// Options for computing gamma.  Use [`Builder`] to set a subset of the options.
#[derive(Copy, Clone, Debug, PartialEq, Builder)]
#[builder(
    name = "Builder",
    build_fn(name = "build_options", validate = "Self::validate")
)]
pub struct Options {
    /// How chance continuums are sampled.
    #[builder(default)]
    pub sampler: SamplerKind,
    /// Sampling stops once the confidence interval of the expected disorder is narrower than
    /// this fraction of its mean (on each side).
    #[builder(default = "DEFAULT_PRECISION_LEVEL")]
    pub precision_level: f64,
    #[builder(default = "DEFAULT_CONFIDENCE_LEVEL")]
    pub confidence_level: f64,
    #[builder(default = "DEFAULT_MIN_SAMPLES")]
    pub min_samples: usize,
    #[builder(default = "DEFAULT_MAX_SAMPLES")]
    pub max_samples: usize,
    /// The number of samples drawn each time the precision level is not yet reached.
    #[builder(default = "DEFAULT_BATCH_SIZE")]
    pub batch_size: usize,
    #[builder(default = "num_cpus::get()")]
    pub threads: usize,
    /// Seeds the chance continuums.  A random seed is used when not given.
    #[builder(default)]
    pub seed: Option<u64>,
    /// Fails a best-alignment search that would keep more candidate unitary alignments.
    #[builder(default)]
    pub max_candidates: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            sampler: SamplerKind::default(),
            precision_level: DEFAULT_PRECISION_LEVEL,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            min_samples: DEFAULT_MIN_SAMPLES,
            max_samples: DEFAULT_MAX_SAMPLES,
            batch_size: DEFAULT_BATCH_SIZE,
            threads: num_cpus::get(),
            seed: None,
            max_candidates: None,
        }
    }
}

impl Builder {
    fn validate(&self) -> Result<(), String> {
        if let Some(precision_level) = self.precision_level {
            if !(precision_level > 0.0 && precision_level.is_finite()) {
                return Err(format!("precision_level must be positive: {precision_level}"));
            }
        }
        if let Some(confidence_level) = self.confidence_level {
            if !(confidence_level > 0.0 && confidence_level < 1.0) {
                return Err(format!("confidence_level must be in (0, 1): {confidence_level}"));
            }
        }
        let min_samples = self.min_samples.unwrap_or(DEFAULT_MIN_SAMPLES);
        let max_samples = self.max_samples.unwrap_or(DEFAULT_MAX_SAMPLES);
        if min_samples < 2 {
            return Err(format!("min_samples must be at least 2: {min_samples}"));
        }
        if max_samples < min_samples {
            return Err(format!(
                "max_samples ({max_samples}) must be at least min_samples ({min_samples})"
            ));
        }
        if self.threads == Some(0) {
            return Err("threads must be at least 1".to_string());
        }
        if self.batch_size == Some(0) {
            return Err("batch_size must be at least 1".to_string());
        }
        Ok(())
    }
}
