#![deny(unsafe_code)]
#![allow(
    clippy::must_use_candidate,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

pub mod align;
pub mod continuum;
pub mod dissimilarity;
pub mod errors;
pub mod gamma;
pub mod sampling;
pub mod util;

pub use align::{Alignment, UnitaryAlignment};
pub use continuum::{Continuum, Segment, Unit};
pub use dissimilarity::{
    CategoricalDissimilarity, CombinedDissimilarity, Dissimilarity, PositionalDissimilarity,
};
pub use gamma::{compute_gamma, Builder, GammaResults, Options, SamplerKind};
