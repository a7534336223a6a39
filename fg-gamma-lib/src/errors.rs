use thiserror::Error;

/// Structural errors raised when a set of unitary alignments does not partition the units of a
/// continuum, or when a unitary alignment does not fit its continuum.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("Unit {unit} of annotator '{annotator}' is not in any unitary alignment")]
    UnitNotAligned { annotator: String, unit: usize },

    #[error("Unit {unit} of annotator '{annotator}' is in more than one unitary alignment")]
    UnitAlignedTwice { annotator: String, unit: usize },

    #[error("Unitary alignment has {found} slots but the continuum has {expected} annotators")]
    TupleLengthMismatch { expected: usize, found: usize },

    #[error("Unitary alignment refers to unit {unit} of annotator '{annotator}', which does not exist")]
    UnknownUnit { annotator: String, unit: usize },

    #[error("Unitary alignment has no units")]
    EmptyUnitaryAlignment,

    #[error("At least two annotators are required, found {0}")]
    TooFewAnnotators(usize),

    #[error("More than {limit} candidate unitary alignments")]
    TooManyCandidates { limit: usize },
}
