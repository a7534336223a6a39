pub mod alignment;
pub mod best;
pub(crate) mod solver;
pub mod unitary_alignment;

pub use alignment::Alignment;
pub use best::BestAlignmentSearch;
pub use unitary_alignment::UnitaryAlignment;
