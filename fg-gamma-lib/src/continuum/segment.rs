use std::{cmp::Ordering, fmt};

use anyhow::{ensure, Result};
use serde::Serialize;

/// A half-open time interval `[start, end)` on the continuum's timeline.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Segment {
    start: f64,
    end: f64,
}

impl Segment {
    /// Builds a new segment.  Both ends must be finite and `start` must be strictly before `end`.
    pub fn new(start: f64, end: f64) -> Result<Self> {
        ensure!(
            start.is_finite() && end.is_finite(),
            "Segment bounds must be finite: [{}, {}]",
            start,
            end
        );
        ensure!(
            start < end,
            "Segment start must be before its end: [{}, {}]",
            start,
            end
        );
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn middle(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Returns a copy of this segment moved so that it starts at `start`.
    pub fn moved_to(&self, start: f64) -> Result<Self> {
        Self::new(start, start + self.duration())
    }

    /// Orders segments by start, then by end.
    pub fn cmp_position(&self, other: &Self) -> Ordering {
        self.start
            .total_cmp(&other.start)
            .then_with(|| self.end.total_cmp(&other.end))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}, {:.3}]", self.start, self.end)
    }
}

#[cfg(test)]
pub mod tests {
    use std::cmp::Ordering;

    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    use super::Segment;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(5.0, 2.0)]
    #[case(f64::NEG_INFINITY, 2.0)]
    #[case(1.0, f64::NAN)]
    fn test_invalid_segments(#[case] start: f64, #[case] end: f64) {
        assert!(Segment::new(start, end).is_err());
    }

    #[rstest]
    fn test_duration_and_middle() {
        let segment = Segment::new(2.0, 5.0).unwrap();
        assert_approx_eq!(f64, segment.duration(), 3.0);
        assert_approx_eq!(f64, segment.middle(), 3.5);
        assert_eq!(segment.to_string(), "[2.000, 5.000]");
    }

    #[rstest]
    fn test_moved_to_keeps_duration() {
        let segment = Segment::new(2.0, 5.0).unwrap().moved_to(10.0).unwrap();
        assert_approx_eq!(f64, segment.start(), 10.0);
        assert_approx_eq!(f64, segment.end(), 13.0);
    }

    #[rstest]
    #[case((0.0, 1.0), (0.0, 2.0), Ordering::Less)]
    #[case((1.0, 2.0), (0.0, 5.0), Ordering::Greater)]
    #[case((1.0, 2.0), (1.0, 2.0), Ordering::Equal)]
    fn test_cmp_position(
        #[case] left: (f64, f64),
        #[case] right: (f64, f64),
        #[case] expected: Ordering,
    ) {
        let left = Segment::new(left.0, left.1).unwrap();
        let right = Segment::new(right.0, right.1).unwrap();
        assert_eq!(left.cmp_position(&right), expected);
    }
}
