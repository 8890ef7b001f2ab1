//! Confidence score module

use std::fmt;

/// Confidence attached to a field mapping, always within [0.0, 1.0]
///
/// Values coming from the external classifier are untrusted, so construction
/// clamps instead of panicking. NaN collapses to zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Confidence(f64);

impl Confidence {
    /// No confidence at all
    pub const ZERO: Confidence = Confidence(0.0);

    /// Full confidence (manual overrides)
    pub const CERTAIN: Confidence = Confidence(1.0);

    /// Create a confidence score, clamping into [0.0, 1.0]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Get the raw value
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Check whether the score is strictly below a threshold
    pub fn is_below(&self, threshold: f64) -> bool {
        self.0 < threshold
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_creation() {
        let c = Confidence::new(0.7);
        assert_eq!(c.value(), 0.7);
    }

    #[test]
    fn test_clamps_out_of_range() {
        assert_eq!(Confidence::new(1.5).value(), 1.0);
        assert_eq!(Confidence::new(-0.2).value(), 0.0);
    }

    #[test]
    fn test_nan_is_zero() {
        assert_eq!(Confidence::new(f64::NAN), Confidence::ZERO);
    }

    #[test]
    fn test_is_below() {
        assert!(Confidence::new(0.3).is_below(0.5));
        assert!(!Confidence::new(0.5).is_below(0.5));
    }

    #[test]
    fn test_display() {
        assert_eq!(Confidence::new(0.9).to_string(), "0.90");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: any input lands inside [0.0, 1.0]
        #[test]
        fn test_confidence_always_in_range(value in proptest::num::f64::ANY) {
            let c = Confidence::new(value);
            prop_assert!(c.value() >= 0.0 && c.value() <= 1.0);
        }

        /// Property: in-range values are preserved exactly
        #[test]
        fn test_in_range_values_preserved(value in 0.0f64..=1.0) {
            prop_assert_eq!(Confidence::new(value).value(), value);
        }
    }
}
