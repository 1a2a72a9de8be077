use serde::{Deserialize, Serialize};
use std::fmt;

/// A numerator/denominator pair as stored by the RATIONAL and SRATIONAL types.
///
/// Equality is component-wise: `1/2` and `2/4` are different values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    numerator: i64,
    denominator: i64,
}

impl Rational {
    pub const fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    /// Floating point value, or `None` for a zero denominator.
    pub fn to_f64(&self) -> Option<f64> {
        if self.denominator == 0 {
            None
        } else {
            Some(self.numerator as f64 / self.denominator as f64)
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_wise_equality() {
        assert_eq!(Rational::new(1, 2), Rational::new(1, 2));
        assert_ne!(Rational::new(1, 2), Rational::new(2, 4));
    }

    #[test]
    fn to_f64_handles_zero_denominator() {
        assert_eq!(Rational::new(3, 4).to_f64(), Some(0.75));
        assert_eq!(Rational::new(3, 0).to_f64(), None);
    }

    #[test]
    fn display_as_fraction() {
        assert_eq!(Rational::new(-7, 3).to_string(), "-7/3");
    }
}
