//! Numeric ranges used by star rating, length and BPM rules

use std::fmt;

/// A numeric range parsed from `a-b`, `a+` or `a`
///
/// - `a-b` matches `a <= x <= b`
/// - `a+` matches `x >= a`
/// - `a` matches `a <= x < a + 1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: Option<f64>,
    pub max_inclusive: bool,
}

impl NumericRange {
    /// Parse a range, returning `None` if it is malformed
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if let Some(min) = text.strip_suffix('+') {
            let min = parse_number(min)?;
            return Some(Self {
                min,
                max: None,
                max_inclusive: true,
            });
        }

        if let Some((min, max)) = text.split_once('-') {
            let (min, max) = (parse_number(min)?, parse_number(max)?);
            if min > max {
                return None;
            }
            return Some(Self {
                min,
                max: Some(max),
                max_inclusive: true,
            });
        }

        let value = parse_number(text)?;
        Some(Self {
            min: value,
            max: Some(value + 1.0),
            max_inclusive: false,
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        if value < self.min {
            return false;
        }
        match self.max {
            Some(max) if self.max_inclusive => value <= max,
            Some(max) => value < max,
            None => true,
        }
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            None => write!(f, "{}+", self.min),
            Some(max) if self.max_inclusive => write!(f, "{}-{}", self.min, max),
            Some(_) => write!(f, "{}", self.min),
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let value: f64 = text.trim().parse().ok()?;
    value.is_finite().then_some(value)
}
