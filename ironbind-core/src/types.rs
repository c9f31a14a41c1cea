//! Constraint primitives shared by schema descriptions and value checks.
//!
//! This module provides the facet types that bound field values: occurrence
//! ranges, integer sign and digit limits, and whitespace handling.

use std::fmt;

/// Upper bound of an occurrence range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaxOccurs {
    /// At most this many occurrences.
    Bounded(u32),
    /// No upper bound.
    Unbounded,
}

impl MaxOccurs {
    /// Parses a `maxOccurs` attribute value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "unbounded" => Some(Self::Unbounded),
            other => other.parse().ok().map(Self::Bounded),
        }
    }

    /// Returns true if `count` does not exceed this bound.
    #[must_use]
    pub const fn admits(&self, count: usize) -> bool {
        match self {
            Self::Bounded(max) => count <= *max as usize,
            Self::Unbounded => true,
        }
    }

    /// Returns true if this bound allows more than one occurrence.
    #[must_use]
    pub const fn is_repeated(&self) -> bool {
        match self {
            Self::Bounded(max) => *max > 1,
            Self::Unbounded => true,
        }
    }
}

impl fmt::Display for MaxOccurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(max) => write!(f, "{max}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Allowed occurrence range of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occurs {
    /// Minimum number of occurrences.
    pub min: u32,
    /// Maximum number of occurrences.
    pub max: MaxOccurs,
}

impl Occurs {
    /// Exactly one occurrence.
    pub const REQUIRED: Self = Self {
        min: 1,
        max: MaxOccurs::Bounded(1),
    };

    /// Zero or one occurrence.
    pub const OPTIONAL: Self = Self {
        min: 0,
        max: MaxOccurs::Bounded(1),
    };

    /// Zero or more occurrences.
    pub const ANY: Self = Self {
        min: 0,
        max: MaxOccurs::Unbounded,
    };

    /// One or more occurrences.
    pub const AT_LEAST_ONE: Self = Self {
        min: 1,
        max: MaxOccurs::Unbounded,
    };

    /// Creates a new occurrence range.
    #[must_use]
    pub const fn new(min: u32, max: MaxOccurs) -> Self {
        Self { min, max }
    }

    /// Returns true if `count` lies within the range.
    #[must_use]
    pub const fn admits(&self, count: usize) -> bool {
        count >= self.min as usize && self.max.admits(count)
    }

    /// Returns true if at least one occurrence is required.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.min > 0
    }

    /// Returns true if the field may occur more than once.
    #[must_use]
    pub const fn is_repeated(&self) -> bool {
        self.max.is_repeated()
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::REQUIRED
    }
}

impl fmt::Display for Occurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

/// Sign restriction on an integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignConstraint {
    /// Any sign.
    #[default]
    None,
    /// Zero or greater (`xs:nonNegativeInteger`).
    NonNegative,
    /// Strictly greater than zero (`xs:positiveInteger`).
    Positive,
}

impl SignConstraint {
    /// Parses a sign constraint from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "nonNegative" => Some(Self::NonNegative),
            "positive" => Some(Self::Positive),
            _ => None,
        }
    }

    /// Returns true if `value` satisfies the constraint.
    #[must_use]
    pub const fn admits(&self, value: i128) -> bool {
        match self {
            Self::None => true,
            Self::NonNegative => value >= 0,
            Self::Positive => value > 0,
        }
    }
}

/// Facets of a bounded integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IntegerFacets {
    /// Maximum number of decimal digits (`xs:totalDigits`).
    pub total_digits: Option<u32>,
    /// Sign restriction.
    pub sign: SignConstraint,
}

impl IntegerFacets {
    /// Largest digit ceiling representable by the value model.
    pub const MAX_TOTAL_DIGITS: u32 = 38;

    /// Creates facets with the given digit ceiling and sign.
    #[must_use]
    pub const fn new(total_digits: Option<u32>, sign: SignConstraint) -> Self {
        Self { total_digits, sign }
    }

    /// Checks `value` against the facets.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn check(&self, value: i128) -> Result<(), NumericConstraint> {
        if let Some(digits) = self.total_digits {
            if digit_count(value) > digits {
                return Err(NumericConstraint::TotalDigits(digits));
            }
        }
        match self.sign {
            SignConstraint::NonNegative if value < 0 => Err(NumericConstraint::NonNegative),
            SignConstraint::Positive if value <= 0 => Err(NumericConstraint::Positive),
            _ => Ok(()),
        }
    }
}

/// Number of significant decimal digits in `value`, ignoring the sign.
#[must_use]
pub fn digit_count(value: i128) -> u32 {
    let mut magnitude = value.unsigned_abs();
    let mut digits = 1;
    while magnitude >= 10 {
        magnitude /= 10;
        digits += 1;
    }
    digits
}

/// A numeric constraint violated by a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericConstraint {
    /// More significant digits than allowed.
    TotalDigits(u32),
    /// Negative value where zero or greater is required.
    NonNegative,
    /// Zero or negative value where a positive value is required.
    Positive,
    /// Text is not an integer literal.
    NotAnInteger,
    /// Value exceeds what the value model can represent.
    Overflow,
}

impl fmt::Display for NumericConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TotalDigits(digits) => write!(f, "at most {digits} digits"),
            Self::NonNegative => f.write_str("non-negative"),
            Self::Positive => f.write_str("positive"),
            Self::NotAnInteger => f.write_str("integer literal"),
            Self::Overflow => f.write_str("representable as a 128-bit integer"),
        }
    }
}

/// Whitespace facet applied to text before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WhiteSpace {
    /// Keep text as-is.
    #[default]
    Preserve,
    /// Replace tab, newline and carriage return with spaces.
    Replace,
    /// Replace, then collapse runs of spaces and trim.
    Collapse,
}

impl WhiteSpace {
    /// Parses a whitespace facet from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "preserve" => Some(Self::Preserve),
            "replace" => Some(Self::Replace),
            "collapse" => Some(Self::Collapse),
            _ => None,
        }
    }
}
