//! Sass numbers: a finite `f64` paired with numerator/denominator unit
//! multisets, fuzzy-equal within a relative tolerance.
//!
//! "Two numbers are equal if, after converting one to the other's units,
//! their values match within a small tolerance" — Sass numbers are not
//! IEEE-754-exact comparable because unit conversion (e.g. `1in` vs
//! `96px`) introduces floating-point rounding that should not be
//! observable to a stylesheet author.

use std::fmt;

use crate::error::{SassError, Span};

/// Relative tolerance used for number equality and integer detection.
pub const EPSILON: f64 = 1e-11;

/// A Sass number: value plus numerator and denominator unit lists.
///
/// Units are stored unsorted in the order they were produced; comparisons
/// and conversions treat them as multisets (`convert_value_to_unit` sorts
/// internally when matching).
#[derive(Debug, Clone)]
pub struct SassNumber {
    value: f64,
    numerator_units: Vec<String>,
    denominator_units: Vec<String>,
    /// The literal text this number was parsed from, if it still looks
    /// exactly like what would be printed (no arithmetic applied yet).
    /// Used by the serializer to avoid introducing spurious precision.
    as_slash: Option<(Box<SassNumber>, Box<SassNumber>)>,
}

impl SassNumber {
    /// A unitless number.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            value,
            numerator_units: Vec::new(),
            denominator_units: Vec::new(),
            as_slash: None,
        }
    }

    /// A number with a single numerator unit, e.g. `10px`.
    #[must_use]
    pub fn with_unit(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            numerator_units: vec![unit.into()],
            denominator_units: Vec::new(),
            as_slash: None,
        }
    }

    /// A number with arbitrary numerator/denominator unit multisets, e.g.
    /// the result of `10px / 2s`.
    #[must_use]
    pub fn with_units(value: f64, numerator: Vec<String>, denominator: Vec<String>) -> Self {
        Self {
            value,
            numerator_units: numerator,
            denominator_units: denominator,
            as_slash: None,
        }
    }

    /// The raw numeric value, in whatever units this number currently has.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn numerator_units(&self) -> &[String] {
        &self.numerator_units
    }

    #[must_use]
    pub fn denominator_units(&self) -> &[String] {
        &self.denominator_units
    }

    /// Whether this number carries any units at all.
    #[must_use]
    pub fn has_units(&self) -> bool {
        !self.numerator_units.is_empty() || !self.denominator_units.is_empty()
    }

    /// Whether this number has exactly one numerator unit and no
    /// denominator units, matching `unit` case-insensitively.
    #[must_use]
    pub fn has_unit(&self, unit: &str) -> bool {
        self.numerator_units.len() == 1
            && self.denominator_units.is_empty()
            && self.numerator_units[0].eq_ignore_ascii_case(unit)
    }

    /// Record that this number was produced by `/`-separating two number
    /// literals rather than dividing them, so the serializer can print
    /// `a/b` verbatim if it survives to output unresolved.
    #[must_use]
    pub fn as_slash(mut self, left: SassNumber, right: SassNumber) -> Self {
        self.as_slash = Some((Box::new(left), Box::new(right)));
        self
    }

    #[must_use]
    pub fn slash_parts(&self) -> Option<(&SassNumber, &SassNumber)> {
        self.as_slash
            .as_ref()
            .map(|(l, r)| (l.as_ref(), r.as_ref()))
    }

    /// Whether this number is numerically within [`EPSILON`] (relative) of
    /// an integer.
    #[must_use]
    pub fn is_int(&self) -> bool {
        fuzzy_equals(self.value, self.value.round())
    }

    /// The nearest integer, if this number is fuzzily integral.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        self.is_int().then(|| self.value.round() as i64)
    }

    /// Assert this number is (fuzzily) an integer, for builtins like
    /// `list.nth` that require one.
    pub fn assert_int(&self, span: &Span) -> Result<i64, SassError> {
        self.as_int()
            .ok_or_else(|| SassError::runtime(format!("{self} is not an integer."), span.clone()))
    }

    /// Assert this number's value lies within `[min, max]` (inclusive,
    /// fuzzy at the boundaries).
    pub fn assert_in_range(&self, min: f64, max: f64, span: &Span) -> Result<f64, SassError> {
        if self.value > min - EPSILON && self.value < max + EPSILON {
            Ok(self.value.clamp(min, max))
        } else {
            Err(SassError::runtime(
                format!("{self} must be between {min} and {max}."),
                span.clone(),
            ))
        }
    }

    /// Assert this number has exactly `unit` and return its value.
    pub fn assert_unit(&self, unit: &str, span: &Span) -> Result<f64, SassError> {
        if self.has_unit(unit) {
            Ok(self.value)
        } else {
            Err(SassError::runtime(
                format!("Expected {self} to have unit \"{unit}\"."),
                span.clone(),
            ))
        }
    }

    /// Whether this number's units are convertible to `other`'s units
    /// (same dimension — e.g. both length, or both unitless).
    #[must_use]
    pub fn compatible_with(&self, other: &SassNumber) -> bool {
        self.convert_value_to_units(&other.numerator_units, &other.denominator_units)
            .is_some()
    }

    /// Convert this number's value into the given numerator/denominator
    /// units, returning `None` if the units are incompatible (different
    /// dimension, e.g. `px` vs `s`).
    #[must_use]
    pub fn convert_value_to_units(
        &self,
        target_numerator: &[String],
        target_denominator: &[String],
    ) -> Option<f64> {
        let mut value = self.value;
        value = convert_multiset(value, &self.numerator_units, target_numerator, false)?;
        value = convert_multiset(value, &self.denominator_units, target_denominator, true)?;
        Some(value)
    }

    /// Produce a new number with the given target units, converting the
    /// value. Returns `None` on incompatible units.
    #[must_use]
    pub fn converted_to(&self, numerator: Vec<String>, denominator: Vec<String>) -> Option<Self> {
        let value = self.convert_value_to_units(&numerator, &denominator)?;
        Some(Self {
            value,
            numerator_units: numerator,
            denominator_units: denominator,
            as_slash: None,
        })
    }

    /// The unit portion alone (no value), e.g. `px` or `deg/s`, `""` if
    /// unitless. Used by error messages that name a unit without
    /// restating the number it came from.
    #[must_use]
    pub fn unit_string(&self) -> String {
        let mut out = String::new();
        for unit in &self.numerator_units {
            out.push_str(unit);
        }
        if !self.denominator_units.is_empty() {
            out.push('/');
            for unit in &self.denominator_units {
                out.push_str(unit);
            }
        }
        out
    }
}

/// Convert `value`, expressed in `from_units`, into `to_units` (both
/// multisets of the same dimension). `invert` is true for denominator
/// conversion, where a larger "from" unit factor means the value should be
/// multiplied instead of divided.
fn convert_multiset(
    mut value: f64,
    from_units: &[String],
    to_units: &[String],
    invert: bool,
) -> Option<f64> {
    if from_units.len() != to_units.len() {
        // Different unit *counts* can still cancel out to the same
        // dimension in principle, but Sass's actual algorithm pairs units
        // one-for-one; an arity mismatch means they are not the same
        // physical quantity.
        if from_units.is_empty() && to_units.is_empty() {
            return Some(value);
        }
        return None;
    }
    if from_units.is_empty() {
        return Some(value);
    }
    // Pair each "from" unit with a compatible "to" unit, consuming each
    // target unit at most once (handles multi-unit products like px*s).
    let mut remaining: Vec<&String> = to_units.iter().collect();
    for from_unit in from_units {
        let idx = remaining
            .iter()
            .position(|to_unit| conversion_factor(from_unit, to_unit).is_some())?;
        let to_unit = remaining.remove(idx);
        let factor = conversion_factor(from_unit, to_unit)?;
        value = if invert { value / factor } else { value * factor };
    }
    Some(value)
}

/// The multiplier to convert one unit of `from` into `to` (e.g. `px` ->
/// `in` is `1.0/96.0`), or `None` if they are not the same physical
/// dimension.
fn conversion_factor(from: &str, to: &str) -> Option<f64> {
    if from.eq_ignore_ascii_case(to) {
        return Some(1.0);
    }
    let table: &[&[(&str, f64)]] = &[
        // Lengths, relative to 1in.
        &[
            ("in", 1.0),
            ("cm", 1.0 / 2.54),
            ("mm", 1.0 / 25.4),
            ("q", 1.0 / 101.6),
            ("pt", 1.0 / 72.0),
            ("pc", 1.0 / 6.0),
            ("px", 1.0 / 96.0),
        ],
        // Angles, relative to 1deg.
        &[
            ("deg", 1.0),
            ("grad", 0.9),
            ("rad", 180.0 / std::f64::consts::PI),
            ("turn", 360.0),
        ],
        // Time, relative to 1s.
        &[("s", 1.0), ("ms", 1.0 / 1000.0)],
        // Frequency, relative to 1Hz.
        &[("hz", 1.0), ("khz", 1000.0)],
        // Resolution, relative to 1dpi.
        &[("dpi", 1.0), ("dpcm", 2.54), ("dppx", 96.0), ("x", 96.0)],
    ];
    for group in table {
        let from_factor = group
            .iter()
            .find(|(unit, _)| unit.eq_ignore_ascii_case(from))
            .map(|(_, f)| *f);
        let to_factor = group
            .iter()
            .find(|(unit, _)| unit.eq_ignore_ascii_case(to))
            .map(|(_, f)| *f);
        if let (Some(ff), Some(tf)) = (from_factor, to_factor) {
            return Some(ff / tf);
        }
    }
    None
}

/// Compare two `f64`s within [`EPSILON`] relative tolerance.
#[must_use]
pub fn fuzzy_equals(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
}

impl PartialEq for SassNumber {
    fn eq(&self, other: &Self) -> bool {
        match other.convert_value_to_units(&self.numerator_units, &self.denominator_units) {
            Some(converted) => fuzzy_equals(self.value, converted),
            None => false,
        }
    }
}

impl fmt::Display for SassNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        for unit in &self.numerator_units {
            write!(f, "{unit}")?;
        }
        if !self.denominator_units.is_empty() {
            write!(f, "/")?;
            for unit in &self.denominator_units {
                write!(f, "{unit}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuzzy_equality_across_unit_conversion() {
        let one_in = SassNumber::with_unit(1.0, "in");
        let ninety_six_px = SassNumber::with_unit(96.0, "px");
        assert_eq!(one_in, ninety_six_px);
    }

    #[test]
    fn incompatible_units_are_not_equal() {
        let px = SassNumber::with_unit(1.0, "px");
        let deg = SassNumber::with_unit(1.0, "deg");
        assert_ne!(px, deg);
    }

    #[test]
    fn unitless_numbers_compare_directly() {
        assert_eq!(SassNumber::new(3.0), SassNumber::new(3.0));
        assert_ne!(SassNumber::new(3.0), SassNumber::new(4.0));
    }

    #[test]
    fn is_int_tolerates_float_noise() {
        let n = SassNumber::new(2.0 + 1e-13);
        assert!(n.is_int());
        assert_eq!(n.as_int(), Some(2));
    }

    #[test]
    fn assert_unit_rejects_wrong_unit() {
        let px = SassNumber::with_unit(1.0, "px");
        let span = test_span();
        assert!(px.assert_unit("em", &span).is_err());
        assert_eq!(px.assert_unit("px", &span).unwrap(), 1.0);
    }

    fn test_span() -> Span {
        use crate::error::SourceFile;
        use std::sync::Arc;
        let source = Arc::new(SourceFile::new(
            url::Url::parse("file:///t.scss").unwrap(),
            "",
        ));
        Span::new(source, 0, 0)
    }
}
