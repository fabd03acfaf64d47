//! Value-to-CSS-text rules (§4.6): numbers, colors, and strings each have
//! a serialization form distinct from their `Display` impls (used for
//! string interpolation and diagnostics), because CSS output has its own
//! quoting, escaping, and compressed-mode elision rules.

use crate::value::color::{ColorFormat, SassColor};
use crate::value::number::SassNumber;
use crate::value::{ListSeparator, Value};

/// Units for which a zero value drops its unit suffix in compressed
/// output — lengths and angles, per §4.6. Other dimensioned units (time,
/// frequency, resolution) keep their unit even at zero.
const ZEROABLE_UNITS: &[&str] = &[
    "px", "in", "cm", "mm", "q", "pt", "pc", "em", "rem", "ex", "ch", "vw", "vh", "vmin", "vmax",
    "%", "deg", "rad", "grad", "turn",
];

/// Write `value` as it should appear in CSS output.
pub fn write_value(out: &mut String, value: &Value, compressed: bool) {
    match value {
        Value::Number(n) => out.push_str(&format_number(n, compressed)),
        Value::Color(c) => out.push_str(&format_color(c)),
        Value::String(s) if s.quoted => write_quoted(out, &s.text),
        Value::String(s) => write_unquoted(out, &s.text),
        Value::List(list) => {
            if list.is_bracketed() {
                out.push('[');
            } else if list.is_empty() {
                out.push_str("()");
                return;
            }
            let sep = match list.separator() {
                ListSeparator::Comma => {
                    if compressed {
                        ","
                    } else {
                        ", "
                    }
                }
                ListSeparator::Slash => " / ",
                ListSeparator::Space | ListSeparator::Undecided => " ",
            };
            for (i, el) in list.elements().iter().enumerate() {
                if i > 0 {
                    out.push_str(sep);
                }
                write_value(out, el, compressed);
            }
            if list.is_bracketed() {
                out.push(']');
            }
        }
        Value::Calculation(calc) => {
            out.push_str(&calc.name);
            out.push('(');
            for (i, arg) in calc.arguments.iter().enumerate() {
                if i > 0 {
                    out.push_str(if compressed { "," } else { ", " });
                }
                write_value(out, arg, compressed);
            }
            out.push(')');
        }
        // Maps, booleans, null, and function references are not legal CSS
        // property values; they only appear here when a stylesheet bug
        // writes one out directly, so the generic `Display` form (the
        // same text `@debug`/`@error` would show) is good enough.
        other => out.push_str(&other.to_string()),
    }
}

/// Render `n` as CSS, formatting the magnitude per Rust's shortest
/// round-trip decimal (which, unlike many languages, never switches to
/// exponential notation — exactly the "no exponential notation, full
/// digits for huge integers" rule this module needs).
fn format_number(n: &SassNumber, compressed: bool) -> String {
    let mut magnitude = format!("{}", n.value());
    if magnitude == "-0" {
        magnitude = "0".to_string();
    }
    if compressed {
        if let Some(rest) = magnitude.strip_prefix("0.") {
            magnitude = format!(".{rest}");
        } else if let Some(rest) = magnitude.strip_prefix("-0.") {
            magnitude = format!("-.{rest}");
        }
    }

    let numerator = n.numerator_units();
    let denominator = n.denominator_units();
    let is_zero = n.value() == 0.0;
    if compressed && is_zero && denominator.is_empty() && numerator.len() == 1 && ZEROABLE_UNITS.contains(&numerator[0].as_str()) {
        return magnitude;
    }

    let mut out = magnitude;
    for unit in numerator {
        out.push_str(unit);
    }
    if !denominator.is_empty() {
        out.push('/');
        for unit in denominator {
            out.push_str(unit);
        }
    }
    out
}

/// Render `c` per its stored original representation (§4.6): a literal
/// that was never touched by a color function round-trips through the
/// syntax it was written in; a computed color falls back to the
/// shortest faithful form (named, then hex, then `rgba(...)`).
fn format_color(c: &SassColor) -> String {
    match c.format() {
        ColorFormat::Named => {
            if c.alpha() == 0.0 && c.red() == 0 && c.green() == 0 && c.blue() == 0 {
                "transparent".to_string()
            } else {
                c.to_named().map_or_else(|| c.to_hex_string(), ToString::to_string)
            }
        }
        ColorFormat::Hex => c.to_hex_string(),
        ColorFormat::Rgb => format_rgb_function(c),
        ColorFormat::Hsl => format_hsl_function(c),
        ColorFormat::Computed => format_computed_color(c),
    }
}

fn format_computed_color(c: &SassColor) -> String {
    if c.red() == 0 && c.green() == 0 && c.blue() == 0 && c.alpha() == 0.0 {
        // `transparent` round-trips as `rgba(0, 0, 0, 0)` for IE8, which
        // treats the `transparent` keyword as a distinct (non-color) value.
        return "rgba(0, 0, 0, 0)".to_string();
    }
    if (c.alpha() - 1.0).abs() < f64::EPSILON {
        if let Some(name) = c.to_named() {
            return name.to_string();
        }
        return c.to_hex_string();
    }
    format_rgb_function(c)
}

fn format_rgb_function(c: &SassColor) -> String {
    if (c.alpha() - 1.0).abs() < f64::EPSILON {
        format!("rgb({}, {}, {})", c.red(), c.green(), c.blue())
    } else {
        format!("rgba({}, {}, {}, {})", c.red(), c.green(), c.blue(), format_unit_value(c.alpha()))
    }
}

fn format_hsl_function(c: &SassColor) -> String {
    let (h, s, l) = (c.hue(), c.saturation(), c.lightness());
    if (c.alpha() - 1.0).abs() < f64::EPSILON {
        format!("hsl({}, {}%, {}%)", format_unit_value(h), format_unit_value(s), format_unit_value(l))
    } else {
        format!(
            "hsla({}, {}%, {}%, {})",
            format_unit_value(h),
            format_unit_value(s),
            format_unit_value(l),
            format_unit_value(c.alpha())
        )
    }
}

/// A bare `f64` rendered the same minimal way `format_number` renders a
/// unitless [`SassNumber`], without constructing one just to throw away
/// its unit lists.
fn format_unit_value(value: f64) -> String {
    let rounded = (value * 1e4).round() / 1e4;
    let text = format!("{rounded}");
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}

fn write_unquoted(out: &mut String, text: &str) {
    write_escaped(out, text, None);
}

fn write_quoted(out: &mut String, text: &str) {
    let double_count = text.matches('"').count();
    let single_count = text.matches('\'').count();
    let quote = if double_count > single_count { '\'' } else { '"' };
    out.push(quote);
    write_escaped(out, text, Some(quote));
    out.push(quote);
}

/// Escape `text` for CSS output: the active quote character (if any) is
/// backslash-escaped, and codepoints in the Unicode private-use areas
/// (including supplementary planes 15 and 16, which many fonts map to
/// icon glyphs) are emitted as CSS hex escapes per §4.6, followed by a
/// trailing space when the next character would otherwise be read as
/// part of the escape.
fn write_escaped(out: &mut String, text: &str, quote: Option<char>) {
    let chars: Vec<char> = text.chars().collect();
    for (i, &ch) in chars.iter().enumerate() {
        if Some(ch) == quote || ch == '\\' {
            out.push('\\');
            out.push(ch);
        } else if is_private_use(ch) {
            out.push('\\');
            out.push_str(&format!("{:x}", ch as u32));
            let next_needs_space = chars.get(i + 1).is_some_and(|n| n.is_ascii_hexdigit() || *n == ' ');
            if next_needs_space {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
}

fn is_private_use(ch: char) -> bool {
    let c = ch as u32;
    (0xE000..=0xF8FF).contains(&c) || (0xF_0000..=0xFFFFD).contains(&c) || (0x10_0000..=0x10_FFFD).contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SassNumber;

    #[test]
    fn compressed_strips_leading_zero() {
        let n = SassNumber::new(0.5);
        assert_eq!(format_number(&n, true), ".5");
        assert_eq!(format_number(&n, false), "0.5");
    }

    #[test]
    fn compressed_drops_zero_length_unit() {
        let n = SassNumber::with_unit(0.0, "px");
        assert_eq!(format_number(&n, true), "0");
        assert_eq!(format_number(&n, false), "0px");
    }

    #[test]
    fn compressed_keeps_zero_time_unit() {
        let n = SassNumber::with_unit(0.0, "s");
        assert_eq!(format_number(&n, true), "0s");
    }

    #[test]
    fn quoted_string_prefers_double_quotes_by_default() {
        let mut out = String::new();
        write_quoted(&mut out, "plain");
        assert_eq!(out, "\"plain\"");
    }

    #[test]
    fn quoted_string_switches_to_single_when_it_has_fewer_escapes() {
        let mut out = String::new();
        write_quoted(&mut out, "say \"hi\"");
        assert_eq!(out, "'say \"hi\"'");
    }
}
