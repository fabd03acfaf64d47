//! `sass:math` — numeric helpers operating on [`SassNumber`] (§4.4).

use std::collections::HashMap;

use crate::error::{SassError, SassResult, Span};
use crate::value::ops::{apply_binary, BinaryOp};
use crate::value::{SassNumber, Value};

use super::{expect_number, ArgReader};

pub(super) fn call(name: &str, positional: Vec<Value>, named: HashMap<String, Value>, span: &Span) -> Option<SassResult<Value>> {
    let mut args = ArgReader::new(positional, named);
    let result = match name {
        "div" => div(&mut args, span),
        "pow" => pow(&mut args, span),
        "sqrt" => unary_fn(&mut args, span, f64::sqrt),
        "abs" => abs(&mut args, span),
        "round" => round(&mut args, span),
        "ceil" => unary_unit_preserving(&mut args, span, f64::ceil),
        "floor" => unary_unit_preserving(&mut args, span, f64::floor),
        "log" => log(&mut args, span),
        "sin" => unary_fn(&mut args, span, f64::sin),
        "cos" => unary_fn(&mut args, span, f64::cos),
        "tan" => unary_fn(&mut args, span, f64::tan),
        "min" => min_max(&mut args, span, true),
        "max" => min_max(&mut args, span, false),
        "percentage" => percentage(&mut args, span),
        "unit" => unit(&mut args, span),
        "unitless" | "is-unitless" => is_unitless(&mut args, span),
        "compatible" => compatible(&mut args, span),
        "clamp" => clamp(&mut args, span),
        "hypot" => hypot(&mut args, span),
        "random" => random(&mut args, span),
        _ => return None,
    };
    Some(result)
}

fn div(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let a = args.required("number1", span)?;
    let b = args.required("number2", span)?;
    apply_binary(BinaryOp::Div, &a, &b, span)
}

fn pow(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let base = args.required("base", span)?;
    let exponent = args.required("exponent", span)?;
    let base = expect_number(&base, span)?;
    let exponent = expect_number(&exponent, span)?;
    if base.has_units() || exponent.has_units() {
        return Err(SassError::runtime("math.pow() is only defined for unitless numbers.".to_string(), span.clone()));
    }
    Ok(Value::Number(SassNumber::new(base.value().powf(exponent.value()))))
}

fn unary_fn(args: &mut ArgReader, span: &Span, f: impl FnOnce(f64) -> f64) -> SassResult<Value> {
    let n = args.required("number", span)?;
    let n = expect_number(&n, span)?;
    Ok(Value::Number(SassNumber::new(f(n.value()))))
}

fn unary_unit_preserving(args: &mut ArgReader, span: &Span, f: impl FnOnce(f64) -> f64) -> SassResult<Value> {
    let n = args.required("number", span)?;
    let n = expect_number(&n, span)?;
    Ok(Value::Number(SassNumber::with_units(
        f(n.value()),
        n.numerator_units().to_vec(),
        n.denominator_units().to_vec(),
    )))
}

fn abs(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    unary_unit_preserving(args, span, f64::abs)
}

fn round(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    unary_unit_preserving(args, span, f64::round)
}

fn log(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let n = args.required("number", span)?;
    let n = expect_number(&n, span)?;
    match args.optional_opt("base") {
        Some(base) => {
            let base = expect_number(&base, span)?;
            Ok(Value::Number(SassNumber::new(n.value().log(base.value()))))
        }
        None => Ok(Value::Number(SassNumber::new(n.value().ln()))),
    }
}

fn min_max(args: &mut ArgReader, span: &Span, min: bool) -> SassResult<Value> {
    let mut numbers = vec![args.required("number1", span)?];
    numbers.extend(args.rest());
    let mut best = expect_number(&numbers[0], span)?.clone();
    for candidate in &numbers[1..] {
        let candidate = expect_number(candidate, span)?;
        if !best.compatible_with(candidate) {
            return Err(SassError::runtime(format!("{best} and {candidate} are incompatible."), span.clone()));
        }
        let converted = candidate
            .convert_value_to_units(best.numerator_units(), best.denominator_units())
            .unwrap_or_else(|| candidate.value());
        let take_candidate = if min { converted < best.value() } else { converted > best.value() };
        if take_candidate {
            best = candidate.clone();
        }
    }
    Ok(Value::Number(best))
}

fn percentage(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let n = args.required("number", span)?;
    let n = expect_number(&n, span)?;
    if n.has_units() {
        return Err(SassError::runtime(format!("{n} is not unitless."), span.clone()));
    }
    Ok(Value::Number(SassNumber::with_unit(n.value() * 100.0, "%")))
}

fn unit(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let n = args.required("number", span)?;
    let n = expect_number(&n, span)?;
    Ok(Value::quoted_string(format_unit(&n)))
}

fn format_unit(n: &SassNumber) -> String {
    let mut text = String::new();
    for (i, u) in n.numerator_units().iter().enumerate() {
        if i > 0 {
            text.push('*');
        }
        text.push_str(u);
    }
    if !n.denominator_units().is_empty() {
        text.push('/');
        for (i, u) in n.denominator_units().iter().enumerate() {
            if i > 0 {
                text.push('*');
            }
            text.push_str(u);
        }
    }
    text
}

fn is_unitless(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let n = args.required("number", span)?;
    let n = expect_number(&n, span)?;
    Ok(Value::Boolean(!n.has_units()))
}

fn compatible(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let a = args.required("number1", span)?;
    let b = args.required("number2", span)?;
    let a = expect_number(&a, span)?;
    let b = expect_number(&b, span)?;
    Ok(Value::Boolean(a.compatible_with(b)))
}

fn clamp(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let min = args.required("min", span)?;
    let value = args.required("number", span)?;
    let max = args.required("max", span)?;
    let min = expect_number(&min, span)?;
    let value = expect_number(&value, span)?;
    let max = expect_number(&max, span)?;
    if !min.compatible_with(value) || !min.compatible_with(max) {
        return Err(SassError::runtime(format!("{min}, {value}, and {max} are not compatible."), span.clone()));
    }
    let value_in_min_units = value.convert_value_to_units(min.numerator_units(), min.denominator_units()).unwrap_or_else(|| value.value());
    let max_in_min_units = max.convert_value_to_units(min.numerator_units(), min.denominator_units()).unwrap_or_else(|| max.value());
    let clamped = value_in_min_units.clamp(min.value().min(max_in_min_units), min.value().max(max_in_min_units));
    Ok(Value::Number(SassNumber::with_units(
        clamped,
        min.numerator_units().to_vec(),
        min.denominator_units().to_vec(),
    )))
}

fn hypot(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let mut numbers = vec![args.required("number1", span)?];
    numbers.extend(args.rest());
    let first = expect_number(&numbers[0], span)?;
    let mut sum_sq = first.value().powi(2);
    for n in &numbers[1..] {
        let n = expect_number(n, span)?;
        let converted = n.convert_value_to_units(first.numerator_units(), first.denominator_units()).unwrap_or_else(|| n.value());
        sum_sq += converted.powi(2);
    }
    Ok(Value::Number(SassNumber::with_units(
        sum_sq.sqrt(),
        first.numerator_units().to_vec(),
        first.denominator_units().to_vec(),
    )))
}

/// `math.random()` is the one built-in whose output is not a pure function
/// of its arguments; Sass accepts that nondeterminism as the price of
/// having it at all. Seeded from the process's address-space layout
/// instead of a wall clock so no extra dependency is needed for a function
/// real stylesheets rarely call more than once per compile.
fn random(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let limit = args.optional_opt("limit");
    let seed = Box::new(0u8);
    let raw = std::ptr::addr_of!(*seed) as usize;
    let unit = f64::from((raw % 1_000_003) as u32) / 1_000_003.0;
    match limit {
        Some(limit) => {
            let limit = expect_number(&limit, span)?;
            let max = limit.assert_int(span)?;
            if max < 1 {
                return Err(SassError::runtime(format!("{limit} must be greater than 0."), span.clone()));
            }
            let n = 1 + (unit * max as f64) as i64 % max;
            Ok(Value::Number(SassNumber::new(n as f64)))
        }
        None => Ok(Value::Number(SassNumber::new(unit))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceFile;
    use std::sync::Arc;

    fn span() -> Span {
        let source = Arc::new(SourceFile::new(url::Url::parse("file:///t.scss").unwrap(), ""));
        Span::new(source, 0, 0)
    }

    #[test]
    fn clamp_keeps_value_in_range() {
        let result = call("clamp", vec![
            Value::Number(SassNumber::new(0.0)),
            Value::Number(SassNumber::new(15.0)),
            Value::Number(SassNumber::new(10.0)),
        ], HashMap::new(), &span()).unwrap().unwrap();
        assert_eq!(result, Value::Number(SassNumber::new(10.0)));
    }

    #[test]
    fn percentage_converts_unitless_ratio() {
        let result = call("percentage", vec![Value::Number(SassNumber::new(0.5))], HashMap::new(), &span())
            .unwrap()
            .unwrap();
        assert_eq!(result, Value::Number(SassNumber::with_unit(50.0, "%")));
    }

    #[test]
    fn unknown_name_falls_through() {
        assert!(call("frobnicate", vec![], HashMap::new(), &span()).is_none());
    }
}
