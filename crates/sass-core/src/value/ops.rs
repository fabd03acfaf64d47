//! The binary and unary operator matrix over [`Value`].
//!
//! What in a dynamically-typed interpreter would be virtual-dispatch
//! operator overloads becomes one explicit match per operator here; cross
//! type behavior (e.g. `"a" + 1 == "a1"`) is spelled out rather than
//! inferred from trait impls, since Sass's coercion rules don't line up
//! with Rust's `Add`/`Sub` semantics (string `+` is concatenation with
//! quotedness inherited from the left operand, number `+` requires
//! compatible units, and so on).

use crate::error::{SassError, Span};

use super::number::SassNumber;
use super::{SassString, Value};

/// `+`, `-`, `*`, `/`, `%`, `==`, `!=`, `<`, `<=`, `>`, `>=` as written in a
/// binary expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

/// Evaluate a binary operator over two already-evaluated values.
///
/// `slash_context` is true when a `/` appeared between two numeric
/// literals in a position where Sass treats it as potential
/// slash-separation rather than division (see the module notes on
/// `as_slash`); the caller resolves that ambiguity before calling in, so
/// by the time this function runs `/` always means division.
pub fn apply_binary(op: BinaryOp, left: &Value, right: &Value, span: &Span) -> Result<Value, SassError> {
    match op {
        BinaryOp::Eq => return Ok(Value::Boolean(left == right)),
        BinaryOp::Neq => return Ok(Value::Boolean(left != right)),
        _ => {}
    }

    match op {
        BinaryOp::Add => add(left, right, span),
        BinaryOp::Sub => sub(left, right, span),
        BinaryOp::Mul => numeric_op(left, right, span, "multiplied", |a, b| mul_units(a, b)),
        BinaryOp::Div => numeric_op(left, right, span, "divided", |a, b| div_units(a, b)),
        BinaryOp::Rem => numeric_op(left, right, span, "modulo'd", |a, b| rem_units(a, b)),
        BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => compare(op, left, right, span),
        BinaryOp::Eq | BinaryOp::Neq => unreachable!("handled above"),
    }
}

fn add(left: &Value, right: &Value, span: &Span) -> Result<Value, SassError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(add_units(a, b, span)?)),
        (Value::String(a), other) => Ok(Value::String(SassString {
            text: format!("{a_text}{other}", a_text = a.text),
            quoted: a.quoted,
        })),
        (Value::Color(_), _) | (_, Value::Color(_)) => Err(undefined_operation(left, "+", right, span)),
        (a, b) => Ok(Value::String(SassString {
            text: format!("{a}{b}"),
            quoted: false,
        })),
    }
}

fn sub(left: &Value, right: &Value, span: &Span) -> Result<Value, SassError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(sub_units(a, b, span)?)),
        (a, b) => Ok(Value::unquoted_string(format!("{a}-{b}"))),
    }
}

fn numeric_op(
    left: &Value,
    right: &Value,
    span: &Span,
    verb: &str,
    f: impl FnOnce(&SassNumber, &SassNumber) -> Result<SassNumber, String>,
) -> Result<Value, SassError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            f(a, b).map(Value::Number).map_err(|msg| SassError::runtime(msg, span.clone()))
        }
        _ => Err(SassError::runtime(
            format!("{left} and {right} can't be {verb}."),
            span.clone(),
        )),
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value, span: &Span) -> Result<Value, SassError> {
    let (Value::Number(a), Value::Number(b)) = (left, right) else {
        return Err(undefined_operation(left, op_symbol(op), right, span));
    };
    if !a.compatible_with(b) {
        return Err(SassError::runtime(
            format!("Incompatible units {} and {}.", b.unit_string(), a.unit_string()),
            span.clone(),
        ));
    }
    let bv = b.convert_value_to_units(a.numerator_units(), a.denominator_units()).unwrap_or(b.value());
    let cmp = a.value().partial_cmp(&bv).unwrap_or(std::cmp::Ordering::Equal);
    let result = match op {
        BinaryOp::Lt => cmp.is_lt(),
        BinaryOp::Lte => cmp.is_le(),
        BinaryOp::Gt => cmp.is_gt(),
        BinaryOp::Gte => cmp.is_ge(),
        _ => unreachable!(),
    };
    Ok(Value::Boolean(result))
}

fn op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Rem => "%",
        BinaryOp::Eq => "==",
        BinaryOp::Neq => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Lte => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Gte => ">=",
    }
}

fn undefined_operation(left: &Value, op: &str, right: &Value, span: &Span) -> SassError {
    SassError::runtime(
        format!("Undefined operation \"{left} {op} {right}\"."),
        span.clone(),
    )
}

fn add_units(a: &SassNumber, b: &SassNumber, span: &Span) -> Result<SassNumber, SassError> {
    require_compatible(a, b, span)?;
    let bv = convert_or_self(a, b);
    Ok(SassNumber::with_units(
        a.value() + bv,
        a.numerator_units().to_vec(),
        a.denominator_units().to_vec(),
    ))
}

fn sub_units(a: &SassNumber, b: &SassNumber, span: &Span) -> Result<SassNumber, SassError> {
    require_compatible(a, b, span)?;
    let bv = convert_or_self(a, b);
    Ok(SassNumber::with_units(
        a.value() - bv,
        a.numerator_units().to_vec(),
        a.denominator_units().to_vec(),
    ))
}

fn require_compatible(a: &SassNumber, b: &SassNumber, span: &Span) -> Result<(), SassError> {
    if a.compatible_with(b) {
        Ok(())
    } else {
        Err(SassError::runtime(format!("Incompatible units {} and {}.", b.unit_string(), a.unit_string()), span.clone()))
    }
}

fn convert_or_self(target: &SassNumber, b: &SassNumber) -> f64 {
    b.convert_value_to_units(target.numerator_units(), target.denominator_units())
        .unwrap_or_else(|| b.value())
}

fn mul_units(a: &SassNumber, b: &SassNumber) -> Result<SassNumber, String> {
    let mut numerator = a.numerator_units().to_vec();
    numerator.extend(b.numerator_units().to_vec());
    let mut denominator = a.denominator_units().to_vec();
    denominator.extend(b.denominator_units().to_vec());
    let (numerator, denominator) = cancel_units(numerator, denominator);
    Ok(SassNumber::with_units(a.value() * b.value(), numerator, denominator))
}

fn div_units(a: &SassNumber, b: &SassNumber) -> Result<SassNumber, String> {
    let mut numerator = a.numerator_units().to_vec();
    numerator.extend(b.denominator_units().to_vec());
    let mut denominator = a.denominator_units().to_vec();
    denominator.extend(b.numerator_units().to_vec());
    let (numerator, denominator) = cancel_units(numerator, denominator);
    Ok(SassNumber::with_units(a.value() / b.value(), numerator, denominator))
}

fn rem_units(a: &SassNumber, b: &SassNumber) -> Result<SassNumber, String> {
    if !a.compatible_with(b) {
        return Err(format!("Incompatible units {} and {}.", b.unit_string(), a.unit_string()));
    }
    let bv = convert_or_self(a, b);
    Ok(SassNumber::with_units(
        a.value() % bv,
        a.numerator_units().to_vec(),
        a.denominator_units().to_vec(),
    ))
}

/// Cancel identical numerator/denominator units (e.g. `px*s / s` -> `px`).
fn cancel_units(mut numerator: Vec<String>, mut denominator: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut i = 0;
    while i < numerator.len() {
        if let Some(j) = denominator
            .iter()
            .position(|u| u.eq_ignore_ascii_case(&numerator[i]))
        {
            numerator.remove(i);
            denominator.remove(j);
        } else {
            i += 1;
        }
    }
    (numerator, denominator)
}

/// Unary `-`/`not` over an already-evaluated value.
pub fn apply_unary_minus(value: &Value, span: &Span) -> Result<Value, SassError> {
    match value {
        Value::Number(n) => Ok(Value::Number(SassNumber::with_units(
            -n.value(),
            n.numerator_units().to_vec(),
            n.denominator_units().to_vec(),
        ))),
        other => Ok(Value::unquoted_string(format!("-{other}"))),
    }
}

#[must_use]
pub fn apply_not(value: &Value) -> Value {
    Value::Boolean(!value.is_truthy())
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
    fn adds_numbers_with_compatible_units() {
        let a = Value::Number(SassNumber::new(1.0));
        let b = Value::Number(SassNumber::new(2.0));
        let result = apply_binary(BinaryOp::Add, &a, &b, &span()).unwrap();
        assert_eq!(result, Value::Number(SassNumber::new(3.0)));
    }

    #[test]
    fn incompatible_unit_addition_errors() {
        let a = Value::Number(SassNumber::with_unit(1.0, "px"));
        let b = Value::Number(SassNumber::with_unit(1.0, "deg"));
        assert!(apply_binary(BinaryOp::Add, &a, &b, &span()).is_err());
    }

    #[test]
    fn string_concatenation_inherits_left_quotedness() {
        let a = Value::quoted_string("hello ");
        let b = Value::unquoted_string("world");
        let result = apply_binary(BinaryOp::Add, &a, &b, &span()).unwrap();
        assert_eq!(result, Value::quoted_string("hello world"));
    }

    #[test]
    fn division_cancels_matching_units() {
        let a = Value::Number(SassNumber::with_unit(10.0, "px"));
        let b = Value::Number(SassNumber::with_unit(2.0, "px"));
        let result = apply_binary(BinaryOp::Div, &a, &b, &span()).unwrap();
        assert_eq!(result, Value::Number(SassNumber::new(5.0)));
    }

    #[test]
    fn equality_never_raises_across_types() {
        let a = Value::Number(SassNumber::new(1.0));
        let b = Value::Boolean(true);
        assert_eq!(apply_binary(BinaryOp::Eq, &a, &b, &span()).unwrap(), Value::Boolean(false));
    }
}
