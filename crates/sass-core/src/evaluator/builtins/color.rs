//! `sass:color` — channel accessors and transformations over [`SassColor`],
//! plus the legacy `lighten()`/`darken()`/... global names (§4.4).

use std::collections::HashMap;

use crate::error::{SassError, SassResult, Span};
use crate::value::{ColorFormat, SassColor, Value};

use super::{expect_color, expect_number, ArgReader};

pub(super) fn call(name: &str, positional: Vec<Value>, named: HashMap<String, Value>, span: &Span) -> Option<SassResult<Value>> {
    let mut args = ArgReader::new(positional, named);
    let result = match name {
        "rgb" | "rgba" => rgb(&mut args, span),
        "hsl" | "hsla" => hsl(&mut args, span),
        "red" => channel(&mut args, span, |c| f64::from(c.red())),
        "green" => channel(&mut args, span, |c| f64::from(c.green())),
        "blue" => channel(&mut args, span, |c| f64::from(c.blue())),
        "alpha" | "opacity" => channel(&mut args, span, SassColor::alpha),
        "hue" => channel(&mut args, span, SassColor::hue),
        "saturation" => channel(&mut args, span, SassColor::saturation),
        "lightness" => channel(&mut args, span, SassColor::lightness),
        "mix" => mix(&mut args, span),
        "invert" => invert(&mut args, span),
        "grayscale" => grayscale(&mut args, span),
        "complement" => complement(&mut args, span),
        "lighten" => adjust_lightness(&mut args, span, 1.0),
        "darken" => adjust_lightness(&mut args, span, -1.0),
        "saturate" => adjust_saturation(&mut args, span, 1.0),
        "desaturate" => adjust_saturation(&mut args, span, -1.0),
        "adjust-hue" => adjust_hue(&mut args, span),
        "opacify" | "fade-in" => adjust_alpha(&mut args, span, 1.0),
        "transparentize" | "fade-out" => adjust_alpha(&mut args, span, -1.0),
        "adjust" | "adjust-color" => adjust(&mut args, span),
        "scale" | "scale-color" => scale(&mut args, span),
        "change" | "change-color" => change(&mut args, span),
        "ie-hex-str" => ie_hex_str(&mut args, span),
        _ => return None,
    };
    Some(result)
}

fn rgb(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let r = args.required("red", span)?;
    let g = args.required("green", span)?;
    let b = args.required("blue", span)?;
    let alpha = args.optional("alpha", Value::Number(crate::value::SassNumber::new(1.0)));
    let r = expect_number(&r, span)?.value();
    let g = expect_number(&g, span)?.value();
    let b = expect_number(&b, span)?.value();
    let alpha = channel_to_unit(expect_number(&alpha, span)?);
    Ok(Value::Color(SassColor::from_rgba(r, g, b, alpha).with_format(ColorFormat::Rgb)))
}

fn hsl(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let h = args.required("hue", span)?;
    let s = args.required("saturation", span)?;
    let l = args.required("lightness", span)?;
    let alpha = args.optional("alpha", Value::Number(crate::value::SassNumber::new(1.0)));
    let h = expect_number(&h, span)?.value();
    let s = expect_number(&s, span)?.value();
    let l = expect_number(&l, span)?.value();
    let alpha = channel_to_unit(expect_number(&alpha, span)?);
    Ok(Value::Color(SassColor::from_hsla(h, s, l, alpha).with_format(ColorFormat::Hsl)))
}

/// Alpha may be written unitless (`0.5`) or as a percentage (`50%`); both
/// resolve to the same `0.0..=1.0` channel.
fn channel_to_unit(n: &crate::value::SassNumber) -> f64 {
    if n.has_unit("%") {
        n.value() / 100.0
    } else {
        n.value()
    }
}

fn channel(args: &mut ArgReader, span: &Span, f: impl FnOnce(&SassColor) -> f64) -> SassResult<Value> {
    let c = args.required("color", span)?;
    let c = expect_color(&c, span)?;
    Ok(Value::Number(crate::value::SassNumber::new(f(c))))
}

fn mix(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let a = args.required("color1", span)?;
    let b = args.required("color2", span)?;
    let weight = args.optional("weight", Value::Number(crate::value::SassNumber::new(50.0)));
    let a = expect_color(&a, span)?;
    let b = expect_color(&b, span)?;
    let weight = expect_number(&weight, span)?.value();
    Ok(Value::Color(a.mix(b, weight)))
}

fn invert(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let c = args.required("color", span)?;
    let weight = args.optional("weight", Value::Number(crate::value::SassNumber::new(100.0)));
    let c = expect_color(&c, span)?;
    let weight = expect_number(&weight, span)?.value();
    Ok(Value::Color(c.mix(&c.invert(), weight)))
}

fn grayscale(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let c = args.required("color", span)?;
    Ok(Value::Color(expect_color(&c, span)?.grayscale()))
}

fn complement(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let c = args.required("color", span)?;
    Ok(Value::Color(expect_color(&c, span)?.complement()))
}

fn adjust_lightness(args: &mut ArgReader, span: &Span, sign: f64) -> SassResult<Value> {
    let c = args.required("color", span)?;
    let amount = args.required("amount", span)?;
    let c = expect_color(&c, span)?;
    let amount = expect_number(&amount, span)?.value();
    let l = (c.lightness() + sign * amount).clamp(0.0, 100.0);
    Ok(Value::Color(c.with_hsl(None, None, Some(l))))
}

fn adjust_saturation(args: &mut ArgReader, span: &Span, sign: f64) -> SassResult<Value> {
    let c = args.required("color", span)?;
    let amount = args.required("amount", span)?;
    let c = expect_color(&c, span)?;
    let amount = expect_number(&amount, span)?.value();
    let s = (c.saturation() + sign * amount).clamp(0.0, 100.0);
    Ok(Value::Color(c.with_hsl(None, Some(s), None)))
}

fn adjust_hue(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let c = args.required("color", span)?;
    let degrees = args.required("degrees", span)?;
    let c = expect_color(&c, span)?;
    let degrees = expect_number(&degrees, span)?.value();
    Ok(Value::Color(c.with_hsl(Some(c.hue() + degrees), None, None)))
}

fn adjust_alpha(args: &mut ArgReader, span: &Span, sign: f64) -> SassResult<Value> {
    let c = args.required("color", span)?;
    let amount = args.required("amount", span)?;
    let c = expect_color(&c, span)?;
    let amount = channel_to_unit(expect_number(&amount, span)?);
    Ok(Value::Color(c.with_alpha((c.alpha() + sign * amount).clamp(0.0, 1.0))))
}

/// `adjust-color($color, $red: ..., $green: ..., ...)`: add a delta to each
/// named channel that was supplied.
fn adjust(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let c = args.required("color", span)?;
    let mut c = *expect_color(&c, span)?;
    if let Some(v) = args.optional_opt("red") {
        c = c.with_rgb(f64::from(c.red()) + expect_number(&v, span)?.value(), f64::from(c.green()), f64::from(c.blue()));
    }
    if let Some(v) = args.optional_opt("green") {
        c = c.with_rgb(f64::from(c.red()), f64::from(c.green()) + expect_number(&v, span)?.value(), f64::from(c.blue()));
    }
    if let Some(v) = args.optional_opt("blue") {
        c = c.with_rgb(f64::from(c.red()), f64::from(c.green()), f64::from(c.blue()) + expect_number(&v, span)?.value());
    }
    let hue_delta = args.optional_opt("hue").map(|v| expect_number(&v, span).map(|n| n.value())).transpose()?;
    let sat_delta = args.optional_opt("saturation").map(|v| expect_number(&v, span).map(|n| n.value())).transpose()?;
    let light_delta = args.optional_opt("lightness").map(|v| expect_number(&v, span).map(|n| n.value())).transpose()?;
    if hue_delta.is_some() || sat_delta.is_some() || light_delta.is_some() {
        c = c.with_hsl(
            hue_delta.map(|d| c.hue() + d),
            sat_delta.map(|d| (c.saturation() + d).clamp(0.0, 100.0)),
            light_delta.map(|d| (c.lightness() + d).clamp(0.0, 100.0)),
        );
    }
    if let Some(v) = args.optional_opt("alpha") {
        c = c.with_alpha((c.alpha() + channel_to_unit(expect_number(&v, span)?)).clamp(0.0, 1.0));
    }
    Ok(Value::Color(c))
}

/// `scale-color($color, $lightness: 10%, ...)`: each named channel is
/// scaled proportionally toward its maximum (positive) or minimum
/// (negative) by the given percentage.
fn scale(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let c = args.required("color", span)?;
    let mut c = *expect_color(&c, span)?;
    let scale_toward = |current: f64, max: f64, pct: f64| -> f64 {
        let pct = pct.clamp(-100.0, 100.0) / 100.0;
        if pct >= 0.0 {
            current + (max - current) * pct
        } else {
            current + current * pct
        }
    };
    if let Some(v) = args.optional_opt("red") {
        let pct = expect_number(&v, span)?.value();
        c = c.with_rgb(scale_toward(f64::from(c.red()), 255.0, pct), f64::from(c.green()), f64::from(c.blue()));
    }
    if let Some(v) = args.optional_opt("green") {
        let pct = expect_number(&v, span)?.value();
        c = c.with_rgb(f64::from(c.red()), scale_toward(f64::from(c.green()), 255.0, pct), f64::from(c.blue()));
    }
    if let Some(v) = args.optional_opt("blue") {
        let pct = expect_number(&v, span)?.value();
        c = c.with_rgb(f64::from(c.red()), f64::from(c.green()), scale_toward(f64::from(c.blue()), 255.0, pct));
    }
    if let Some(v) = args.optional_opt("saturation") {
        let pct = expect_number(&v, span)?.value();
        let s = scale_toward(c.saturation(), 100.0, pct);
        c = c.with_hsl(None, Some(s), None);
    }
    if let Some(v) = args.optional_opt("lightness") {
        let pct = expect_number(&v, span)?.value();
        let l = scale_toward(c.lightness(), 100.0, pct);
        c = c.with_hsl(None, None, Some(l));
    }
    if let Some(v) = args.optional_opt("alpha") {
        let pct = expect_number(&v, span)?.value();
        let alpha = scale_toward(c.alpha() * 100.0, 100.0, pct) / 100.0;
        c = c.with_alpha(alpha);
    }
    Ok(Value::Color(c))
}

/// `change-color($color, $red: ..., ...)`: overwrite named channels
/// outright rather than adjusting or scaling them.
fn change(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let c = args.required("color", span)?;
    let mut c = *expect_color(&c, span)?;
    let red = args.optional_opt("red").map(|v| expect_number(&v, span).map(|n| n.value())).transpose()?;
    let green = args.optional_opt("green").map(|v| expect_number(&v, span).map(|n| n.value())).transpose()?;
    let blue = args.optional_opt("blue").map(|v| expect_number(&v, span).map(|n| n.value())).transpose()?;
    if red.is_some() || green.is_some() || blue.is_some() {
        c = c.with_rgb(
            red.unwrap_or(f64::from(c.red())),
            green.unwrap_or(f64::from(c.green())),
            blue.unwrap_or(f64::from(c.blue())),
        );
    }
    let hue = args.optional_opt("hue").map(|v| expect_number(&v, span).map(|n| n.value())).transpose()?;
    let saturation = args.optional_opt("saturation").map(|v| expect_number(&v, span).map(|n| n.value())).transpose()?;
    let lightness = args.optional_opt("lightness").map(|v| expect_number(&v, span).map(|n| n.value())).transpose()?;
    if hue.is_some() || saturation.is_some() || lightness.is_some() {
        c = c.with_hsl(hue, saturation, lightness);
    }
    if let Some(v) = args.optional_opt("alpha") {
        c = c.with_alpha(channel_to_unit(expect_number(&v, span)?));
    }
    Ok(Value::Color(c))
}

fn ie_hex_str(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let c = args.required("color", span)?;
    let c = expect_color(&c, span)?;
    let alpha = (c.alpha() * 255.0).round() as u8;
    Ok(Value::unquoted_string(format!("#{alpha:02X}{:02X}{:02X}{:02X}", c.red(), c.green(), c.blue())))
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
    fn lighten_raises_lightness() {
        let red = Value::Color(SassColor::from_rgba(255.0, 0.0, 0.0, 1.0));
        let result = call("lighten", vec![red, Value::Number(crate::value::SassNumber::new(10.0))], HashMap::new(), &span())
            .unwrap()
            .unwrap();
        let Value::Color(c) = result else { panic!("expected color") };
        assert!(c.lightness() > 50.0);
    }

    #[test]
    fn rgb_builds_opaque_color_by_default() {
        let result = call(
            "rgb",
            vec![
                Value::Number(crate::value::SassNumber::new(10.0)),
                Value::Number(crate::value::SassNumber::new(20.0)),
                Value::Number(crate::value::SassNumber::new(30.0)),
            ],
            HashMap::new(),
            &span(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(result, Value::Color(SassColor::from_rgba(10.0, 20.0, 30.0, 1.0)));
    }
}
