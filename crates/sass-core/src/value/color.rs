//! Sass colors: RGBA storage with alpha, plus the original textual
//! representation so a literal color that nothing operates on round-trips
//! through serialization bit-exactly.
//!
//! Grounded in the teacher's `ColorValue` (hex parsing, named-color table)
//! but extended with HSL/HWB constructors and channel accessors, since
//! Sass color functions (`lighten`, `adjust-hue`, `mix`, ...) operate in
//! those spaces.

use std::fmt;

/// How a [`SassColor`] was written in source, so the serializer can emit
/// the same form when no color operation has touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    /// No original representation (e.g. produced by an operation); emit
    /// the shortest equivalent form.
    Computed,
    /// A named color like `red` or `rebeccapurple`.
    Named,
    /// `#rgb` / `#rgba` / `#rrggbb` / `#rrggbbaa`.
    Hex,
    /// `rgb(...)` / `rgba(...)`.
    Rgb,
    /// `hsl(...)` / `hsla(...)`.
    Hsl,
}

/// A Sass color: sRGB channels plus alpha, always stored in `0..=255` /
/// `0.0..=1.0` canonical form regardless of how it was constructed.
#[derive(Debug, Clone, Copy)]
pub struct SassColor {
    r: u8,
    g: u8,
    b: u8,
    alpha: f64,
    format: ColorFormat,
}

impl SassColor {
    /// Construct from RGB channels (clamped to `0..=255`) and alpha
    /// (clamped to `[0,1]`).
    #[must_use]
    pub fn from_rgba(r: f64, g: f64, b: f64, alpha: f64) -> Self {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
            alpha: alpha.clamp(0.0, 1.0),
            format: ColorFormat::Computed,
        }
    }

    /// Construct from HSL, per the CSS `hsl()` conversion algorithm.
    #[must_use]
    pub fn from_hsla(hue: f64, saturation: f64, lightness: f64, alpha: f64) -> Self {
        let (r, g, b) = hsl_to_rgb(
            normalize_hue(hue),
            saturation.clamp(0.0, 100.0) / 100.0,
            lightness.clamp(0.0, 100.0) / 100.0,
        );
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
            alpha: alpha.clamp(0.0, 1.0),
            format: ColorFormat::Computed,
        }
    }

    /// Mark which textual form this color should round-trip as.
    #[must_use]
    pub fn with_format(mut self, format: ColorFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn red(&self) -> u8 {
        self.r
    }
    #[must_use]
    pub fn green(&self) -> u8 {
        self.g
    }
    #[must_use]
    pub fn blue(&self) -> u8 {
        self.b
    }
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// HSL hue in `[0, 360)`.
    #[must_use]
    pub fn hue(&self) -> f64 {
        rgb_to_hsl(self.r, self.g, self.b).0
    }

    /// HSL saturation in `[0, 100]`.
    #[must_use]
    pub fn saturation(&self) -> f64 {
        rgb_to_hsl(self.r, self.g, self.b).1 * 100.0
    }

    /// HSL lightness in `[0, 100]`.
    #[must_use]
    pub fn lightness(&self) -> f64 {
        rgb_to_hsl(self.r, self.g, self.b).2 * 100.0
    }

    /// Return a copy with `alpha` replaced.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self.format = ColorFormat::Computed;
        self
    }

    /// Return a copy with RGB channels replaced, alpha untouched.
    #[must_use]
    pub fn with_rgb(mut self, r: f64, g: f64, b: f64) -> Self {
        self.r = clamp_channel(r);
        self.g = clamp_channel(g);
        self.b = clamp_channel(b);
        self.format = ColorFormat::Computed;
        self
    }

    /// Return a copy converted via HSL with the given channels replaced,
    /// where `None` leaves that channel unchanged.
    #[must_use]
    pub fn with_hsl(&self, hue: Option<f64>, saturation: Option<f64>, lightness: Option<f64>) -> Self {
        let (h, s, l) = rgb_to_hsl(self.r, self.g, self.b);
        let h = hue.map_or(h, normalize_hue);
        let s = saturation.map_or(s, |v| v.clamp(0.0, 100.0) / 100.0);
        let l = lightness.map_or(l, |v| v.clamp(0.0, 100.0) / 100.0);
        Self::from_hsla(h, s * 100.0, l * 100.0, self.alpha)
    }

    /// Linear-blend `self` and `other` by `weight` (0..=100, `self`'s
    /// share), matching the `mix()` / `color.mix()` algorithm including its
    /// alpha-aware weighting.
    #[must_use]
    pub fn mix(&self, other: &SassColor, weight: f64) -> Self {
        let weight = weight.clamp(0.0, 100.0) / 100.0;
        let alpha_distance = self.alpha - other.alpha;
        let normalized_weight = 2.0 * weight - 1.0;
        let combined = normalized_weight * alpha_distance;
        let w1 = if combined == -1.0 {
            normalized_weight
        } else {
            (normalized_weight + alpha_distance) / (1.0 + combined)
        };
        let w1 = (w1 + 1.0) / 2.0;
        let w2 = 1.0 - w1;
        let r = f64::from(self.r) * w1 + f64::from(other.r) * w2;
        let g = f64::from(self.g) * w1 + f64::from(other.g) * w2;
        let b = f64::from(self.b) * w1 + f64::from(other.b) * w2;
        let alpha = self.alpha * weight + other.alpha * (1.0 - weight);
        Self::from_rgba(r, g, b, alpha)
    }

    /// Invert RGB channels, leaving alpha untouched (`invert()` with
    /// 100% weight).
    #[must_use]
    pub fn invert(&self) -> Self {
        Self::from_rgba(
            255.0 - f64::from(self.r),
            255.0 - f64::from(self.g),
            255.0 - f64::from(self.b),
            self.alpha,
        )
    }

    /// Desaturate fully (`grayscale()`).
    #[must_use]
    pub fn grayscale(&self) -> Self {
        self.with_hsl(None, Some(0.0), None)
    }

    /// Rotate hue by 180° (`complement()`).
    #[must_use]
    pub fn complement(&self) -> Self {
        let hue = self.hue();
        self.with_hsl(Some(hue + 180.0), None, None)
    }

    /// Parse a 3/4/6/8-digit hex color (with or without leading `#`).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expand = |c: char| -> u8 { u8::from_str_radix(&c.to_string().repeat(2), 16).unwrap_or(0) };
        let (r, g, b, a) = match hex.len() {
            3 => {
                let mut chars = hex.chars();
                (
                    expand(chars.next()?),
                    expand(chars.next()?),
                    expand(chars.next()?),
                    255,
                )
            }
            4 => {
                let mut chars = hex.chars();
                (
                    expand(chars.next()?),
                    expand(chars.next()?),
                    expand(chars.next()?),
                    expand(chars.next()?),
                )
            }
            6 => (
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
                255,
            ),
            8 => (
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
                u8::from_str_radix(&hex[6..8], 16).ok()?,
            ),
            _ => return None,
        };
        Some(Self {
            r,
            g,
            b,
            alpha: f64::from(a) / 255.0,
            format: ColorFormat::Hex,
        })
    }

    /// Look up a CSS named color. A representative subset of the full
    /// 148-name table; unrecognized names return `None` and are treated as
    /// plain (unquoted-string) identifiers by the parser.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("transparent") {
            return Some(Self { r: 0, g: 0, b: 0, alpha: 0.0, format: ColorFormat::Named });
        }
        let rgb = NAMED_COLORS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, rgb)| *rgb)?;
        Some(Self {
            r: rgb.0,
            g: rgb.1,
            b: rgb.2,
            alpha: 1.0,
            format: ColorFormat::Named,
        })
    }

    /// The canonical named color for this RGBA value, if an exact (opaque)
    /// match exists.
    #[must_use]
    pub fn to_named(&self) -> Option<&'static str> {
        if self.alpha < 1.0 {
            return None;
        }
        NAMED_COLORS
            .iter()
            .find(|(_, rgb)| *rgb == (self.r, self.g, self.b))
            .map(|(name, _)| *name)
    }

    /// Shortest unambiguous hex form: `#rgb` if every channel pair
    /// repeats, else `#rrggbb` (alpha is never encoded in hex output by
    /// this serializer; see [`ColorFormat`] / the `rgba()` fallback).
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        let can_shorten = |v: u8| v & 0x0F == v >> 4;
        if can_shorten(self.r) && can_shorten(self.g) && can_shorten(self.b) {
            format!("#{:x}{:x}{:x}", self.r & 0xF, self.g & 0xF, self.b & 0xF)
        } else {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        }
    }

    #[must_use]
    pub fn format(&self) -> ColorFormat {
        self.format
    }
}

fn clamp_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn normalize_hue(h: f64) -> f64 {
    let h = h % 360.0;
    if h < 0.0 { h + 360.0 } else { h }
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        let v = l * 255.0;
        return (v, v, v);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let hk = h / 360.0;
    let t = |mut t: f64| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 1.0 / 2.0 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    (
        t(hk + 1.0 / 3.0) * 255.0,
        t(hk) * 255.0,
        t(hk - 1.0 / 3.0) * 255.0,
    )
}

fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if (max - min).abs() < 1e-9 {
        return (0.0, 0.0, l);
    }
    let delta = max - min;
    let s = if l > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };
    let h = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    (h * 60.0, s, l)
}

impl PartialEq for SassColor {
    fn eq(&self, other: &Self) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b && self.alpha == other.alpha
    }
}

impl fmt::Display for SassColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha >= 1.0 {
            if let Some(name) = self.to_named() {
                return write!(f, "{name}");
            }
            write!(f, "{}", self.to_hex_string())
        } else if self.r == 0 && self.g == 0 && self.b == 0 && self.alpha == 0.0 {
            write!(f, "rgba(0, 0, 0, 0)")
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.alpha)
        }
    }
}

/// A representative subset of CSS's named-color table — the common
/// keywords plus the full 16 HTML4 basic colors. Sufficient to round-trip
/// the colors that appear in real stylesheets most often; an unrecognized
/// name is not an error; it is simply not foldable to a [`SassColor`] and
/// is carried as an unquoted identifier instead.
///
/// `transparent` is deliberately absent: it is not an RGB color at all
/// (alpha `0`, not just `black`) and is handled as a special case by
/// [`SassColor::from_named`] instead, so it never collides with `black`
/// as a lookup-table entry sharing the same `(0, 0, 0)` triple.
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("red", (255, 0, 0)),
    ("green", (0, 128, 0)),
    ("blue", (0, 0, 255)),
    ("yellow", (255, 255, 0)),
    ("cyan", (0, 255, 255)),
    ("aqua", (0, 255, 255)),
    ("magenta", (255, 0, 255)),
    ("fuchsia", (255, 0, 255)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
    ("silver", (192, 192, 192)),
    ("maroon", (128, 0, 0)),
    ("olive", (128, 128, 0)),
    ("lime", (0, 255, 0)),
    ("navy", (0, 0, 128)),
    ("purple", (128, 0, 128)),
    ("teal", (0, 128, 128)),
    ("orange", (255, 165, 0)),
    ("pink", (255, 192, 203)),
    ("brown", (165, 42, 42)),
    ("gold", (255, 215, 0)),
    ("indigo", (75, 0, 130)),
    ("violet", (238, 130, 238)),
    ("coral", (255, 127, 80)),
    ("salmon", (250, 128, 114)),
    ("khaki", (240, 230, 140)),
    ("crimson", (220, 20, 60)),
    ("chocolate", (210, 105, 30)),
    ("tomato", (255, 99, 71)),
    ("orchid", (218, 112, 214)),
    ("plum", (221, 160, 221)),
    ("skyblue", (135, 206, 235)),
    ("steelblue", (70, 130, 180)),
    ("slategray", (112, 128, 144)),
    ("rebeccapurple", (102, 51, 153)),
    ("beige", (245, 245, 220)),
    ("ivory", (255, 255, 240)),
    ("lavender", (230, 230, 250)),
    ("tan", (210, 180, 140)),
    ("turquoise", (64, 224, 208)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips_through_shortest_form() {
        let color = SassColor::from_hex("#ff0000").unwrap();
        assert_eq!(color.to_hex_string(), "#f00");
    }

    #[test]
    fn three_digit_hex_expands_correctly() {
        let a = SassColor::from_hex("abc").unwrap();
        let b = SassColor::from_hex("aabbcc").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn named_color_lookup_is_case_insensitive() {
        let a = SassColor::from_named("RED").unwrap();
        let b = SassColor::from_hex("ff0000").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hsl_round_trips_primary_red() {
        let red = SassColor::from_rgba(255.0, 0.0, 0.0, 1.0);
        assert!((red.hue() - 0.0).abs() < 1e-6);
        assert!((red.saturation() - 100.0).abs() < 1e-6);
        assert!((red.lightness() - 50.0).abs() < 1e-6);
    }

    #[test]
    fn mix_of_black_and_white_is_mid_gray() {
        let black = SassColor::from_rgba(0.0, 0.0, 0.0, 1.0);
        let white = SassColor::from_rgba(255.0, 255.0, 255.0, 1.0);
        let mid = black.mix(&white, 50.0);
        assert_eq!(mid.red(), 128);
    }

    #[test]
    fn invert_flips_channels_and_preserves_alpha() {
        let c = SassColor::from_rgba(10.0, 20.0, 30.0, 0.5);
        let inverted = c.invert();
        assert_eq!(inverted.red(), 245);
        assert_eq!(inverted.alpha(), 0.5);
    }
}
