//! `Color` (spec §3): RGB components plus alpha, carrying the source literal
//! text so re-emission can stay faithful when nothing has changed it.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    /// Float during math (spec §3 invariant 3 only binds at emission time);
    /// clamped to `[0, 255]` in `to_css_string`.
    r: f64,
    g: f64,
    b: f64,
    alpha: f64,
    /// Original literal (`"red"`, `"#fff"`), kept so a color that passes
    /// through untouched re-emits exactly as written.
    source_text: Option<String>,
}

impl Color {
    pub fn rgba(r: f64, g: f64, b: f64, alpha: f64) -> Self {
        Color {
            r,
            g,
            b,
            alpha,
            source_text: None,
        }
    }

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color::rgba(r, g, b, 1.0)
    }

    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.source_text = Some(text.into());
        self
    }

    pub fn r(&self) -> f64 {
        self.r
    }
    pub fn g(&self) -> f64 {
        self.g
    }
    pub fn b(&self) -> f64 {
        self.b
    }
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn clamped(&self) -> Color {
        Color {
            r: self.r.round().clamp(0.0, 255.0),
            g: self.g.round().clamp(0.0, 255.0),
            b: self.b.round().clamp(0.0, 255.0),
            alpha: self.alpha.clamp(0.0, 1.0),
            source_text: None,
        }
    }

    pub fn from_hex(hex: &str) -> Option<Color> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let expand = |c: char| -> Option<u8> { u8::from_str_radix(&c.to_string(), 16).ok() };
        let (r, g, b, a) = match hex.len() {
            3 => {
                let mut it = hex.chars();
                let r = expand(it.next()?)? * 17;
                let g = expand(it.next()?)? * 17;
                let b = expand(it.next()?)? * 17;
                (r, g, b, 255)
            }
            4 => {
                let mut it = hex.chars();
                let r = expand(it.next()?)? * 17;
                let g = expand(it.next()?)? * 17;
                let b = expand(it.next()?)? * 17;
                let a = expand(it.next()?)? * 17;
                (r, g, b, a)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                (r, g, b, 255)
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                (r, g, b, a)
            }
            _ => return None,
        };
        Some(Color::rgba(r as f64, g as f64, b as f64, a as f64 / 255.0).with_source_text(format!("#{hex}")))
    }

    pub fn from_name(name: &str) -> Option<Color> {
        let (r, g, b) = named_color(name.to_ascii_lowercase().as_str())?;
        Some(Color::rgb(r as f64, g as f64, b as f64).with_source_text(name.to_owned()))
    }

    pub fn from_hsl(h: f64, s: f64, l: f64, alpha: f64) -> Color {
        let h = ((h % 360.0) + 360.0) % 360.0 / 360.0;
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        if s == 0.0 {
            let v = l * 255.0;
            return Color::rgba(v, v, v, alpha);
        }
        let q = if l < 0.5 {
            l * (1.0 + s)
        } else {
            l + s - l * s
        };
        let p = 2.0 * l - q;
        let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
        let g = hue_to_rgb(p, q, h);
        let b = hue_to_rgb(p, q, h - 1.0 / 3.0);
        Color::rgba(r * 255.0, g * 255.0, b * 255.0, alpha)
    }

    /// Returns `(h, s, l)` with `h` in degrees, `s`/`l` in `[0, 1]`.
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let r = self.r / 255.0;
        let g = self.g / 255.0;
        let b = self.b / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if (max - min).abs() < f64::EPSILON {
            return (0.0, 0.0, l);
        }
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if (max - r).abs() < f64::EPSILON {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if (max - g).abs() < f64::EPSILON {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h * 60.0, s, l)
    }

    /// Shortest valid CSS serialization: `#rgb` when every nybble
    /// duplicates, else `#rrggbb`, else `rgba(...)` when alpha != 1. A
    /// color that still carries its original literal text (never passed
    /// through a color function, which always constructs a fresh
    /// source-text-less `Color`) re-emits that text verbatim instead —
    /// this is what keeps `color: red` from becoming `color: #f00`.
    pub fn to_css_string(&self) -> String {
        if let Some(text) = &self.source_text {
            return text.clone();
        }
        let c = self.clamped();
        let (r, g, b) = (c.r as u8, c.g as u8, c.b as u8);
        if (c.alpha - 1.0).abs() > f64::EPSILON {
            return format!(
                "rgba({}, {}, {}, {})",
                r,
                g,
                b,
                format_alpha(c.alpha)
            );
        }
        let short = |v: u8| (v >> 4) == (v & 0xf);
        if short(r) && short(g) && short(b) {
            format!("#{:x}{:x}{:x}", r & 0xf, g & 0xf, b & 0xf)
        } else {
            format!("#{r:02x}{g:02x}{b:02x}")
        }
    }
}

fn format_alpha(alpha: f64) -> String {
    let rounded = (alpha * 1000.0).round() / 1000.0;
    if (rounded - rounded.trunc()).abs() < f64::EPSILON {
        format!("{}", rounded.trunc() as i64)
    } else {
        let s = format!("{rounded}");
        s.trim_end_matches('0').trim_end_matches('.').to_owned()
    }
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let mut t = t;
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_string())
    }
}

/// A small slice of CSS named colors; enough for the common case without
/// vendoring the full 148-entry keyword table.
fn named_color(name: &str) -> Option<(u8, u8, u8)> {
    Some(match name {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "maroon" => (128, 0, 0),
        "purple" => (128, 0, 128),
        "fuchsia" | "magenta" => (255, 0, 255),
        "lime" => (0, 255, 0),
        "olive" => (128, 128, 0),
        "navy" => (0, 0, 128),
        "teal" => (0, 128, 128),
        "aqua" | "cyan" => (0, 255, 255),
        "orange" => (255, 165, 0),
        "pink" => (255, 192, 203),
        "brown" => (165, 42, 42),
        "transparent" => return None,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortens_duplicated_nybbles() {
        assert_eq!(Color::rgb(255.0, 255.0, 255.0).to_css_string(), "#fff");
    }

    #[test]
    fn uses_long_form_when_nybbles_differ() {
        assert_eq!(Color::rgb(18.0, 52.0, 86.0).to_css_string(), "#123456");
    }

    #[test]
    fn alpha_below_one_forces_rgba() {
        assert_eq!(
            Color::rgba(255.0, 0.0, 0.0, 0.5).to_css_string(),
            "rgba(255, 0, 0, 0.5)"
        );
    }

    #[test]
    fn named_color_reemits_its_own_name() {
        assert_eq!(Color::from_name("red").unwrap().to_css_string(), "red");
        assert_eq!(Color::from_name("Maroon").unwrap().to_css_string(), "Maroon");
    }

    #[test]
    fn lightened_named_color_no_longer_preserves_the_name() {
        let red = Color::from_name("red").unwrap();
        let mixed = Color::rgba(red.r(), red.g(), red.b(), red.alpha());
        assert_eq!(mixed.to_css_string(), "#f00");
    }

    #[test]
    fn hex_roundtrips_through_hsl() {
        let c = Color::from_hex("#336699").unwrap();
        let (h, s, l) = c.to_hsl();
        let back = Color::from_hsl(h, s, l, 1.0);
        assert_eq!(back.to_css_string(), "#336699");
    }
}
