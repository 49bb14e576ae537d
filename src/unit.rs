//! `Dimension.Unit` and the length/angle/duration/frequency/resolution
//! conversion tables referenced, but not enumerated, by spec §4.3.

use std::fmt;

/// A canonical unit: numerators and denominators kept sorted so that
/// `Unit` equality is structural (spec §3 invariant 2), with cancellation
/// applied whenever a numerator and denominator are dimensionally
/// compatible (`px/px` -> unitless).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Unit {
    numerators: Vec<String>,
    denominators: Vec<String>,
}

impl Unit {
    pub fn unitless() -> Self {
        Unit::default()
    }

    pub fn single(unit: impl Into<String>) -> Self {
        Unit {
            numerators: vec![unit.into()],
            denominators: Vec::new(),
        }
    }

    pub fn is_unitless(&self) -> bool {
        self.numerators.is_empty() && self.denominators.is_empty()
    }

    pub fn numerators(&self) -> &[String] {
        &self.numerators
    }

    pub fn denominators(&self) -> &[String] {
        &self.denominators
    }

    /// The single backup unit used when formatting a dimension whose unit
    /// algebra produced more than one numerator (spec `Unit.backupUnit`).
    pub fn backup_unit(&self) -> Option<&str> {
        self.numerators.first().map(String::as_str)
    }

    fn sort_and_cancel(mut num: Vec<String>, mut den: Vec<String>) -> Unit {
        num.sort();
        den.sort();
        let mut numerators = Vec::with_capacity(num.len());
        for n in num {
            if let Some(pos) = den.iter().position(|d| d.eq_ignore_ascii_case(&n)) {
                den.remove(pos);
            } else {
                numerators.push(n);
            }
        }
        Unit {
            numerators,
            denominators: den,
        }
    }

    pub fn multiply(&self, other: &Unit) -> Unit {
        let mut num = self.numerators.clone();
        num.extend(other.numerators.iter().cloned());
        let mut den = self.denominators.clone();
        den.extend(other.denominators.iter().cloned());
        Unit::sort_and_cancel(num, den)
    }

    pub fn divide(&self, other: &Unit) -> Unit {
        let mut num = self.numerators.clone();
        num.extend(other.denominators.iter().cloned());
        let mut den = self.denominators.clone();
        den.extend(other.numerators.iter().cloned());
        Unit::sort_and_cancel(num, den)
    }

    /// True if `self` and `other` describe the same physical quantity
    /// (same dimension family) so that `+`/`-` are legal between them.
    pub fn is_compatible_with(&self, other: &Unit) -> bool {
        if self == other {
            return true;
        }
        if self.numerators.len() != 1
            || other.numerators.len() != 1
            || !self.denominators.is_empty()
            || !other.denominators.is_empty()
        {
            return self.is_unitless() && other.is_unitless();
        }
        let a = self.numerators[0].to_ascii_lowercase();
        let b = other.numerators[0].to_ascii_lowercase();
        family_of(&a).is_some() && family_of(&a) == family_of(&b)
    }

    /// Conversion factor that turns a value expressed in `self` into the
    /// equivalent value expressed in `other`, when both are single-unit and
    /// in the same family. `None` if they're incompatible or compound.
    pub fn conversion_factor(&self, other: &Unit) -> Option<f64> {
        if self == other {
            return Some(1.0);
        }
        if self.numerators.len() != 1 || other.numerators.len() != 1 {
            return None;
        }
        let a = self.numerators[0].to_ascii_lowercase();
        let b = other.numerators[0].to_ascii_lowercase();
        let fa = canonical_factor(&a)?;
        let fb = canonical_factor(&b)?;
        if family_of(&a) != family_of(&b) {
            return None;
        }
        Some(fa / fb)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.numerators.is_empty() && self.denominators.is_empty() {
            return Ok(());
        }
        write!(f, "{}", self.numerators.join("*"))?;
        if !self.denominators.is_empty() {
            write!(f, "/{}", self.denominators.join("/"))?;
        }
        Ok(())
    }
}

/// Which physical quantity a unit measures, for compatibility and
/// conversion purposes. Units outside these families (e.g. `px`, `%`,
/// `fr`) are only ever compatible with themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Length,
    Angle,
    Duration,
    Frequency,
    Resolution,
}

fn family_of(unit: &str) -> Option<Family> {
    match unit {
        "cm" | "mm" | "q" | "in" | "pt" | "pc" | "px" => Some(Family::Length),
        "deg" | "grad" | "rad" | "turn" => Some(Family::Angle),
        "s" | "ms" => Some(Family::Duration),
        "hz" | "khz" => Some(Family::Frequency),
        "dpi" | "dpcm" | "dppx" => Some(Family::Resolution),
        _ => None,
    }
}

/// Factor that converts a value in `unit` into a family-canonical base unit
/// (`px` for length, `rad` for angle, `s` for duration, `hz` for frequency,
/// `dppx` for resolution).
fn canonical_factor(unit: &str) -> Option<f64> {
    Some(match unit {
        // Length, canonicalized to px at 96dpi, matching the reference's
        // CSS absolute-length ratios.
        "px" => 1.0,
        "cm" => 96.0 / 2.54,
        "mm" => 96.0 / 25.4,
        "q" => 96.0 / 101.6,
        "in" => 96.0,
        "pt" => 96.0 / 72.0,
        "pc" => 16.0,
        // Angle, canonicalized to radians.
        "rad" => 1.0,
        "deg" => std::f64::consts::PI / 180.0,
        "grad" => std::f64::consts::PI / 200.0,
        "turn" => std::f64::consts::TAU,
        // Duration, canonicalized to seconds.
        "s" => 1.0,
        "ms" => 0.001,
        // Frequency, canonicalized to Hz.
        "hz" => 1.0,
        "khz" => 1000.0,
        // Resolution, canonicalized to dppx.
        "dppx" => 1.0,
        "dpi" => 1.0 / 96.0,
        "dpcm" => 2.54 / 96.0,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancels_matching_numerator_and_denominator() {
        let px = Unit::single("px");
        let unitless = px.divide(&px);
        assert!(unitless.is_unitless());
    }

    #[test]
    fn px_and_cm_are_compatible() {
        assert!(Unit::single("px").is_compatible_with(&Unit::single("cm")));
    }

    #[test]
    fn px_and_deg_are_not_compatible() {
        assert!(!Unit::single("px").is_compatible_with(&Unit::single("deg")));
    }

    #[test]
    fn numerators_and_denominators_sort_for_structural_equality() {
        let a = Unit::single("px").multiply(&Unit::single("em"));
        let b = Unit::single("em").multiply(&Unit::single("px"));
        assert_eq!(a, b);
    }
}
