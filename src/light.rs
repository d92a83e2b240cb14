use serde::{Deserialize, Serialize};

pub const LOW_LIGHT_MIN_LUX: f64 = 500.0;
pub const MEDIUM_LIGHT_MIN_LUX: f64 = 2_000.0;
pub const BRIGHT_LIGHT_MIN_LUX: f64 = 10_000.0;
pub const DIRECT_SUN_MIN_LUX: f64 = 20_000.0;

/// Ordinal light-level category for an illuminance reading
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LightLevel {
    VeryLow,
    Low,
    Medium,
    Bright,
    DirectSun,
    /// No reading was available
    Unknown,
}

impl LightLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightLevel::VeryLow => "very_low",
            LightLevel::Low => "low",
            LightLevel::Medium => "medium",
            LightLevel::Bright => "bright",
            LightLevel::DirectSun => "direct_sun",
            LightLevel::Unknown => "unknown",
        }
    }

    /// User-facing description
    pub fn label(&self) -> &'static str {
        match self {
            LightLevel::VeryLow => "very low light",
            LightLevel::Low => "low light",
            LightLevel::Medium => "medium light",
            LightLevel::Bright => "bright light",
            LightLevel::DirectSun => "direct sunlight",
            LightLevel::Unknown => "Unknown",
        }
    }

    /// Classify a known reading. Lower bounds are inclusive; negative values
    /// are not rejected and fall into `VeryLow`.
    pub fn from_lux(lux: f64) -> Self {
        if lux.is_nan() {
            LightLevel::Unknown
        } else if lux < LOW_LIGHT_MIN_LUX {
            LightLevel::VeryLow
        } else if lux < MEDIUM_LIGHT_MIN_LUX {
            LightLevel::Low
        } else if lux < BRIGHT_LIGHT_MIN_LUX {
            LightLevel::Medium
        } else if lux < DIRECT_SUN_MIN_LUX {
            LightLevel::Bright
        } else {
            LightLevel::DirectSun
        }
    }
}

impl std::fmt::Display for LightLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Map an optional lux reading to its light level
pub fn classify(lux: Option<f64>) -> LightLevel {
    match lux {
        None => LightLevel::Unknown,
        Some(value) => LightLevel::from_lux(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(Some(0.0)), LightLevel::VeryLow);
        assert_eq!(classify(Some(499.0)), LightLevel::VeryLow);
        assert_eq!(classify(Some(500.0)), LightLevel::Low);
        assert_eq!(classify(Some(1999.0)), LightLevel::Low);
        assert_eq!(classify(Some(2000.0)), LightLevel::Medium);
        assert_eq!(classify(Some(9999.0)), LightLevel::Medium);
        assert_eq!(classify(Some(10000.0)), LightLevel::Bright);
        assert_eq!(classify(Some(19999.0)), LightLevel::Bright);
        assert_eq!(classify(Some(20000.0)), LightLevel::DirectSun);
    }

    #[test]
    fn test_classify_fractional_just_below_boundary() {
        assert_eq!(classify(Some(499.9)), LightLevel::VeryLow);
        assert_eq!(classify(Some(19999.99)), LightLevel::Bright);
    }

    #[test]
    fn test_classify_missing_is_unknown() {
        assert_eq!(classify(None), LightLevel::Unknown);
        assert_eq!(classify(Some(f64::NAN)), LightLevel::Unknown);
    }

    #[test]
    fn test_negative_lux_passes_through() {
        assert_eq!(classify(Some(-25.0)), LightLevel::VeryLow);
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(LightLevel::VeryLow < LightLevel::Low);
        assert!(LightLevel::Bright < LightLevel::DirectSun);
    }

    #[test]
    fn test_labels() {
        assert_eq!(LightLevel::Medium.label(), "medium light");
        assert_eq!(LightLevel::DirectSun.to_string(), "direct sunlight");
        assert_eq!(LightLevel::Unknown.label(), "Unknown");
    }
}
