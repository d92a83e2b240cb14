//! Preference-quiz answers and the per-field predicates the match engine
//! applies to catalog records.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::catalog::{LoveLevel, PlantRecord, WaterRequirement};

/// Answer to the "pets around?" question that requires pet-safe plants
pub const PETS_YES: &str = "hell yeah!";
pub const PETS_NO: &str = "nope";

pub const SIZE_OPTIONS: [&str; 4] = [
    "small (<50 cm)",
    "medium (50-100 cm)",
    "large (>100 cm)",
    "hanging",
];
pub const LOOKS_OPTIONS: [&str; 3] = ["green", "flowery", "catching"];
pub const LOVE_LEVEL_OPTIONS: [&str; 3] = ["zero", "some", "lots of"];
pub const WATERING_OPTIONS: [&str; 3] = ["weekly", "bi-weekly", "rarely"];
pub const PETS_OPTIONS: [&str; 2] = [PETS_YES, PETS_NO];

/// User filter preferences. An empty string leaves that field unconstrained.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct FilterSet {
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub looks: String,
    #[serde(default)]
    pub love_level: String,
    #[serde(default)]
    pub watering: String,
    #[serde(default)]
    pub pets: String,
}

/// Identifies one of the five filter fields
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FilterField {
    Size,
    Looks,
    LoveLevel,
    Watering,
    Pets,
}

impl FilterField {
    pub const ALL: [FilterField; 5] = [
        FilterField::Size,
        FilterField::Looks,
        FilterField::LoveLevel,
        FilterField::Watering,
        FilterField::Pets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Size => "size",
            FilterField::Looks => "looks",
            FilterField::LoveLevel => "loveLevel",
            FilterField::Watering => "watering",
            FilterField::Pets => "pets",
        }
    }
}

impl FilterSet {
    pub fn value(&self, field: FilterField) -> &str {
        match field {
            FilterField::Size => &self.size,
            FilterField::Looks => &self.looks,
            FilterField::LoveLevel => &self.love_level,
            FilterField::Watering => &self.watering,
            FilterField::Pets => &self.pets,
        }
    }

    /// True when no field constrains the result
    pub fn is_empty(&self) -> bool {
        FilterField::ALL.iter().all(|f| self.value(*f).is_empty())
    }

    /// Fields carrying a constraint, in declaration order
    pub fn active_fields(&self) -> Vec<FilterField> {
        FilterField::ALL
            .into_iter()
            .filter(|f| !self.value(*f).is_empty())
            .collect()
    }

    /// First active field whose predicate rejects the plant
    pub fn first_rejection(&self, plant: &PlantRecord) -> Option<FilterField> {
        self.active_fields()
            .into_iter()
            .find(|field| !self.field_accepts(*field, plant))
    }

    pub fn accepts(&self, plant: &PlantRecord) -> bool {
        self.first_rejection(plant).is_none()
    }

    fn field_accepts(&self, field: FilterField, plant: &PlantRecord) -> bool {
        let value = self.value(field);
        match field {
            FilterField::Size => normalize_size(value) == plant.size.as_str(),
            FilterField::Looks => value.to_lowercase() == plant.looks.as_str(),
            FilterField::LoveLevel => love_level_accepts(value, plant.love_level),
            FilterField::Watering => watering_accepts(value, plant.water_requirement),
            FilterField::Pets => {
                if value == PETS_YES {
                    plant.petsafe
                } else {
                    !plant.petsafe
                }
            }
        }
    }
}

/// Strip a parenthetical qualifier and lowercase: "Small (<50 cm)" -> "small"
pub fn normalize_size(value: &str) -> String {
    static QUALIFIER_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = QUALIFIER_REGEX.get_or_init(|| {
        Regex::new(r" \(.*\)").unwrap_or_else(|_| unreachable!("static pattern is valid"))
    });

    regex.replace(value, "").to_lowercase()
}

/// The watering answer is a ceiling on care frequency: "weekly" also accepts
/// plants that need water less often.
fn watering_accepts(filter: &str, requirement: WaterRequirement) -> bool {
    match filter.parse::<WaterRequirement>() {
        Ok(ceiling) => requirement >= ceiling,
        Err(()) => false,
    }
}

/// The love answer is the most care the user is willing to give
fn love_level_accepts(filter: &str, level: LoveLevel) -> bool {
    match filter.parse::<LoveLevel>() {
        Ok(ceiling) => level <= ceiling,
        Err(()) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Looks, PlantSize};
    use crate::test_utils::helpers::plant;

    fn filters() -> FilterSet {
        FilterSet::default()
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let p = plant("Fern", 1000, 5000, 500);
        assert!(filters().is_empty());
        assert!(filters().accepts(&p));
    }

    #[test]
    fn test_size_qualifier_is_stripped() {
        assert_eq!(normalize_size("small (<50 cm)"), "small");
        assert_eq!(normalize_size("Large (>100 cm)"), "large");
        assert_eq!(normalize_size("hanging"), "hanging");

        let mut p = plant("Fern", 1000, 5000, 500);
        p.size = PlantSize::Small;
        let f = FilterSet {
            size: "small (<50 cm)".to_string(),
            ..filters()
        };
        assert!(f.accepts(&p));

        let f = FilterSet {
            size: "large (>100 cm)".to_string(),
            ..filters()
        };
        assert_eq!(f.first_rejection(&p), Some(FilterField::Size));
    }

    #[test]
    fn test_looks_is_case_insensitive() {
        let mut p = plant("Orchid", 1000, 5000, 500);
        p.looks = Looks::Flowery;

        let f = FilterSet {
            looks: "Flowery".to_string(),
            ..filters()
        };
        assert!(f.accepts(&p));
    }

    #[test]
    fn test_watering_is_graded() {
        let mut p = plant("Cactus", 1000, 5000, 500);
        p.water_requirement = WaterRequirement::Rarely;
        for answer in ["weekly", "bi-weekly", "rarely"] {
            let f = FilterSet {
                watering: answer.to_string(),
                ..filters()
            };
            assert!(f.accepts(&p), "rarely-watered plant rejected by {}", answer);
        }

        p.water_requirement = WaterRequirement::Weekly;
        let f = FilterSet {
            watering: "bi-weekly".to_string(),
            ..filters()
        };
        assert!(!f.accepts(&p));
    }

    #[test]
    fn test_love_level_is_graded() {
        let mut p = plant("Fern", 1000, 5000, 500);
        p.love_level = LoveLevel::Some;

        let accepts = |answer: &str| {
            FilterSet {
                love_level: answer.to_string(),
                ..FilterSet::default()
            }
            .accepts(&p)
        };

        assert!(accepts("lots of"));
        assert!(accepts("some"));
        assert!(!accepts("zero"));
    }

    #[test]
    fn test_unknown_graded_value_matches_nothing() {
        let p = plant("Fern", 1000, 5000, 500);
        let f = FilterSet {
            watering: "daily".to_string(),
            ..filters()
        };
        assert!(!f.accepts(&p));
    }

    #[test]
    fn test_pets_gate() {
        let mut p = plant("Fern", 1000, 5000, 500);
        p.petsafe = true;

        let yes = FilterSet {
            pets: PETS_YES.to_string(),
            ..filters()
        };
        let no = FilterSet {
            pets: PETS_NO.to_string(),
            ..filters()
        };
        assert!(yes.accepts(&p));
        assert!(!no.accepts(&p));

        p.petsafe = false;
        assert!(!yes.accepts(&p));
        assert!(no.accepts(&p));
    }

    #[test]
    fn test_active_fields_and_json_shape() {
        let f = FilterSet {
            love_level: "some".to_string(),
            pets: PETS_NO.to_string(),
            ..filters()
        };
        assert_eq!(f.active_fields(), vec![FilterField::LoveLevel, FilterField::Pets]);

        let value = serde_json::to_value(&f).unwrap();
        assert_eq!(value["loveLevel"], "some");
        assert_eq!(value["size"], "");

        // Missing fields deserialize as unconstrained
        let partial: FilterSet = serde_json::from_str(r#"{"looks":"green"}"#).unwrap();
        assert_eq!(partial.looks, "green");
        assert!(partial.size.is_empty());
    }
}
