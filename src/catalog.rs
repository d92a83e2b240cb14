//! Static plant catalog.
//!
//! The catalog is loaded once at startup through a [`CatalogProvider`] and is
//! read-only afterwards. Loading validates that every record carries a name,
//! that names are unique, and that the light thresholds are ordered
//! `survivesMinLux <= growsWellMinLux <= thrivesMinLux <= thrivesMaxLux`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::error::CatalogError;

const BUNDLED_CATALOG_JSON: &str = include_str!("../data/plants.json");

// ============================================================================
// Enum-like plant attributes
// ============================================================================

/// How often a plant needs watering, ordered from most to least frequent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String")]
pub enum WaterRequirement {
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "bi-weekly")]
    BiWeekly,
    #[serde(rename = "rarely")]
    Rarely,
}

impl WaterRequirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaterRequirement::Weekly => "weekly",
            WaterRequirement::BiWeekly => "bi-weekly",
            WaterRequirement::Rarely => "rarely",
        }
    }
}

impl FromStr for WaterRequirement {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(WaterRequirement::Weekly),
            "bi-weekly" => Ok(WaterRequirement::BiWeekly),
            "rarely" => Ok(WaterRequirement::Rarely),
            _ => Err(()),
        }
    }
}

/// How much attention a plant needs, ordered from least to most
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String")]
pub enum LoveLevel {
    #[serde(rename = "zero")]
    Zero,
    #[serde(rename = "some")]
    Some,
    #[serde(rename = "lots of")]
    LotsOf,
}

impl LoveLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoveLevel::Zero => "zero",
            LoveLevel::Some => "some",
            LoveLevel::LotsOf => "lots of",
        }
    }
}

impl FromStr for LoveLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero" => Ok(LoveLevel::Zero),
            "some" => Ok(LoveLevel::Some),
            "lots of" => Ok(LoveLevel::LotsOf),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
#[serde(rename_all = "lowercase")]
pub enum PlantSize {
    Small,
    Medium,
    Large,
    Hanging,
}

impl PlantSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlantSize::Small => "small",
            PlantSize::Medium => "medium",
            PlantSize::Large => "large",
            PlantSize::Hanging => "hanging",
        }
    }
}

impl FromStr for PlantSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(PlantSize::Small),
            "medium" => Ok(PlantSize::Medium),
            "large" => Ok(PlantSize::Large),
            "hanging" => Ok(PlantSize::Hanging),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
#[serde(rename_all = "lowercase")]
pub enum Looks {
    Green,
    Flowery,
    Catching,
}

impl Looks {
    pub fn as_str(&self) -> &'static str {
        match self {
            Looks::Green => "green",
            Looks::Flowery => "flowery",
            Looks::Catching => "catching",
        }
    }
}

impl FromStr for Looks {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "green" => Ok(Looks::Green),
            "flowery" => Ok(Looks::Flowery),
            "catching" => Ok(Looks::Catching),
            _ => Err(()),
        }
    }
}

// Catalog files are hand-written; attribute values are matched ignoring case.
fn parse_attribute<T: FromStr>(kind: &str, value: String) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("unknown {} '{}'", kind, value))
}

impl TryFrom<String> for WaterRequirement {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_attribute("water requirement", value)
    }
}

impl TryFrom<String> for LoveLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_attribute("love level", value)
    }
}

impl TryFrom<String> for PlantSize {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_attribute("size", value)
    }
}

impl TryFrom<String> for Looks {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_attribute("looks", value)
    }
}

// ============================================================================
// Plant record
// ============================================================================

/// A single catalog entry. `name` is the primary key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlantRecord {
    pub name: String,
    pub tagline: String,
    pub height: String,
    pub water_requirement: WaterRequirement,
    pub love_level: LoveLevel,
    pub love_language: String,
    pub origin: String,
    pub petsafe: bool,
    pub pet_safety_detail: String,
    pub temp_min: f64,
    pub temp_max: f64,
    pub size: PlantSize,
    pub looks: Looks,
    pub thrives_min_lux: u32,
    pub thrives_max_lux: u32,
    pub grows_well_min_lux: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survives_min_lux: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survival_note: Option<String>,
}

impl PlantRecord {
    /// Check the light-threshold ordering invariant
    pub fn validate_thresholds(&self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidThresholds {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.thrives_min_lux > self.thrives_max_lux {
            return Err(invalid("thrivesMinLux > thrivesMaxLux"));
        }
        if self.grows_well_min_lux > self.thrives_min_lux {
            return Err(invalid("growsWellMinLux > thrivesMinLux"));
        }
        if let Some(survives) = self.survives_min_lux {
            if survives > self.grows_well_min_lux {
                return Err(invalid("survivesMinLux > growsWellMinLux"));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Providers
// ============================================================================

/// Source of catalog records, consulted once at startup
pub trait CatalogProvider {
    fn load_catalog(&self) -> Result<Vec<PlantRecord>, CatalogError>;
}

/// The plant list compiled into the crate
#[derive(Debug, Clone, Default)]
pub struct BundledCatalog;

impl CatalogProvider for BundledCatalog {
    fn load_catalog(&self) -> Result<Vec<PlantRecord>, CatalogError> {
        Ok(serde_json::from_str(BUNDLED_CATALOG_JSON)?)
    }
}

/// A JSON array of plant records on disk
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogProvider for JsonFileCatalog {
    fn load_catalog(&self) -> Result<Vec<PlantRecord>, CatalogError> {
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Validated, immutable plant collection shared across the process
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    plants: Arc<[PlantRecord]>,
}

impl Catalog {
    /// Load and validate records from a provider
    pub fn load(provider: &dyn CatalogProvider) -> Result<Self, CatalogError> {
        let catalog = Self::from_records(provider.load_catalog()?)?;
        info!(plants = catalog.len(), "Plant catalog loaded");
        Ok(catalog)
    }

    /// Catalog compiled into the crate
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::load(&BundledCatalog)
    }

    pub fn from_records(records: Vec<PlantRecord>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for plant in &records {
            if plant.name.trim().is_empty() {
                return Err(CatalogError::MissingName);
            }
            if !seen.insert(plant.name.as_str()) {
                return Err(CatalogError::DuplicateName(plant.name.clone()));
            }
            plant.validate_thresholds()?;
        }

        Ok(Self {
            plants: records.into(),
        })
    }

    pub fn plants(&self) -> &[PlantRecord] {
        &self.plants
    }

    pub fn get(&self, name: &str) -> Option<&PlantRecord> {
        self.plants.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::helpers::plant;

    #[test]
    fn test_bundled_catalog_is_valid() {
        let catalog = Catalog::bundled().unwrap();

        assert!(!catalog.is_empty());
        for p in catalog.plants() {
            assert!(p.validate_thresholds().is_ok(), "{} invalid", p.name);
        }
    }

    #[test]
    fn test_plant_record_json_shape() {
        let json = r#"{
            "name": "Snake Plant",
            "tagline": "Unkillable",
            "height": "30-120 cm",
            "waterRequirement": "rarely",
            "loveLevel": "zero",
            "loveLanguage": "Neglect",
            "origin": "West Africa",
            "petsafe": false,
            "petSafetyDetail": "Mildly toxic",
            "tempMin": 10,
            "tempMax": 30,
            "size": "medium",
            "looks": "green",
            "thrivesMinLux": 2000,
            "thrivesMaxLux": 20000,
            "growsWellMinLux": 500,
            "survivesMinLux": 100,
            "survivalNote": "Slows right down"
        }"#;

        let plant: PlantRecord = serde_json::from_str(json).unwrap();
        assert_eq!(plant.water_requirement, WaterRequirement::Rarely);
        assert_eq!(plant.love_level, LoveLevel::Zero);
        assert_eq!(plant.survives_min_lux, Some(100));

        let value = serde_json::to_value(&plant).unwrap();
        assert_eq!(value["waterRequirement"], "rarely");
        assert_eq!(value["loveLevel"], "zero");
        assert_eq!(value["thrivesMinLux"], 2000);
    }

    #[test]
    fn test_attributes_parse_ignoring_case() {
        let json = r#"{
            "name": "Peace Lily",
            "tagline": "Droops when thirsty",
            "height": "40-60 cm",
            "waterRequirement": "Bi-Weekly",
            "loveLevel": "Lots Of",
            "loveLanguage": "Attention",
            "origin": "Colombia",
            "petsafe": false,
            "petSafetyDetail": "Toxic",
            "tempMin": 16,
            "tempMax": 29,
            "size": "Small",
            "looks": "FLOWERY",
            "thrivesMinLux": 1000,
            "thrivesMaxLux": 5000,
            "growsWellMinLux": 300
        }"#;

        let plant: PlantRecord = serde_json::from_str(json).unwrap();
        assert_eq!(plant.water_requirement, WaterRequirement::BiWeekly);
        assert_eq!(plant.love_level, LoveLevel::LotsOf);
        assert_eq!(plant.size, PlantSize::Small);
        assert_eq!(plant.looks, Looks::Flowery);

        // Written back in canonical lowercase
        let value = serde_json::to_value(&plant).unwrap();
        assert_eq!(value["size"], "small");
        assert_eq!(value["loveLevel"], "lots of");
    }

    #[test]
    fn test_unknown_attribute_value_rejected() {
        let json = r#"{"name": "X", "tagline": "", "height": "", "waterRequirement": "daily",
            "loveLevel": "some", "loveLanguage": "", "origin": "", "petsafe": true,
            "petSafetyDetail": "", "tempMin": 0, "tempMax": 0, "size": "small",
            "looks": "green", "thrivesMinLux": 1, "thrivesMaxLux": 2, "growsWellMinLux": 0}"#;

        let err = serde_json::from_str::<PlantRecord>(json).unwrap_err();
        assert!(err.to_string().contains("unknown water requirement 'daily'"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let records = vec![plant("Fern", 500, 2000, 200), plant("Fern", 500, 2000, 200)];

        let result = Catalog::from_records(records);
        assert!(matches!(result, Err(CatalogError::DuplicateName(name)) if name == "Fern"));
    }

    #[test]
    fn test_unordered_thresholds_rejected() {
        let mut bad = plant("Fern", 2000, 10000, 500);
        bad.grows_well_min_lux = 3000;

        let result = Catalog::from_records(vec![bad]);
        assert!(matches!(result, Err(CatalogError::InvalidThresholds { .. })));
    }

    #[test]
    fn test_survives_above_grows_well_rejected() {
        let mut bad = plant("Fern", 2000, 10000, 500);
        bad.survives_min_lux = Some(800);

        assert!(bad.validate_thresholds().is_err());
    }

    #[test]
    fn test_empty_catalog_is_valid() {
        let catalog = Catalog::from_records(Vec::new()).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_json_file_catalog_missing_file() {
        let provider = JsonFileCatalog::new("/nonexistent/plants.json");
        assert!(matches!(provider.load_catalog(), Err(CatalogError::Io(_))));
    }

    #[test]
    fn test_graded_enum_parsing() {
        assert_eq!("Bi-Weekly".parse::<WaterRequirement>(), Ok(WaterRequirement::BiWeekly));
        assert_eq!("LOTS OF".parse::<LoveLevel>(), Ok(LoveLevel::LotsOf));
        assert!("daily".parse::<WaterRequirement>().is_err());
    }
}
