//! Light-and-preference match engine.
//!
//! Matching runs in two steps. The light step scores each catalog plant by the
//! tier its thresholds place the reading in; the filter step then drops plants
//! rejected by any non-empty [`FilterSet`] field. Results are ordered by
//! descending percentage with catalog order kept on ties.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, PlantRecord};
use crate::filters::{FilterField, FilterSet};

/// Light adequacy tier and its match percentage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Survives,
    GrowsWell,
    Thrives,
}

impl MatchTier {
    pub fn percentage(&self) -> u8 {
        match self {
            MatchTier::Thrives => 100,
            MatchTier::GrowsWell => 80,
            MatchTier::Survives => 50,
        }
    }

    /// Tier for a reading, or `None` when the plant does not qualify
    pub fn for_lux(plant: &PlantRecord, lux: f64, include_survives: bool) -> Option<Self> {
        let thrives_min = f64::from(plant.thrives_min_lux);
        let thrives_max = f64::from(plant.thrives_max_lux);
        let grows_well_min = f64::from(plant.grows_well_min_lux);

        if lux >= thrives_min && lux <= thrives_max {
            return Some(MatchTier::Thrives);
        }
        if lux >= grows_well_min && lux < thrives_min {
            return Some(MatchTier::GrowsWell);
        }
        if include_survives {
            if let Some(survives_min) = plant.survives_min_lux {
                if lux >= f64::from(survives_min) && lux < grows_well_min {
                    return Some(MatchTier::Survives);
                }
            }
        }
        None
    }
}

/// A catalog record annotated with its match percentage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchedPlant {
    #[serde(flatten)]
    pub plant: PlantRecord,
    pub match_percentage: u8,
}

impl MatchedPlant {
    pub fn name(&self) -> &str {
        &self.plant.name
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Score plants between `survivesMinLux` and `growsWellMinLux` at 50%
    pub include_survives_tier: bool,
}

/// Plant excluded by the filter step and the first field that rejected it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub plant: String,
    pub field: FilterField,
}

/// What a match run did, for callers that want to log it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchTrace {
    pub lux: Option<f64>,
    pub light_matches: Vec<String>,
    pub applied_filters: Vec<FilterField>,
    pub exclusions: Vec<Exclusion>,
    pub shown: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MatchEngine {
    catalog: Catalog,
    options: MatchOptions,
}

impl MatchEngine {
    pub fn new(catalog: Catalog, options: MatchOptions) -> Self {
        Self { catalog, options }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn options(&self) -> MatchOptions {
        self.options
    }

    /// Ranked plants for a reading and the user's filters
    pub fn match_plants(
        &self,
        lux: Option<f64>,
        filters: &FilterSet,
        skip_filters: bool,
    ) -> Vec<MatchedPlant> {
        self.match_traced(lux, filters, skip_filters).0
    }

    /// Light step only, ranked
    pub fn match_by_light(&self, lux: Option<f64>) -> Vec<MatchedPlant> {
        let mut matches = self.light_matches(lux);
        sort_by_percentage(&mut matches);
        matches
    }

    pub fn match_traced(
        &self,
        lux: Option<f64>,
        filters: &FilterSet,
        skip_filters: bool,
    ) -> (Vec<MatchedPlant>, MatchTrace) {
        let light_matches = self.light_matches(lux);
        let mut trace = MatchTrace {
            lux,
            light_matches: light_matches.iter().map(|m| m.plant.name.clone()).collect(),
            ..MatchTrace::default()
        };

        let mut shown = if skip_filters {
            light_matches
        } else {
            trace.applied_filters = filters.active_fields();
            let mut kept = Vec::with_capacity(light_matches.len());
            for candidate in light_matches {
                match filters.first_rejection(&candidate.plant) {
                    Some(field) => trace.exclusions.push(Exclusion {
                        plant: candidate.plant.name.clone(),
                        field,
                    }),
                    None => kept.push(candidate),
                }
            }
            kept
        };

        sort_by_percentage(&mut shown);
        trace.shown = shown.iter().map(|m| m.plant.name.clone()).collect();
        (shown, trace)
    }

    fn light_matches(&self, lux: Option<f64>) -> Vec<MatchedPlant> {
        let lux = match lux {
            Some(value) if !value.is_nan() => value,
            _ => return Vec::new(),
        };

        self.catalog
            .plants()
            .iter()
            .filter_map(|plant| {
                MatchTier::for_lux(plant, lux, self.options.include_survives_tier).map(|tier| {
                    MatchedPlant {
                        plant: plant.clone(),
                        match_percentage: tier.percentage(),
                    }
                })
            })
            .collect()
    }
}

// sort_by is stable, so ties keep catalog order
fn sort_by_percentage(matches: &mut [MatchedPlant]) {
    matches.sort_by(|a, b| b.match_percentage.cmp(&a.match_percentage));
}
