//! Test utilities for property-based testing
//!
//! Generators for lux readings, catalog records, filter answers and
//! measurement timestamps, plus small helpers shared by unit and integration
//! tests.

pub mod generators {
    use proptest::prelude::*;

    use crate::catalog::{Looks, LoveLevel, PlantRecord, PlantSize, WaterRequirement};
    use crate::filters::{
        FilterSet, LOOKS_OPTIONS, LOVE_LEVEL_OPTIONS, PETS_OPTIONS, SIZE_OPTIONS,
        WATERING_OPTIONS,
    };

    /// Generate a plausible lux reading, 0 to 100k
    pub fn lux() -> impl Strategy<Value = f64> {
        prop_oneof![
            0.0f64..100_000.0,
            (0u32..100_000).prop_map(f64::from),
        ]
    }

    /// Generate a whole-lux reading as stored in a logbook
    pub fn stored_lux() -> impl Strategy<Value = u32> {
        0u32..150_000
    }

    pub fn water_requirement() -> impl Strategy<Value = WaterRequirement> {
        prop_oneof![
            Just(WaterRequirement::Weekly),
            Just(WaterRequirement::BiWeekly),
            Just(WaterRequirement::Rarely),
        ]
    }

    pub fn love_level() -> impl Strategy<Value = LoveLevel> {
        prop_oneof![
            Just(LoveLevel::Zero),
            Just(LoveLevel::Some),
            Just(LoveLevel::LotsOf),
        ]
    }

    pub fn plant_size() -> impl Strategy<Value = PlantSize> {
        prop_oneof![
            Just(PlantSize::Small),
            Just(PlantSize::Medium),
            Just(PlantSize::Large),
            Just(PlantSize::Hanging),
        ]
    }

    pub fn looks() -> impl Strategy<Value = Looks> {
        prop_oneof![Just(Looks::Green), Just(Looks::Flowery), Just(Looks::Catching)]
    }

    /// Generate ordered light thresholds:
    /// (survives, growsWell, thrivesMin, thrivesMax)
    pub fn thresholds() -> impl Strategy<Value = (Option<u32>, u32, u32, u32)> {
        (0u32..5_000, 0u32..10_000, 0u32..20_000, 0u32..60_000, any::<bool>()).prop_map(
            |(survives, grows_gap, thrives_gap, span, has_survives)| {
                let grows_well = survives + grows_gap;
                let thrives_min = grows_well + thrives_gap;
                let thrives_max = thrives_min + span;
                (has_survives.then_some(survives), grows_well, thrives_min, thrives_max)
            },
        )
    }

    /// Generate a valid plant record with the given name
    pub fn plant_record(name: String) -> impl Strategy<Value = PlantRecord> {
        (
            thresholds(),
            water_requirement(),
            love_level(),
            plant_size(),
            looks(),
            any::<bool>(),
        )
            .prop_map(
                move |((survives, grows_well, thrives_min, thrives_max), water, love, size, looks, petsafe)| {
                    let mut plant = super::helpers::plant(&name, thrives_min, thrives_max, grows_well);
                    plant.survives_min_lux = survives;
                    plant.water_requirement = water;
                    plant.love_level = love;
                    plant.size = size;
                    plant.looks = looks;
                    plant.petsafe = petsafe;
                    plant
                },
            )
    }

    /// Generate a catalog of uniquely named plants
    pub fn catalog_records(max_len: usize) -> impl Strategy<Value = Vec<PlantRecord>> {
        (0..=max_len).prop_flat_map(|len| {
            (0..len)
                .map(|i| plant_record(format!("Plant {}", i)))
                .collect::<Vec<_>>()
        })
    }

    fn answer(options: &'static [&'static str]) -> impl Strategy<Value = String> {
        prop_oneof![
            2 => Just(String::new()),
            3 => prop::sample::select(options).prop_map(str::to_string),
        ]
    }

    /// Generate filter answers drawn from the quiz vocabulary, some left empty
    pub fn filter_set() -> impl Strategy<Value = FilterSet> {
        (
            answer(&SIZE_OPTIONS),
            answer(&LOOKS_OPTIONS),
            answer(&LOVE_LEVEL_OPTIONS),
            answer(&WATERING_OPTIONS),
            answer(&PETS_OPTIONS),
        )
            .prop_map(|(size, looks, love_level, watering, pets)| FilterSet {
                size,
                looks,
                love_level,
                watering,
                pets,
            })
    }

    /// Generate an RFC3339 timestamp at the given hour of 2024-01-15
    pub fn timestamp_at_hour(hour: u32) -> impl Strategy<Value = String> {
        (0u32..60, 0u32..60, 0u32..1000).prop_map(move |(minute, second, millis)| {
            format!(
                "2024-01-15T{:02}:{:02}:{:02}.{:03}+00:00",
                hour, minute, second, millis
            )
        })
    }

    /// A logbook operation for sequence tests
    #[derive(Debug, Clone)]
    pub enum MeasurementOp {
        Add(u32),
        /// Delete the measurement at this index modulo the current length
        Delete(usize),
        /// Delete with a timestamp that is not in the logbook
        DeleteMissing,
    }

    pub fn measurement_ops(max_len: usize) -> impl Strategy<Value = Vec<MeasurementOp>> {
        prop::collection::vec(
            prop_oneof![
                5 => stored_lux().prop_map(MeasurementOp::Add),
                2 => any::<usize>().prop_map(MeasurementOp::Delete),
                1 => Just(MeasurementOp::DeleteMissing),
            ],
            0..max_len,
        )
    }
}

pub mod helpers {
    use crate::catalog::{Looks, LoveLevel, PlantRecord, PlantSize, WaterRequirement};

    /// Helper to get DynamoDB Local endpoint from environment
    pub fn test_dynamodb_endpoint() -> String {
        std::env::var("DYNAMODB_ENDPOINT").unwrap_or_else(|_| "http://localhost:8000".to_string())
    }

    /// Helper to generate a test table name with random suffix
    pub fn test_table_name(prefix: &str) -> String {
        use rand::Rng;
        let suffix: u32 = rand::thread_rng().gen();
        format!("{}-test-{}", prefix, suffix)
    }

    /// A medium, green, weekly-watered plant with the given light thresholds
    pub fn plant(name: &str, thrives_min: u32, thrives_max: u32, grows_well: u32) -> PlantRecord {
        PlantRecord {
            name: name.to_string(),
            tagline: format!("{} for testing", name),
            height: "30-60 cm".to_string(),
            water_requirement: WaterRequirement::Weekly,
            love_level: LoveLevel::Some,
            love_language: "Attention".to_string(),
            origin: "Greenhouse".to_string(),
            petsafe: true,
            pet_safety_detail: "Non-toxic".to_string(),
            temp_min: 15.0,
            temp_max: 28.0,
            size: PlantSize::Medium,
            looks: Looks::Green,
            thrives_min_lux: thrives_min,
            thrives_max_lux: thrives_max,
            grows_well_min_lux: grows_well,
            survives_min_lux: None,
            survival_note: None,
        }
    }
}
