//! Property Test: Logbook Aggregation
//!
//! This property test verifies that:
//! - The stored average always equals the rounded mean of the measurements
//! - Measurement timestamps stay unique within a logbook
//! - Time-of-day bucketing counts each parseable reading exactly once

use proptest::prelude::*;
use sunny_spot::logbook::{
    add_measurement, bucket_by_time_of_day, delete_measurement, is_balanced, time_of_day, Logbook,
    Measurement, TimeOfDay,
};
use sunny_spot::test_utils::generators::{self, MeasurementOp};
use sunny_spot::time::FixedClock;

fn reference_average(measurements: &[Measurement]) -> u32 {
    if measurements.is_empty() {
        return 0;
    }
    let sum: f64 = measurements.iter().map(|m| f64::from(m.lux)).sum();
    // Half-up rounding of the exact mean; sums stay far below 2^53
    (sum / measurements.len() as f64 + 0.5).floor() as u32
}

fn measurement(timestamp: String) -> Measurement {
    Measurement {
        number: 1,
        lux: 100,
        timestamp,
        display_timestamp: String::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: after any add/delete sequence the average is the rounded mean
    #[test]
    fn prop_average_tracks_measurements(ops in generators::measurement_ops(40)) {
        let mut clock = FixedClock::from_rfc3339("2024-01-15T06:00:00+00:00").unwrap();
        let mut logbook = Logbook::new("spot", "Spot", "2024-01-15T05:00:00.000+00:00");

        for op in ops {
            match op {
                MeasurementOp::Add(lux) => {
                    logbook = add_measurement(&logbook, lux, &clock);
                    clock.advance_seconds(600);
                }
                MeasurementOp::Delete(index) => {
                    if !logbook.measurements.is_empty() {
                        let ts = logbook.measurements[index % logbook.measurements.len()]
                            .timestamp
                            .clone();
                        let (updated, removed) = delete_measurement(&logbook, &ts);
                        prop_assert!(removed);
                        logbook = updated;
                    }
                }
                MeasurementOp::DeleteMissing => {
                    let (updated, removed) = delete_measurement(&logbook, "1999-01-01T00:00:00.000Z");
                    prop_assert!(!removed);
                    prop_assert_eq!(&updated, &logbook);
                }
            }

            prop_assert_eq!(logbook.average, reference_average(&logbook.measurements));
        }
    }

    /// Property: repeated adds under a frozen clock never reuse a timestamp
    #[test]
    fn prop_timestamps_unique(luxes in prop::collection::vec(generators::stored_lux(), 1..20)) {
        let clock = FixedClock::from_rfc3339("2024-01-15T12:00:00+00:00").unwrap();
        let mut logbook = Logbook::new("spot", "Spot", "2024-01-15T05:00:00.000+00:00");

        for lux in &luxes {
            logbook = add_measurement(&logbook, *lux, &clock);
        }

        let mut stamps: Vec<&str> = logbook.measurements.iter().map(|m| m.timestamp.as_str()).collect();
        stamps.sort();
        stamps.dedup();
        prop_assert_eq!(stamps.len(), luxes.len());
    }

    /// Property: readings are bucketed by hour and counted once each
    #[test]
    fn prop_bucketing_counts_each_reading(
        morning in prop::collection::vec((0u32..12).prop_flat_map(generators::timestamp_at_hour), 0..6),
        afternoon in prop::collection::vec((12u32..16).prop_flat_map(generators::timestamp_at_hour), 0..6),
        evening in prop::collection::vec((16u32..24).prop_flat_map(generators::timestamp_at_hour), 0..6),
    ) {
        for ts in &morning {
            prop_assert_eq!(time_of_day(ts), TimeOfDay::Morning);
        }

        let measurements: Vec<Measurement> = morning
            .iter()
            .chain(afternoon.iter())
            .chain(evening.iter())
            .cloned()
            .map(measurement)
            .collect();

        let counts = bucket_by_time_of_day(&measurements);
        prop_assert_eq!(counts.morning as usize, morning.len());
        prop_assert_eq!(counts.afternoon as usize, afternoon.len());
        prop_assert_eq!(counts.evening as usize, evening.len());
        prop_assert_eq!(
            is_balanced(&counts),
            morning.len() == afternoon.len() && afternoon.len() == evening.len()
        );
    }
}

#[cfg(test)]
mod additional_tests {
    use super::*;

    #[test]
    fn test_logbook_scenario() {
        let mut clock = FixedClock::from_rfc3339("2024-01-15T09:00:00+00:00").unwrap();
        let logbook = Logbook::new("spot", "Spot", "2024-01-15T08:00:00.000+00:00");

        let logbook = add_measurement(&logbook, 1000, &clock);
        clock.advance_seconds(60);
        let logbook = add_measurement(&logbook, 3000, &clock);
        assert_eq!(logbook.average, 2000);

        let ts = logbook.measurements[1].timestamp.clone();
        let (logbook, _) = delete_measurement(&logbook, &ts);
        assert_eq!(logbook.average, 1000);

        clock.advance_seconds(60);
        let logbook = add_measurement(&logbook, 500, &clock);
        assert_eq!(logbook.average, 750);
    }

    #[test]
    fn test_unparseable_timestamps_are_skipped() {
        let counts = bucket_by_time_of_day(&[measurement("soon".to_string())]);
        assert_eq!(counts.total(), 0);
        assert!(is_balanced(&counts));
    }
}
