// ABOUTME: End-to-end race prediction against aid-station plans
// ABOUTME: Covers cutoff bands, finish handling and the profile pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::collections::BTreeMap;

use cairn_core::models::AidStation;
use cairn_intelligence::aggregator::PerformanceProfile;
use cairn_intelligence::gradient::GradientBucket;
use cairn_intelligence::race_predictor::{CutoffStatus, RacePredictor, RunnerProfile};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 29, 6, 30, 0).unwrap()
}

fn even_pace_profile(pace: f64) -> RunnerProfile {
    RunnerProfile {
        flat_pace_min_km: pace,
        fatigue_factor: 1.0,
        ..RunnerProfile::default()
    }
}

#[test]
fn test_single_finish_station_reproduces_race_time() {
    let predictor = RacePredictor::new(even_pace_profile(6.0));
    let finish_station = vec![AidStation::new("finish", "Finish", 10.0)];

    let predictions = predictor.predict(&finish_station, start_time(), 10.0, None);
    assert_eq!(predictions.len(), 1);
    assert!((predictions[0].predicted_arrival_minutes - 60.0).abs() < 1e-9);

    let finish = predictor.predict_finish(&predictions, 10.0, start_time());
    assert_eq!(
        finish.predicted_finish_time,
        start_time() + Duration::minutes(60)
    );
}

#[test]
fn test_cutoff_bands_across_a_plan() {
    let predictor = RacePredictor::new(even_pace_profile(6.0));
    // Arrivals at 30, 60, 90 and 120 minutes
    let mut plan = vec![
        AidStation::new("a", "Alpha", 5.0),
        AidStation::new("b", "Bravo", 10.0),
        AidStation::new("c", "Charlie", 15.0),
        AidStation::new("d", "Delta", 20.0),
    ];
    plan[0].cutoff_hours_from_start = Some(25.0 / 60.0); // buffer -5
    plan[1].cutoff_hours_from_start = Some(70.0 / 60.0); // buffer 10
    plan[2].cutoff_hours_from_start = Some(110.0 / 60.0); // buffer 20
    plan[3].cutoff_hours_from_start = Some(165.0 / 60.0); // buffer 45

    let predictions = predictor.predict(&plan, start_time(), 20.0, None);
    assert_eq!(predictions[0].status, CutoffStatus::Missed);
    assert_eq!(predictions[1].status, CutoffStatus::Danger);
    assert_eq!(predictions[2].status, CutoffStatus::Warning);
    assert_eq!(predictions[3].status, CutoffStatus::Safe);
    for prediction in &predictions {
        assert!(prediction.cutoff_time.is_some());
        assert!(prediction.buffer_minutes.is_some());
    }
}

#[test]
fn test_explicit_segment_distances_override_deltas() {
    let predictor = RacePredictor::new(even_pace_profile(6.0));
    // Station at 10 km but routed over a 12 km trail segment
    let mut station = AidStation::new("a", "Alpha", 10.0);
    station.distance_from_prev_km = Some(12.0);
    let predictions = predictor.predict(&[station], start_time(), 20.0, None);
    assert!((predictions[0].predicted_arrival_minutes - 72.0).abs() < 1e-9);
}

#[test]
fn test_night_start_slows_early_segments() {
    let predictor = RacePredictor::new(even_pace_profile(6.0));
    let night = Utc.with_ymd_and_hms(2026, 8, 29, 23, 0, 0).unwrap();
    let plan = vec![AidStation::new("a", "Alpha", 10.0)];

    let by_night = predictor.predict(&plan, night, 20.0, None);
    let by_day = predictor.predict(&plan, start_time(), 20.0, None);
    assert!(by_night[0].is_nighttime);
    assert!(!by_day[0].is_nighttime);
    assert!(
        by_night[0].predicted_arrival_minutes > by_day[0].predicted_arrival_minutes
    );
}

#[test]
fn test_profile_pipeline_feeds_the_predictor() {
    let mut pace_by_gradient = BTreeMap::new();
    pace_by_gradient.insert(GradientBucket::Flat, 5.5);
    let mut decay = BTreeMap::new();
    decay.insert("0-10".to_owned(), 1.0);
    decay.insert("90-100".to_owned(), 1.2);

    let aggregate = PerformanceProfile {
        pace_by_gradient,
        overall_gap_min_km: 5.7,
        fatigue_factor: 3.1,
        pace_decay_by_progress_pct: decay,
        gradient_sample_sizes: BTreeMap::new(),
        activities_analyzed: 4,
        total_distance_km: 120.0,
    };
    let profile = RunnerProfile::from_performance_profile(&aggregate);
    let predictor = RacePredictor::new(profile);

    let plan = vec![
        AidStation::new("early", "Early", 5.0),
        AidStation::new("late", "Late", 95.0),
    ];
    let predictions = predictor.predict(&plan, start_time(), 100.0, None);

    // Early segment runs at the measured flat pace with no decay
    assert!((predictions[0].fatigue_factor - 1.0).abs() < 1e-9);
    assert!((predictions[0].segment_pace_min_km - 5.5).abs() < 1e-9);
    // Late segment carries the empirical end-of-race slowdown
    assert!((predictions[1].fatigue_factor - 1.2).abs() < 1e-9);
}

#[test]
fn test_base_pace_override() {
    let predictor = RacePredictor::new(even_pace_profile(6.0));
    let plan = vec![AidStation::new("a", "Alpha", 10.0)];
    let predictions = predictor.predict(&plan, start_time(), 20.0, Some(5.0));
    assert!((predictions[0].predicted_arrival_minutes - 50.0).abs() < 1e-9);
}
