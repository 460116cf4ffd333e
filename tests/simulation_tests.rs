use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use duskcam::commands::simulate::run_simulation;
use duskcam::core::{Phase, run_cycle};
use duskcam::state::{JsonStateStore, MemoryStateStore, StateStore};
use duskcam::time_source::SimulatedTimeSource;
use duskcam::{ExposureSettings, ExposureState, LoadOutcome, SunTable, SunTimes};
use tempfile::tempdir;

fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 10, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

/// Sunrise 06:30 and sunset 19:45 around the test dates
fn autumn_table() -> SunTable {
    let mut table = SunTable::new();
    let times = SunTimes::new(
        NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
        NaiveTime::from_hms_opt(19, 45, 0).unwrap(),
    );
    for day in 1..=5 {
        table.insert(NaiveDate::from_ymd_opt(2024, 10, day).unwrap(), times);
    }
    table
}

#[test]
fn test_simulated_night_ramps_and_returns_to_day() {
    let settings = ExposureSettings::default();
    let store = MemoryStateStore::new(ExposureState::daytime(&settings));
    let source = SimulatedTimeSource::new(at(2, 19, 0), at(3, 7, 0));

    let mut phases = Vec::new();
    let summary = run_simulation(
        &source,
        Duration::minutes(1),
        &autumn_table(),
        &settings,
        &store,
        |report, changed| {
            if changed {
                phases.push(report.decision.phase);
            }
        },
    )
    .unwrap();

    assert_eq!(summary.captures, 721);
    assert_eq!(summary.phase_changes, 4);
    assert_eq!(
        phases,
        vec![
            Phase::Day,
            Phase::PostSunset,
            Phase::Night,
            Phase::PreSunrise,
            Phase::Day
        ]
    );
    assert_eq!(summary.peak.shutter_speed, settings.max_shutter);
    assert_eq!(summary.peak.gain, settings.max_gain);

    assert_eq!(summary.final_state.shutter_speed, settings.daytime_shutter);
    assert_eq!(summary.final_state.gain, settings.min_gain);
    assert_eq!(summary.final_state.photo_counter, 1);
    assert_eq!(store.load(), LoadOutcome::Loaded(summary.final_state));
}

#[test]
fn test_simulation_holds_overnight_values() {
    let settings = ExposureSettings::default();
    let store = MemoryStateStore::new(ExposureState::daytime(&settings));
    let source = SimulatedTimeSource::new(at(2, 19, 45), at(3, 1, 0));

    let summary = run_simulation(
        &source,
        Duration::minutes(1),
        &autumn_table(),
        &settings,
        &store,
        |_, _| {},
    )
    .unwrap();

    // Ends in the night, still at the longest exposure
    assert_eq!(summary.final_state.shutter_speed, settings.max_shutter);
    assert_eq!(summary.final_state.gain, settings.max_gain);
    assert_eq!(summary.phase_changes, 2);
}

#[test]
fn test_simulation_rejects_zero_interval() {
    let settings = ExposureSettings::default();
    let store = MemoryStateStore::new(ExposureState::daytime(&settings));
    let source = SimulatedTimeSource::new(at(2, 19, 0), at(2, 20, 0));

    let result = run_simulation(
        &source,
        Duration::zero(),
        &autumn_table(),
        &settings,
        &store,
        |_, _| {},
    );
    assert!(result.is_err());
}

#[test]
fn test_successive_runs_continue_from_the_state_file() {
    let dir = tempdir().unwrap();
    let settings = ExposureSettings::default();
    let store = JsonStateStore::new(
        dir.path().join("camera_state.json"),
        ExposureState::daytime(&settings),
    );
    let table = autumn_table();

    for minute in 46..=48 {
        run_cycle(at(2, 19, minute), &store, &table, &settings, true).unwrap();
    }

    let LoadOutcome::Loaded(state) = store.load() else {
        panic!("state file should have been written");
    };
    assert_eq!(state.shutter_speed, 4489 + 3 * 199_925);
    assert_eq!(state.photo_counter, 3);
    assert_eq!(state.gain, 1.0);
    assert!((state.gain_increment_counter - 0.35).abs() < 1e-9);

    // A dry run reports the next step without saving it
    let report = run_cycle(at(2, 19, 49), &store, &table, &settings, false).unwrap();
    assert!(!report.saved);
    assert_eq!(report.decision.capture.shutter_speed, 4489 + 4 * 199_925);
    assert_eq!(store.load(), LoadOutcome::Loaded(state));
}

#[test]
fn test_missing_dates_fall_back_to_daytime_values() {
    let dir = tempdir().unwrap();
    let settings = ExposureSettings::default();
    let store = JsonStateStore::new(
        dir.path().join("camera_state.json"),
        ExposureState::daytime(&settings),
    );

    let report = run_cycle(at(2, 23, 0), &store, &SunTable::new(), &settings, true).unwrap();
    assert_eq!(report.decision.phase, Phase::Unknown);
    assert_eq!(report.decision.capture.shutter_speed, settings.daytime_shutter);
    assert_eq!(report.decision.capture.gain, settings.min_gain);
}
