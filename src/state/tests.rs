use super::*;
use crate::core::ExposureSettings;
use std::fs;
use tempfile::tempdir;

fn defaults() -> ExposureState {
    ExposureState::daytime(&ExposureSettings::default())
}

fn ramping_state() -> ExposureState {
    ExposureState {
        shutter_speed: 204_414,
        gain: 2.0,
        photo_counter: 9,
        gain_increment_counter: 0.05,
    }
}

#[test]
fn test_daytime_defaults_use_gain_floor() {
    let state = defaults();
    assert_eq!(state.shutter_speed, 4489);
    assert_eq!(state.gain, 1.0);
    assert_eq!(state.photo_counter, 0);
    assert_eq!(state.gain_increment_counter, 0.0);
}

#[test]
fn test_missing_file_is_cold_start() {
    let dir = tempdir().unwrap();
    let store = JsonStateStore::new(dir.path().join("camera_state.json"), defaults());

    let outcome = store.load();
    assert_eq!(outcome.default_reason(), Some(&DefaultReason::Missing));
    assert_eq!(outcome.state(), &defaults());
}

#[test]
fn test_save_then_load_returns_same_state() {
    let dir = tempdir().unwrap();
    let store = JsonStateStore::new(dir.path().join("camera_state.json"), defaults());

    let state = ExposureState {
        gain_increment_counter: 7.0 / 60.0,
        ..ramping_state()
    };
    store.save(&state).unwrap();

    assert_eq!(store.load(), LoadOutcome::Loaded(state));
}

#[test]
fn test_save_creates_parent_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested/state/camera_state.json");
    let store = JsonStateStore::new(&path, defaults());

    store.save(&ramping_state()).unwrap();
    assert!(path.exists());
}

#[test]
fn test_save_replaces_whole_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("camera_state.json");
    fs::write(
        &path,
        r#"{"shutter_speed": 9000, "gain": 3.0, "photo_counter": 40, "gain_increment_counter": 0.5, "extra": true}"#,
    )
    .unwrap();

    let store = JsonStateStore::new(&path, defaults());
    store.save(&ramping_state()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains("extra"));
    assert_eq!(store.load(), LoadOutcome::Loaded(ramping_state()));

    // No temp files left beside the record
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_optional_counters_default_to_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("camera_state.json");
    fs::write(&path, r#"{"shutter_speed": 500000, "gain": 4}"#).unwrap();

    let store = JsonStateStore::new(&path, defaults());
    let outcome = store.load();
    assert_eq!(
        outcome,
        LoadOutcome::Loaded(ExposureState {
            shutter_speed: 500_000,
            gain: 4.0,
            photo_counter: 0,
            gain_increment_counter: 0.0,
        })
    );
}

#[test]
fn test_corrupt_documents_fall_back_to_defaults() {
    let cases = [
        ("not json", "{ shutter_speed"),
        ("missing gain", r#"{"shutter_speed": 4489}"#),
        ("string shutter", r#"{"shutter_speed": "fast", "gain": 1}"#),
        ("negative shutter", r#"{"shutter_speed": -5, "gain": 1}"#),
        ("negative gain", r#"{"shutter_speed": 4489, "gain": -2}"#),
        (
            "carry out of range",
            r#"{"shutter_speed": 4489, "gain": 1, "gain_increment_counter": 1.5}"#,
        ),
        ("empty", ""),
    ];

    let dir = tempdir().unwrap();
    let path = dir.path().join("camera_state.json");
    let store = JsonStateStore::new(&path, defaults());

    for (name, content) in cases {
        fs::write(&path, content).unwrap();
        let outcome = store.load();
        assert!(
            matches!(outcome.default_reason(), Some(DefaultReason::Corrupt(_))),
            "{name}: expected corrupt, got {outcome:?}"
        );
        assert_eq!(outcome.state(), &defaults(), "{name}");
    }
}

#[test]
fn test_directory_in_place_of_file_is_unreadable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("camera_state.json");
    fs::create_dir(&path).unwrap();

    let store = JsonStateStore::new(&path, defaults());
    let outcome = store.load();
    assert!(matches!(
        outcome.default_reason(),
        Some(DefaultReason::Unreadable(_))
    ));
}

#[test]
fn test_memory_store_starts_empty() {
    let store = MemoryStateStore::new(defaults());
    assert_eq!(store.load().default_reason(), Some(&DefaultReason::Missing));

    store.save(&ramping_state()).unwrap();
    assert_eq!(store.load(), LoadOutcome::Loaded(ramping_state()));

    let seeded = MemoryStateStore::with_state(defaults(), ramping_state());
    assert_eq!(seeded.load().into_state(), ramping_state());
}

#[test]
fn test_default_reason_messages() {
    assert_eq!(DefaultReason::Missing.to_string(), "no saved state");
    assert_eq!(
        DefaultReason::Corrupt("expected value".into()).to_string(),
        "state file corrupt: expected value"
    );
}

#[test]
#[serial_test::serial]
fn test_default_state_path_follows_xdg_state_home() {
    let dir = tempdir().unwrap();
    let original = std::env::var("XDG_STATE_HOME").ok();

    unsafe {
        std::env::set_var("XDG_STATE_HOME", dir.path());
    }
    assert_eq!(
        default_state_path(),
        dir.path().join("duskcam").join("camera_state.json")
    );

    unsafe {
        match original {
            Some(value) => std::env::set_var("XDG_STATE_HOME", value),
            None => std::env::remove_var("XDG_STATE_HOME"),
        }
    }
}
