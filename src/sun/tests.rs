use super::*;
use crate::common::constants::test_constants::*;
use chrono::NaiveDate;
use chrono_tz::Tz;
use tempfile::tempdir;

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, m, d).unwrap()
}

#[test]
fn test_sun_event_parses_clock_formats() {
    assert_eq!("06:30".parse::<SunEvent>().unwrap(), SunEvent::At(time(6, 30)));
    assert_eq!(
        "06:30:15".parse::<SunEvent>().unwrap(),
        SunEvent::At(NaiveTime::from_hms_opt(6, 30, 15).unwrap())
    );
    assert_eq!(
        "07:27:02 PM".parse::<SunEvent>().unwrap(),
        SunEvent::At(NaiveTime::from_hms_opt(19, 27, 2).unwrap())
    );
}

#[test]
fn test_sun_event_keeps_timestamp_time_as_written() {
    // No zone conversion: the clock time in the string is used verbatim
    let event: SunEvent = "2023-03-21T05:58:00+00:00".parse().unwrap();
    assert_eq!(event, SunEvent::At(time(5, 58)));

    let event: SunEvent = "2023-03-21T18:10:00+02:00".parse().unwrap();
    assert_eq!(event, SunEvent::At(time(18, 10)));
}

#[test]
fn test_sun_event_sentinels() {
    assert_eq!("never_rises".parse::<SunEvent>().unwrap(), SunEvent::NeverRises);
    assert_eq!("never_sets".parse::<SunEvent>().unwrap(), SunEvent::NeverSets);
    assert!(SunEvent::NeverSets.is_sentinel());
    assert_eq!(SunEvent::NeverRises.time(), None);
}

#[test]
fn test_sun_event_rejects_garbage() {
    assert!("sunrise".parse::<SunEvent>().is_err());
    assert!("25:00".parse::<SunEvent>().is_err());
    assert!("".parse::<SunEvent>().is_err());
}

#[test]
fn test_sun_event_display() {
    assert_eq!(SunEvent::At(time(6, 5)).to_string(), "06:05");
    assert_eq!(
        SunEvent::At(NaiveTime::from_hms_opt(6, 5, 9).unwrap()).to_string(),
        "06:05:09"
    );
    assert_eq!(SunEvent::NeverSets.to_string(), "never_sets");
}

#[test]
fn test_sun_times_clock_times() {
    let times = SunTimes::new(time(6, 30), time(19, 45));
    assert_eq!(times.clock_times(), Some((time(6, 30), time(19, 45))));
    assert!(!times.is_polar());

    let polar = SunTimes {
        sunrise: SunEvent::NeverSets,
        sunset: SunEvent::At(time(23, 50)),
    };
    assert_eq!(polar.clock_times(), None);
    assert!(polar.is_polar());
}

#[test]
fn test_table_lookup_by_month_day() {
    let json = format!(
        r#"{{
            "03-21": {{ "sunrise": "{TEST_SUNRISE}", "sunset": "{TEST_SUNSET}" }},
            "06-21": {{ "sunrise": "never_sets", "sunset": "never_sets" }}
        }}"#
    );
    let table = SunTable::from_json(&json).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.polar_days(), 1);

    // Year is irrelevant, only month and day are used
    let march = table
        .sun_times(NaiveDate::from_ymd_opt(2031, 3, 21).unwrap())
        .unwrap();
    assert_eq!(march.clock_times(), Some((time(6, 30), time(19, 45))));

    let june = table.sun_times(date(6, 21)).unwrap();
    assert!(june.is_polar());

    assert_eq!(table.sun_times(date(1, 1)), None);
}

#[test]
fn test_table_accepts_api_format_with_solar_noon() {
    let json = r#"{
        "01-15": {
            "sunrise": "2023-01-15T10:44:37+00:00",
            "sunset": "2023-01-15T12:10:05+00:00",
            "solar_noon": "2023-01-15T11:27:21+00:00"
        },
        "12-21": {
            "sunrise": "never_rises",
            "sunset": "never_sets",
            "solar_noon": "2023-12-21T11:15:00+00:00"
        }
    }"#;
    let table = SunTable::from_json(json).unwrap();
    let jan = table.sun_times(date(1, 15)).unwrap();
    assert_eq!(
        jan.sunrise,
        SunEvent::At(NaiveTime::from_hms_opt(10, 44, 37).unwrap())
    );
    assert!(table.sun_times(date(12, 21)).unwrap().is_polar());

    // solar_noon survives a rewrite
    let rewritten = table.to_json().unwrap();
    assert!(rewritten.contains("2023-12-21T11:15:00+00:00"));
}

#[test]
fn test_table_rejects_malformed_entries() {
    let bad_key = r#"{ "3-21": { "sunrise": "06:00", "sunset": "18:00" } }"#;
    assert!(SunTable::from_json(bad_key).is_err());

    let bad_date = r#"{ "02-30": { "sunrise": "06:00", "sunset": "18:00" } }"#;
    assert!(SunTable::from_json(bad_date).is_err());

    let bad_time = r#"{ "03-21": { "sunrise": "dawn", "sunset": "18:00" } }"#;
    let err = SunTable::from_json(bad_time).unwrap_err();
    assert!(format!("{err:#}").contains("03-21"));

    let missing_field = r#"{ "03-21": { "sunrise": "06:00" } }"#;
    assert!(SunTable::from_json(missing_field).is_err());
}

#[test]
fn test_table_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("sun_data.json");

    let mut table = SunTable::new();
    table.insert(date(3, 21), SunTimes::new(time(6, 2), time(18, 14)));
    table.insert(
        date(6, 21),
        SunTimes {
            sunrise: SunEvent::NeverSets,
            sunset: SunEvent::NeverSets,
        },
    );
    table.save(&path).unwrap();

    let loaded = SunTable::load(&path).unwrap();
    assert_eq!(loaded, table);
}

#[test]
fn test_table_load_missing_file_errors() {
    let dir = tempdir().unwrap();
    assert!(SunTable::load(&dir.path().join("absent.json")).is_err());
}

#[test]
fn test_polar_condition() {
    // Svalbard: midnight sun in June, polar night in December
    assert_eq!(
        generate::polar_condition(78.22, date(6, 21)),
        Some(SunEvent::NeverSets)
    );
    assert_eq!(
        generate::polar_condition(78.22, date(12, 21)),
        Some(SunEvent::NeverRises)
    );
    // Southern hemisphere mirrors it
    assert_eq!(
        generate::polar_condition(-78.22, date(6, 21)),
        Some(SunEvent::NeverRises)
    );
    assert_eq!(generate::polar_condition(45.0, date(6, 21)), None);
    assert_eq!(generate::polar_condition(0.0, date(12, 21)), None);
}

#[test]
fn test_generate_table_mid_latitude() {
    let request = TableRequest {
        latitude: 48.8566,
        longitude: 2.3522,
        year: 2023,
        timezone: Some("Europe/Paris".parse::<Tz>().unwrap()),
    };
    let table = generate_table(&request).unwrap();

    // 365 days plus the copied leap day
    assert_eq!(table.len(), 366);
    assert_eq!(table.polar_days(), 0);
    assert_eq!(
        table.sun_times(date(2, 28)),
        table.sun_times(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
    );

    let (sunrise, sunset) = table.sun_times(date(3, 21)).unwrap().clock_times().unwrap();
    assert!(sunrise < sunset);
    assert!(sunrise > time(6, 0) && sunrise < time(8, 0), "sunrise {sunrise}");
    assert!(sunset > time(18, 0) && sunset < time(20, 0), "sunset {sunset}");

    // Summer days are longer than winter days
    let (jr, js) = table.sun_times(date(6, 21)).unwrap().clock_times().unwrap();
    let (dr, ds) = table.sun_times(date(12, 21)).unwrap().clock_times().unwrap();
    assert!(js - jr > ds - dr);
}

#[test]
fn test_generate_table_arctic_has_polar_days() {
    let request = TableRequest {
        latitude: 68.7252,
        longitude: 15.4506,
        year: 2024,
        timezone: Some("Europe/Oslo".parse::<Tz>().unwrap()),
    };
    let table = generate_table(&request).unwrap();

    assert_eq!(table.len(), 366);
    assert!(table.polar_days() > 0);
    assert_eq!(
        table.sun_times(date(6, 21)).unwrap().sunset,
        SunEvent::NeverSets
    );
    assert_eq!(
        table.sun_times(date(12, 21)).unwrap().sunrise,
        SunEvent::NeverRises
    );
    assert!(!table.sun_times(date(3, 21)).unwrap().is_polar());
}

#[test]
fn test_generate_table_rejects_bad_coordinates() {
    let request = TableRequest {
        latitude: 91.0,
        longitude: 0.0,
        year: 2023,
        timezone: None,
    };
    assert!(generate_table(&request).is_err());
}
