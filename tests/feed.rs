use std::fs;

use tempfile::tempdir;

use neo_impact_calculator::feed::{FeedError, parse_feed, parse_neo, read_neo_file};

const LOOKUP: &str = r#"{
  "id": "3542519",
  "name": "(2010 PK9)",
  "absolute_magnitude_h": 21.6,
  "is_potentially_hazardous_asteroid": true,
  "estimated_diameter": {
    "kilometers": {
      "estimated_diameter_min": 0.1460679643,
      "estimated_diameter_max": 0.3266178974
    }
  },
  "close_approach_data": [
    {
      "close_approach_date": "2010-07-18",
      "relative_velocity": { "kilometers_per_hour": "80273.2", "kilometers_per_second": "22.3" },
      "miss_distance": { "kilometers": "4583021.7" },
      "orbiting_body": "Earth"
    },
    {
      "close_approach_date": "2024-07-18",
      "relative_velocity": { "kilometers_per_hour": "61000.5" },
      "miss_distance": { "kilometers": "1000000.0" },
      "orbiting_body": "Earth"
    },
    {
      "close_approach_date": "2031-01-02",
      "relative_velocity": { "kilometers_per_hour": 55000.0 },
      "miss_distance": { "kilometers": 2500000.0 },
      "orbiting_body": "Mars"
    }
  ]
}"#;

#[test]
fn parses_lookup_record_with_string_numbers() {
    let record = parse_neo(LOOKUP).unwrap();
    assert_eq!(record.id, "3542519");
    assert!(record.is_potentially_hazardous_asteroid);
    assert_eq!(record.absolute_magnitude_h, Some(21.6));
    assert_eq!(record.close_approach_data.len(), 3);
    assert_eq!(record.close_approach_data[0].relative_velocity.kilometers_per_hour, 80273.2);
    assert_eq!(record.close_approach_data[2].miss_distance.kilometers, 2_500_000.0);
    assert_eq!(record.close_approach_data[2].orbiting_body.as_deref(), Some("Mars"));
}

#[test]
fn selects_closest_and_dated_approaches() {
    let record = parse_neo(LOOKUP).unwrap();

    let closest = record.closest_approach().unwrap();
    assert_eq!(closest.close_approach_date, "2024-07-18");

    let inputs = record.profile_inputs(closest);
    assert_eq!(inputs.diameter_min_km, 0.1460679643);
    assert_eq!(inputs.diameter_max_km, 0.3266178974);
    assert_eq!(inputs.velocity_kmh, 61000.5);
    assert_eq!(inputs.distance_km, 1_000_000.0);

    let dated = record.approach_on("2010-07-18").unwrap();
    assert_eq!(dated.miss_distance.kilometers, 4583021.7);

    let err = record.approach_on("1999-01-01").unwrap_err();
    assert!(matches!(err, FeedError::NoApproachOn { ref date, .. } if date == "1999-01-01"));
}

#[test]
fn record_without_approaches_has_no_closest() {
    let json = r#"{
      "id": "1",
      "name": "lonely",
      "estimated_diameter": { "kilometers": { "estimated_diameter_min": 1, "estimated_diameter_max": 2 } }
    }"#;
    let record = parse_neo(json).unwrap();
    assert!(!record.is_potentially_hazardous_asteroid);
    assert!(matches!(record.closest_approach(), Err(FeedError::NoApproaches(id)) if id == "1"));
}

#[test]
fn parses_feed_page_in_date_order() {
    let json = format!(
        r#"{{ "element_count": 2, "near_earth_objects": {{ "2024-07-19": [{LOOKUP}], "2024-07-18": [{LOOKUP}] }} }}"#
    );
    let page = parse_feed(&json).unwrap();
    assert_eq!(page.element_count, 2);
    let dates: Vec<&String> = page.near_earth_objects.keys().collect();
    assert_eq!(dates, vec!["2024-07-18", "2024-07-19"]);
    assert_eq!(page.records().count(), 2);
}

#[test]
fn rejects_malformed_numbers_and_reads_files() {
    let bad = LOOKUP.replace("\"80273.2\"", "\"fast\"");
    assert!(matches!(parse_neo(&bad), Err(FeedError::Json(_))));

    let dir = tempdir().unwrap();
    let path = dir.path().join("neo.json");
    fs::write(&path, LOOKUP).unwrap();
    assert_eq!(read_neo_file(&path).unwrap().name, "(2010 PK9)");
    assert!(matches!(read_neo_file(dir.path().join("nope.json")), Err(FeedError::Io(_))));
}
