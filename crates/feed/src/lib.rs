//! Parsing of NeoWs-style near-Earth object records.
//!
//! Only the fields needed to build an impact profile are modelled. Numeric
//! values in the feed are usually JSON strings; both forms are accepted.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed feed record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("object {0} has no close-approach data")]
    NoApproaches(String),
    #[error("object {id} has no close approach on {date}")]
    NoApproachOn { id: String, date: String },
}

/// A single near-Earth object as returned by the lookup endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NeoRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub absolute_magnitude_h: Option<f64>,
    #[serde(default)]
    pub is_potentially_hazardous_asteroid: bool,
    pub estimated_diameter: EstimatedDiameter,
    #[serde(default)]
    pub close_approach_data: Vec<CloseApproach>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EstimatedDiameter {
    pub kilometers: DiameterRange,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct DiameterRange {
    #[serde(deserialize_with = "number_or_string")]
    pub estimated_diameter_min: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub estimated_diameter_max: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CloseApproach {
    pub close_approach_date: String,
    pub relative_velocity: RelativeVelocity,
    pub miss_distance: MissDistance,
    #[serde(default)]
    pub orbiting_body: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct RelativeVelocity {
    #[serde(deserialize_with = "number_or_string")]
    pub kilometers_per_hour: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct MissDistance {
    #[serde(deserialize_with = "number_or_string")]
    pub kilometers: f64,
}

/// One page of the date-keyed browse feed.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FeedPage {
    #[serde(default)]
    pub element_count: usize,
    pub near_earth_objects: BTreeMap<String, Vec<NeoRecord>>,
}

impl FeedPage {
    /// All records in date order.
    pub fn records(&self) -> impl Iterator<Item = &NeoRecord> {
        self.near_earth_objects.values().flatten()
    }
}

/// Raw quantities needed to build an asteroid profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileInputs {
    pub diameter_min_km: f64,
    pub diameter_max_km: f64,
    pub velocity_kmh: f64,
    pub distance_km: f64,
}

impl NeoRecord {
    /// Approach with the smallest miss distance.
    pub fn closest_approach(&self) -> Result<&CloseApproach, FeedError> {
        self.close_approach_data
            .iter()
            .min_by(|a, b| {
                a.miss_distance
                    .kilometers
                    .total_cmp(&b.miss_distance.kilometers)
            })
            .ok_or_else(|| FeedError::NoApproaches(self.id.clone()))
    }

    /// Approach on an exact `YYYY-MM-DD` date.
    pub fn approach_on(&self, date: &str) -> Result<&CloseApproach, FeedError> {
        self.close_approach_data
            .iter()
            .find(|a| a.close_approach_date == date)
            .ok_or_else(|| FeedError::NoApproachOn {
                id: self.id.clone(),
                date: date.to_string(),
            })
    }

    pub fn profile_inputs(&self, approach: &CloseApproach) -> ProfileInputs {
        let range = self.estimated_diameter.kilometers;
        ProfileInputs {
            diameter_min_km: range.estimated_diameter_min,
            diameter_max_km: range.estimated_diameter_max,
            velocity_kmh: approach.relative_velocity.kilometers_per_hour,
            distance_km: approach.miss_distance.kilometers,
        }
    }
}

pub fn parse_neo(json: &str) -> Result<NeoRecord, FeedError> {
    let record: NeoRecord = serde_json::from_str(json)?;
    debug!(id = %record.id, approaches = record.close_approach_data.len(), "parsed NEO record");
    Ok(record)
}

pub fn parse_feed(json: &str) -> Result<FeedPage, FeedError> {
    let page: FeedPage = serde_json::from_str(json)?;
    debug!(days = page.near_earth_objects.len(), "parsed feed page");
    Ok(page)
}

/// Read a lookup record saved to disk.
pub fn read_neo_file<P: AsRef<Path>>(path: P) -> Result<NeoRecord, FeedError> {
    let mut contents = String::new();
    BufReader::new(File::open(path)?).read_to_string(&mut contents)?;
    parse_neo(&contents)
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(v) => Ok(v),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
