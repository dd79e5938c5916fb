//! Satellite active-fire detections (FIRMS area CSV)
//!
//! Only four columns are read: latitude (1), longitude (2), acquisition date
//! (6) and confidence (10). Rows that are too short or carry unparsable
//! coordinates are skipped.

use crate::core_types::geo::{geo_point, GeoPoint};
use crate::error::SimulationError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const LAT_COLUMN: usize = 1;
const LNG_COLUMN: usize = 2;
const DATE_COLUMN: usize = 6;
const CONFIDENCE_COLUMN: usize = 10;
const MIN_COLUMNS: usize = 4;

const UNKNOWN_DATE: &str = "unknown date";

/// One detected fire, drawn next to the simulated fronts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFire {
    pub lat: f64,
    pub lng: f64,
    /// Acquisition date as reported by the feed
    pub date: String,
    /// Confidence as reported by the feed (`l`/`n`/`h` or a percentage)
    pub confidence: Option<String>,
}

impl ReferenceFire {
    pub fn position(&self) -> GeoPoint {
        geo_point(self.lat, self.lng)
    }
}

/// Parse the CSV body of a FIRMS area query. The first row is a header.
pub fn parse_firms_csv(text: &str) -> Vec<ReferenceFire> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.trim().as_bytes());

    let mut fires = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable detection row {}: {}", row + 1, e);
                continue;
            }
        };
        if record.len() < MIN_COLUMNS {
            warn!("Skipping short detection row {} ({} columns): {:?}", row + 1, record.len(), record);
            continue;
        }

        let coordinate = |column: usize| {
            record
                .get(column)
                .and_then(|field| field.parse::<f64>().ok())
                .filter(|value| !value.is_nan())
        };
        let (Some(lat), Some(lng)) = (coordinate(LAT_COLUMN), coordinate(LNG_COLUMN)) else {
            warn!("Skipping detection row {} with invalid coordinates: {:?}", row + 1, record);
            continue;
        };

        fires.push(ReferenceFire {
            lat,
            lng,
            date: record
                .get(DATE_COLUMN)
                .filter(|date| !date.is_empty())
                .unwrap_or(UNKNOWN_DATE)
                .to_owned(),
            confidence: record.get(CONFIDENCE_COLUMN).map(str::to_owned),
        });
    }

    debug!("Parsed {} reference fires", fires.len());
    fires
}

/// Read and parse a FIRMS CSV file
///
/// # Errors
/// Returns `SimulationError::Io` if the file cannot be read.
pub fn load_firms_csv<P: AsRef<Path>>(path: P) -> Result<Vec<ReferenceFire>, SimulationError> {
    Ok(parse_firms_csv(&fs::read_to_string(path)?))
}
