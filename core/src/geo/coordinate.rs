use serde::{Deserialize, Serialize};

/// Number of leading digits that form the integer part of an exported coordinate.
const INTEGER_DIGITS: usize = 2;

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a point from two raw export cells; `None` if either cell is unusable.
    pub fn from_raw(latitude: &str, longitude: &str) -> Option<Self> {
        Some(Self::new(
            normalize_coordinate(latitude)?,
            normalize_coordinate(longitude)?,
        ))
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        super::distance::haversine_km(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Repairs a coordinate from the survey export format.
///
/// The exporter writes coordinates as bare digit strings with the decimal point
/// implied after the first two digits (`"457555"` is `45.7555`). Separators that
/// sometimes leak into the export (`,` and `.`) are removed before the point is
/// re-inserted. Anything that is not all digits afterwards, or that has no
/// fractional digits, is rejected. Negative coordinates and coordinates with one or
/// three integer digits cannot be represented and are dropped, not guessed.
pub fn normalize_coordinate(raw: &str) -> Option<f64> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '.')
        .collect();

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() <= INTEGER_DIGITS {
        return None;
    }

    let (whole, fraction) = digits.split_at(INTEGER_DIGITS);
    format!("{whole}.{fraction}").parse::<f64>().ok()
}
