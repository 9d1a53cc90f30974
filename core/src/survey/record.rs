use crate::geo::GeoPoint;
use crate::signal::{SignalTier, Technology};
use crate::survey::source::{columns, RawRecord};

/// A measurement with typed fields and a validated position.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    pub position: GeoPoint,
    pub signal_strength: Option<f64>,
    pub technology: Option<Technology>,
    pub cell_id: Option<f64>,
    pub operator: Option<String>,
}

impl MeasurementRecord {
    /// Coerces a raw row. Only an unusable position rejects the row; every other
    /// field degrades to `None` on its own.
    pub fn from_raw(raw: &RawRecord<'_>) -> Option<Self> {
        let position = GeoPoint::from_raw(
            raw.get(columns::LATITUDE)?,
            raw.get(columns::LONGITUDE)?,
        )?;

        Some(Self {
            position,
            signal_strength: raw.get(columns::SIGNAL).and_then(parse_numeric),
            technology: raw.get(columns::TECHNOLOGY).and_then(Technology::parse),
            cell_id: raw.get(columns::CELL_ID).and_then(parse_numeric),
            operator: raw
                .get(columns::OPERATOR)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        })
    }

    pub fn tier(&self) -> SignalTier {
        SignalTier::classify(self.signal_strength)
    }

    /// Cell identifier rendered as an integer, the way it is printed on site.
    pub fn cell_id_display(&self) -> Option<String> {
        self.cell_id.map(|id| {
            if id.is_finite() && id.abs() < i64::MAX as f64 {
                (id.trunc() as i64).to_string()
            } else {
                format!("{id:.0}")
            }
        })
    }
}

/// Lenient numeric coercion: blank or non-numeric text is `None`, never an error.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| !value.is_nan())
}
