use serde::{Serialize, Serializer};
use std::fmt;

/// Radio access technology of a measurement.
///
/// Vendor names are folded into generations; anything unrecognised is kept
/// upper-cased so it can still be displayed and matched exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Technology {
    Gen2,
    Gen3,
    Gen4,
    Gen5,
    Other(String),
}

impl Technology {
    /// Canonicalises a raw cell value. Blank input is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().to_uppercase();
        let tech = match value.as_str() {
            "" => return None,
            "2G" | "GSM" => Technology::Gen2,
            "3G" | "WCDMA" | "UMTS" => Technology::Gen3,
            "4G" | "LTE" => Technology::Gen4,
            "5G" | "NR" => Technology::Gen5,
            _ => Technology::Other(value),
        };
        Some(tech)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Technology::Gen2 => "2G",
            Technology::Gen3 => "3G",
            Technology::Gen4 => "4G",
            Technology::Gen5 => "5G",
            Technology::Other(name) => name,
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Technology {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
