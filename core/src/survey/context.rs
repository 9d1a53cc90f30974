use serde::{Deserialize, Serialize};

use crate::signal::Technology;
use crate::survey::record::parse_numeric;
use crate::survey::source::{columns, SourceTable};

/// Keyword that disables the technology and operator filters.
pub const ALL: &str = "ALL";

/// Filter values exactly as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub tech: String,
    pub operator: String,
    pub psc_pci: String,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            tech: ALL.to_string(),
            operator: ALL.to_string(),
            psc_pci: String::new(),
        }
    }
}

/// Parsed filters; `None` means the filter is not applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub technology: Option<Technology>,
    pub operator: Option<String>,
    pub cell_id: Option<f64>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.technology.is_none() && self.operator.is_none() && self.cell_id.is_none()
    }
}

/// Non-fatal conditions surfaced alongside a (possibly empty) result.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Warning {
    #[error("the PSC/PCI value '{0}' is not a valid number; the PSC/PCI filter is not applied")]
    InvalidCellFilter(String),
    #[error("column '{column}' is missing; filtering by {filter} is not possible")]
    MissingFilterColumn {
        column: &'static str,
        filter: &'static str,
    },
    #[error("the data file contains no rows")]
    EmptySource,
    #[error("no data found for the selected filters")]
    NoMatches,
}

/// Everything derived from one request before any record is touched.
///
/// Built once per invocation and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RequestContext {
    filters: Filters,
    /// Whether the caller asked for any usable filter, even one later disabled
    /// because the source lacks its column.
    requested: bool,
    operators: Vec<String>,
    warnings: Vec<Warning>,
}

impl RequestContext {
    /// Parses the filter parameters against the columns `table` offers. Without
    /// a table only the parameter values themselves are validated.
    pub fn new(params: &FilterParams, table: Option<&SourceTable>) -> Self {
        let mut warnings = Vec::new();

        // Generation names are matched as such; anything else is compared verbatim
        // against the canonical data values, so a vendor name like LTE matches nothing.
        let tech = params.tech.trim().to_uppercase();
        let mut technology = match tech.as_str() {
            "" | ALL => None,
            "2G" | "3G" | "4G" | "5G" => Technology::parse(&tech),
            _ => Some(Technology::Other(tech)),
        };

        let mut operator = (!params.operator.is_empty() && params.operator != ALL)
            .then(|| params.operator.clone());

        let cell_text = params.psc_pci.trim();
        let mut cell_id = None;
        if !cell_text.is_empty() {
            cell_id = parse_numeric(cell_text);
            if cell_id.is_none() {
                warnings.push(Warning::InvalidCellFilter(cell_text.to_string()));
            }
        }

        let requested = technology.is_some() || operator.is_some() || cell_id.is_some();

        let mut operators = Vec::new();
        if let Some(table) = table {
            let mut require = |wanted: bool, column: &'static str, filter: &'static str| {
                let missing = wanted && !table.has_column(column);
                if missing {
                    warnings.push(Warning::MissingFilterColumn { column, filter });
                }
                missing
            };
            if require(technology.is_some(), columns::TECHNOLOGY, "technology") {
                technology = None;
            }
            if require(cell_id.is_some(), columns::CELL_ID, "PSC/PCI") {
                cell_id = None;
            }
            if require(operator.is_some(), columns::OPERATOR, "operator") {
                operator = None;
            }
            operators = table.operators();
        }

        Self {
            filters: Filters {
                technology,
                operator,
                cell_id,
            },
            requested,
            operators,
            warnings,
        }
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn operators(&self) -> &[String] {
        &self.operators
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// True when the caller selected any valid filter, including one that had to be
    /// disabled for a missing column.
    pub fn filters_applied(&self) -> bool {
        self.requested
    }

    /// The filters in effect, in the same shape the caller sent them.
    pub fn effective_params(&self) -> FilterParams {
        FilterParams {
            tech: self
                .filters
                .technology
                .as_ref()
                .map_or_else(|| ALL.to_string(), |tech| tech.to_string()),
            operator: self
                .filters
                .operator
                .clone()
                .unwrap_or_else(|| ALL.to_string()),
            psc_pci: self
                .filters
                .cell_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }
}
