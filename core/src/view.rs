//! Presentation-ready result of one request.
//!
//! `build_map_view` is the boundary of the core: whatever goes wrong while
//! loading or processing ends up as a message on an empty view, never as an
//! error returned to the caller.

use serde::Serialize;

use crate::geo::{GeoPoint, StatsHelper};
use crate::processing::{PipelineOutput, SurveyPipeline};
use crate::signal::SignalTier;
use crate::survey::{
    FilterParams, MeasurementRecord, RequestContext, SourceError, SourceTable, Warning,
};

/// Map centre used when there is nothing better to show (Timișoara).
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    latitude: 45.7555,
    longitude: 21.2255,
};

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    Ok,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointView {
    pub latitude: f64,
    pub longitude: f64,
    pub signal_strength: Option<f64>,
    pub tier: SignalTier,
    pub color: &'static str,
    pub technology: String,
    pub cell_id: String,
    pub operator: String,
}

impl From<&MeasurementRecord> for PointView {
    fn from(record: &MeasurementRecord) -> Self {
        let tier = record.tier();
        Self {
            latitude: record.position.latitude,
            longitude: record.position.longitude,
            signal_strength: record.signal_strength,
            tier,
            color: tier.color(),
            technology: record
                .technology
                .as_ref()
                .map_or_else(|| NOT_AVAILABLE.to_string(), |tech| tech.to_string()),
            cell_id: record
                .cell_id_display()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            operator: record
                .operator
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

/// Link between `points[from]` and `points[to]`; drawn only when `connected`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentView {
    pub from: usize,
    pub to: usize,
    pub connected: bool,
    pub color: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewStats {
    pub rows_read: usize,
    pub filtered: usize,
    pub survivors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub status: ViewStatus,
    pub points: Vec<PointView>,
    pub segments: Vec<SegmentView>,
    pub operators: Vec<String>,
    pub center: GeoPoint,
    pub filters: FilterParams,
    pub stats: ViewStats,
    pub message: Option<String>,
}

impl MapView {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Runs one request against `source` and shapes the result for display.
pub fn build_map_view(
    source: Result<&SourceTable, &SourceError>,
    params: &FilterParams,
    pipeline: &SurveyPipeline,
    fallback_center: GeoPoint,
) -> MapView {
    let table = source.ok();
    let ctx = RequestContext::new(params, table);
    let mut warnings: Vec<Warning> = ctx.warnings().to_vec();
    let mut errors: Vec<String> = Vec::new();
    let mut output = PipelineOutput::default();

    match source {
        Err(err) if !err.is_fatal() => warnings.push(Warning::EmptySource),
        Err(err) => errors.push(err.to_string()),
        Ok(table) => {
            if table.is_empty() {
                warnings.push(Warning::EmptySource);
            }
            match pipeline.run(table, &ctx) {
                Ok(result) => output = result,
                Err(err) => errors.push(format!("processing failed: {err}")),
            }
        }
    }

    let survivors = &output.track.survivors;
    if survivors.is_empty() && ctx.filters_applied() && errors.is_empty() && warnings.is_empty() {
        warnings.push(Warning::NoMatches);
    }

    let center = if survivors.is_empty() || !ctx.filters_applied() {
        fallback_center
    } else {
        StatsHelper::centroid(survivors.iter().map(|record| &record.position))
            .unwrap_or(fallback_center)
    };

    let points: Vec<PointView> = survivors.iter().map(PointView::from).collect();
    let segments = output
        .track
        .connections
        .iter()
        .enumerate()
        .map(|(index, connected)| SegmentView {
            from: index,
            to: index + 1,
            connected: *connected,
            color: points[index].color,
        })
        .collect();

    let status = if !errors.is_empty() {
        ViewStatus::Error
    } else if !warnings.is_empty() {
        ViewStatus::Warning
    } else {
        ViewStatus::Ok
    };
    let message = errors
        .iter()
        .map(|err| format!("Error: {err}."))
        .chain(warnings.iter().map(|warning| format!("Warning: {warning}.")))
        .collect::<Vec<_>>()
        .join(" ");

    MapView {
        status,
        stats: ViewStats {
            rows_read: output.rows_read,
            filtered: output.filtered,
            survivors: points.len(),
        },
        points,
        segments,
        operators: ctx.operators().to_vec(),
        center,
        filters: ctx.effective_params(),
        message: (!message.is_empty()).then_some(message),
    }
}
