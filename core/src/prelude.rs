use serde::{Deserialize, Serialize};

use crate::survey::MeasurementRecord;

/// Distance thresholds shared by the reduction stage and segment derivation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReducerConfig {
    /// Points closer than this to the last kept point are duplicates.
    pub dedup_threshold_km: f64,
    /// Consecutive survivors closer than this are drawn as one track.
    pub connect_threshold_km: f64,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            dedup_threshold_km: 0.005,
            connect_threshold_km: 0.01,
        }
    }
}

/// Input payload for a processing stage.
#[derive(Debug, Clone, Default)]
pub struct StageInput {
    pub records: Vec<MeasurementRecord>,
}

impl StageInput {
    pub fn new(records: Vec<MeasurementRecord>) -> Self {
        Self { records }
    }
}

/// Output produced by each stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub records: Vec<MeasurementRecord>,
    pub metadata: StageMetadata,
}

/// Metadata used for chaining stages and telemetry.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub dropped: usize,
    /// One flag per consecutive pair of output records, set by the reducer.
    pub connections: Option<Vec<bool>>,
    pub notes: Vec<String>,
}

/// Common error type for stage execution.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// A single step over the ordered record sequence.
///
/// Stages never reorder records; they only drop them or annotate the output.
pub trait ProcessingStage {
    fn name(&self) -> &'static str;
    fn execute(&self, input: StageInput) -> StageResult<StageOutput>;
}
