use serde::Serialize;
use signalcore::telemetry::MetricsSnapshot;

use crate::workflow::runner::Runner;

#[derive(Debug, Clone, Serialize)]
pub struct OperatorList {
    pub operators: Vec<String>,
}

/// Reply of `GET /status`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub source: String,
    pub cached: bool,
    pub metrics: MetricsSnapshot,
}

impl ServiceStatus {
    pub fn from_runner(runner: &Runner) -> Self {
        Self {
            source: runner.config().source.display().to_string(),
            cached: runner.is_cached(),
            metrics: runner.metrics(),
        }
    }
}
