use crate::workflow::config::ServiceConfig;
use log::{info, warn};
use signalcore::processing::SurveyPipeline;
use signalcore::survey::{FilterParams, SourceTable};
use signalcore::telemetry::{MetricsRecorder, MetricsSnapshot};
use signalcore::view::{build_map_view, MapView, ViewStatus};
use std::sync::Arc;

/// Executes map requests against the configured survey export.
///
/// Cheap to clone; clones share the pipeline, the cached table and the metrics.
#[derive(Clone)]
pub struct Runner {
    config: ServiceConfig,
    pipeline: Arc<SurveyPipeline>,
    cached: Option<Arc<SourceTable>>,
    metrics: Arc<MetricsRecorder>,
}

impl Runner {
    pub fn new(config: ServiceConfig) -> Self {
        let cached = if config.cache_source {
            match SourceTable::from_path(&config.source) {
                Ok(table) => {
                    info!(
                        "cached {} rows from {}",
                        table.len(),
                        config.source.display()
                    );
                    Some(Arc::new(table))
                }
                Err(err) => {
                    warn!("source not cached, reading per request instead: {}", err);
                    None
                }
            }
        } else {
            None
        };

        Self {
            pipeline: Arc::new(SurveyPipeline::new(config.reducer)),
            config,
            cached,
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    pub fn execute(&self, params: &FilterParams) -> MapView {
        let loaded;
        let source = match &self.cached {
            Some(table) => Ok(table.as_ref()),
            None => {
                loaded = SourceTable::from_path(&self.config.source);
                loaded.as_ref()
            }
        };

        let view = build_map_view(source, params, &self.pipeline, self.config.fallback_center);

        if view.status == ViewStatus::Error {
            self.metrics.record_error();
        }
        self.metrics
            .record_request(view.stats.rows_read, view.stats.survivors);
        match &view.message {
            Some(message) => warn!(
                "request {:?} -> {} points ({})",
                params,
                view.points.len(),
                message
            ),
            None => info!("request {:?} -> {} points", params, view.points.len()),
        }
        view
    }

    /// Operator names available for filtering; empty when the source is unusable.
    pub fn operators(&self) -> Vec<String> {
        match &self.cached {
            Some(table) => table.operators(),
            None => SourceTable::from_path(&self.config.source)
                .map(|table| table.operators())
                .unwrap_or_default(),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
