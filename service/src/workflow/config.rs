use anyhow::Context;
use serde::{Deserialize, Serialize};
use signalcore::geo::GeoPoint;
use signalcore::{ReducerConfig, DEFAULT_CENTER};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Survey export read on every request (or once, with `cache_source`).
    pub source: PathBuf,
    pub bind: SocketAddr,
    pub fallback_center: GeoPoint,
    pub reducer: ReducerConfig,
    /// Load the export once at start-up and share it between requests.
    pub cache_source: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("date_procesate_optim.csv"),
            bind: SocketAddr::from(([127, 0, 0, 1], 5001)),
            fallback_center: DEFAULT_CENTER,
            reducer: ReducerConfig::default(),
            cache_source: false,
        }
    }
}

impl ServiceConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading service config {}", path_ref.display()))?;
        let config: ServiceConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing service config {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_source<P: Into<PathBuf>>(mut self, source: P) -> Self {
        self.source = source.into();
        self
    }

    fn validate(&self) -> anyhow::Result<()> {
        let reducer = &self.reducer;
        anyhow::ensure!(
            reducer.dedup_threshold_km >= 0.0 && reducer.connect_threshold_km >= 0.0,
            "reducer thresholds must not be negative"
        );
        Ok(())
    }
}
