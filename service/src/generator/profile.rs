use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use signalcore::geo::GeoPoint;
use signalcore::DEFAULT_CENTER;
use std::path::Path;

/// Metres per degree of latitude on the 6371 km sphere.
const METRES_PER_DEGREE: f64 = 111_195.0;

/// Configuration for generating a synthetic drive-test export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    pub points: usize,
    pub seed: u64,
    pub start: GeoPoint,
    /// Distance travelled between two measurements.
    pub step_m: f64,
    pub jitter_m: f64,
    /// Chance that a measurement repeats the previous position (vehicle stopped).
    pub repeat_probability: f64,
    /// Chance that a row carries an unusable coordinate.
    pub malformed_probability: f64,
    pub operators: Vec<String>,
    pub technologies: Vec<String>,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            points: 500,
            seed: 0,
            start: DEFAULT_CENTER,
            step_m: 6.0,
            jitter_m: 1.5,
            repeat_probability: 0.2,
            malformed_probability: 0.02,
            operators: vec!["Orange".into(), "Vodafone".into(), "Telekom".into()],
            technologies: vec!["LTE".into(), "NR".into(), "WCDMA".into(), "GSM".into()],
        }
    }
}

impl SurveyConfig {
    fn validate(&self) -> anyhow::Result<()> {
        for (name, p) in [
            ("repeat_probability", self.repeat_probability),
            ("malformed_probability", self.malformed_probability),
        ] {
            anyhow::ensure!((0.0..=1.0).contains(&p), "{name} must lie in [0, 1]");
        }
        anyhow::ensure!(
            self.step_m >= 0.0 && self.jitter_m >= 0.0,
            "step and jitter must not be negative"
        );
        for (name, value) in [
            ("latitude", self.start.latitude),
            ("longitude", self.start.longitude),
        ] {
            anyhow::ensure!(
                (10.0..100.0).contains(&value),
                "start {name} {value} cannot be written with two integer digits"
            );
        }
        anyhow::ensure!(
            !self.operators.is_empty() && !self.technologies.is_empty(),
            "at least one operator and one technology are required"
        );
        Ok(())
    }
}

/// One row of the export, with every cell written as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyRow {
    pub lat: String,
    pub long: String,
    pub rssi: String,
    pub tech: String,
    pub psc_pci: String,
    pub net_op_name: String,
}

/// Writes a coordinate the way the field exporter does: digits only, with the
/// decimal point implied after the second digit. Only values in [10, 100) fit.
pub fn encode_coordinate(value: f64) -> String {
    format!("{value:.6}").replace('.', "")
}

fn offset(rng: &mut StdRng, spread: f64) -> f64 {
    if spread > 0.0 {
        rng.gen_range(-spread..spread)
    } else {
        0.0
    }
}

pub fn build_survey(config: &SurveyConfig) -> anyhow::Result<Vec<SurveyRow>> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut rows = Vec::with_capacity(config.points);
    let mut position = config.start;
    let mut heading: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
    let mut rssi: f64 = -85.0;
    let mut operator = &config.operators[0];
    let mut tech = &config.technologies[0];
    let mut cell_id: u32 = rng.gen_range(1..504);

    for index in 0..config.points {
        if index % 50 == 0 {
            operator = &config.operators[rng.gen_range(0..config.operators.len())];
            tech = &config.technologies[rng.gen_range(0..config.technologies.len())];
            cell_id = rng.gen_range(1..504);
        }

        if index > 0 && !rng.gen_bool(config.repeat_probability) {
            heading += offset(&mut rng, 0.3);
            let step = config.step_m + offset(&mut rng, config.jitter_m);
            let north = step * heading.cos() / METRES_PER_DEGREE;
            let east = step * heading.sin()
                / (METRES_PER_DEGREE * position.latitude.to_radians().cos());
            position = GeoPoint::new(position.latitude + north, position.longitude + east);
        }

        rssi = (rssi + offset(&mut rng, 4.0)).clamp(-135.0, -50.0);

        let (lat, long) = if rng.gen_bool(config.malformed_probability) {
            ("45".to_string(), String::new())
        } else {
            (
                encode_coordinate(position.latitude),
                encode_coordinate(position.longitude),
            )
        };

        rows.push(SurveyRow {
            lat,
            long,
            rssi: format!("{rssi:.0}"),
            tech: tech.clone(),
            psc_pci: cell_id.to_string(),
            net_op_name: operator.clone(),
        });
    }

    Ok(rows)
}

pub fn write_survey<P: AsRef<Path>>(path: P, rows: &[SurveyRow]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating survey file {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("writing survey file {}", path.display()))?;
    }
    writer.flush().context("flushing survey file")?;
    Ok(())
}
