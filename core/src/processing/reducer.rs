use crate::prelude::{
    ProcessingStage, ReducerConfig, StageInput, StageMetadata, StageOutput, StageResult,
};
use crate::survey::MeasurementRecord;
use crate::telemetry::log::LogManager;

/// Survivors of a reduction pass and the connectivity between neighbours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReducedTrack {
    pub survivors: Vec<MeasurementRecord>,
    /// `connections[i]` joins `survivors[i]` and `survivors[i + 1]`.
    pub connections: Vec<bool>,
}

/// Greedy forward filter that collapses repeated measurements of one spot.
///
/// Each record is compared with the last record that was kept, never with the
/// raw predecessor, so a slow drift of sub-threshold hops collapses into a
/// single survivor. Records must arrive in trajectory order.
pub struct ProximityReducer {
    config: ReducerConfig,
    logger: LogManager,
}

impl ProximityReducer {
    pub fn new(config: ReducerConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("proximity-reducer"),
        }
    }

    pub fn reduce(&self, records: Vec<MeasurementRecord>) -> ReducedTrack {
        let threshold = self.config.dedup_threshold_km;
        let survivors = records
            .into_iter()
            .fold(Vec::new(), |mut kept: Vec<MeasurementRecord>, record| {
                let duplicate = kept
                    .last()
                    .is_some_and(|last| last.position.distance_km(&record.position) < threshold);
                if !duplicate {
                    kept.push(record);
                }
                kept
            });
        let connections = connections(&survivors, self.config.connect_threshold_km);
        ReducedTrack {
            survivors,
            connections,
        }
    }
}

/// Flags each consecutive pair that lies closer than `threshold_km`.
pub fn connections(records: &[MeasurementRecord], threshold_km: f64) -> Vec<bool> {
    records
        .windows(2)
        .map(|pair| pair[0].position.distance_km(&pair[1].position) < threshold_km)
        .collect()
}

impl ProcessingStage for ProximityReducer {
    fn name(&self) -> &'static str {
        "proximity-reducer"
    }

    fn execute(&self, input: StageInput) -> StageResult<StageOutput> {
        let before = input.records.len();
        let track = self.reduce(input.records);
        let dropped = before - track.survivors.len();
        let linked = track.connections.iter().filter(|c| **c).count();

        self.logger.record(&format!(
            "kept {} of {} records, {} connected segments",
            track.survivors.len(),
            before,
            linked
        ));

        Ok(StageOutput {
            records: track.survivors,
            metadata: StageMetadata {
                dropped,
                connections: Some(track.connections),
                notes: vec![format!(
                    "dedup threshold {:.3} km",
                    self.config.dedup_threshold_km
                )],
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;

    fn at(latitude: f64, longitude: f64) -> MeasurementRecord {
        MeasurementRecord {
            position: GeoPoint::new(latitude, longitude),
            signal_strength: None,
            technology: None,
            cell_id: None,
            operator: None,
        }
    }

    fn reducer() -> ProximityReducer {
        ProximityReducer::new(ReducerConfig::default())
    }

    // 0.00002 degrees of latitude is about 2.2 m.
    const HOP: f64 = 0.00002;

    #[test]
    fn empty_input_yields_nothing() {
        let track = reducer().reduce(Vec::new());
        assert!(track.survivors.is_empty());
        assert!(track.connections.is_empty());
    }

    #[test]
    fn first_record_always_survives() {
        let track = reducer().reduce(vec![at(45.0, 21.0)]);
        assert_eq!(track.survivors, vec![at(45.0, 21.0)]);
        assert!(track.connections.is_empty());
    }

    #[test]
    fn identical_points_collapse() {
        let track = reducer().reduce(vec![at(45.0, 21.0), at(45.0, 21.0), at(45.0, 21.0)]);
        assert_eq!(track.survivors.len(), 1);
    }

    #[test]
    fn compares_against_last_kept_not_previous() {
        // 0, 2.2 m, 4.4 m, 6.7 m: only the fourth is 5 m from the first.
        let records: Vec<_> = (0..4).map(|i| at(45.0 + HOP * i as f64, 21.0)).collect();
        let track = reducer().reduce(records.clone());
        assert_eq!(track.survivors, vec![records[0].clone(), records[3].clone()]);
    }

    #[test]
    fn slow_drift_collapses_to_one_survivor() {
        // Each hop is compared with the first point until the drift passes 5 m.
        let records: Vec<_> = (0..3).map(|i| at(45.0 + HOP * i as f64, 21.0)).collect();
        let track = reducer().reduce(records);
        assert_eq!(track.survivors.len(), 1);
    }

    #[test]
    fn reduction_is_idempotent() {
        let records: Vec<_> = (0..40)
            .map(|i| at(45.0 + HOP * (i as f64) * 1.7, 21.0 + HOP * ((i % 5) as f64)))
            .collect();
        let once = reducer().reduce(records);
        let twice = reducer().reduce(once.survivors.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn connections_respect_ten_metre_threshold() {
        // ~6.7 m apart: kept and connected. ~111 m further: kept, not connected.
        let records = vec![
            at(45.0, 21.0),
            at(45.0 + 3.0 * HOP, 21.0),
            at(45.001 + 3.0 * HOP, 21.0),
        ];
        let track = reducer().reduce(records);
        assert_eq!(track.survivors.len(), 3);
        assert_eq!(track.connections, vec![true, false]);
    }

    #[test]
    fn thresholds_are_exclusive_at_the_exact_distance() {
        let first = at(45.0, 21.0);
        let second = at(45.00004, 21.0);
        let d = first.position.distance_km(&second.position);
        assert!((d - 0.004_447_797).abs() < 1e-9, "got {d}");

        let reducer = ProximityReducer::new(ReducerConfig {
            dedup_threshold_km: d,
            connect_threshold_km: d,
        });
        let track = reducer.reduce(vec![first, second]);
        assert_eq!(track.survivors.len(), 2);
        assert_eq!(track.connections, vec![false]);
    }

    #[test]
    fn stage_reports_connections_in_metadata() {
        let output = reducer()
            .execute(StageInput::new(vec![at(45.0, 21.0), at(45.0, 21.0), at(46.0, 21.0)]))
            .unwrap();
        assert_eq!(output.records.len(), 2);
        assert_eq!(output.metadata.dropped, 1);
        assert_eq!(output.metadata.connections, Some(vec![false]));
    }
}
