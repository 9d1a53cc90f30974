use crate::prelude::{ProcessingStage, ReducerConfig, StageError, StageInput, StageResult};
use crate::processing::filter::FilterStage;
use crate::processing::reducer::{ProximityReducer, ReducedTrack};
use crate::survey::source::columns;
use crate::survey::{MeasurementRecord, RequestContext, SourceTable};
use crate::telemetry::log::LogManager;

/// Result of one full pass over a source table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    pub rows_read: usize,
    /// Records left after coordinate validation and the attribute filters.
    pub filtered: usize,
    pub track: ReducedTrack,
}

/// Normalise, filter and reduce, in that order, preserving row order throughout.
pub struct SurveyPipeline {
    reducer: ProximityReducer,
    logger: LogManager,
}

impl SurveyPipeline {
    pub fn new(config: ReducerConfig) -> Self {
        Self {
            reducer: ProximityReducer::new(config),
            logger: LogManager::new("pipeline"),
        }
    }

    /// Coerces every row and drops those without a usable position.
    pub fn normalize(&self, table: &SourceTable) -> Vec<MeasurementRecord> {
        let records: Vec<MeasurementRecord> = table
            .rows()
            .filter_map(|row| MeasurementRecord::from_raw(&row))
            .collect();
        let rejected = table.len() - records.len();
        if records.is_empty() && rejected > 0 {
            self.logger
                .warn(&format!("none of {rejected} rows has a valid position"));
        } else if rejected > 0 {
            self.logger
                .detail(&format!("{rejected} rows without a valid position"));
        }
        records
    }

    /// Normalisation plus the attribute filters of `ctx`.
    pub fn process(
        &self,
        table: &SourceTable,
        ctx: &RequestContext,
    ) -> StageResult<Vec<MeasurementRecord>> {
        for column in columns::REQUIRED {
            if !table.has_column(column) {
                return Err(StageError::InvalidInput(format!(
                    "required column '{column}' is missing"
                )));
            }
        }

        let mut records = self.normalize(table);
        for stage in FilterStage::chain(ctx.filters()) {
            records = stage.execute(StageInput::new(records))?.records;
        }
        Ok(records)
    }

    pub fn run(&self, table: &SourceTable, ctx: &RequestContext) -> StageResult<PipelineOutput> {
        let records = self.process(table, ctx)?;
        let filtered = records.len();

        let output = self.reducer.execute(StageInput::new(records))?;
        let connections = output.metadata.connections.ok_or_else(|| {
            StageError::Internal("reducer produced no connection data".into())
        })?;
        if connections.len() != output.records.len().saturating_sub(1) {
            return Err(StageError::Internal(format!(
                "{} connections for {} survivors",
                connections.len(),
                output.records.len()
            )));
        }

        Ok(PipelineOutput {
            rows_read: table.len(),
            filtered,
            track: ReducedTrack {
                survivors: output.records,
                connections,
            },
        })
    }
}

impl Default for SurveyPipeline {
    fn default() -> Self {
        Self::new(ReducerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{SignalTier, Technology};
    use crate::survey::FilterParams;

    fn run(csv: &str, params: FilterParams) -> PipelineOutput {
        let table = SourceTable::from_reader(csv.as_bytes()).unwrap();
        let ctx = RequestContext::new(&params, Some(&table));
        SurveyPipeline::default().run(&table, &ctx).unwrap()
    }

    #[test]
    fn nearby_distinct_points_both_survive() {
        let output = run(
            "lat,long,rssi\n457555,212255,-80\n457556,212256,-90\n",
            FilterParams::default(),
        );
        let survivors = &output.track.survivors;
        assert_eq!(survivors.len(), 2);
        assert_eq!(survivors[0].tier(), SignalTier::Excellent);
        assert_eq!(survivors[1].tier(), SignalTier::Good);
        // The two points are about 13.6 m apart: past the 10 m link threshold.
        let gap = survivors[0].position.distance_km(&survivors[1].position);
        assert!(gap > 0.013 && gap < 0.014, "got {gap}");
        assert_eq!(output.track.connections, vec![false]);
    }

    #[test]
    fn repeated_position_keeps_only_the_first() {
        let output = run(
            "lat,long,rssi\n457555,212255,-80\n457555,212255,-120\n",
            FilterParams::default(),
        );
        assert_eq!(output.track.survivors.len(), 1);
        assert_eq!(output.track.survivors[0].signal_strength, Some(-80.0));
    }

    #[test]
    fn technology_filter_uses_aliases() {
        let params = FilterParams {
            tech: "4G".into(),
            ..Default::default()
        };
        let output = run(
            "lat,long,tech\n457555,212255,LTE\n457655,212355,GSM\n",
            params,
        );
        assert_eq!(output.filtered, 1);
        assert_eq!(output.track.survivors.len(), 1);
        assert_eq!(output.track.survivors[0].technology, Some(Technology::Gen4));
    }

    #[test]
    fn invalid_positions_are_dropped_before_reduction() {
        let output = run(
            "lat,long\n45,212255\n457555,212255\nabc,212255\n457655,212355\n",
            FilterParams::default(),
        );
        assert_eq!(output.rows_read, 4);
        assert_eq!(output.filtered, 2);
        assert_eq!(output.track.survivors.len(), 2);
    }

    #[test]
    fn filters_apply_in_sequence() {
        let params = FilterParams {
            tech: "3G".into(),
            operator: "Orange".into(),
            psc_pci: "301".into(),
        };
        let output = run(
            "lat,long,tech,net_op_name,psc_pci\n\
             457555,212255,UMTS,Orange,301\n\
             457655,212355,UMTS,Vodafone,301\n\
             457755,212455,UMTS,Orange,302\n\
             457855,212555,LTE,Orange,301\n\
             457955,212655,WCDMA,Orange,301.0\n",
            params,
        );
        assert_eq!(output.filtered, 2);
        assert_eq!(output.track.survivors.len(), 2);
    }

    #[test]
    fn row_order_is_preserved() {
        let output = run(
            "lat,long,rssi\n457955,212655,-1\n457555,212255,-2\n457755,212455,-3\n",
            FilterParams::default(),
        );
        let strengths: Vec<_> = output
            .track
            .survivors
            .iter()
            .map(|r| r.signal_strength.unwrap())
            .collect();
        assert_eq!(strengths, vec![-1.0, -2.0, -3.0]);
    }
}
