use crate::prelude::{ProcessingStage, StageInput, StageMetadata, StageOutput, StageResult};
use crate::signal::Technology;
use crate::survey::{Filters, MeasurementRecord};
use crate::telemetry::log::LogManager;

/// One attribute filter over the record sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterStage {
    Technology(Technology),
    Operator(String),
    CellId(f64),
}

impl FilterStage {
    /// The stages for `filters`, in application order: technology, operator, cell.
    pub fn chain(filters: &Filters) -> Vec<FilterStage> {
        let mut stages = Vec::with_capacity(3);
        if let Some(tech) = &filters.technology {
            stages.push(FilterStage::Technology(tech.clone()));
        }
        if let Some(operator) = &filters.operator {
            stages.push(FilterStage::Operator(operator.clone()));
        }
        if let Some(cell_id) = filters.cell_id {
            stages.push(FilterStage::CellId(cell_id));
        }
        stages
    }

    pub fn matches(&self, record: &MeasurementRecord) -> bool {
        match self {
            FilterStage::Technology(tech) => record.technology.as_ref() == Some(tech),
            FilterStage::Operator(operator) => record.operator.as_ref() == Some(operator),
            FilterStage::CellId(cell_id) => record.cell_id == Some(*cell_id),
        }
    }
}

impl ProcessingStage for FilterStage {
    fn name(&self) -> &'static str {
        match self {
            FilterStage::Technology(_) => "technology-filter",
            FilterStage::Operator(_) => "operator-filter",
            FilterStage::CellId(_) => "cell-filter",
        }
    }

    fn execute(&self, input: StageInput) -> StageResult<StageOutput> {
        let before = input.records.len();
        let records: Vec<MeasurementRecord> = input
            .records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect();
        let dropped = before - records.len();

        LogManager::new(self.name())
            .detail(&format!("kept {} of {} records", records.len(), before));

        Ok(StageOutput {
            records,
            metadata: StageMetadata {
                dropped,
                ..Default::default()
            },
        })
    }
}
