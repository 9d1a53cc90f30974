pub mod filter;
pub mod pipeline;
pub mod reducer;

pub use filter::FilterStage;
pub use pipeline::{PipelineOutput, SurveyPipeline};
pub use reducer::{ProximityReducer, ReducedTrack};
