//! Normalisation and proximity-reduction core for the signal survey map.
//!
//! Raw survey exports are loaded as text, coerced into typed measurement
//! records, filtered by the request's attributes and thinned into a track of
//! points that are at least a few metres apart.

pub mod geo;
pub mod prelude;
pub mod processing;
pub mod signal;
pub mod survey;
pub mod telemetry;
pub mod view;

pub use prelude::{ProcessingStage, ReducerConfig, StageInput, StageOutput};
pub use view::{build_map_view, MapView, DEFAULT_CENTER};
