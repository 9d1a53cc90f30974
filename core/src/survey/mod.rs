pub mod context;
pub mod record;
pub mod source;

pub use context::{FilterParams, Filters, RequestContext, Warning};
pub use record::MeasurementRecord;
pub use source::{RawRecord, SourceError, SourceTable};
