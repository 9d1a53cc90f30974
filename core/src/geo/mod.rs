pub mod coordinate;
pub mod distance;
pub mod stats;

pub use coordinate::{normalize_coordinate, GeoPoint};
pub use distance::haversine_km;
pub use stats::StatsHelper;
