use super::coordinate::GeoPoint;

pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        mean.is_finite().then_some(mean)
    }

    /// Arithmetic mean of latitudes and longitudes; `None` for an empty set.
    pub fn centroid<'a, I>(points: I) -> Option<GeoPoint>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let (lats, lons): (Vec<f64>, Vec<f64>) = points
            .into_iter()
            .map(|p| (p.latitude, p.longitude))
            .unzip();
        Some(GeoPoint::new(Self::mean(&lats)?, Self::mean(&lons)?))
    }
}
