/// Mean Earth radius used for all distance calculations, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two points given in degrees.
///
/// Total: any non-finite coordinate yields `f64::INFINITY`, so an unusable pair
/// always counts as far apart. The haversine term is clamped so rounding near
/// identical or antipodal points cannot produce a NaN.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if ![lat1, lon1, lat2, lon2].iter().all(|c| c.is_finite()) {
        return f64::INFINITY;
    }

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let d_lat = lat2_rad - lat1_rad;
    let d_lon = lon2.to_radians() - lon1.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (d_lon / 2.0).sin().powi(2);
    if a < 0.0 {
        return 0.0;
    }
    if !(a <= 1.0) {
        return f64::INFINITY;
    }

    2.0 * a.sqrt().asin() * EARTH_RADIUS_KM
}
