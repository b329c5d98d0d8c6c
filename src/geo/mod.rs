use crate::models::location::{GeoPoint, Located};

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Average urban van speed used to estimate straight-line leg durations.
pub const URBAN_SPEED_KMH: f64 = 25.0;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Flat-earth distance in degrees. Only meaningful at city scale.
pub fn planar_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let delta_lat = a.lat - b.lat;
    let delta_lng = a.lng - b.lng;
    (delta_lat * delta_lat + delta_lng * delta_lng).sqrt()
}

/// Returns the item closest to `point` by planar distance, together with
/// that distance. Ties keep the earliest item.
pub fn nearest<'a, T: Located>(point: &GeoPoint, items: &'a [T]) -> Option<(&'a T, f64)> {
    let mut best: Option<(&T, f64)> = None;

    for item in items {
        let distance = planar_distance(point, &item.location());
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((item, distance)),
        }
    }

    best
}

pub fn centroid(points: &[GeoPoint]) -> Option<GeoPoint> {
    if points.is_empty() {
        return None;
    }

    let count = points.len() as f64;
    let (lat_sum, lng_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));

    Some(GeoPoint::new(lat_sum / count, lng_sum / count))
}

pub fn minutes_at_urban_speed(distance_km: f64) -> f64 {
    distance_km / URBAN_SPEED_KMH * 60.0
}
