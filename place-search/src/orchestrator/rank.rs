//! Distance ranking.

use crate::geo::haversine_km;
use crate::types::PlaceRecord;

/// Sort records nearest-first from `(latitude, longitude)`.
///
/// Each record gets `distance_from_query_km` attached; an existing finite
/// distance is reused rather than recomputed. The sort is stable, so
/// equidistant records keep their input order.
pub fn rank(records: Vec<PlaceRecord>, latitude: f64, longitude: f64) -> Vec<PlaceRecord> {
    let mut ranked: Vec<(f64, PlaceRecord)> = records
        .into_iter()
        .map(|mut record| {
            let distance = record
                .distance_from_query_km
                .filter(|d| d.is_finite())
                .unwrap_or_else(|| {
                    haversine_km(latitude, longitude, record.latitude, record.longitude)
                });
            record.distance_from_query_km = Some(distance);
            (distance, record)
        })
        .collect();

    ranked.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    ranked.into_iter().map(|(_, record)| record).collect()
}
