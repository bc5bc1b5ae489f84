//! Map marker derivation.
//!
//! A marker is emitted only for results carrying both coordinates with
//! non-zero values; anything else is silently excluded.

use serde_json::Value;

use crate::models::{Domain, MapMarker, SearchCandidate};

pub fn build_markers(candidates: &[&SearchCandidate]) -> Vec<MapMarker> {
    candidates.iter().filter_map(|c| marker_for(c)).collect()
}

fn marker_for(candidate: &SearchCandidate) -> Option<MapMarker> {
    let latitude = coordinate(&candidate.payload, "latitude")?;
    let longitude = coordinate(&candidate.payload, "longitude")?;
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }

    let extra_keys: &[&str] = match candidate.domain {
        Domain::Festival => &["address", "start_date", "end_date"],
        Domain::Attraction => &["address", "phone"],
        Domain::Restaurant => &["address", "phone"],
    };

    let mut extra = serde_json::Map::new();
    for key in extra_keys {
        if let Some(value) = candidate.payload.get(*key) {
            if !value.is_null() {
                extra.insert((*key).to_string(), value.clone());
            }
        }
    }

    Some(MapMarker {
        id: candidate.external_id.clone(),
        title: candidate.title.clone(),
        latitude,
        longitude,
        domain: candidate.domain,
        extra,
    })
}

fn coordinate(payload: &Value, key: &str) -> Option<f64> {
    payload.get(key)?.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(domain: Domain, payload: Value) -> SearchCandidate {
        SearchCandidate {
            domain,
            external_id: "11".to_string(),
            title: "Somewhere".to_string(),
            vector_score: 0.9,
            keyword_overlap: 0.4,
            payload,
        }
    }

    #[test]
    fn marker_built_from_valid_coordinates() {
        let c = candidate(
            Domain::Attraction,
            json!({
                "latitude": 37.5512,
                "longitude": 126.9882,
                "address": "남산공원길 105",
                "phone": "02-3455-9277",
                "description": "ignored"
            }),
        );
        let markers = build_markers(&[&c]);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].id, "11");
        assert_eq!(markers[0].extra["address"], "남산공원길 105");
        assert_eq!(markers[0].extra["phone"], "02-3455-9277");
        assert!(!markers[0].extra.contains_key("description"));
    }

    #[test]
    fn zero_coordinates_are_excluded() {
        let c = candidate(
            Domain::Attraction,
            json!({"latitude": 0.0, "longitude": 0.0}),
        );
        assert!(build_markers(&[&c]).is_empty());

        let c = candidate(
            Domain::Attraction,
            json!({"latitude": 37.5, "longitude": 0.0}),
        );
        assert!(build_markers(&[&c]).is_empty());
    }

    #[test]
    fn missing_coordinates_are_excluded() {
        let c = candidate(Domain::Restaurant, json!({"latitude": 37.5}));
        assert!(build_markers(&[&c]).is_empty());

        let c = candidate(Domain::Restaurant, json!({}));
        assert!(build_markers(&[&c]).is_empty());
    }

    #[test]
    fn festival_markers_carry_date_range() {
        let c = candidate(
            Domain::Festival,
            json!({
                "latitude": 37.57,
                "longitude": 126.97,
                "start_date": "2025-10-01",
                "end_date": "2025-10-09",
                "address": "광화문광장"
            }),
        );
        let markers = build_markers(&[&c]);
        assert_eq!(markers[0].extra["start_date"], "2025-10-01");
        assert_eq!(markers[0].extra["end_date"], "2025-10-09");
    }
}
