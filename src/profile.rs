use serde::Serialize;

use crate::geometry::ParsedTrackData;

/// One sample of the elevation profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePoint {
    #[serde(rename = "distance")]
    pub distance_km: f64,
    #[serde(rename = "elevation")]
    pub elevation_m: f64,
}

/// Elevation against course distance for the first track, keeping every
/// `sample_every`-th point that has an elevation (0 or 1 keeps all).
pub fn elevation_profile(data: &ParsedTrackData, sample_every: usize) -> Vec<ProfilePoint> {
    let Some(track) = data.tracks.first() else {
        return Vec::new();
    };

    track
        .segments
        .iter()
        .flat_map(|s| &s.points)
        .filter_map(|p| {
            p.ele.map(|ele| ProfilePoint {
                distance_km: p.cumulative_distance_km(),
                elevation_m: ele,
            })
        })
        .step_by(sample_every.max(1))
        .collect()
}
