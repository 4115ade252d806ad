use log::debug;
use serde::Serialize;

use crate::geometry::{Coordinate, ParsedTrackData, TrackPoint, haversine_distance};
use crate::gpx_types::Waypoint;
use crate::options::{CourseOptions, NearestSearch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointKind {
    Start,
    Checkpoint,
    End,
}

/// A waypoint selected as a course checkpoint, with its position along the track.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub kind: CheckpointKind,
    /// Course distance of the matched track point.
    #[serde(rename = "distance")]
    pub distance_km: f64,
    /// How far the waypoint lies from the matched track point; infinite when
    /// the course has no track points.
    #[serde(rename = "matchDistanceM")]
    pub match_distance_m: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

/// Result of a nearest-point search.
#[derive(Debug, Clone, Copy)]
pub struct NearestMatch<'a> {
    pub point: Option<&'a TrackPoint>,
    pub distance_m: f64,
}

/// Find the track point closest to `target`.
///
/// Ties keep the earliest point. With no points the match is empty and the
/// distance infinite.
pub fn nearest_point<'a>(
    points: &[&'a TrackPoint],
    target: Coordinate,
    search: NearestSearch,
) -> NearestMatch<'a> {
    let mut best = NearestMatch {
        point: None,
        distance_m: f64::INFINITY,
    };

    for &point in points.iter().step_by(search.stride(points.len())) {
        let d = haversine_distance(target, point.coordinate());
        if d < best.distance_m {
            best = NearestMatch {
                point: Some(point),
                distance_m: d,
            };
        }
    }

    best
}

fn is_candidate(wpt: &Waypoint, keyword: &str) -> bool {
    wpt.name.to_lowercase().contains(keyword)
}

/// Display name: everything before the first '/', trimmed.
fn display_name(raw: &str) -> &str {
    raw.split('/').next().unwrap_or_default().trim()
}

fn classify(index: usize, count: usize) -> CheckpointKind {
    // A lone candidate is the start.
    if index == 0 {
        CheckpointKind::Start
    } else if index + 1 == count {
        CheckpointKind::End
    } else {
        CheckpointKind::Checkpoint
    }
}

/// Select checkpoint waypoints, classify them by position and project each
/// onto the track to obtain its course distance.
pub fn extract_checkpoints(data: &ParsedTrackData, opts: &CourseOptions) -> Vec<Checkpoint> {
    let keyword = opts.checkpoint_keyword.to_lowercase();
    let candidates: Vec<&Waypoint> = data
        .waypoints
        .iter()
        .filter(|w| is_candidate(w, &keyword))
        .collect();
    let points: Vec<&TrackPoint> = data.points().collect();

    let checkpoints: Vec<Checkpoint> = candidates
        .iter()
        .enumerate()
        .map(|(idx, wpt)| {
            let nearest = nearest_point(&points, wpt.coordinate(), opts.nearest_search);
            Checkpoint {
                name: display_name(&wpt.name).to_string(),
                lat: wpt.lat,
                lon: wpt.lon,
                kind: classify(idx, candidates.len()),
                distance_km: nearest.point.map_or(0.0, TrackPoint::cumulative_distance_km),
                match_distance_m: nearest.distance_m,
                elevation: wpt.ele.or_else(|| nearest.point.and_then(|p| p.ele)),
            }
        })
        .collect();

    debug!(
        "extracted {} checkpoints from {} waypoints over {} track points",
        checkpoints.len(),
        data.waypoints.len(),
        points.len()
    );

    checkpoints
}
