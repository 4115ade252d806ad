use geojson::{Bbox, Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use crate::checkpoints::Checkpoint;
use crate::course::Course;
use crate::geometry::{Bounds, Segment, Track, TrackPoint};
use crate::gpx_types::Waypoint;
use crate::options::{CourseOptions, FeatureKind};

/// Convert an analyzed course to a GeoJSON FeatureCollection for the map layer.
pub fn to_feature_collection(course: &Course, opts: &CourseOptions) -> FeatureCollection {
    let mut features = Vec::new();

    if opts.should_include(FeatureKind::Waypoint) {
        for wpt in &course.track.waypoints {
            features.push(waypoint_to_feature(wpt, opts));
        }
    }

    if opts.should_include(FeatureKind::Track) {
        for trk in &course.track.tracks {
            features.extend(track_to_features(trk, opts));
        }
    }

    if opts.should_include(FeatureKind::Checkpoint) {
        for cp in &course.checkpoints {
            features.push(checkpoint_to_feature(cp));
        }
    }

    FeatureCollection {
        bbox: bounds_to_bbox(&course.track.bounds),
        features,
        foreign_members: None,
    }
}

fn bounds_to_bbox(bounds: &Bounds) -> Option<Bbox> {
    if bounds.is_empty() {
        return None;
    }
    Some(vec![
        bounds.min_lon,
        bounds.min_lat,
        bounds.max_lon,
        bounds.max_lat,
    ])
}

fn feature(geometry: Geometry, props: Map<String, JsonValue>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

fn waypoint_to_feature(wpt: &Waypoint, opts: &CourseOptions) -> Feature {
    let coords = match (opts.include_elevation, wpt.ele) {
        (true, Some(ele)) => vec![wpt.lon, wpt.lat, ele],
        _ => vec![wpt.lon, wpt.lat],
    };

    let mut props = Map::new();
    props.insert(
        "gpxType".to_string(),
        JsonValue::String("waypoint".to_string()),
    );
    insert_non_empty(&mut props, "name", &wpt.name);
    insert_non_empty(&mut props, "desc", &wpt.description);
    insert_non_empty(&mut props, "type", &wpt.waypoint_type);
    if let Some(ele) = wpt.ele {
        insert_number(&mut props, "ele", ele);
    }

    feature(Geometry::new(Value::Point(coords)), props)
}

fn checkpoint_to_feature(cp: &Checkpoint) -> Feature {
    let mut props = Map::new();
    props.insert(
        "gpxType".to_string(),
        JsonValue::String("checkpoint".to_string()),
    );
    props.insert("name".to_string(), JsonValue::String(cp.name.clone()));
    props.insert(
        "type".to_string(),
        serde_json::to_value(cp.kind).unwrap_or(JsonValue::Null),
    );
    insert_number(&mut props, "distance", cp.distance_km);
    if let Some(ele) = cp.elevation {
        insert_number(&mut props, "elevation", ele);
    }

    feature(Geometry::new(Value::Point(vec![cp.lon, cp.lat])), props)
}

fn track_to_features(trk: &Track, opts: &CourseOptions) -> Vec<Feature> {
    let non_empty_segments: Vec<&Segment> =
        trk.segments.iter().filter(|s| !s.points.is_empty()).collect();

    if non_empty_segments.is_empty() {
        return Vec::new();
    }

    // Single point across all segments → Point Feature
    let total_points: usize = non_empty_segments.iter().map(|s| s.points.len()).sum();
    if total_points == 1 {
        let pt = &non_empty_segments[0].points[0];
        let mut props = build_track_props(trk);
        insert_number(&mut props, "distance", pt.cumulative_distance_km());
        return vec![feature(
            Geometry::new(Value::Point(point_coords(pt, opts.include_elevation))),
            props,
        )];
    }

    let lines: Vec<&Segment> = non_empty_segments
        .into_iter()
        .filter(|s| s.points.len() >= 2)
        .collect();

    if lines.is_empty() {
        return Vec::new();
    }

    if opts.join_track_segments && lines.len() > 1 {
        let line_strings: Vec<Vec<Vec<f64>>> = lines
            .iter()
            .map(|seg| line_coords(&seg.points, opts.include_elevation))
            .collect();

        let mut coord_props = Map::new();
        coord_props.insert(
            "distances".to_string(),
            JsonValue::Array(
                lines
                    .iter()
                    .map(|seg| JsonValue::Array(distances(&seg.points)))
                    .collect(),
            ),
        );
        if opts.include_time {
            let all_times: Vec<Vec<JsonValue>> = lines.iter().map(|seg| times(&seg.points)).collect();
            if all_times.iter().any(|t| t.iter().any(|v| !v.is_null())) {
                coord_props.insert(
                    "times".to_string(),
                    JsonValue::Array(all_times.into_iter().map(JsonValue::Array).collect()),
                );
            }
        }

        let mut props = build_track_props(trk);
        props.insert(
            "coordinateProperties".to_string(),
            JsonValue::Object(coord_props),
        );

        return vec![feature(
            Geometry::new(Value::MultiLineString(line_strings)),
            props,
        )];
    }

    // Each segment as a separate LineString Feature
    lines
        .iter()
        .map(|seg| {
            let geometry = Geometry::new(Value::LineString(line_coords(
                &seg.points,
                opts.include_elevation,
            )));

            let mut coord_props = Map::new();
            coord_props.insert(
                "distances".to_string(),
                JsonValue::Array(distances(&seg.points)),
            );
            if opts.include_time {
                let seg_times = times(&seg.points);
                // Only include if at least one time is present
                if seg_times.iter().any(|t| !t.is_null()) {
                    coord_props.insert("times".to_string(), JsonValue::Array(seg_times));
                }
            }

            let mut props = build_track_props(trk);
            props.insert(
                "coordinateProperties".to_string(),
                JsonValue::Object(coord_props),
            );
            feature(geometry, props)
        })
        .collect()
}

fn build_track_props(trk: &Track) -> Map<String, JsonValue> {
    let mut props = Map::new();
    props.insert(
        "gpxType".to_string(),
        JsonValue::String("track".to_string()),
    );
    insert_non_empty(&mut props, "name", &trk.name);
    props
}

/// Build [lon, lat] or [lon, lat, ele] coordinate array.
fn point_coords(pt: &TrackPoint, include_elevation: bool) -> Vec<f64> {
    match (include_elevation, pt.ele) {
        (true, Some(ele)) => vec![pt.lon, pt.lat, ele],
        _ => vec![pt.lon, pt.lat],
    }
}

fn line_coords(points: &[TrackPoint], include_elevation: bool) -> Vec<Vec<f64>> {
    points
        .iter()
        .map(|pt| point_coords(pt, include_elevation))
        .collect()
}

/// Course distance in km for each point.
fn distances(points: &[TrackPoint]) -> Vec<JsonValue> {
    points
        .iter()
        .map(|pt| number(pt.cumulative_distance_km()))
        .collect()
}

fn times(points: &[TrackPoint]) -> Vec<JsonValue> {
    points
        .iter()
        .map(|pt| match &pt.time {
            Some(t) => JsonValue::String(t.clone()),
            None => JsonValue::Null,
        })
        .collect()
}

fn number(value: f64) -> JsonValue {
    serde_json::Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number)
}

fn insert_number(props: &mut Map<String, JsonValue>, key: &str, value: f64) {
    props.insert(key.to_string(), number(value));
}

fn insert_non_empty(props: &mut Map<String, JsonValue>, key: &str, value: &str) {
    if !value.is_empty() {
        props.insert(key.to_string(), JsonValue::String(value.to_string()));
    }
}
