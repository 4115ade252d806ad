use course_track_wasm::checkpoints::{CheckpointKind, extract_checkpoints};
use course_track_wasm::converter::to_feature_collection;
use course_track_wasm::course::load_course;
use course_track_wasm::error::CourseError;
use course_track_wasm::geometry::{Coordinate, ParsedTrackData, analyze, haversine_distance};
use course_track_wasm::options::{CourseOptions, NearestSearch};
use course_track_wasm::parser::parse_gpx;

fn load_fixture(path: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{path}")).unwrap()
}

fn analyze_fixture(path: &str) -> ParsedTrackData {
    analyze(parse_gpx(&load_fixture(path)).unwrap())
}

fn exact() -> CourseOptions {
    CourseOptions {
        nearest_search: NearestSearch::Exact,
        ..Default::default()
    }
}

/// Distance covered by 0.05 degrees of longitude on the equator.
fn step_m() -> f64 {
    haversine_distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.05))
}

// ---- course/ ----

#[test]
fn test_mini_loop_structure() {
    let data = analyze_fixture("course/mini_loop.gpx");
    assert_eq!(data.waypoints.len(), 4);
    assert_eq!(data.tracks.len(), 1);
    assert_eq!(data.tracks[0].name, "Mini loop");
    assert_eq!(data.tracks[0].segments.len(), 2);
    assert_eq!(data.tracks[0].segments[0].points.len(), 3);
    assert_eq!(data.tracks[0].segments[1].points.len(), 2);

    let first = &data.tracks[0].segments[0].points[0];
    assert_eq!(first.time.as_deref(), Some("2025-08-29T18:00:00Z"));
    assert!(data.tracks[0].segments[1].points[0].time.is_none());
    assert_eq!(data.waypoints[0].description, "Depart");
    assert_eq!(data.waypoints[0].waypoint_type, "Start");
}

#[test]
fn test_mini_loop_distance() {
    let data = analyze_fixture("course/mini_loop.gpx");
    let distances: Vec<f64> = data.points().map(|p| p.cumulative_distance_m).collect();

    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    // The second segment starts at the running total of the first.
    assert_eq!(distances[2], distances[3]);
    assert!((distances[2] - 2.0 * step_m()).abs() < 1e-6);
    assert!((data.total_distance_km * 1000.0 - 3.0 * step_m()).abs() < 1e-6);
}

#[test]
fn test_mini_loop_elevation() {
    let data = analyze_fixture("course/mini_loop.gpx");
    // +100, -50 in the first segment, +150 in the second.
    assert!((data.total_elevation_gain_m - 250.0).abs() < 1e-9);
    assert!((data.total_elevation_loss_m - 50.0).abs() < 1e-9);
}

#[test]
fn test_mini_loop_bounds() {
    let data = analyze_fixture("course/mini_loop.gpx");
    let b = data.bounds;
    assert!(!b.is_empty());
    assert_eq!(b.min_lat, 0.0);
    assert_eq!(b.max_lat, 0.001);
    assert_eq!(b.min_lon, 0.0);
    assert_eq!(b.max_lon, 0.2);
}

#[test]
fn test_mini_loop_checkpoints() {
    let data = analyze_fixture("course/mini_loop.gpx");
    let cps = extract_checkpoints(&data, &exact());

    let names: Vec<&str> = cps.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Chamonix", "Les Houches", "Chamonix Arrivee"]);
    let kinds: Vec<CheckpointKind> = cps.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            CheckpointKind::Start,
            CheckpointKind::Checkpoint,
            CheckpointKind::End
        ]
    );

    assert_eq!(cps[0].distance_km, 0.0);
    assert!((cps[1].distance_km * 1000.0 - 2.0 * step_m()).abs() < 1e-6);
    assert!((cps[2].distance_km - data.total_distance_km).abs() < 1e-9);
    assert_eq!(cps[1].elevation, Some(1010.0));
}

#[test]
fn test_sampled_search_matches_exact_on_small_track() {
    let data = analyze_fixture("course/mini_loop.gpx");
    let sampled = extract_checkpoints(&data, &CourseOptions::default());
    let exact = extract_checkpoints(&data, &exact());
    assert_eq!(sampled, exact);
}

#[test]
fn test_garmin_extensions() {
    let data = analyze_fixture("course/garmin_extensions.gpx");
    assert_eq!(data.tracks[0].name, "Recon run");
    assert_eq!(data.points().count(), 3);
    assert!((data.total_elevation_gain_m - 6.6).abs() < 1e-6);
    assert!((data.total_elevation_loss_m - 3.8).abs() < 1e-6);
    assert!(data.total_distance_km > 0.9 && data.total_distance_km < 1.2);
    assert!(extract_checkpoints(&data, &CourseOptions::default()).is_empty());
}

#[test]
fn test_parse_twice_is_equal() {
    let xml = load_fixture("course/mini_loop.gpx");
    let a = analyze(parse_gpx(&xml).unwrap());
    let b = analyze(parse_gpx(&xml).unwrap());
    assert_eq!(a, b);
}

#[test]
fn test_load_course_end_to_end() {
    let opts = CourseOptions {
        profile_sample_every: 1,
        ..exact()
    };
    let course = load_course(&load_fixture("course/mini_loop.gpx"), &opts).unwrap();
    assert_eq!(course.checkpoints.len(), 3);
    assert_eq!(course.elevation_profile.len(), 5);
    assert_eq!(course.elevation_profile[4].elevation_m, 1200.0);

    let fc = to_feature_collection(&course, &opts);
    // 4 waypoints, 2 segment lines, 3 checkpoints
    assert_eq!(fc.features.len(), 9);
    assert_eq!(fc.bbox, Some(vec![0.0, 0.0, 0.2, 0.001]));
}

// ---- edge_cases/ ----

#[test]
fn test_empty_document() {
    let data = analyze_fixture("edge_cases/empty.gpx");
    assert!(data.waypoints.is_empty());
    assert!(data.tracks.is_empty());
    assert!(data.bounds.is_empty());
    assert_eq!(data.total_distance_km, 0.0);
    assert_eq!(data.total_elevation_gain_m, 0.0);
    assert_eq!(data.total_elevation_loss_m, 0.0);
}

#[test]
fn test_waypoints_without_track() {
    let data = analyze_fixture("edge_cases/waypoints_only.gpx");
    assert_eq!(data.waypoints.len(), 3);
    // The waypoint without coordinates sits at (0, 0) and widens the bounds.
    assert_eq!(data.bounds.min_lat, 0.0);
    assert_eq!(data.bounds.max_lon, 7.045);

    let cps = extract_checkpoints(&data, &CourseOptions::default());
    assert_eq!(cps.len(), 3);
    assert_eq!(cps[2].name, "Lost");
    for cp in &cps {
        assert_eq!(cp.distance_km, 0.0);
        assert!(cp.match_distance_m.is_infinite());
    }
}

#[test]
fn test_truncated_document_is_error() {
    let result = parse_gpx(&load_fixture("edge_cases/truncated.gpx"));
    assert!(matches!(result, Err(CourseError::XmlParse(_))));
}

#[test]
fn test_cut_off_document_is_error() {
    let result = parse_gpx(&load_fixture("edge_cases/cut_off.gpx"));
    match result {
        Err(CourseError::UnexpectedEof { element }) => assert_eq!(element, "ele"),
        other => panic!("Expected UnexpectedEof, got {other:?}"),
    }
    assert!(load_course(&load_fixture("edge_cases/cut_off.gpx"), &exact()).is_err());
}

#[test]
fn test_error_messages() {
    let err = parse_gpx("").unwrap_err();
    assert_eq!(err.to_string(), "Document has no root element");

    let err = parse_gpx("<html><body/></html>").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected <gpx> root element, found <html>"
    );

    let err = parse_gpx(r#"<gpx><trk><trkseg><trkpt lat="1" lon="2"/>"#).unwrap_err();
    assert_eq!(err.to_string(), "Document ends inside <trkseg>");
}
