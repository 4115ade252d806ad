use log::debug;
use serde::Serialize;

use crate::gpx_types::{GpxDocument, RawPoint, Waypoint};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Great-circle distance in meters on a spherical Earth.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lon - a.lon).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Axis-aligned box around every track point and waypoint.
///
/// With nothing to enclose the box stays inverted (min > max); check
/// [`Bounds::is_empty`] before using it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        min_lat: f64::INFINITY,
        max_lat: f64::NEG_INFINITY,
        min_lon: f64::INFINITY,
        max_lon: f64::NEG_INFINITY,
    };

    pub fn extend(&mut self, c: Coordinate) {
        self.min_lat = self.min_lat.min(c.lat);
        self.max_lat = self.max_lat.max(c.lat);
        self.min_lon = self.min_lon.min(c.lon);
        self.max_lon = self.max_lon.max(c.lon);
    }

    pub fn is_empty(&self) -> bool {
        self.min_lat > self.max_lat || self.min_lon > self.max_lon
    }

    pub fn center(&self) -> Option<Coordinate> {
        if self.is_empty() {
            return None;
        }
        Some(Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        ))
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A track point annotated with its distance along the course.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ele: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(rename = "cumulativeDistanceM")]
    pub cumulative_distance_m: f64,
}

impl TrackPoint {
    fn annotate(raw: RawPoint, cumulative_distance_m: f64) -> Self {
        Self {
            lat: raw.lat,
            lon: raw.lon,
            ele: raw.ele,
            time: raw.time,
            cumulative_distance_m,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    pub fn cumulative_distance_km(&self) -> f64 {
        self.cumulative_distance_m / 1000.0
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub points: Vec<TrackPoint>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Track {
    pub name: String,
    pub segments: Vec<Segment>,
}

/// The analyzed course: waypoints, annotated tracks and summary figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTrackData {
    pub waypoints: Vec<Waypoint>,
    pub tracks: Vec<Track>,
    pub bounds: Bounds,
    #[serde(rename = "totalDistance")]
    pub total_distance_km: f64,
    #[serde(rename = "totalElevationGain")]
    pub total_elevation_gain_m: f64,
    #[serde(rename = "totalElevationLoss")]
    pub total_elevation_loss_m: f64,
}

impl ParsedTrackData {
    /// Every track point of every segment of every track, in document order.
    pub fn points(&self) -> impl Iterator<Item = &TrackPoint> + '_ {
        self.tracks
            .iter()
            .flat_map(|t| &t.segments)
            .flat_map(|s| &s.points)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Climb {
    gain_m: f64,
    loss_m: f64,
}

impl Climb {
    fn record(&mut self, from: Option<f64>, to: Option<f64>) {
        if let (Some(from), Some(to)) = (from, to) {
            let diff = to - from;
            if diff > 0.0 {
                self.gain_m += diff;
            } else {
                self.loss_m += -diff;
            }
        }
    }
}

/// Compute bounds, cumulative distances and elevation totals for a parsed document.
///
/// The running distance carries over from one segment (and track) to the next:
/// the first point of a segment takes the total reached so far, so the gap
/// between segments adds nothing and distances never decrease.
pub fn analyze(doc: GpxDocument) -> ParsedTrackData {
    let mut bounds = Bounds::EMPTY;
    doc.tracks
        .iter()
        .flat_map(|t| &t.segments)
        .flat_map(|s| &s.points)
        .for_each(|p| bounds.extend(p.coordinate()));
    doc.waypoints
        .iter()
        .for_each(|w| bounds.extend(w.coordinate()));

    let mut running_m = 0.0;
    let mut climb = Climb::default();
    let mut tracks = Vec::with_capacity(doc.tracks.len());

    for raw_track in doc.tracks {
        let mut segments = Vec::with_capacity(raw_track.segments.len());

        for raw_segment in raw_track.segments {
            let mut points: Vec<TrackPoint> = Vec::with_capacity(raw_segment.points.len());

            for raw in raw_segment.points {
                if let Some(prev) = points.last() {
                    running_m += haversine_distance(prev.coordinate(), raw.coordinate());
                    climb.record(prev.ele, raw.ele);
                }
                points.push(TrackPoint::annotate(raw, running_m));
            }

            segments.push(Segment { points });
        }

        tracks.push(Track {
            name: raw_track.name,
            segments,
        });
    }

    debug!(
        "analyzed course: {:.3} km, +{:.0} m / -{:.0} m",
        running_m / 1000.0,
        climb.gain_m,
        climb.loss_m
    );

    ParsedTrackData {
        waypoints: doc.waypoints,
        tracks,
        bounds,
        total_distance_km: running_m / 1000.0,
        total_elevation_gain_m: climb.gain_m,
        total_elevation_loss_m: climb.loss_m,
    }
}
