use serde::Serialize;

use crate::geometry::Coordinate;

/// Raw GPX content as read from the document, before any geometry is computed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GpxDocument {
    pub waypoints: Vec<Waypoint>,
    pub tracks: Vec<RawTrack>,
}

/// A named point of interest (<wpt>).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ele: Option<f64>,
    pub description: String,
    #[serde(rename = "type")]
    pub waypoint_type: String,
}

impl Waypoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            name: String::new(),
            lat,
            lon,
            ele: None,
            description: String::new(),
            waypoint_type: String::new(),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// A track point (<trkpt>) as parsed, without distance annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoint {
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
    /// Raw `<time>` text, passed through untouched (not parsed or normalized).
    pub time: Option<String>,
}

impl RawPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ele: None,
            time: None,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// A GPX track segment (<trkseg>).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawSegment {
    pub points: Vec<RawPoint>,
}

/// A GPX track (<trk>).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawTrack {
    pub name: String,
    pub segments: Vec<RawSegment>,
}
