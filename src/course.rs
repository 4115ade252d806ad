use serde::Serialize;

use crate::checkpoints::{Checkpoint, extract_checkpoints};
use crate::error::CourseError;
use crate::geometry::{ParsedTrackData, analyze};
use crate::options::CourseOptions;
use crate::parser::parse_gpx;
use crate::profile::{ProfilePoint, elevation_profile};

/// Everything the course map needs from one GPX document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub track: ParsedTrackData,
    pub checkpoints: Vec<Checkpoint>,
    pub elevation_profile: Vec<ProfilePoint>,
}

impl Course {
    pub fn from_track(track: ParsedTrackData, opts: &CourseOptions) -> Self {
        let checkpoints = extract_checkpoints(&track, opts);
        let elevation_profile = elevation_profile(&track, opts.profile_sample_every);
        Self {
            track,
            checkpoints,
            elevation_profile,
        }
    }
}

/// Parse and analyze a GPX document in one call.
pub fn load_course(xml: &str, opts: &CourseOptions) -> Result<Course, CourseError> {
    let track = analyze(parse_gpx(xml)?);
    Ok(Course::from_track(track, opts))
}
