use serde::Deserialize;

/// Options controlling checkpoint extraction, the elevation profile and GeoJSON export.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseOptions {
    /// Case-insensitive substring a waypoint name must contain to be a checkpoint (default: "segment")
    #[serde(default = "default_checkpoint_keyword")]
    pub checkpoint_keyword: String,

    /// How checkpoints are matched to their nearest track point (default: sampled, 5000 candidates)
    #[serde(default)]
    pub nearest_search: NearestSearch,

    /// Keep every N-th elevation profile entry; 0 or 1 keeps all (default: 50)
    #[serde(default = "default_profile_sample_every")]
    pub profile_sample_every: usize,

    /// Include elevation as the 3rd coordinate value (default: true)
    #[serde(default = "default_true")]
    pub include_elevation: bool,

    /// Include timestamps in coordinateProperties.times (default: true)
    #[serde(default = "default_true")]
    pub include_time: bool,

    /// Which feature kinds to export (default: all)
    #[serde(default)]
    pub types: Option<Vec<FeatureKind>>,

    /// Join track segments into a single MultiLineString (default: false)
    #[serde(default)]
    pub join_track_segments: bool,
}

impl Default for CourseOptions {
    fn default() -> Self {
        Self {
            checkpoint_keyword: default_checkpoint_keyword(),
            nearest_search: NearestSearch::default(),
            profile_sample_every: default_profile_sample_every(),
            include_elevation: true,
            include_time: true,
            types: None,
            join_track_segments: false,
        }
    }
}

impl CourseOptions {
    pub fn should_include(&self, kind: FeatureKind) -> bool {
        match &self.types {
            None => true,
            Some(types) => types.contains(&kind),
        }
    }
}

/// Strategy for finding the track point closest to a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum NearestSearch {
    /// Test every track point.
    Exact,
    /// Test a uniform stride of track points so that at most about
    /// `max_candidates` are tested. The result is accurate to one stride.
    Sampled {
        #[serde(rename = "maxCandidates", default = "default_max_candidates")]
        max_candidates: usize,
    },
}

impl Default for NearestSearch {
    fn default() -> Self {
        Self::Sampled {
            max_candidates: default_max_candidates(),
        }
    }
}

impl NearestSearch {
    /// Index step used when scanning `len` track points.
    pub fn stride(&self, len: usize) -> usize {
        match *self {
            Self::Exact => 1,
            Self::Sampled { max_candidates } => (len / max_candidates.max(1)).max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Waypoint,
    Track,
    Checkpoint,
}

fn default_true() -> bool {
    true
}

fn default_checkpoint_keyword() -> String {
    "segment".to_string()
}

fn default_profile_sample_every() -> usize {
    50
}

fn default_max_candidates() -> usize {
    5000
}
