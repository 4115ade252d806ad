pub mod checkpoints;
pub mod converter;
pub mod course;
pub mod error;
pub mod geometry;
pub mod gpx_types;
pub mod options;
pub mod parser;
pub mod profile;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::course::Course;
use crate::options::CourseOptions;

/// Parse a GPX string and return its waypoints, annotated tracks, bounds and totals.
#[wasm_bindgen(js_name = parseTrack)]
pub fn parse_track(gpx_string: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let data = geometry::analyze(parser::parse_gpx(gpx_string)?);
    to_js(&data)
}

/// Parse a GPX string and return the full course: track data, checkpoints and elevation profile.
#[wasm_bindgen(js_name = loadCourse)]
pub fn load_course(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let course = course::load_course(gpx_string, &opts)?;
    to_js(&course)
}

/// Return only the checkpoint list of a GPX course.
#[wasm_bindgen(js_name = extractCheckpoints)]
pub fn extract_checkpoints(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let data = geometry::analyze(parser::parse_gpx(gpx_string)?);
    to_js(&checkpoints::extract_checkpoints(&data, &opts))
}

/// Convert a GPX course to GeoJSON, returned as a JS object.
#[wasm_bindgen(js_name = courseToGeoJson)]
pub fn course_to_geojson(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let course = course::load_course(gpx_string, &opts)?;
    to_js(&converter::to_feature_collection(&course, &opts))
}

/// Convert a GPX course to GeoJSON, returned as a JSON string.
#[wasm_bindgen(js_name = courseToGeoJsonString)]
pub fn course_to_geojson_string(gpx_string: &str, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let course: Course = course::load_course(gpx_string, &opts)?;
    let fc = converter::to_feature_collection(&course, &opts);
    serde_json::to_string(&fc).map_err(|e| js_sys::Error::new(&e.to_string()).into())
}

fn parse_options(options: JsValue) -> Result<CourseOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(CourseOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| js_sys::Error::new(&e.to_string()).into())
    }
}

/// Serialize into plain JS values: maps (GeoJSON `properties`, foreign members)
/// become ordinary objects instead of `Map`s.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| js_sys::Error::new(&e.to_string()).into())
}
