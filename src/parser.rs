use log::{debug, warn};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::CourseError;
use crate::gpx_types::*;

type Result<T> = std::result::Result<T, CourseError>;

/// Parse a GPX XML string into its waypoints and tracks, in document order.
///
/// Missing optional fields never fail the parse. XML syntax errors, a missing
/// or foreign root element and a document that ends before `</gpx>` are
/// reported as errors. Anything after the closing root tag is ignored.
pub fn parse_gpx(xml: &str) -> Result<GpxDocument> {
    let mut reader = Reader::from_str(xml);
    let mut doc = GpxDocument::default();
    let mut root_seen = false;
    // Open elements below the root that are walked through, not consumed.
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if !root_seen => {
                expect_gpx_root(&e)?;
                root_seen = true;
            }
            Ok(Event::Empty(e)) if !root_seen => {
                expect_gpx_root(&e)?;
                break;
            }
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"wpt" => doc.waypoints.push(parse_waypoint(&e, &mut reader)?),
                b"trk" => doc.tracks.push(parse_track(&mut reader)?),
                b"rte" | b"extensions" => {
                    reader
                        .read_to_end(e.name())
                        .map_err(CourseError::XmlParse)?;
                }
                _ => depth += 1,
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"wpt" {
                    let (lat, lon) = parse_lat_lon(&e, "wpt");
                    doc.waypoints.push(Waypoint::new(lat, lon));
                }
            }
            Ok(Event::End(_)) if depth > 0 => depth -= 1,
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) if root_seen => return Err(unexpected_eof("gpx")),
            Ok(Event::Eof) => return Err(CourseError::MissingRoot),
            Err(e) => return Err(CourseError::XmlParse(e)),
            _ => {}
        }
    }

    debug!(
        "parsed gpx: {} waypoints, {} tracks, {} points",
        doc.waypoints.len(),
        doc.tracks.len(),
        doc.tracks
            .iter()
            .flat_map(|t| &t.segments)
            .map(|s| s.points.len())
            .sum::<usize>()
    );

    Ok(doc)
}

fn expect_gpx_root(e: &BytesStart<'_>) -> Result<()> {
    if e.local_name().as_ref() == b"gpx" {
        Ok(())
    } else {
        Err(CourseError::UnexpectedRoot {
            found: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        })
    }
}

/// Read lat/lon attributes, falling back to 0 for anything missing or unparsable.
fn parse_lat_lon(e: &BytesStart<'_>, element: &str) -> (f64, f64) {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr in e.attributes().flatten() {
        let val = std::str::from_utf8(&attr.value).unwrap_or_default();
        match attr.key.local_name().as_ref() {
            b"lat" => lat = parse_number(val),
            b"lon" => lon = parse_number(val),
            _ => {}
        }
    }

    let lat = lat.unwrap_or_else(|| {
        warn!("<{element}> has a missing or invalid lat, using 0");
        0.0
    });
    let lon = lon.unwrap_or_else(|| {
        warn!("<{element}> has a missing or invalid lon, using 0");
        0.0
    });

    (lat, lon)
}

fn unexpected_eof(element: &str) -> CourseError {
    CourseError::UnexpectedEof {
        element: element.to_string(),
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a <wpt> element and its children.
/// Called after receiving Event::Start for the waypoint.
fn parse_waypoint<'a>(start: &BytesStart<'a>, reader: &mut Reader<&'a [u8]>) -> Result<Waypoint> {
    let (lat, lon) = parse_lat_lon(start, "wpt");
    let mut wpt = Waypoint::new(lat, lon);

    // The first occurrence of each child wins.
    let mut name: Option<String> = None;
    let mut desc: Option<String> = None;
    let mut wpt_type: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => {
                    let text = read_text_owned(reader, &e)?;
                    name.get_or_insert(text);
                }
                b"desc" => {
                    let text = read_text_owned(reader, &e)?;
                    desc.get_or_insert(text);
                }
                b"type" => {
                    let text = read_text_owned(reader, &e)?;
                    wpt_type.get_or_insert(text);
                }
                b"ele" => {
                    let text = read_text_owned(reader, &e)?;
                    if wpt.ele.is_none() {
                        wpt.ele = parse_number(&text);
                    }
                }
                _ => {
                    // Skip unknown/extensions elements
                    reader
                        .read_to_end(e.name())
                        .map_err(CourseError::XmlParse)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"wpt" => break,
            Ok(Event::Eof) => return Err(unexpected_eof("wpt")),
            Err(e) => return Err(CourseError::XmlParse(e)),
            _ => {}
        }
    }

    wpt.name = name.unwrap_or_default();
    wpt.description = desc.unwrap_or_default();
    wpt.waypoint_type = wpt_type.unwrap_or_default();
    Ok(wpt)
}

/// Parse a <trk> element.
fn parse_track<'a>(reader: &mut Reader<&'a [u8]>) -> Result<RawTrack> {
    let mut track = RawTrack::default();
    let mut name: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => {
                    let text = read_text_owned(reader, &e)?;
                    name.get_or_insert(text);
                }
                b"trkseg" => track.segments.push(parse_segment(reader)?),
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(CourseError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkseg" {
                    track.segments.push(RawSegment::default());
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trk" => break,
            Ok(Event::Eof) => return Err(unexpected_eof("trk")),
            Err(e) => return Err(CourseError::XmlParse(e)),
            _ => {}
        }
    }

    track.name = name.unwrap_or_default();
    Ok(track)
}

/// Parse a <trkseg> element. Empty segments are kept so segment order survives.
fn parse_segment<'a>(reader: &mut Reader<&'a [u8]>) -> Result<RawSegment> {
    let mut segment = RawSegment::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => segment.points.push(parse_track_point(&e, reader)?),
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(CourseError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    let (lat, lon) = parse_lat_lon(&e, "trkpt");
                    segment.points.push(RawPoint::new(lat, lon));
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkseg" => break,
            Ok(Event::Eof) => return Err(unexpected_eof("trkseg")),
            Err(e) => return Err(CourseError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(segment)
}

/// Parse a <trkpt> element and its <ele>/<time> children.
fn parse_track_point<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
) -> Result<RawPoint> {
    let (lat, lon) = parse_lat_lon(start, "trkpt");
    let mut point = RawPoint::new(lat, lon);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" => {
                    let text = read_text_owned(reader, &e)?;
                    if point.ele.is_none() {
                        point.ele = parse_number(&text);
                    }
                }
                b"time" => {
                    point.time = Some(read_text_owned(reader, &e)?);
                }
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(CourseError::XmlParse)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkpt" => break,
            Ok(Event::Eof) => return Err(unexpected_eof("trkpt")),
            Err(e) => return Err(CourseError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(point)
}

/// Read text content of an element as an owned String.
/// Handles regular text, CDATA sections, and entity references (Event::GeneralRef).
fn read_text_owned<'a>(reader: &mut Reader<&'a [u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Ok(Event::CData(e)) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Ok(Event::GeneralRef(e)) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    match std::str::from_utf8(e.as_ref()).unwrap_or_default() {
                        "amp" => text.push('&'),
                        "lt" => text.push('<'),
                        "gt" => text.push('>'),
                        "quot" => text.push('"'),
                        "apos" => text.push('\''),
                        _ => {}
                    }
                }
            }
            Ok(Event::Start(e)) => {
                // Markup inside a text element contributes its text, like textContent.
                text.push_str(&read_text_owned(reader, &e)?);
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => {
                return Err(unexpected_eof(&String::from_utf8_lossy(&end_name)));
            }
            Err(e) => return Err(CourseError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(text)
}
