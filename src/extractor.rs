use std::borrow::Cow;
use std::path::Path;

use crate::ddm::{Axis, MAX_DECIMALS, format_ddm_with};
use crate::error::WaypointError;
use crate::options::ExtractOptions;
use crate::parser::{Element, parse_document};
use crate::waypoint_types::{WaypointRecord, WaypointRow};

type Result<T> = std::result::Result<T, WaypointError>;

const WAYPOINT: &str = "Waypoint";
const NAME: &str = "Name";
const LATITUDE: &str = "Position/Latitude";
const LONGITUDE: &str = "Position/Longitude";
const ALTITUDE: &str = "Position/Altitude";

/// Extract display rows with default options.
pub fn extract_waypoints(xml: &str) -> Result<Vec<WaypointRow>> {
    extract_waypoints_with(xml, &ExtractOptions::default())
}

pub fn extract_waypoints_with(xml: &str, opts: &ExtractOptions) -> Result<Vec<WaypointRow>> {
    let records = extract_records(xml, opts)?;
    Ok(records
        .iter()
        .map(|record| to_row(record, opts))
        .collect())
}

/// Read an XML file and extract its rows.
///
/// An unreadable file fails the same way as a malformed document.
pub fn extract_waypoints_from_path(
    path: impl AsRef<Path>,
    opts: &ExtractOptions,
) -> Result<Vec<WaypointRow>> {
    let path = path.as_ref();
    tracing::debug!("Parsing XML file: {}", path.display());
    let xml = std::fs::read_to_string(path)?;
    extract_waypoints_with(&xml, opts)
}

/// Every valid `<Waypoint>` below the document root, in document order.
///
/// Waypoints with a missing field or a non-numeric coordinate are skipped.
pub fn extract_records(xml: &str, opts: &ExtractOptions) -> Result<Vec<WaypointRecord>> {
    opts.validate()?;
    let root = parse_document(xml)?;

    let mut found = 0usize;
    let records: Vec<WaypointRecord> = root
        .descendants()
        .filter(|el| el.name == WAYPOINT)
        .inspect(|_| found += 1)
        .filter_map(|el| parse_waypoint(el, opts))
        .collect();

    tracing::info!(
        found,
        extracted = records.len(),
        skipped = found - records.len(),
        "Extracted waypoints"
    );
    Ok(records)
}

fn parse_waypoint(waypoint: &Element, opts: &ExtractOptions) -> Option<WaypointRecord> {
    let (Some(name), Some(lat), Some(lon), Some(alt)) = (
        waypoint.child(NAME),
        waypoint.find(LATITUDE),
        waypoint.find(LONGITUDE),
        waypoint.find(ALTITUDE),
    ) else {
        tracing::debug!("Skipping waypoint with a missing field");
        return None;
    };

    let (Some(latitude), Some(longitude), Some(altitude)) = (
        parse_number(&lat.text),
        parse_number(&lon.text),
        parse_number(&alt.text),
    ) else {
        tracing::debug!(
            latitude = lat.text.as_str(),
            longitude = lon.text.as_str(),
            altitude = alt.text.as_str(),
            "Skipping waypoint with a non-numeric field"
        );
        return None;
    };

    Some(WaypointRecord {
        name: clean_name(&name.text, &opts.strip_name_token),
        latitude,
        longitude,
        altitude,
    })
}

/// Trimmed float parse. Non-finite values are rejected.
fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let number = if text.contains('_') {
        Cow::Owned(strip_digit_separators(text)?)
    } else {
        Cow::Borrowed(text)
    };
    number
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Drop `_` separators as in `1_000.5`. Each one must sit between two digits.
fn strip_digit_separators(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let well_placed = bytes.iter().enumerate().all(|(i, b)| {
        *b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    });
    well_placed.then(|| text.replace('_', ""))
}

/// Remove every `token`, turn newlines into spaces and trim.
pub fn clean_name(raw: &str, token: &str) -> String {
    let without_token = if token.is_empty() {
        raw.to_string()
    } else {
        raw.replace(token, "")
    };
    without_token.replace('\n', " ").trim().to_string()
}

/// Format a record for display.
pub fn to_row(record: &WaypointRecord, opts: &ExtractOptions) -> WaypointRow {
    let altitude_decimals = opts.altitude_decimals.min(MAX_DECIMALS);
    WaypointRow {
        name: record.name.clone(),
        latitude: format_ddm_with(record.latitude, Axis::Latitude, opts.minute_decimals),
        longitude: format_ddm_with(record.longitude, Axis::Longitude, opts.minute_decimals),
        altitude: format!("{:.altitude_decimals$} ft", record.altitude),
    }
}
