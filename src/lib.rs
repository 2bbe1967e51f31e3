pub mod converter;
pub mod ddm;
pub mod error;
pub mod extractor;
pub mod options;
pub mod parser;
pub mod table;
pub mod waypoint_types;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::ddm::{Axis, format_ddm};
use crate::options::ExtractOptions;
use crate::waypoint_types::{COLUMN_HEADERS, WaypointRow};

/// Extract waypoint rows from an XML string, returned as an array of JS objects.
#[wasm_bindgen(js_name = extractWaypoints)]
pub fn extract_waypoints_js(xml: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let rows = extractor::extract_waypoints_with(xml, &opts)?;
    serde_wasm_bindgen::to_value(&rows).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract waypoint rows from an XML string, returned as a JSON string.
#[wasm_bindgen(js_name = extractWaypointsString)]
pub fn extract_waypoints_string(xml: &str, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let rows = extractor::extract_waypoints_with(xml, &opts)?;
    serde_json::to_string(&rows).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Format one decimal-degree value as Degrees + Decimal Minutes.
#[wasm_bindgen(js_name = formatDdm)]
pub fn format_ddm_js(value: f64, is_latitude: bool) -> String {
    format_ddm(value, Axis::from_is_latitude(is_latitude))
}

/// Newline-joined values of one column of previously extracted rows.
#[wasm_bindgen(js_name = copyColumn)]
pub fn copy_column_js(rows: JsValue, index: usize) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let rows: Vec<WaypointRow> =
        serde_wasm_bindgen::from_value(rows).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(table::copy_column(&rows, index))
}

#[wasm_bindgen(js_name = columnHeaders)]
pub fn column_headers() -> js_sys::Array {
    COLUMN_HEADERS.iter().map(|h| JsValue::from_str(h)).collect()
}

/// Convert the waypoints of an XML string to GeoJSON, returned as a JS object.
#[wasm_bindgen(js_name = waypointsToGeoJson)]
pub fn waypoints_to_geojson(xml: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let records = extractor::extract_records(xml, &opts)?;
    let fc = converter::to_feature_collection(&records, &opts);
    // Properties are maps; keep them plain objects so JSON.stringify sees them.
    fc.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_options(options: JsValue) -> Result<ExtractOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(ExtractOptions::default())
    } else {
        let opts: ExtractOptions = serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }
}
