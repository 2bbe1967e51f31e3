use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use crate::ddm::{Axis, format_ddm_with};
use crate::options::ExtractOptions;
use crate::waypoint_types::WaypointRecord;

/// Convert extracted waypoints to a GeoJSON FeatureCollection of Points.
pub fn to_feature_collection(records: &[WaypointRecord], opts: &ExtractOptions) -> FeatureCollection {
    let features = records
        .iter()
        .map(|record| waypoint_to_feature(record, opts))
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn waypoint_to_feature(record: &WaypointRecord, opts: &ExtractOptions) -> Feature {
    // Altitude is in feet, so it stays out of the coordinate array
    let geometry = Geometry::new(Value::Point(vec![record.longitude, record.latitude]));

    let mut props = Map::new();
    props.insert(
        "gpxType".to_string(),
        JsonValue::String("waypoint".to_string()),
    );
    props.insert("name".to_string(), JsonValue::String(record.name.clone()));
    props.insert(
        "latitudeDdm".to_string(),
        JsonValue::String(format_ddm_with(
            record.latitude,
            Axis::Latitude,
            opts.minute_decimals,
        )),
    );
    props.insert(
        "longitudeDdm".to_string(),
        JsonValue::String(format_ddm_with(
            record.longitude,
            Axis::Longitude,
            opts.minute_decimals,
        )),
    );
    if let Some(altitude) = serde_json::Number::from_f64(record.altitude) {
        props.insert("altitudeFt".to_string(), JsonValue::Number(altitude));
    }

    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract_records;

    #[test]
    fn test_waypoint_conversion() {
        let xml = r#"<?xml version="1.0"?>
<Plan>
  <Waypoint>
    <Name>Venom1Tokyo</Name>
    <Position>
      <Latitude>35.6762</Latitude>
      <Longitude>139.6503</Longitude>
      <Altitude>1500</Altitude>
    </Position>
  </Waypoint>
</Plan>"#;
        let opts = ExtractOptions::default();
        let records = extract_records(xml, &opts).unwrap();
        let fc = to_feature_collection(&records, &opts);

        assert_eq!(fc.features.len(), 1);
        let f = &fc.features[0];
        let geom = f.geometry.as_ref().unwrap();

        // Check [lon, lat] order
        if let Value::Point(coords) = &geom.value {
            assert_eq!(coords.len(), 2);
            assert!((coords[0] - 139.6503).abs() < 1e-10); // lon
            assert!((coords[1] - 35.6762).abs() < 1e-10); // lat
        } else {
            panic!("Expected Point geometry");
        }

        let props = f.properties.as_ref().unwrap();
        assert_eq!(props["gpxType"], "waypoint");
        assert_eq!(props["name"], "Tokyo");
        assert_eq!(props["latitudeDdm"], "35°40.572' N");
        assert_eq!(props["longitudeDdm"], "139°39.018' E");
        assert_eq!(props["altitudeFt"], 1500.0);
    }

    #[test]
    fn test_empty_collection() {
        let fc = to_feature_collection(&[], &ExtractOptions::default());
        assert!(fc.features.is_empty());
        let json = serde_json::to_value(&fc).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
    }
}
