use serde::{Deserialize, Serialize};

/// Table headers, in column order.
pub const COLUMN_HEADERS: [&str; 4] = [
    "Name",
    "Latitude (DDM)",
    "Longitude (DDM)",
    "Altitude (ft)",
];

/// A validated `<Waypoint>` with its name already cleaned.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointRecord {
    pub name: String,
    /// Decimal degrees.
    pub latitude: f64,
    /// Decimal degrees.
    pub longitude: f64,
    /// Feet.
    pub altitude: f64,
}

/// One display row: name, DDM latitude, DDM longitude, altitude with unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaypointRow {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
    pub altitude: String,
}

impl WaypointRow {
    /// Value of the column at `index`, matching [`COLUMN_HEADERS`].
    pub fn column(&self, index: usize) -> Option<&str> {
        match index {
            0 => Some(&self.name),
            1 => Some(&self.latitude),
            2 => Some(&self.longitude),
            3 => Some(&self.altitude),
            _ => None,
        }
    }

    pub fn columns(&self) -> [&str; 4] {
        [&self.name, &self.latitude, &self.longitude, &self.altitude]
    }
}
