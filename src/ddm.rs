//! Degrees + Decimal Minutes formatting.

/// Number of decimals printed for the minute part.
pub const DEFAULT_MINUTE_DECIMALS: usize = 3;

/// Most decimals any formatted value may ask for; an `f64` carries no more.
pub const MAX_DECIMALS: usize = 17;

/// Which coordinate a value belongs to; decides the hemisphere letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    pub fn from_is_latitude(is_latitude: bool) -> Self {
        if is_latitude {
            Axis::Latitude
        } else {
            Axis::Longitude
        }
    }

    /// Hemisphere letter for a signed value. Zero counts as positive.
    pub fn hemisphere(self, value: f64) -> char {
        let positive = value >= 0.0;
        match (self, positive) {
            (Axis::Latitude, true) => 'N',
            (Axis::Latitude, false) => 'S',
            (Axis::Longitude, true) => 'E',
            (Axis::Longitude, false) => 'W',
        }
    }
}

/// Format decimal degrees as `D°MM.mmm' H`, e.g. `47°30.000' N`.
pub fn format_ddm(value: f64, axis: Axis) -> String {
    format_ddm_with(value, axis, DEFAULT_MINUTE_DECIMALS)
}

/// Same as [`format_ddm`] with a configurable number of minute decimals.
///
/// Minutes are rounded as printed and never carried into the degrees, so a value
/// just below a whole degree can print as `60.000`. Precision is capped at
/// [`MAX_DECIMALS`].
pub fn format_ddm_with(value: f64, axis: Axis, minute_decimals: usize) -> String {
    let minute_decimals = minute_decimals.min(MAX_DECIMALS);
    let hemisphere = axis.hemisphere(value);
    let magnitude = value.abs();
    let degrees = magnitude.floor();
    let minutes = (magnitude - degrees) * 60.0;

    format!("{degrees:.0}°{minutes:.minute_decimals$}' {hemisphere}")
}
