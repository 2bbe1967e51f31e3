use serde::Deserialize;

use crate::ddm::{DEFAULT_MINUTE_DECIMALS, MAX_DECIMALS};
use crate::error::WaypointError;

/// Options for waypoint extraction and formatting.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractOptions {
    /// Substring removed from every waypoint name (default: "Venom1")
    #[serde(default = "default_strip_name_token")]
    pub strip_name_token: String,

    /// Decimals printed for DDM minutes (default: 3)
    #[serde(default = "default_minute_decimals")]
    pub minute_decimals: usize,

    /// Decimals printed for the altitude in feet (default: 2)
    #[serde(default = "default_altitude_decimals")]
    pub altitude_decimals: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            strip_name_token: default_strip_name_token(),
            minute_decimals: default_minute_decimals(),
            altitude_decimals: default_altitude_decimals(),
        }
    }
}

impl ExtractOptions {
    /// Reject precisions the formatter cannot honour.
    pub fn validate(&self) -> Result<(), WaypointError> {
        for (field, value) in [
            ("minuteDecimals", self.minute_decimals),
            ("altitudeDecimals", self.altitude_decimals),
        ] {
            if value > MAX_DECIMALS {
                return Err(WaypointError::InvalidOption(format!(
                    "{field} must be at most {MAX_DECIMALS}, got {value}"
                )));
            }
        }
        Ok(())
    }
}

fn default_strip_name_token() -> String {
    "Venom1".to_string()
}

fn default_minute_decimals() -> usize {
    DEFAULT_MINUTE_DECIMALS
}

fn default_altitude_decimals() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let opts: ExtractOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.strip_name_token, "Venom1");
        assert_eq!(opts.minute_decimals, 3);
        assert_eq!(opts.altitude_decimals, 2);
    }

    #[test]
    fn test_camel_case_fields() {
        let opts: ExtractOptions =
            serde_json::from_str(r#"{"stripNameToken": "Viper2", "altitudeDecimals": 0}"#)
                .unwrap();
        assert_eq!(opts.strip_name_token, "Viper2");
        assert_eq!(opts.minute_decimals, 3);
        assert_eq!(opts.altitude_decimals, 0);
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(ExtractOptions::default().validate().is_ok());
    }

    #[test]
    fn test_huge_precision_rejected() {
        let opts: ExtractOptions =
            serde_json::from_str(r#"{"minuteDecimals": 100000}"#).unwrap();
        let err = opts.validate().unwrap_err();
        assert!(matches!(err, WaypointError::InvalidOption(_)));
        assert_eq!(
            err.to_string(),
            "invalid option: minuteDecimals must be at most 17, got 100000"
        );

        let opts = ExtractOptions {
            altitude_decimals: 18,
            ..ExtractOptions::default()
        };
        assert!(opts.validate().is_err());
    }
}
