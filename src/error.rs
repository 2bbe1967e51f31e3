use thiserror::Error;
use wasm_bindgen::JsValue;

/// Structural failures that abort a whole extraction.
///
/// Individual waypoints with missing or non-numeric fields never produce one of
/// these; they are skipped by the extractor.
#[derive(Debug, Error)]
pub enum WaypointError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("unclosed element <{0}>")]
    UnclosedElement(String),

    #[error("unexpected end tag </{0}>")]
    UnexpectedEndTag(String),

    #[error("no element found")]
    NoRootElement,

    #[error("content outside the document element")]
    ContentOutsideRoot,

    #[error("undefined entity &{0};")]
    UndefinedEntity(String),

    #[error("invalid entity declaration for '{0}'")]
    InvalidEntityDeclaration(String),

    #[error("not well-formed (invalid name '{0}')")]
    InvalidName(String),

    #[error("not well-formed ('<' in the value of attribute '{0}')")]
    InvalidAttributeValue(String),

    #[error("not well-formed (']]>' in character data)")]
    CdataEndInText,

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WaypointError {
    /// The single message shown to the user for a failed load.
    ///
    /// Every document or file failure reads the same way; only a bad option or an
    /// output failure is reported as itself.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidOption(_) | Self::Json(_) => self.to_string(),
            _ => format!("Failed to parse XML:\n{self}"),
        }
    }
}

impl From<WaypointError> for JsValue {
    fn from(e: WaypointError) -> Self {
        JsValue::from_str(&e.user_message())
    }
}
