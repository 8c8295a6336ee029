//! Structured error types for Folio.
//!
//! The variants cover the real error sources: JSON parsing, geometry that
//! cannot hold a table, row groups that do not match the page budgets, and
//! logo decoding. Bad numbers in the invoice itself
//! are never errors; the totals calculator clamps them to zero.

/// The unified error type returned by the synchronous Folio API.
#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    /// JSON input failed to parse as a valid export request.
    #[error("Failed to parse invoice: {source}{}", hint_suffix(.hint))]
    ParseError {
        source: serde_json::Error,
        hint: String,
    },
    /// The page geometry cannot fit a header plus at least one row, or the
    /// summary block cannot fit in the reserved footer area.
    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),
    /// Row groups handed to the compositor do not fit the page budgets.
    #[error("Layout error: {0}")]
    Layout(String),
    /// The logo could not be decoded.
    #[error("Image error: {0}")]
    Image(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the invoice schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => "Unexpected end of input, is the JSON truncated?".to_string(),
            serde_json::error::Category::Io => String::new(),
        };
        FolioError::ParseError { source: e, hint }
    }
}
