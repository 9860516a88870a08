//! Structured error types for form rendering.
//!
//! Rendering is atomic: every failure surfaces as one `FormError` from the
//! top-level call and no partial document is returned.

use thiserror::Error;

/// The unified error type returned by all public faiform API functions.
#[derive(Debug, Error)]
pub enum FormError {
    /// JSON input failed to parse as a valid record.
    #[error("Failed to parse record: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// A font could not be parsed or embedded.
    #[error("Font error: {0}")]
    Font(String),

    /// A font family was requested that nobody registered.
    #[error("Missing font resource: no face registered for family '{family}'")]
    MissingFont { family: String },

    /// Explicit column widths do not fit inside the grid's total width.
    #[error("Column widths sum to {explicit:.3}in but the grid is only {total:.3}in wide")]
    ColumnOverflow { explicit: f64, total: f64 },

    /// Two cells claim the same slot, or a span runs past the grid edge.
    #[error("Cell at row {row}, column {col} overlaps another cell or the grid edge")]
    CellOverlap { row: usize, col: usize },

    /// A data grid does not line up with the template it overlays.
    #[error("Data grid shape {found:?} does not match template shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A data grid starts somewhere other than its template.
    #[error("Data grid starts at y={found:.3}in but its template starts at y={expected:.3}in")]
    AnchorMismatch { expected: f64, found: f64 },

    /// A grid's computed geometry leaves the page.
    #[error("Grid starting at y={start_y:.3}in reaches {edge:.3}in, beyond the {limit:.3}in page")]
    LayoutOverflow { start_y: f64, edge: f64, limit: f64 },

    /// A repeating section holds more entries than the form has rows for.
    #[error("{section} has {len} entries but the form only has room for {capacity}")]
    CapacityExceeded {
        section: &'static str,
        capacity: usize,
        len: usize,
    },

    /// A pair of mutually exclusive flags is not exactly-one-true.
    #[error("Exactly one of '{first}' and '{second}' must be set")]
    ExclusivePair {
        first: &'static str,
        second: &'static str,
    },

    /// PDF generation failed.
    #[error("Render error: {0}")]
    Render(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FormError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the record schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        FormError::Parse { source: e, hint }
    }
}
