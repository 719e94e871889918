//! Error types returned while turning row descriptors into a PDF document.

use std::fmt;

use crate::richtext::ParseError;

/// Errors raised while converting loosely-typed input rows into [`RowDescriptor`]s.
///
/// [`RowDescriptor`]: crate::model::RowDescriptor
#[derive(Debug)]
pub enum SchemaError {
    /// The input could not be decoded as JSON.
    Json(serde_json::Error),
    /// A row carried a type tag that is not one of the supported row kinds.
    UnknownRowType {
        /// Index of the offending row in the input sequence.
        index: usize,
        /// The tag found in the input, if any.
        row_type: Option<String>,
    },
    /// A title row did not carry any title text.
    MissingTitle {
        /// Index of the offending row in the input sequence.
        index: usize,
    },
    /// The `row_data` payload did not match the shape the row kind expects.
    InvalidRowData {
        /// Index of the offending row in the input sequence.
        index: usize,
        /// Description of the expected payload.
        expected: &'static str,
    },
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "Failed to decode row descriptors: {err}"),
            Self::UnknownRowType {
                index,
                row_type: Some(row_type),
            } => write!(f, "Row {index} has unrecognized row type `{row_type}`"),
            Self::UnknownRowType {
                index,
                row_type: None,
            } => write!(f, "Row {index} is missing its row type"),
            Self::MissingTitle { index } => write!(f, "Title row {index} has no title text"),
            Self::InvalidRowData { index, expected } => {
                write!(f, "Row {index} has invalid row data; expected {expected}")
            }
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::UnknownRowType { .. } | Self::MissingTitle { .. } | Self::InvalidRowData { .. } => {
                None
            }
        }
    }
}

/// Errors that abort a document build. No partial output is produced when one is returned.
#[derive(Debug)]
pub enum BuildError {
    /// [`crate::fonts::initialize`] has not been called before building.
    FontsNotInitialized,
    /// The font files could not be located or loaded.
    FontLoad(genpdf::error::Error),
    /// The configured logo could not be read or decoded.
    Logo(genpdf::error::Error),
    /// One of the images placed around the table could not be read or decoded.
    Image {
        /// Index of the image in the configured image list.
        index: usize,
        /// Underlying decoding error.
        source: genpdf::error::Error,
    },
    /// The rich-text markup of a row could not be parsed.
    Markup {
        /// Index of the row containing the malformed markup.
        row: usize,
        /// Underlying parser error.
        source: ParseError,
    },
    /// The raw row input was rejected.
    Schema(SchemaError),
    /// Layout or serialization failed inside `genpdf`.
    Render(genpdf::error::Error),
}

impl From<SchemaError> for BuildError {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontsNotInitialized => {
                write!(f, "Fonts are not registered; call fonts::initialize first")
            }
            Self::FontLoad(err) => write!(f, "Failed to load fonts: {err}"),
            Self::Logo(err) => write!(f, "Failed to load logo image: {err}"),
            Self::Image { index, source } => write!(f, "Failed to load image {index}: {source}"),
            Self::Markup { row, source } => write!(f, "Invalid markup in row {row}: {source}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "Failed to render document: {err}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontsNotInitialized => None,
            Self::FontLoad(err) | Self::Logo(err) | Self::Render(err) => Some(err),
            Self::Image { source, .. } => Some(source),
            Self::Markup { source, .. } => Some(source),
            Self::Schema(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_row_type_names_index_and_tag() {
        let err = SchemaError::UnknownRowType {
            index: 4,
            row_type: Some("banner".to_string()),
        };
        assert_eq!(err.to_string(), "Row 4 has unrecognized row type `banner`");
    }

    #[test]
    fn schema_error_converts_into_build_error() {
        let err: BuildError = SchemaError::MissingTitle { index: 1 }.into();
        assert!(matches!(err, BuildError::Schema(SchemaError::MissingTitle { index: 1 })));
        assert!(std::error::Error::source(&err).is_some());
    }
}
