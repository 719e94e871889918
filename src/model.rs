//! Data structures describing the rows of a table document.
//!
//! The types in this module are plain values that callers assemble before a build.  They do not
//! reference `genpdf` so they can be produced by frontends or decoded from JSON (see
//! [`crate::schema::RawRow`]) without touching the rendering layer.

/// Text rendered in place of a column whose content is missing or empty.
pub const NOT_AVAILABLE: &str = "N/A";

/// Text substituted by [`rows_from_fields`] for fields without a value.
pub const MISSING_FIELD_VALUE: &str = "---";

/// Horizontal alignment requested for a column of a regular row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColumnAlignment {
    /// Left aligned content.
    #[default]
    Left,
    /// Center aligned content.
    Center,
    /// Right aligned content.
    Right,
    /// Fully justified content.
    Justify,
}

impl ColumnAlignment {
    /// Resolves a raw alignment tag such as `align_right`.
    ///
    /// Only the center, right and justify tags are recognized; anything else, including a missing
    /// tag, resolves to [`ColumnAlignment::Left`].
    pub fn from_raw(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("align_center") => Self::Center,
            Some("align_right") => Self::Right,
            Some("align_justify") => Self::Justify,
            _ => Self::Left,
        }
    }
}

/// A single column of a regular row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnDescriptor {
    content: Option<String>,
    alignment: ColumnAlignment,
}

impl ColumnDescriptor {
    /// Creates a left-aligned column with the given rich-text content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            alignment: ColumnAlignment::Left,
        }
    }

    /// Creates a column without content. It renders as [`NOT_AVAILABLE`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets the content and returns the updated column.
    pub fn with_content(mut self, content: impl Into<Option<String>>) -> Self {
        self.content = content.into();
        self
    }

    /// Sets the alignment and returns the updated column.
    pub fn with_alignment(mut self, alignment: ColumnAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Returns the raw content, if any.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Returns the requested alignment.
    pub fn alignment(&self) -> ColumnAlignment {
        self.alignment
    }

    /// Returns the markup to render, substituting [`NOT_AVAILABLE`] for missing or empty content.
    pub fn display_text(&self) -> &str {
        match self.content.as_deref() {
            Some(content) if !content.is_empty() => content,
            _ => NOT_AVAILABLE,
        }
    }
}

/// Size of a spacer row in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpacerSize {
    /// Width in points.
    pub width: f64,
    /// Height in points.
    pub height: f64,
}

impl SpacerSize {
    /// Creates a spacer size from a width and height in points.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for SpacerSize {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// One logical row of the table.
#[derive(Clone, Debug, PartialEq)]
pub enum RowDescriptor {
    /// A banner row holding a single rich-text string, e.g. `<font size=10>Outside Colors:</font>`.
    Title(String),
    /// A blank row of the given size, defaulting to 1×1 points.
    Spacer(Option<SpacerSize>),
    /// A data row with one cell per column.
    Regular(Vec<ColumnDescriptor>),
}

impl RowDescriptor {
    /// Convenience helper for building a title row.
    pub fn title(text: impl Into<String>) -> Self {
        Self::Title(text.into())
    }

    /// Convenience helper for a spacer row of the default size.
    pub fn spacer() -> Self {
        Self::Spacer(None)
    }

    /// Convenience helper for a spacer row of an explicit size in points.
    pub fn sized_spacer(width: f64, height: f64) -> Self {
        Self::Spacer(Some(SpacerSize::new(width, height)))
    }

    /// Convenience helper for a regular row.
    pub fn regular<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = ColumnDescriptor>,
    {
        Self::Regular(columns.into_iter().collect())
    }
}

/// Representation of image sources supported by the content model.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    /// Image loaded from raw bytes.
    Bytes(Vec<u8>),
    /// Image referenced by a file path.
    Path(String),
}

impl ImageSource {
    /// Creates a new in-memory image from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Creates an image sourced from a file path.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }
}

/// Where an extra image is placed relative to the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImagePosition {
    /// Rendered before the table.
    BeforeTable,
    /// Rendered after the table.
    AfterTable,
}

/// An image together with its placement relative to the table.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedImage {
    source: ImageSource,
    position: ImagePosition,
}

impl PlacedImage {
    /// Creates a placed image.
    pub fn new(source: ImageSource, position: ImagePosition) -> Self {
        Self { source, position }
    }

    /// Creates an image placed before the table.
    pub fn before_table(source: ImageSource) -> Self {
        Self::new(source, ImagePosition::BeforeTable)
    }

    /// Creates an image placed after the table.
    pub fn after_table(source: ImageSource) -> Self {
        Self::new(source, ImagePosition::AfterTable)
    }

    /// Returns the image source.
    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Returns the placement.
    pub fn position(&self) -> ImagePosition {
        self.position
    }
}

/// Turns labelled field values into two-column regular rows.
///
/// Fields whose label appears in `exclude` are skipped. Missing values render as
/// [`MISSING_FIELD_VALUE`].
pub fn rows_from_fields<I, L, V>(fields: I, exclude: &[&str]) -> Vec<RowDescriptor>
where
    I: IntoIterator<Item = (L, Option<V>)>,
    L: Into<String>,
    V: ToString,
{
    fields
        .into_iter()
        .map(|(label, value)| (label.into(), value))
        .filter(|(label, _)| !exclude.contains(&label.as_str()))
        .map(|(label, value)| {
            let value = value
                .map(|value| value.to_string())
                .unwrap_or_else(|| MISSING_FIELD_VALUE.to_string());
            RowDescriptor::regular([ColumnDescriptor::new(label), ColumnDescriptor::new(value)])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_empty_content_displays_placeholder() {
        assert_eq!(ColumnDescriptor::empty().display_text(), NOT_AVAILABLE);
        assert_eq!(ColumnDescriptor::new("").display_text(), NOT_AVAILABLE);
        assert_eq!(ColumnDescriptor::new("7012 Matt").display_text(), "7012 Matt");
    }

    #[test]
    fn raw_alignment_falls_back_to_left() {
        assert_eq!(ColumnAlignment::from_raw(Some("align_center")), ColumnAlignment::Center);
        assert_eq!(ColumnAlignment::from_raw(Some("align_right")), ColumnAlignment::Right);
        assert_eq!(ColumnAlignment::from_raw(Some("align_justify")), ColumnAlignment::Justify);
        assert_eq!(ColumnAlignment::from_raw(Some("align_left")), ColumnAlignment::Left);
        assert_eq!(ColumnAlignment::from_raw(Some("diagonal")), ColumnAlignment::Left);
        assert_eq!(ColumnAlignment::from_raw(None), ColumnAlignment::Left);
    }

    #[test]
    fn fields_become_two_column_rows() {
        let rows = rows_from_fields(
            [
                ("Id", Some(7)),
                ("Width", Some(120)),
                ("Height", None),
            ],
            &["Id"],
        );

        assert_eq!(
            rows,
            vec![
                RowDescriptor::regular([
                    ColumnDescriptor::new("Width"),
                    ColumnDescriptor::new("120"),
                ]),
                RowDescriptor::regular([
                    ColumnDescriptor::new("Height"),
                    ColumnDescriptor::new(MISSING_FIELD_VALUE),
                ]),
            ]
        );
    }

    #[test]
    fn spacer_defaults_to_one_point() {
        assert_eq!(SpacerSize::default(), SpacerSize::new(1.0, 1.0));
    }
}
