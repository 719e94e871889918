//! Row schema interpretation.
//!
//! [`interpret`] walks the caller's [`RowDescriptor`]s and produces one row of [`Cell`]s plus one
//! [`RowTag`] per descriptor. [`parse_rows`] is the loosely-typed entry point used for JSON input;
//! it is where unknown row kinds are rejected.

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, SchemaError};
use crate::model::{ColumnAlignment, ColumnDescriptor, RowDescriptor, SpacerSize};
use crate::richtext::{parse_markup, RichText};

/// Raw `row_type` tag of a title row.
pub const ROW_TYPE_TITLE: &str = "row_type_title";
/// Raw `row_type` tag of a spacer row.
pub const ROW_TYPE_SPACER: &str = "spacer";
/// Raw `row_type` tag of a regular row.
pub const ROW_TYPE_REGULAR: &str = "regular_row";

/// Kind of a row as seen by the background resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowTag {
    /// A title banner.
    Title,
    /// A blank spacer.
    Spacer,
    /// A regular data row.
    Item,
}

/// A renderable cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// Formatted text with its horizontal alignment.
    Text {
        /// Parsed rich text.
        text: RichText,
        /// Alignment of the paragraph inside the cell.
        alignment: ColumnAlignment,
    },
    /// Blank space of a fixed size in points.
    Space(SpacerSize),
}

impl Cell {
    /// Returns the alignment for text cells.
    pub fn alignment(&self) -> Option<ColumnAlignment> {
        match self {
            Cell::Text { alignment, .. } => Some(*alignment),
            Cell::Space(_) => None,
        }
    }

    /// Returns the unstyled text for text cells.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            Cell::Text { text, .. } => Some(text.plain_text()),
            Cell::Space(_) => None,
        }
    }
}

/// Output of [`interpret`]: a cell matrix and a parallel list of row tags.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InterpretedRows {
    rows: Vec<Vec<Cell>>,
    tags: Vec<RowTag>,
}

impl InterpretedRows {
    /// Returns the cell matrix, one entry per input row.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Returns the row tags, parallel to [`InterpretedRows::rows`].
    pub fn tags(&self) -> &[RowTag] {
        &self.tags
    }

    /// Number of interpreted rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when no rows were interpreted.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<Vec<Cell>>, Vec<RowTag>) {
        (self.rows, self.tags)
    }
}

/// Interprets row descriptors into cells and tags, preserving input order.
pub fn interpret(rows: &[RowDescriptor]) -> Result<InterpretedRows, BuildError> {
    let mut interpreted = InterpretedRows::default();

    for (index, row) in rows.iter().enumerate() {
        let (cells, tag) = match row {
            RowDescriptor::Title(title) => {
                let cell = Cell::Text {
                    text: parse_cell_markup(index, title)?,
                    alignment: ColumnAlignment::Left,
                };
                (vec![cell], RowTag::Title)
            }
            RowDescriptor::Spacer(size) => {
                (vec![Cell::Space(size.unwrap_or_default())], RowTag::Spacer)
            }
            RowDescriptor::Regular(columns) => {
                let cells = columns
                    .iter()
                    .map(|column| {
                        Ok(Cell::Text {
                            text: parse_cell_markup(index, column.display_text())?,
                            alignment: column.alignment(),
                        })
                    })
                    .collect::<Result<Vec<_>, BuildError>>()?;
                (cells, RowTag::Item)
            }
        };
        interpreted.rows.push(cells);
        interpreted.tags.push(tag);
    }

    Ok(interpreted)
}

fn parse_cell_markup(row: usize, markup: &str) -> Result<RichText, BuildError> {
    parse_markup(markup).map_err(|source| BuildError::Markup { row, source })
}

/// A row as found in JSON input, using the dictionary keys of the row schema.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// One of [`ROW_TYPE_TITLE`], [`ROW_TYPE_SPACER`] or [`ROW_TYPE_REGULAR`].
    #[serde(default)]
    pub row_type: Option<String>,
    /// Title text of a title row.
    #[serde(default)]
    pub title: Option<String>,
    /// Row payload: title text, spacer size or columns depending on the row type.
    #[serde(default)]
    pub row_data: Option<RawRowData>,
}

/// Payload of a [`RawRow`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRowData {
    /// Title text.
    Text(String),
    /// Spacer `[width, height]` in points.
    Size([f64; 2]),
    /// Regular row columns.
    Columns(Vec<RawColumn>),
}

/// A column of a raw regular row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawColumn {
    /// Cell content. Strings are used as-is, other JSON values by their JSON text, `null` is
    /// treated as missing.
    #[serde(default)]
    pub column_content: Option<serde_json::Value>,
    /// Alignment tag such as `align_right`.
    #[serde(default)]
    pub column_align: Option<String>,
}

impl RawColumn {
    fn to_descriptor(&self) -> ColumnDescriptor {
        let content = match &self.column_content {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        };
        ColumnDescriptor::empty()
            .with_content(content)
            .with_alignment(ColumnAlignment::from_raw(self.column_align.as_deref()))
    }
}

/// Converts raw rows into typed descriptors, failing on the first malformed row.
pub fn parse_rows(raw: &[RawRow]) -> Result<Vec<RowDescriptor>, SchemaError> {
    raw.iter()
        .enumerate()
        .map(|(index, row)| parse_row(index, row))
        .collect()
}

/// Decodes a JSON array of raw rows and converts it with [`parse_rows`].
pub fn parse_rows_json(json: &str) -> Result<Vec<RowDescriptor>, SchemaError> {
    let raw: Vec<RawRow> = serde_json::from_str(json)?;
    parse_rows(&raw)
}

fn parse_row(index: usize, row: &RawRow) -> Result<RowDescriptor, SchemaError> {
    match row.row_type.as_deref() {
        Some(ROW_TYPE_TITLE) => {
            let title = match (&row.title, &row.row_data) {
                (Some(title), _) => title.clone(),
                (None, Some(RawRowData::Text(text))) => text.clone(),
                _ => return Err(SchemaError::MissingTitle { index }),
            };
            Ok(RowDescriptor::Title(title))
        }
        Some(ROW_TYPE_SPACER) => match &row.row_data {
            None => Ok(RowDescriptor::Spacer(None)),
            Some(RawRowData::Size([width, height])) => {
                Ok(RowDescriptor::sized_spacer(*width, *height))
            }
            Some(_) => Err(SchemaError::InvalidRowData {
                index,
                expected: "a `[width, height]` pair",
            }),
        },
        Some(ROW_TYPE_REGULAR) => match &row.row_data {
            Some(RawRowData::Columns(columns)) => Ok(RowDescriptor::Regular(
                columns.iter().map(RawColumn::to_descriptor).collect(),
            )),
            _ => Err(SchemaError::InvalidRowData {
                index,
                expected: "a list of columns",
            }),
        },
        other => Err(SchemaError::UnknownRowType {
            index,
            row_type: other.map(str::to_string),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> Vec<RowDescriptor> {
        vec![
            RowDescriptor::title("Outside Colors:"),
            RowDescriptor::regular([
                ColumnDescriptor::new("Panel color:"),
                ColumnDescriptor::new("7012 Matt"),
                ColumnDescriptor::new("$100").with_alignment(ColumnAlignment::Right),
            ]),
        ]
    }

    #[test]
    fn interprets_rows_in_order() {
        let interpreted = interpret(&sample_rows()).expect("interpret");
        assert_eq!(interpreted.len(), 2);
        assert_eq!(interpreted.tags(), &[RowTag::Title, RowTag::Item]);

        let regular = &interpreted.rows()[1];
        assert_eq!(regular.len(), 3);
        assert_eq!(regular[0].plain_text().as_deref(), Some("Panel color:"));
        assert_eq!(regular[0].alignment(), Some(ColumnAlignment::Left));
        assert_eq!(regular[1].alignment(), Some(ColumnAlignment::Left));
        assert_eq!(regular[2].alignment(), Some(ColumnAlignment::Right));
    }

    #[test]
    fn spacer_defaults_to_one_by_one() {
        let interpreted =
            interpret(&[RowDescriptor::spacer(), RowDescriptor::sized_spacer(10.0, 20.0)])
                .expect("interpret");
        assert_eq!(interpreted.rows()[0], vec![Cell::Space(SpacerSize::new(1.0, 1.0))]);
        assert_eq!(interpreted.rows()[1], vec![Cell::Space(SpacerSize::new(10.0, 20.0))]);
        assert_eq!(interpreted.tags(), &[RowTag::Spacer, RowTag::Spacer]);
    }

    #[test]
    fn missing_content_renders_placeholder() {
        let interpreted = interpret(&[RowDescriptor::regular([
            ColumnDescriptor::empty(),
            ColumnDescriptor::new(""),
        ])])
        .expect("interpret");
        let cells = &interpreted.rows()[0];
        assert_eq!(cells[0].plain_text().as_deref(), Some("N/A"));
        assert_eq!(cells[1].plain_text().as_deref(), Some("N/A"));
    }

    #[test]
    fn ragged_rows_keep_their_column_counts() {
        let interpreted = interpret(&[
            RowDescriptor::regular([ColumnDescriptor::new("a")]),
            RowDescriptor::regular((0..5).map(|i| ColumnDescriptor::new(i.to_string()))),
            RowDescriptor::Regular(Vec::new()),
        ])
        .expect("interpret");
        let counts: Vec<_> = interpreted.rows().iter().map(Vec::len).collect();
        assert_eq!(counts, vec![1, 5, 0]);
    }

    #[test]
    fn malformed_markup_reports_row_index() {
        let err = interpret(&[
            RowDescriptor::title("ok"),
            RowDescriptor::title("<b>unterminated"),
        ])
        .unwrap_err();
        assert!(matches!(err, BuildError::Markup { row: 1, .. }));
    }

    #[test]
    fn parses_raw_json_rows() {
        let json = r#"[
            {"row_type": "row_type_title", "title": "<font size=10>16/10/2026</font>"},
            {"row_type": "spacer"},
            {"row_type": "spacer", "row_data": [5, 12]},
            {"row_type": "row_type_title", "row_data": "Outside Colors:"},
            {"row_type": "regular_row", "row_data": [
                {"column_content": "Panel color outside:"},
                {"column_content": 7012},
                {"column_content": null, "column_align": "align_right"},
                {"column_content": "$100", "column_align": "align_sideways"}
            ]}
        ]"#;

        let rows = parse_rows_json(json).expect("parse");
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], RowDescriptor::title("<font size=10>16/10/2026</font>"));
        assert_eq!(rows[1], RowDescriptor::spacer());
        assert_eq!(rows[2], RowDescriptor::sized_spacer(5.0, 12.0));
        assert_eq!(rows[3], RowDescriptor::title("Outside Colors:"));
        assert_eq!(
            rows[4],
            RowDescriptor::regular([
                ColumnDescriptor::new("Panel color outside:"),
                ColumnDescriptor::new("7012"),
                ColumnDescriptor::empty().with_alignment(ColumnAlignment::Right),
                ColumnDescriptor::new("$100"),
            ])
        );
    }

    #[test]
    fn unknown_row_type_is_rejected_with_index() {
        let json = r#"[
            {"row_type": "spacer"},
            {"row_type": "banner", "title": "x"}
        ]"#;
        let err = parse_rows_json(json).unwrap_err();
        match err {
            SchemaError::UnknownRowType { index, row_type } => {
                assert_eq!(index, 1);
                assert_eq!(row_type.as_deref(), Some("banner"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_row_type_is_rejected() {
        let err = parse_rows(&[RawRow::default()]).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnknownRowType {
                index: 0,
                row_type: None
            }
        ));
    }

    #[test]
    fn regular_row_without_columns_is_rejected() {
        let row = RawRow {
            row_type: Some(ROW_TYPE_REGULAR.to_string()),
            ..RawRow::default()
        };
        let err = parse_rows(&[row]).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidRowData { index: 0, .. }));
    }

    #[test]
    fn title_without_text_is_rejected() {
        let row = RawRow {
            row_type: Some(ROW_TYPE_TITLE.to_string()),
            ..RawRow::default()
        };
        assert!(matches!(
            parse_rows(&[row]).unwrap_err(),
            SchemaError::MissingTitle { index: 0 }
        ));
    }
}
