//! Table assembly.
//!
//! [`assemble`] combines the interpreted cell matrix with the resolved backgrounds into an
//! [`AssembledTable`] with one logical row per input row. Rows are laid out
//! independently: title and spacer rows are a single full-width cell, regular rows split the width
//! evenly between however many columns they carry.

use genpdf::elements::{LinearLayout, Paragraph, TableLayout};
use genpdf::error::Error;
use genpdf::{Element, Margins};
use log::{debug, warn};

use crate::elements::{pt, FillPass, SegmentLog, ShadedRow, Spacer};
use crate::model::ColumnAlignment;
use crate::richtext::RichText;
use crate::schema::{Cell, InterpretedRows, RowTag};
use crate::style::{paragraph_alignment, resolve_backgrounds, BodyStyle, Shade};

/// Number of leading columns shaded by the default background span.
pub const DEFAULT_SHADED_COLUMNS: usize = 3;

/// Cell padding in points: top/bottom and left/right.
const CELL_PADDING_VERTICAL_PT: f64 = 3.0;
const CELL_PADDING_HORIZONTAL_PT: f64 = 6.0;

/// How far a row background extends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackgroundSpan {
    /// Shade the first `n` cells of each row. Rows with fewer cells are fully shaded, rows with
    /// more are shaded only across their first `n` cells.
    LeadingColumns(usize),
    /// Shade every cell of each row.
    FullRow,
}

impl BackgroundSpan {
    /// Number of cells shaded in a row of `column_count` cells.
    pub fn shaded_columns(self, column_count: usize) -> usize {
        match self {
            BackgroundSpan::LeadingColumns(limit) => limit.min(column_count),
            BackgroundSpan::FullRow => column_count,
        }
    }

    /// Share of the row width that is shaded for a row of `column_count` equal-width cells.
    pub fn fill_fraction(self, column_count: usize) -> f64 {
        if column_count == 0 {
            return 0.0;
        }
        self.shaded_columns(column_count) as f64 / column_count as f64
    }
}

impl Default for BackgroundSpan {
    fn default() -> Self {
        BackgroundSpan::LeadingColumns(DEFAULT_SHADED_COLUMNS)
    }
}

/// Summary of one assembled row.
#[derive(Clone, Debug, PartialEq)]
pub struct AssembledRow {
    tag: RowTag,
    shade: Shade,
    cells: Vec<Cell>,
    shaded_columns: usize,
    fill_fraction: f64,
}

impl AssembledRow {
    /// Returns the row kind.
    pub fn tag(&self) -> RowTag {
        self.tag
    }

    /// Returns the background directive.
    pub fn shade(&self) -> Shade {
        self.shade
    }

    /// Returns the cells of the row.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns how many leading cells the background covers.
    pub fn shaded_columns(&self) -> usize {
        self.shaded_columns
    }
}

/// The assembled table: one row per input row with its resolved background.
///
/// [`AssembledTable::layout`] builds the `genpdf` elements for one layout pass. Both passes of a
/// build share the per-row segment logs kept here.
pub struct AssembledTable {
    rows: Vec<AssembledRow>,
    segments: Vec<SegmentLog>,
    body: BodyStyle,
    justified_cells: usize,
}

impl AssembledTable {
    /// Returns the row summaries in render order.
    pub fn rows(&self) -> &[AssembledRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` for a table without rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of cells requesting justified text, which render left-aligned.
    pub fn justified_cells(&self) -> usize {
        self.justified_cells
    }

    /// Segment heights recorded for the row at `index` by the measuring pass.
    pub fn segments(&self, index: usize) -> Option<&SegmentLog> {
        self.segments.get(index)
    }

    /// Builds the table element for one layout pass.
    pub fn layout(&self, pass: FillPass) -> Result<LinearLayout, Error> {
        let mut layout = LinearLayout::vertical();
        for (row, segments) in self.rows.iter().zip(&self.segments) {
            let content = row_element(row.tag, &row.cells, &self.body)?;
            layout.push(ShadedRow::new(
                content,
                row.shade.color(),
                row.fill_fraction,
                pass,
                segments.clone(),
            ));
        }
        Ok(layout)
    }
}

/// Resolves the backgrounds of the interpreted rows and packages both into a table.
pub fn assemble(
    interpreted: InterpretedRows,
    span: BackgroundSpan,
    body: &BodyStyle,
) -> AssembledTable {
    let shades = resolve_backgrounds(interpreted.tags());
    let (rows, tags) = interpreted.into_parts();

    let mut assembled = Vec::with_capacity(rows.len());
    let mut justified = 0usize;
    for (index, ((cells, tag), shade)) in rows.into_iter().zip(tags).zip(shades).enumerate() {
        let column_count = cells.len();
        let shaded_columns = span.shaded_columns(column_count);
        if shaded_columns < column_count {
            debug!(
                "Row {} has {} columns; background covers the first {}",
                index, column_count, shaded_columns
            );
        }
        justified += cells
            .iter()
            .filter(|cell| cell.alignment() == Some(ColumnAlignment::Justify))
            .count();

        assembled.push(AssembledRow {
            tag,
            shade,
            cells,
            shaded_columns,
            fill_fraction: span.fill_fraction(column_count),
        });
    }

    if justified > 0 {
        warn!(
            "{} justified cells are rendered left-aligned; the layout engine cannot justify text",
            justified
        );
    }

    AssembledTable {
        segments: assembled.iter().map(|_| SegmentLog::new()).collect(),
        rows: assembled,
        body: *body,
        justified_cells: justified,
    }
}

fn row_element(
    tag: RowTag,
    cells: &[Cell],
    body: &BodyStyle,
) -> Result<Box<dyn Element>, Error> {
    let element: Box<dyn Element> = match (tag, cells) {
        (RowTag::Title | RowTag::Spacer, [cell]) => cell_element(cell, body),
        (_, []) => Box::new(Spacer::new(pt(0.0), pt(0.0))),
        _ => {
            let mut table = TableLayout::new(vec![1; cells.len()]);
            table.push_row(cells.iter().map(|cell| cell_element(cell, body)).collect())?;
            Box::new(table)
        }
    };
    Ok(element)
}

fn cell_element(cell: &Cell, body: &BodyStyle) -> Box<dyn Element> {
    match cell {
        Cell::Space(size) => Box::new(Spacer::new(pt(size.width), pt(size.height))),
        Cell::Text { text, alignment } => Box::new(
            text_element(text, *alignment)
                .styled(body.paragraph_style())
                .padded(Margins::trbl(
                    pt(CELL_PADDING_VERTICAL_PT),
                    pt(CELL_PADDING_HORIZONTAL_PT),
                    pt(CELL_PADDING_VERTICAL_PT),
                    pt(CELL_PADDING_HORIZONTAL_PT),
                )),
        ),
    }
}

fn text_element(text: &RichText, alignment: ColumnAlignment) -> LinearLayout {
    let alignment = paragraph_alignment(alignment);
    let mut layout = LinearLayout::vertical();
    for line in text.lines() {
        let mut paragraph = Paragraph::default();
        for span in line {
            paragraph.push(span.to_styled_string());
        }
        paragraph.set_alignment(alignment);
        layout.push(paragraph);
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnDescriptor, RowDescriptor};
    use crate::schema::interpret;

    fn build(rows: &[RowDescriptor], span: BackgroundSpan) -> AssembledTable {
        assemble(interpret(rows).expect("interpret"), span, &BodyStyle::default())
    }

    #[test]
    fn assembles_example_table() {
        let table = build(
            &[
                RowDescriptor::title("Outside Colors:"),
                RowDescriptor::regular([
                    ColumnDescriptor::new("Panel color:"),
                    ColumnDescriptor::new("7012 Matt"),
                    ColumnDescriptor::new("$100").with_alignment(ColumnAlignment::Right),
                ]),
            ],
            BackgroundSpan::default(),
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].shade(), Shade::Date);
        assert_eq!(table.rows()[1].shade(), Shade::Dark);

        let alignments: Vec<_> = table.rows()[1]
            .cells()
            .iter()
            .map(|cell| cell.alignment())
            .collect();
        assert_eq!(
            alignments,
            vec![
                Some(ColumnAlignment::Left),
                Some(ColumnAlignment::Left),
                Some(ColumnAlignment::Right),
            ]
        );
    }

    #[test]
    fn row_count_and_order_follow_input() {
        let rows = vec![
            RowDescriptor::title("A"),
            RowDescriptor::spacer(),
            RowDescriptor::regular([ColumnDescriptor::new("B")]),
            RowDescriptor::title("C"),
        ];
        let table = build(&rows, BackgroundSpan::default());
        let tags: Vec<_> = table.rows().iter().map(AssembledRow::tag).collect();
        assert_eq!(
            tags,
            vec![RowTag::Title, RowTag::Spacer, RowTag::Item, RowTag::Title]
        );
        assert_eq!(table.rows()[3].cells()[0].plain_text().as_deref(), Some("C"));
    }

    #[test]
    fn fixed_span_shades_at_most_three_columns() {
        let wide = RowDescriptor::regular((0..5).map(|i| ColumnDescriptor::new(i.to_string())));
        let narrow = RowDescriptor::regular([ColumnDescriptor::new("x"), ColumnDescriptor::new("y")]);
        let table = build(
            &[RowDescriptor::title("t"), wide, narrow],
            BackgroundSpan::default(),
        );

        assert_eq!(table.rows()[0].shaded_columns(), 1);
        // Rows wider than three columns are only partially shaded.
        assert_eq!(table.rows()[1].shaded_columns(), 3);
        assert_eq!(table.rows()[2].shaded_columns(), 2);
    }

    #[test]
    fn full_row_span_shades_every_column() {
        let wide = RowDescriptor::regular((0..5).map(|i| ColumnDescriptor::new(i.to_string())));
        let table = build(&[RowDescriptor::title("t"), wide], BackgroundSpan::FullRow);
        assert_eq!(table.rows()[1].shaded_columns(), 5);
    }

    #[test]
    fn fill_fraction_matches_shaded_share() {
        let span = BackgroundSpan::default();
        assert_eq!(span.fill_fraction(0), 0.0);
        assert_eq!(span.fill_fraction(1), 1.0);
        assert_eq!(span.fill_fraction(3), 1.0);
        assert!((span.fill_fraction(4) - 0.75).abs() < f64::EPSILON);
        assert_eq!(BackgroundSpan::FullRow.fill_fraction(4), 1.0);
    }

    #[test]
    fn empty_input_assembles_empty_table() {
        let table = build(&[], BackgroundSpan::default());
        assert!(table.is_empty());
        assert!(table.layout(FillPass::Measure).is_ok());
    }

    #[test]
    fn every_row_gets_a_shade_and_segment_log() {
        let rows: Vec<_> = (0..7)
            .map(|i| RowDescriptor::regular([ColumnDescriptor::new(i.to_string())]))
            .collect();
        let table = build(&rows, BackgroundSpan::default());
        assert_eq!(table.len(), 7);
        assert!((0..7).all(|index| table.segments(index).is_some()));
        assert!(table.segments(7).is_none());
        assert_eq!(table.rows()[6].shade(), Shade::Dark);
    }

    #[test]
    fn justified_cells_are_counted_once_per_table() {
        let justified = || ColumnDescriptor::new("x").with_alignment(ColumnAlignment::Justify);
        let rows: Vec<_> = (0..50)
            .map(|_| RowDescriptor::regular([justified(), ColumnDescriptor::new("y")]))
            .collect();
        let table = build(&rows, BackgroundSpan::default());
        assert_eq!(table.justified_cells(), 50);
        assert_eq!(
            table.rows()[0].cells()[0].alignment(),
            Some(ColumnAlignment::Justify)
        );
    }

    #[test]
    fn layouts_build_for_ragged_rows() {
        let table = build(
            &[
                RowDescriptor::title("t"),
                RowDescriptor::Regular(Vec::new()),
                RowDescriptor::regular((0..4).map(|i| ColumnDescriptor::new(i.to_string()))),
                RowDescriptor::sized_spacer(10.0, 4.0),
            ],
            BackgroundSpan::default(),
        );
        assert!(table.layout(FillPass::Measure).is_ok());
        assert!(table.layout(FillPass::Paint).is_ok());
    }
}
