//! Row backgrounds and paragraph styles.

use genpdf::style::{Color, Style};
use genpdf::Alignment;

use crate::model::ColumnAlignment;
use crate::schema::RowTag;

/// Font size in points of table text.
pub const BODY_FONT_SIZE: u8 = 8;

/// Background of the first table row.
pub const DATE_BACKGROUND: Color = Color::Rgb(0xd9, 0xd9, 0xd9);
/// Background of title rows.
pub const TITLE_BACKGROUND: Color = Color::Rgb(0xbd, 0xbd, 0xbd);
/// Background of spacer rows and every second regular row.
pub const WHITE_BACKGROUND: Color = Color::Rgb(0xff, 0xff, 0xff);
/// Background of the first, third, fifth… regular row.
pub const DARK_BACKGROUND: Color = Color::Rgb(0xed, 0xed, 0xed);

/// Background directive for one table row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shade {
    /// The first row of the table, whatever its kind.
    Date,
    /// A title banner.
    Title,
    /// Spacers and the even-numbered regular rows.
    White,
    /// The odd-numbered regular rows.
    Dark,
}

impl Shade {
    /// Returns the fill color.
    pub fn color(self) -> Color {
        match self {
            Shade::Date => DATE_BACKGROUND,
            Shade::Title => TITLE_BACKGROUND,
            Shade::White => WHITE_BACKGROUND,
            Shade::Dark => DARK_BACKGROUND,
        }
    }
}

/// Resolves one background per row.
///
/// Row 0 is always [`Shade::Date`]. Regular rows alternate between [`Shade::Dark`] and
/// [`Shade::White`], starting with dark; the alternation counts regular rows only, so titles and
/// spacers in between do not shift it. Row 0 takes the date shade without advancing the counter,
/// even when it is a regular row.
pub fn resolve_backgrounds(tags: &[RowTag]) -> Vec<Shade> {
    let mut regular_rows = 0usize;
    tags.iter()
        .enumerate()
        .map(|(index, tag)| {
            if index == 0 {
                return Shade::Date;
            }
            match tag {
                RowTag::Title => Shade::Title,
                RowTag::Spacer => Shade::White,
                RowTag::Item => {
                    let shade = if regular_rows % 2 == 0 {
                        Shade::Dark
                    } else {
                        Shade::White
                    };
                    regular_rows += 1;
                    shade
                }
            }
        })
        .collect()
}

/// Paragraph style shared by every table cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyStyle {
    font_size: u8,
}

impl BodyStyle {
    /// Creates a body style with the given font size in points.
    pub fn new(font_size: u8) -> Self {
        Self { font_size }
    }

    /// Returns the font size in points.
    pub fn font_size(&self) -> u8 {
        self.font_size
    }

    /// Returns the `genpdf` style applied to cell paragraphs.
    ///
    /// The font family is left unset so the document's registered family applies.
    pub fn paragraph_style(&self) -> Style {
        Style::new().with_font_size(self.font_size)
    }
}

impl Default for BodyStyle {
    fn default() -> Self {
        Self::new(BODY_FONT_SIZE)
    }
}

/// Maps a column alignment onto the alignments `genpdf` paragraphs support.
///
/// `genpdf` paragraphs cannot justify text, so justified columns are rendered left-aligned.
/// [`crate::table::assemble`] reports them once per table.
pub fn paragraph_alignment(alignment: ColumnAlignment) -> Alignment {
    match alignment {
        ColumnAlignment::Left | ColumnAlignment::Justify => Alignment::Left,
        ColumnAlignment::Center => Alignment::Center,
        ColumnAlignment::Right => Alignment::Right,
    }
}
