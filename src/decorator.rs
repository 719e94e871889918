//! Per-page header and footer drawing.
//!
//! Coordinates follow PDF conventions: points, measured from the bottom-left corner of the page.
//! They are converted to `genpdf`'s top-left millimetre positions when drawing.

use genpdf::elements::Image;
use genpdf::error::Error;
use genpdf::style::{Style, StyledString};
use genpdf::{render, Element, Mm, PageDecorator, Position};
use log::warn;

use crate::elements::{decode_image, pt, sized_image};
use crate::error::BuildError;
use crate::model::ImageSource;

/// Left edge of the header text, separators and content frame.
pub const BASIC_MARGIN_PT: f64 = 30.0;
/// Width of the content frame and of the separator lines.
pub const FRAME_WIDTH_PT: f64 = 530.0;
/// Height of the content frame.
pub const FRAME_HEIGHT_PT: f64 = 687.0;

const LOGO_X_PT: f64 = 350.0;
const LOGO_BOTTOM_PT: f64 = 750.0;
const LOGO_WIDTH_PT: f64 = 210.0;
const LOGO_HEIGHT_PT: f64 = 70.0;

const TITLE_BASELINE_PT: f64 = LOGO_BOTTOM_PT + 62.0;
const TITLE_FONT_SIZE: u8 = 10;
const ADDRESS_FIRST_BASELINE_PT: f64 = TITLE_BASELINE_PT - 20.0;
const ADDRESS_LINE_HEIGHT_PT: f64 = 12.0;
const ADDRESS_FONT_SIZE: u8 = 9;

const HEADER_LINE_Y_PT: f64 = 730.0;
const FOOTER_LINE_Y_PT: f64 = 20.0;

const FOOTER_BASELINE_PT: f64 = 8.0;
const FOOTER_FONT_SIZE: u8 = 8;
const PAGE_NUMBER_CENTER_PT: f64 = 295.0;
const WATERMARK_CENTER_PT: f64 = 507.0;

/// Supplies the data drawn in the page header and footer.
pub trait HeaderSource {
    /// Title line drawn above the address block; also used as the document title.
    fn title(&self) -> Option<&str> {
        None
    }

    /// Address lines drawn below the title.
    fn address_lines(&self) -> &[String] {
        &[]
    }

    /// Logo drawn in the top-right corner.
    fn logo(&self) -> Option<&ImageSource>;

    /// Text stamped in the footer.
    fn watermark(&self) -> Option<&str>;
}

/// Header data passed in directly by the caller: an optional logo and watermark.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SuppliedHeader {
    logo: Option<ImageSource>,
    watermark: Option<String>,
}

impl SuppliedHeader {
    /// Creates a header from an optional logo and watermark.
    pub fn new(logo: Option<ImageSource>, watermark: Option<String>) -> Self {
        Self { logo, watermark }
    }
}

impl HeaderSource for SuppliedHeader {
    fn logo(&self) -> Option<&ImageSource> {
        self.logo.as_ref()
    }

    fn watermark(&self) -> Option<&str> {
        self.watermark.as_deref()
    }
}

/// Static company information: title, address block, logo and watermark.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompanyInfo {
    tab_title: String,
    address_parts: Vec<String>,
    logo: Option<ImageSource>,
    watermark: Option<String>,
}

impl CompanyInfo {
    /// Creates company information with the given title.
    pub fn new(tab_title: impl Into<String>) -> Self {
        Self {
            tab_title: tab_title.into(),
            ..Self::default()
        }
    }

    /// Sets the address lines and returns the updated value.
    pub fn with_address<I, S>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.address_parts = parts.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the logo and returns the updated value.
    pub fn with_logo(mut self, logo: impl Into<Option<ImageSource>>) -> Self {
        self.logo = logo.into();
        self
    }

    /// Sets the footer watermark and returns the updated value.
    pub fn with_watermark(mut self, watermark: impl Into<Option<String>>) -> Self {
        self.watermark = watermark.into();
        self
    }
}

impl HeaderSource for CompanyInfo {
    fn title(&self) -> Option<&str> {
        Some(&self.tab_title)
    }

    fn address_lines(&self) -> &[String] {
        &self.address_parts
    }

    fn logo(&self) -> Option<&ImageSource> {
        self.logo.as_ref()
    }

    fn watermark(&self) -> Option<&str> {
        self.watermark.as_deref()
    }
}

/// Corners of the content frame border as a closed path, starting and ending at the top-left
/// corner.
pub fn frame_outline(page_height: Mm) -> Vec<Position> {
    let left = pt(BASIC_MARGIN_PT);
    let right = pt(BASIC_MARGIN_PT + FRAME_WIDTH_PT);
    let top = page_height - pt(BASIC_MARGIN_PT + FRAME_HEIGHT_PT);
    let bottom = page_height - pt(BASIC_MARGIN_PT);
    vec![
        Position::new(left, top),
        Position::new(right, top),
        Position::new(right, bottom),
        Position::new(left, bottom),
        Position::new(left, top),
    ]
}

/// Formats the footer page label, e.g. `-3-`.
pub fn page_label(page: usize) -> String {
    format!("-{}-", page)
}

/// Page decorator drawing the header and footer and narrowing each page to the content frame.
pub struct PageDecorations {
    page: usize,
    title: Option<String>,
    address_lines: Vec<String>,
    watermark: Option<String>,
    logo: Option<Image>,
}

impl PageDecorations {
    /// Snapshots `source` for a single build. The logo is decoded here so that an unreadable
    /// logo fails the build before any page is laid out.
    pub fn from_source(source: &dyn HeaderSource) -> Result<Self, BuildError> {
        let logo = source
            .logo()
            .map(|logo| {
                decode_image(logo)
                    .and_then(|image| sized_image(image, pt(LOGO_WIDTH_PT), pt(LOGO_HEIGHT_PT)))
            })
            .transpose()
            .map_err(BuildError::Logo)?;

        Ok(Self {
            page: 0,
            title: source.title().map(str::to_string),
            address_lines: source
                .address_lines()
                .iter()
                .map(|line| line.trim().to_string())
                .collect(),
            watermark: source.watermark().map(str::to_string),
            logo,
        })
    }

    /// Number of pages decorated so far.
    pub fn pages_decorated(&self) -> usize {
        self.page
    }
}

struct PageCanvas<'c, 'a> {
    context: &'c genpdf::Context,
    area: &'c render::Area<'a>,
    page_height: Mm,
}

impl PageCanvas<'_, '_> {
    fn from_bottom(&self, y_pt: f64) -> Mm {
        self.page_height - pt(y_pt)
    }

    fn text_width(&self, style: Style, text: &str) -> Mm {
        StyledString::new(text, style).width(&self.context.font_cache)
    }

    fn draw_text(&self, x: Mm, baseline_pt: f64, style: Style, text: &str) -> Result<(), Error> {
        let ascent = style
            .font(&self.context.font_cache)
            .glyph_height(style.font_size());
        let top = self.from_bottom(baseline_pt) - ascent;
        let printed = self
            .area
            .print_str(&self.context.font_cache, Position::new(x, top), style, text)?;
        if !printed {
            warn!("Page decoration `{}` did not fit on the page", text);
        }
        Ok(())
    }

    fn draw_centered(
        &self,
        center_pt: f64,
        baseline_pt: f64,
        style: Style,
        text: &str,
    ) -> Result<(), Error> {
        let x = pt(center_pt) - self.text_width(style, text) / 2.0;
        self.draw_text(x, baseline_pt, style, text)
    }

    fn draw_separator(&self, y_pt: f64) {
        let y = self.from_bottom(y_pt);
        self.area.draw_line(
            vec![
                Position::new(pt(BASIC_MARGIN_PT), y),
                Position::new(pt(BASIC_MARGIN_PT + FRAME_WIDTH_PT), y),
            ],
            Style::new(),
        );
    }

    fn draw_frame_border(&self) {
        self.area.draw_line(frame_outline(self.page_height), Style::new());
    }
}

impl PageDecorator for PageDecorations {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'a>,
        style: Style,
    ) -> Result<render::Area<'a>, Error> {
        self.page += 1;
        let page_height = area.size().height;

        if let Some(logo) = &mut self.logo {
            let mut logo_area = area.clone();
            logo_area.add_offset(Position::new(
                pt(LOGO_X_PT),
                page_height - pt(LOGO_BOTTOM_PT + LOGO_HEIGHT_PT),
            ));
            logo.render(context, logo_area, style)?;
        }

        {
            let canvas = PageCanvas {
                context,
                area: &area,
                page_height,
            };

            if let Some(title) = &self.title {
                let title_style = style.and(Style::new().bold().with_font_size(TITLE_FONT_SIZE));
                canvas.draw_text(pt(BASIC_MARGIN_PT), TITLE_BASELINE_PT, title_style, title)?;
            }

            let address_style = style.and(Style::new().with_font_size(ADDRESS_FONT_SIZE));
            for (index, line) in self.address_lines.iter().enumerate() {
                let baseline = ADDRESS_FIRST_BASELINE_PT - index as f64 * ADDRESS_LINE_HEIGHT_PT;
                canvas.draw_text(pt(BASIC_MARGIN_PT), baseline, address_style, line)?;
            }

            canvas.draw_separator(HEADER_LINE_Y_PT);

            let footer_style = style.and(Style::new().bold().with_font_size(FOOTER_FONT_SIZE));
            canvas.draw_centered(
                PAGE_NUMBER_CENTER_PT,
                FOOTER_BASELINE_PT,
                footer_style,
                &page_label(self.page),
            )?;
            if let Some(watermark) = &self.watermark {
                canvas.draw_centered(
                    WATERMARK_CENTER_PT,
                    FOOTER_BASELINE_PT,
                    footer_style,
                    watermark,
                )?;
            }

            canvas.draw_separator(FOOTER_LINE_Y_PT);
            canvas.draw_frame_border();
        }

        let frame_top = page_height - pt(BASIC_MARGIN_PT + FRAME_HEIGHT_PT);
        area.add_offset(Position::new(pt(BASIC_MARGIN_PT), frame_top));
        area.set_width(pt(FRAME_WIDTH_PT));
        area.set_height(pt(FRAME_HEIGHT_PT));
        Ok(area)
    }
}
