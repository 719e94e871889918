//! Element implementations built on top of `genpdf` primitives.
//!
//! This module holds the image decoding helpers, the fixed-size spacer used for spacer rows and
//! around inline images, and [`ShadedRow`], which paints a background behind a table row.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use image::GenericImageView;

use genpdf::elements::{Image, LinearLayout};
use genpdf::error::{Context as _, Error};
use genpdf::style::{Color, Style};
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Scale, Size};

use crate::model::ImageSource;

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

/// Side length in points of images placed before or after the table.
pub const INLINE_IMAGE_SIZE_PT: f64 = 100.0;

/// Vertical gap in points above and below inline images.
pub const INLINE_IMAGE_GAP_PT: f64 = 10.0;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Converts a length in PDF points to `genpdf` millimetres.
pub fn pt(value: f64) -> Mm {
    mm_from_f64(value * MM_PER_INCH / 72.0)
}

fn estimated_image_size(image: &image::DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// Loads an image from in-memory bytes using the [`image`] crate with descriptive errors.
pub fn decode_image_from_bytes(bytes: impl AsRef<[u8]>) -> Result<image::DynamicImage, Error> {
    image::load_from_memory(bytes.as_ref()).context("Failed to decode image from provided bytes")
}

/// Loads an image from the given path using the [`image`] crate with descriptive errors.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

/// Decodes an [`ImageSource`].
pub fn decode_image(source: &ImageSource) -> Result<image::DynamicImage, Error> {
    match source {
        ImageSource::Bytes(bytes) => decode_image_from_bytes(bytes),
        ImageSource::Path(path) => decode_image_from_path(path),
    }
}

/// Converts a decoded image into a `genpdf` image stretched to `width` × `height`.
///
/// `genpdf` cannot embed alpha channels, so the image is flattened to RGB first.
pub fn sized_image(image: image::DynamicImage, width: Mm, height: Mm) -> Result<Image, Error> {
    let image = if image.color().has_alpha() {
        image::DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        image
    };
    let natural = estimated_image_size(&image, DEFAULT_IMAGE_DPI);
    let natural_width = mm_to_f64(natural.width);
    let natural_height = mm_to_f64(natural.height);
    if natural_width <= f64::EPSILON || natural_height <= f64::EPSILON {
        return Err(Error::new(
            "Image has no pixels",
            genpdf::error::ErrorKind::InvalidData,
        ));
    }

    let mut element = Image::from_dynamic_image(image)?;
    element.set_scale(Scale::new(
        mm_to_f64(width) / natural_width,
        mm_to_f64(height) / natural_height,
    ));
    Ok(element)
}

/// Builds the block emitted for an image placed around the table: a gap, the image drawn at
/// [`INLINE_IMAGE_SIZE_PT`] square and centered, and another gap.
pub fn inline_image(image: image::DynamicImage) -> Result<LinearLayout, Error> {
    let side = pt(INLINE_IMAGE_SIZE_PT);
    let mut image = sized_image(image, side, side)?;
    image.set_alignment(Alignment::Center);

    let mut layout = LinearLayout::vertical();
    layout.push(Spacer::new(pt(INLINE_IMAGE_GAP_PT), pt(INLINE_IMAGE_GAP_PT)));
    layout.push(image);
    layout.push(Spacer::new(pt(INLINE_IMAGE_GAP_PT), pt(INLINE_IMAGE_GAP_PT)));
    Ok(layout)
}

/// Blank element that occupies a fixed size.
#[derive(Clone, Copy, Debug)]
pub struct Spacer {
    size: Size,
}

impl Spacer {
    /// Creates a spacer of the given width and height.
    pub fn new(width: Mm, height: Mm) -> Self {
        Self {
            size: Size::new(width, height),
        }
    }

    /// Returns the occupied size.
    pub fn size(&self) -> Size {
        self.size
    }
}

impl Element for Spacer {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        if self.size.height > area.size().height {
            result.has_more = true;
            return Ok(result);
        }
        result.size = self.size;
        Ok(result)
    }
}

/// Stroke spacing used to paint row backgrounds, below the default 1 pt line width.
const FILL_STROKE_STEP_PT: f64 = 0.8;
/// Default PDF line width in points.
const STROKE_WIDTH_PT: f64 = 1.0;

/// Which of the two layout passes a [`ShadedRow`] takes part in.
///
/// A row's height is only known after its content is laid out, but the background has to be
/// drawn before the content to stay underneath it. The document is therefore laid out twice:
/// the measuring pass records every rendered row segment, the painting pass draws each
/// background from the recorded height and then the content on top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillPass {
    /// Lay out the content and record segment heights without drawing backgrounds.
    Measure,
    /// Draw backgrounds from recorded heights, then the content.
    Paint,
}

/// Heights of the segments a row was split into, shared between the two passes.
#[derive(Clone, Debug, Default)]
pub struct SegmentLog(Rc<RefCell<Vec<Mm>>>);

impl SegmentLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, height: Mm) {
        self.0.borrow_mut().push(height);
    }

    /// Height of the segment rendered at position `index`, if it was measured.
    pub fn get(&self, index: usize) -> Option<Mm> {
        self.0.borrow().get(index).copied()
    }

    /// Number of recorded segments.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Vertical offsets, relative to the top of a row segment, of the strokes that cover a band
/// `height` tall.
///
/// Strokes are [`STROKE_WIDTH_PT`] wide and spaced closer than that, so adjacent strokes
/// overlap and the band reads as a solid fill that stays inside the segment.
pub fn fill_stroke_offsets(height: Mm) -> Vec<Mm> {
    let height = mm_to_f64(height);
    if height <= 0.0 {
        return Vec::new();
    }
    let stroke = mm_to_f64(pt(STROKE_WIDTH_PT));
    if height <= stroke {
        return vec![mm_from_f64(height / 2.0)];
    }
    let half = stroke / 2.0;
    let span = height - stroke;
    let steps = (span / mm_to_f64(pt(FILL_STROKE_STEP_PT))).ceil().max(1.0) as usize;
    (0..=steps)
        .map(|step| mm_from_f64(half + span * step as f64 / steps as f64))
        .collect()
}

/// Wraps a row element and paints a background behind it.
///
/// The fill covers `fill_fraction` of the available width starting at the left edge.
pub struct ShadedRow {
    inner: Box<dyn Element>,
    color: Color,
    fill_fraction: f64,
    pass: FillPass,
    segments: SegmentLog,
    rendered: usize,
}

impl ShadedRow {
    /// Creates a shaded row taking part in `pass`, sharing `segments` with its counterpart in
    /// the other pass.
    pub fn new(
        inner: Box<dyn Element>,
        color: Color,
        fill_fraction: f64,
        pass: FillPass,
        segments: SegmentLog,
    ) -> Self {
        Self {
            inner,
            color,
            fill_fraction: fill_fraction.clamp(0.0, 1.0),
            pass,
            segments,
            rendered: 0,
        }
    }

    /// Returns the background color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns the shaded share of the row width.
    pub fn fill_fraction(&self) -> f64 {
        self.fill_fraction
    }

    fn paint(&self, area: &render::Area<'_>, height: Mm) {
        if self.fill_fraction <= 0.0 {
            return;
        }
        let width = area.size().width * self.fill_fraction;
        let fill = Style::new().with_color(self.color);
        for y in fill_stroke_offsets(height) {
            area.draw_line(vec![Position::new(0, y), Position::new(width, y)], fill);
        }
    }
}

impl Element for ShadedRow {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        match self.pass {
            FillPass::Measure => {
                let result = self.inner.render(context, area, style)?;
                self.segments.record(result.size.height);
                Ok(result)
            }
            FillPass::Paint => {
                if let Some(height) = self.segments.get(self.rendered) {
                    self.paint(&area, height);
                }
                self.rendered += 1;
                self.inner.render(context, area, style)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_fn(width, height, |x, _| Rgba([x as u8, 40, 80, 200]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(buffer)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn points_convert_to_millimetres() {
        assert!((mm_to_f64(pt(72.0)) - 25.4).abs() < 1e-9);
    }

    #[test]
    fn decodes_images_from_bytes() {
        let image = decode_image(&ImageSource::from_bytes(png_bytes(4, 3))).expect("decode");
        assert_eq!(image.dimensions(), (4, 3));
    }

    #[test]
    fn missing_image_path_is_an_error() {
        let err = decode_image(&ImageSource::from_path("/__missing__/logo.png")).unwrap_err();
        assert!(err.to_string().contains("/__missing__/logo.png"));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(decode_image(&ImageSource::from_bytes(vec![0u8, 1, 2, 3])).is_err());
    }

    #[test]
    fn alpha_images_are_accepted_for_embedding() {
        let image = decode_image_from_bytes(png_bytes(8, 8)).expect("decode");
        assert!(sized_image(image, pt(100.0), pt(100.0)).is_ok());
    }

    #[test]
    fn shaded_row_clamps_fill_fraction() {
        let row = ShadedRow::new(
            Box::new(Spacer::new(pt(1.0), pt(1.0))),
            Color::Rgb(0, 0, 0),
            1.5,
            FillPass::Paint,
            SegmentLog::new(),
        );
        assert_eq!(row.fill_fraction(), 1.0);
    }

    #[test]
    fn fill_strokes_overlap_and_stay_inside_the_band() {
        let height = pt(17.0);
        let offsets: Vec<f64> = fill_stroke_offsets(height).into_iter().map(mm_to_f64).collect();
        let stroke = mm_to_f64(pt(STROKE_WIDTH_PT));

        assert!((offsets[0] - stroke / 2.0).abs() < 1e-9);
        assert!((offsets[offsets.len() - 1] - (mm_to_f64(height) - stroke / 2.0)).abs() < 1e-9);
        for pair in offsets.windows(2) {
            assert!(pair[1] - pair[0] < stroke, "gap between fill strokes");
        }
    }

    #[test]
    fn thin_and_empty_bands() {
        assert!(fill_stroke_offsets(pt(0.0)).is_empty());
        let offsets = fill_stroke_offsets(pt(0.5));
        assert_eq!(offsets.len(), 1);
        assert!((mm_to_f64(offsets[0]) - mm_to_f64(pt(0.25))).abs() < 1e-9);
    }

    #[test]
    fn segment_log_is_shared_between_clones() {
        let log = SegmentLog::new();
        let other = log.clone();
        log.record(pt(12.0));
        assert_eq!(other.len(), 1);
        assert_eq!(other.get(0), Some(pt(12.0)));
        assert_eq!(other.get(1), None);
    }
}
