//! Document construction: geometry, decorator registration, story order and serialization.

use genpdf::fonts::{FontData, FontFamily};
use genpdf::PaperSize;
use image::DynamicImage;
use log::debug;

use crate::decorator::{HeaderSource, PageDecorations, SuppliedHeader};
use crate::elements::{decode_image, inline_image, FillPass};
use crate::error::BuildError;
use crate::fonts;
use crate::model::{ImagePosition, ImageSource, PlacedImage, RowDescriptor};
use crate::schema;
use crate::style::BodyStyle;
use crate::table::{self, AssembledTable, BackgroundSpan};

/// Immutable per-build configuration.
///
/// Nothing in here outlives a build: each call to [`build_document`] reads the configuration it
/// is given and keeps no state between calls.
pub struct DocumentConfig {
    header: Box<dyn HeaderSource>,
    images: Vec<PlacedImage>,
    background_span: BackgroundSpan,
    body: BodyStyle,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            header: Box::new(SuppliedHeader::default()),
            images: Vec::new(),
            background_span: BackgroundSpan::default(),
            body: BodyStyle::default(),
        }
    }
}

impl DocumentConfig {
    /// Creates a configuration without logo, watermark or extra images.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration whose header shows the given logo and footer watermark.
    pub fn standalone(logo: Option<ImageSource>, watermark: Option<String>) -> Self {
        Self::new().with_header(SuppliedHeader::new(logo, watermark))
    }

    /// Sets the source of the header and footer data.
    pub fn with_header(mut self, header: impl HeaderSource + 'static) -> Self {
        self.header = Box::new(header);
        self
    }

    /// Adds an image before or after the table. Images keep their insertion order.
    pub fn with_image(mut self, source: ImageSource, position: ImagePosition) -> Self {
        self.images.push(PlacedImage::new(source, position));
        self
    }

    /// Adds several placed images, keeping their order.
    pub fn with_images<I>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = PlacedImage>,
    {
        self.images.extend(images);
        self
    }

    /// Sets how far row backgrounds extend.
    pub fn with_background_span(mut self, span: BackgroundSpan) -> Self {
        self.background_span = span;
        self
    }

    /// Sets the font size of table text in points.
    pub fn with_body_font_size(mut self, font_size: u8) -> Self {
        self.body = BodyStyle::new(font_size);
        self
    }

    /// Returns the header source.
    pub fn header(&self) -> &dyn HeaderSource {
        self.header.as_ref()
    }

    /// Returns the placed images in insertion order.
    pub fn images(&self) -> &[PlacedImage] {
        &self.images
    }

    /// Returns the background span policy.
    pub fn background_span(&self) -> BackgroundSpan {
        self.background_span
    }

    /// Returns the body style.
    pub fn body(&self) -> BodyStyle {
        self.body
    }
}

/// One entry of the document flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoryItem {
    /// The placed image at this index of the configured image list.
    Image(usize),
    /// The assembled table.
    Table,
}

/// Orders the document flow: images placed before the table, the table, then images placed
/// after it. Each group keeps the order of `images`.
pub fn story_order(images: &[PlacedImage]) -> Vec<StoryItem> {
    let indices_at = |position: ImagePosition| {
        images
            .iter()
            .enumerate()
            .filter(move |(_, image)| image.position() == position)
            .map(|(index, _)| StoryItem::Image(index))
    };

    indices_at(ImagePosition::BeforeTable)
        .chain(std::iter::once(StoryItem::Table))
        .chain(indices_at(ImagePosition::AfterTable))
        .collect()
}

/// Renders `rows` into a complete A4 PDF document.
///
/// Fonts must have been registered with [`fonts::initialize`] (or
/// [`fonts::initialize_from_dir`]) beforehand. Any failure aborts the build without output.
///
/// The document is laid out twice: a measuring pass records the height of every table row
/// segment, and the painting pass draws row backgrounds from those heights underneath the row
/// content. Only the bytes of the painting pass are returned.
pub fn build_document(
    rows: &[RowDescriptor],
    config: &DocumentConfig,
) -> Result<Vec<u8>, BuildError> {
    let font_family = fonts::registered().ok_or(BuildError::FontsNotInitialized)?;
    debug!(
        "Building document with {} rows and {} images",
        rows.len(),
        config.images().len()
    );

    let interpreted = schema::interpret(rows)?;
    let table = table::assemble(interpreted, config.background_span(), &config.body());
    let images = config
        .images()
        .iter()
        .enumerate()
        .map(|(index, image)| {
            decode_image(image.source()).map_err(|source| BuildError::Image { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let pass = StoryPass {
        font_family,
        config,
        table: &table,
        images: &images,
    };
    pass.render(FillPass::Measure)?;
    let bytes = pass.render(FillPass::Paint)?;
    debug!("Rendered document of {} bytes", bytes.len());
    Ok(bytes)
}

struct StoryPass<'b> {
    font_family: &'static FontFamily<FontData>,
    config: &'b DocumentConfig,
    table: &'b AssembledTable,
    images: &'b [DynamicImage],
}

impl StoryPass<'_> {
    fn render(&self, fill: FillPass) -> Result<Vec<u8>, BuildError> {
        let decorations = PageDecorations::from_source(self.config.header())?;
        let body = self.config.body();

        let mut document = genpdf::Document::new(self.font_family.clone());
        document.set_paper_size(PaperSize::A4);
        document.set_font_size(body.font_size());
        if let Some(title) = self.config.header().title() {
            document.set_title(title);
        }
        document.set_page_decorator(decorations);

        for item in story_order(self.config.images()) {
            match item {
                StoryItem::Image(index) => {
                    let image = inline_image(self.images[index].clone())
                        .map_err(|source| BuildError::Image { index, source })?;
                    document.push(image);
                }
                StoryItem::Table => {
                    document.push(self.table.layout(fill).map_err(BuildError::Render)?);
                }
            }
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(BuildError::Render)?;
        Ok(bytes)
    }
}

/// Renders `rows` with an optional logo, footer watermark and extra images.
pub fn build_pdf(
    rows: &[RowDescriptor],
    logo: Option<ImageSource>,
    watermark: Option<&str>,
    images: &[PlacedImage],
) -> Result<Vec<u8>, BuildError> {
    let config = DocumentConfig::standalone(logo, watermark.map(str::to_string))
        .with_images(images.iter().cloned());
    build_document(rows, &config)
}
