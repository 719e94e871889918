use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::info;
use pdf_table_builder::model::{
    ColumnAlignment, ColumnDescriptor, ImagePosition, ImageSource, RowDescriptor,
};
use pdf_table_builder::schema::parse_rows_json;
use pdf_table_builder::table::BackgroundSpan;
use pdf_table_builder::{build_document, fonts, BuildError, DocumentConfig};

/// Renders row tables into decorated PDF documents.
///
/// Fonts must be present under `assets/fonts` or provided via the
/// `PDF_TABLE_BUILDER_FONTS_DIR` environment variable before running the commands below.
#[derive(Parser)]
#[command(author, version, about = "Render row tables into PDF documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON array of rows to a PDF file.
    Render {
        /// JSON file holding the rows.
        input: PathBuf,

        #[command(flatten)]
        document: DocumentArgs,
    },

    /// Render the built-in example table.
    Sample {
        #[command(flatten)]
        document: DocumentArgs,
    },
}

#[derive(Args)]
struct DocumentArgs {
    /// Output PDF path.
    #[arg(short, long, default_value = "table.pdf")]
    output: PathBuf,

    /// Logo drawn in the top-right corner of every page.
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Text stamped in the footer of every page.
    #[arg(long)]
    watermark: Option<String>,

    /// Image placed before the table; may be repeated.
    #[arg(long = "image-before")]
    images_before: Vec<PathBuf>,

    /// Image placed after the table; may be repeated.
    #[arg(long = "image-after")]
    images_after: Vec<PathBuf>,

    /// Shade every column instead of the first three.
    #[arg(long)]
    full_row_background: bool,
}

impl DocumentArgs {
    fn config(&self) -> DocumentConfig {
        let logo = self.logo.as_deref().map(image_source);
        let mut config = DocumentConfig::standalone(logo, self.watermark.clone());
        for path in &self.images_before {
            config = config.with_image(image_source(path), ImagePosition::BeforeTable);
        }
        for path in &self.images_after {
            config = config.with_image(image_source(path), ImagePosition::AfterTable);
        }
        if self.full_row_background {
            config = config.with_background_span(BackgroundSpan::FullRow);
        }
        config
    }
}

fn image_source(path: &Path) -> ImageSource {
    ImageSource::from_path(path.to_string_lossy().into_owned())
}

fn sample_rows() -> Vec<RowDescriptor> {
    vec![
        RowDescriptor::title("Outside Colors:"),
        RowDescriptor::regular([
            ColumnDescriptor::new("Panel color:"),
            ColumnDescriptor::new("7012 Matt"),
            ColumnDescriptor::new("$100").with_alignment(ColumnAlignment::Right),
        ]),
        RowDescriptor::regular([
            ColumnDescriptor::new("Frame color:"),
            ColumnDescriptor::new("<b>9016</b> Gloss"),
            ColumnDescriptor::new("$40").with_alignment(ColumnAlignment::Right),
        ]),
        RowDescriptor::spacer(),
        RowDescriptor::title("Hardware:"),
        RowDescriptor::regular([
            ColumnDescriptor::new("Handle:"),
            ColumnDescriptor::empty(),
            ColumnDescriptor::new("$25").with_alignment(ColumnAlignment::Right),
        ]),
    ]
}

fn render(rows: &[RowDescriptor], document: &DocumentArgs) -> Result<(), Box<dyn Error>> {
    fonts::initialize().map_err(BuildError::FontLoad)?;
    let bytes = build_document(rows, &document.config())?;
    fs::write(&document.output, &bytes)?;
    info!(
        "Wrote {} bytes to {}",
        bytes.len(),
        document.output.display()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Render { input, document } => fs::read_to_string(input)
            .map_err(Box::<dyn Error>::from)
            .and_then(|json| parse_rows_json(&json).map_err(Box::<dyn Error>::from))
            .and_then(|rows| render(&rows, document)),
        Commands::Sample { document } => render(&sample_rows(), document),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
