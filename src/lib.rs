//! Core entry point for the pdf_table_builder crate.
//!
//! Rows of titles, spacers and aligned text columns are rendered into a paginated A4 PDF with a
//! logo, address block, page numbers and a watermark on every page.
//!
//! ```no_run
//! use pdf_table_builder::model::{ColumnAlignment, ColumnDescriptor, RowDescriptor};
//! use pdf_table_builder::{build_pdf, fonts};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! fonts::initialize()?;
//!
//! let rows = vec![
//!     RowDescriptor::title("Outside Colors:"),
//!     RowDescriptor::regular([
//!         ColumnDescriptor::new("Panel color:"),
//!         ColumnDescriptor::new("7012 Matt"),
//!         ColumnDescriptor::new("$100").with_alignment(ColumnAlignment::Right),
//!     ]),
//! ];
//! let bytes = build_pdf(&rows, None, Some("Powered by design-vs.com"), &[])?;
//! std::fs::write("table.pdf", bytes)?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod decorator;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod model;
pub mod richtext;
pub mod schema;
pub mod style;
pub mod table;

pub use builder::{build_document, build_pdf, DocumentConfig};
pub use decorator::{CompanyInfo, HeaderSource, SuppliedHeader};
pub use error::{BuildError, SchemaError};
