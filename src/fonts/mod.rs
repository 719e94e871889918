//! Font loading and one-time registration.
//!
//! Documents are rendered with the Noto Sans family (regular and bold). The fonts are loaded once
//! per process through [`initialize`] or [`initialize_from_dir`]; builds only read the registered
//! family, so registration never happens as a side effect of rendering.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use genpdf::error::Error;
use genpdf::fonts::{FontData, FontFamily};
use log::debug;

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "NotoSans";

/// Environment variable that overrides the font directory search.
pub const FONTS_DIR_ENV: &str = "PDF_TABLE_BUILDER_FONTS_DIR";

const REGULAR_FONT_FILE: &str = "NotoSans-Regular.ttf";
const BOLD_FONT_FILE: &str = "NotoSans-Bold.ttf";
const FONT_FILES: &[&str] = &[REGULAR_FONT_FILE, BOLD_FONT_FILE];

static REGISTERED_FONTS: OnceLock<FontFamily<FontData>> = OnceLock::new();

/// Directory holding the fonts shipped with the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(path) = env::var(FONTS_DIR_ENV) {
        if !path.trim().is_empty() {
            candidates.push(PathBuf::from(path));
        }
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = bundled_fonts_source_dir();
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn missing_font_files(path: &Path) -> Vec<PathBuf> {
    FONT_FILES
        .iter()
        .map(|name| path.join(name))
        .filter(|candidate| !candidate.is_file())
        .collect()
}

fn resolve_font_directory() -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        let exists = candidate.is_dir();
        let missing = missing_font_files(&candidate);

        if exists && missing.is_empty() {
            debug!("Using fonts from {}", candidate.display());
            return Ok(candidate);
        }

        let reason = if !exists {
            format!("directory missing at {}", candidate.display())
        } else {
            let missing_list = missing
                .iter()
                .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
                .collect::<Vec<_>>()
                .join(", ");
            format!("missing files [{}]", missing_list)
        };

        attempts.push(format!("{} ({})", candidate.display(), reason));
    }

    let summary = if attempts.is_empty() {
        "no search paths were available".to_owned()
    } else {
        attempts.join(", ")
    };

    Err(Error::new(
        format!(
            "Unable to locate the font directory. Checked: {}. See assets/fonts/README.md or set {}.",
            summary, FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "fonts directory not found"),
    ))
}

fn load_font(directory: &Path, file: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!("Failed to load font at {}: {}", path.display(), err),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

/// Loads the regular and bold faces from `directory`.
///
/// The italic faces reuse the upright ones since only regular and bold files are shipped.
pub fn load_font_family(directory: impl AsRef<Path>) -> Result<FontFamily<FontData>, Error> {
    let directory = directory.as_ref();
    let regular = load_font(directory, REGULAR_FONT_FILE)?;
    let bold = load_font(directory, BOLD_FONT_FILE)?;
    debug!(
        "Loaded {} font family from {}",
        DEFAULT_FONT_FAMILY_NAME,
        directory.display()
    );

    Ok(FontFamily {
        italic: regular.clone(),
        bold_italic: bold.clone(),
        regular,
        bold,
    })
}

fn register(family: FontFamily<FontData>) -> &'static FontFamily<FontData> {
    REGISTERED_FONTS.get_or_init(|| family)
}

/// Registers the font family found through the default directory search.
///
/// The search checks `PDF_TABLE_BUILDER_FONTS_DIR`, then `assets/fonts` next to the executable,
/// then `assets/fonts` in the crate sources. Calling this again after a successful registration
/// returns the already registered family without touching the filesystem.
pub fn initialize() -> Result<&'static FontFamily<FontData>, Error> {
    if let Some(family) = REGISTERED_FONTS.get() {
        return Ok(family);
    }
    let directory = resolve_font_directory()?;
    Ok(register(load_font_family(directory)?))
}

/// Registers the font family stored in `directory`.
///
/// Like [`initialize`], this is idempotent: once a family is registered, later calls return it
/// unchanged.
pub fn initialize_from_dir(
    directory: impl AsRef<Path>,
) -> Result<&'static FontFamily<FontData>, Error> {
    if let Some(family) = REGISTERED_FONTS.get() {
        debug!(
            "Fonts already registered; ignoring {}",
            directory.as_ref().display()
        );
        return Ok(family);
    }
    Ok(register(load_font_family(directory)?))
}

/// Returns the registered font family, if [`initialize`] has succeeded.
pub fn registered() -> Option<&'static FontFamily<FontData>> {
    REGISTERED_FONTS.get()
}

/// Indicates whether the font files can be found by the default directory search.
pub fn default_fonts_available() -> bool {
    resolve_font_directory().is_ok()
}
