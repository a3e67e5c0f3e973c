//! # Image to Icon Conversion
//!
//! Turns one source image into a set of square `.ico` files, one per size,
//! written to a directory named after the source file.
//!
//! ```text
//! ~/pictures/logo.png  ──▶  <output_root>/logo/16x16.ico
//!                                           /24x24.ico
//!                                           ...
//!                                           /256x256.ico
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{ImageFormat, ImageReader};
use log::{debug, info};

/// Source formats accepted by [`IcoConverter`].
pub const SOURCE_FORMATS: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP];

/// Sizes written when the config doesn't say otherwise.
pub const DEFAULT_SIZES: [u32; 7] = [16, 24, 32, 48, 64, 128, 256];

/// ICO stores dimensions in a single byte where 0 means 256.
pub const MAX_ICON_SIZE: u32 = 256;

/// Files produced by one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSet {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

#[derive(Debug)]
pub enum ConvertError {
    Io(std::io::Error),
    /// The source is not PNG, JPEG or WebP.
    Unsupported(Option<ImageFormat>),
    Decode(String),
    Encode { size: u32, message: String },
    InvalidSize(u32),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Io(e) => write!(f, "error opening image: {e}"),
            ConvertError::Unsupported(_) => write!(f, "unsupported image type"),
            ConvertError::Decode(msg) => write!(f, "error decoding image: {msg}"),
            ConvertError::Encode { size, message } => {
                write!(f, "error encoding ICO for size {size}x{size}: {message}")
            }
            ConvertError::InvalidSize(size) => {
                write!(f, "icon size {size} is outside 1..={MAX_ICON_SIZE}")
            }
        }
    }
}

impl std::error::Error for ConvertError {}

impl From<std::io::Error> for ConvertError {
    fn from(e: std::io::Error) -> Self {
        ConvertError::Io(e)
    }
}

/// Blocking conversion service. Callers run it off the event thread.
pub trait IconConverter: Send + Sync {
    fn convert(&self, source: &Path, sizes: &[u32]) -> Result<IconSet, ConvertError>;
}

/// [`IconConverter`] backed by the `image` crate.
pub struct IcoConverter {
    output_root: PathBuf,
}

impl IcoConverter {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }
}

impl Default for IcoConverter {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_path(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

impl IconConverter for IcoConverter {
    fn convert(&self, source: &Path, sizes: &[u32]) -> Result<IconSet, ConvertError> {
        if let Some(bad) = sizes.iter().find(|s| **s == 0 || **s > MAX_ICON_SIZE) {
            return Err(ConvertError::InvalidSize(*bad));
        }

        let source = expand_path(source);
        debug!("Converting {} to sizes {:?}", source.display(), sizes);

        let reader = ImageReader::open(&source)?.with_guessed_format()?;
        match reader.format() {
            Some(format) if SOURCE_FORMATS.contains(&format) => {}
            other => return Err(ConvertError::Unsupported(other)),
        }
        let img = reader
            .decode()
            .map_err(|e| ConvertError::Decode(e.to_string()))?;

        let stem = source
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "icons".into());
        let dir = self.output_root.join(stem);
        fs::create_dir_all(&dir)?;

        let mut files = Vec::with_capacity(sizes.len());
        for &size in sizes {
            let resized = img.resize_exact(size, size, FilterType::Nearest).to_rgba8();
            let path = dir.join(format!("{size}x{size}.ico"));
            resized
                .save_with_format(&path, ImageFormat::Ico)
                .map_err(|e| ConvertError::Encode {
                    size,
                    message: e.to_string(),
                })?;
            files.push(path);
        }

        info!(
            "Wrote {} icons for {} to {}",
            files.len(),
            source.display(),
            dir.display()
        );
        Ok(IconSet { dir, files })
    }
}
