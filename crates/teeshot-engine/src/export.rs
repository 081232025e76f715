use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::ImageFormat;
use teeshot_contracts::{DataUrl, ImageSource, ShirtColor};

use crate::collage::{check_surface, decode_source, encode_jpeg};
use crate::error::RenderError;

pub const EXPORT_JPEG_QUALITY: u8 = 95;
pub const DOWNLOAD_ALL_PAUSE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

/// Destination for finished files.
pub trait DownloadSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Writes downloads into one directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// What an export actually delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Resized { path: PathBuf, size: u32 },
    /// Resizing failed; the unresized original was saved instead.
    FellBackToOriginal { path: PathBuf, reason: String },
}

impl ExportOutcome {
    pub fn path(&self) -> &Path {
        match self {
            ExportOutcome::Resized { path, .. } | ExportOutcome::FellBackToOriginal { path, .. } => {
                path
            }
        }
    }

    pub fn fell_back(&self) -> bool {
        matches!(self, ExportOutcome::FellBackToOriginal { .. })
    }
}

pub fn variation_file_name(color: Option<ShirtColor>, index: usize, size: u32) -> String {
    let identifier = color
        .map(ShirtColor::slug)
        .unwrap_or_else(|| format!("variation-{}", index + 1));
    format!("ai-variation-{identifier}-{size}px.png")
}

pub fn original_file_name(size: u32) -> String {
    format!("original-mockup-{size}px.png")
}

pub fn collage_file_name(size: u32) -> String {
    format!("ai-collage-{size}px.jpg")
}

/// Name used when the resize fails: the first `-{size}px` becomes `-original`.
pub fn fallback_file_name(file_name: &str, size: u32) -> String {
    file_name.replacen(&format!("-{size}px"), "-original", 1)
}

/// Redraws `source` into an exact `size`×`size` square.
pub fn resize_image(source: &ImageSource, size: u32, format: ExportFormat) -> Result<Vec<u8>, RenderError> {
    check_surface(size, size)?;
    let image = decode_source(0, source)?;
    let scaled = image.resize_exact(size, size, FilterType::Lanczos3);
    match format {
        ExportFormat::Jpeg => encode_jpeg(scaled.to_rgb8(), EXPORT_JPEG_QUALITY),
        ExportFormat::Png => {
            let mut bytes = Vec::new();
            scaled
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .map_err(|err| RenderError::Encode {
                    format: "png",
                    detail: err.to_string(),
                })?;
            Ok(bytes)
        }
    }
}

/// Resizes and saves; on any render failure saves the original bytes instead.
///
/// Only a failing sink, or an original that cannot be read at all, is an error.
pub fn resize_and_save(
    source: &ImageSource,
    size: u32,
    file_name: &str,
    format: ExportFormat,
    sink: &dyn DownloadSink,
) -> Result<ExportOutcome> {
    match resize_image(source, size, format) {
        Ok(bytes) => {
            let path = sink.save(file_name, &bytes)?;
            Ok(ExportOutcome::Resized { path, size })
        }
        Err(err) => {
            let reason = err.to_string();
            tracing::warn!(file_name, size, %reason, "failed to resize image, saving original");
            let original = source
                .bytes()
                .with_context(|| format!("failed to read original {}", source.describe()))?;
            let path = sink.save(&fallback_file_name(file_name, size), &original)?;
            Ok(ExportOutcome::FellBackToOriginal { path, reason })
        }
    }
}

/// Exports every result in order, pausing before each save.
pub fn download_all(
    images: &[DataUrl],
    colors: &[ShirtColor],
    size: u32,
    sink: &dyn DownloadSink,
    pause: Duration,
) -> Result<Vec<ExportOutcome>> {
    let mut outcomes = Vec::with_capacity(images.len());
    for (index, image) in images.iter().enumerate() {
        let file_name = variation_file_name(colors.get(index).copied(), index, size);
        if !pause.is_zero() {
            thread::sleep(pause);
        }
        let source = ImageSource::Data(image.clone());
        outcomes.push(resize_and_save(
            &source,
            size,
            &file_name,
            ExportFormat::Png,
            sink,
        )?);
    }
    Ok(outcomes)
}
