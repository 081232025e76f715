use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use teeshot_contracts::codec::mime_for_path;
use teeshot_contracts::{
    ColorSelection, DataUrl, DownloadSize, EncodedImage, InputError, ShirtColor, ShotType,
};

use crate::error::RunError;

pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// The graphic the user uploaded, plus the preview shown back to them.
///
/// Dropping the value releases the preview with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    file_name: String,
    encoded: EncodedImage,
    preview: DataUrl,
}

impl UploadedImage {
    /// Rejects anything that is not a PNG, JPEG or WEBP graphic.
    pub fn from_bytes(
        file_name: impl Into<String>,
        bytes: &[u8],
        mime_hint: Option<&str>,
    ) -> Result<Self, InputError> {
        let file_name = file_name.into();
        let mime_hint = mime_hint.or_else(|| mime_for_path(Path::new(&file_name)));
        let encoded = EncodedImage::from_upload(&file_name, bytes, mime_hint)?;
        let preview = encoded.to_data_url();
        Ok(Self {
            file_name,
            encoded,
            preview,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let encoded = EncodedImage::from_path(path)
            .with_context(|| format!("failed to load upload {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|value| value.to_str())
            .unwrap_or("upload")
            .to_string();
        let preview = encoded.to_data_url();
        Ok(Self {
            file_name,
            encoded,
            preview,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn encoded(&self) -> &EncodedImage {
        &self.encoded
    }

    pub fn preview(&self) -> &DataUrl {
        &self.preview
    }
}

/// Images from one successful run, index-aligned with the colors that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMockups {
    pub colors: Vec<ShirtColor>,
    pub shot: ShotType,
    pub images: Vec<DataUrl>,
}

impl GeneratedMockups {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn color_at(&self, index: usize) -> Option<ShirtColor> {
        self.colors.get(index).copied()
    }
}

/// Everything a run needs, captured when it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    pub source: EncodedImage,
    /// Catalog order.
    pub colors: Vec<ShirtColor>,
    pub shot: ShotType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutput {
    pub images: Vec<DataUrl>,
    pub collage: Option<DataUrl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Generating,
    ShowingResults,
    ShowingError,
}

#[derive(Debug, Default)]
pub struct AppState {
    source: Option<UploadedImage>,
    selection: ColorSelection,
    shot: ShotType,
    download_size: DownloadSize,
    in_flight: bool,
    results: Option<GeneratedMockups>,
    collage: Option<DataUrl>,
    error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<&UploadedImage> {
        self.source.as_ref()
    }

    pub fn selection(&self) -> &ColorSelection {
        &self.selection
    }

    pub fn shot(&self) -> ShotType {
        self.shot
    }

    pub fn download_size(&self) -> DownloadSize {
        self.download_size
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight
    }

    pub fn results(&self) -> Option<&GeneratedMockups> {
        self.results.as_ref()
    }

    pub fn collage(&self) -> Option<&DataUrl> {
        self.collage.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight {
            Phase::Generating
        } else if self.error.is_some() {
            Phase::ShowingError
        } else if self.results.is_some() {
            Phase::ShowingResults
        } else {
            Phase::Idle
        }
    }

    /// Replaces the source and drops every output of earlier runs.
    pub fn upload(&mut self, image: UploadedImage) {
        self.source = Some(image);
        self.clear_outputs();
    }

    /// Returns whether `color` is selected afterwards.
    pub fn toggle_color(&mut self, color: ShirtColor) -> bool {
        self.selection.toggle(color)
    }

    pub fn select_all_colors(&mut self) {
        self.selection.select_all();
    }

    pub fn clear_colors(&mut self) {
        self.selection.clear();
    }

    pub fn set_shot(&mut self, shot: ShotType) {
        self.shot = shot;
    }

    pub fn set_download_size(&mut self, size: DownloadSize) {
        self.download_size = size;
    }

    pub fn can_generate(&self) -> bool {
        !self.in_flight && self.source.is_some() && !self.selection.is_empty()
    }

    /// Validates input and marks a run as in flight.
    ///
    /// While a run is in flight the request is refused with
    /// [`InputError::Busy`] and nothing changes. Validation failures are
    /// recorded as the visible error.
    pub fn begin_generation(&mut self) -> Result<GenerationTicket, InputError> {
        if self.in_flight {
            return Err(InputError::Busy);
        }
        let Some(source) = self.source.as_ref().map(|image| image.encoded().clone()) else {
            return Err(self.reject(InputError::MissingSource));
        };
        if self.selection.is_empty() {
            return Err(self.reject(InputError::NoColorsSelected));
        }
        let ticket = GenerationTicket {
            source,
            colors: self.selection.sorted(),
            shot: self.shot,
        };
        self.clear_outputs();
        self.in_flight = true;
        Ok(ticket)
    }

    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        outcome: Result<GenerationOutput, RunError>,
    ) {
        self.in_flight = false;
        match outcome {
            Ok(output) => {
                self.error = None;
                self.results = Some(GeneratedMockups {
                    colors: ticket.colors,
                    shot: ticket.shot,
                    images: output.images,
                });
                self.collage = output.collage;
            }
            Err(err) => {
                self.results = None;
                self.collage = None;
                self.error = Some(user_message(&err));
            }
        }
    }

    fn reject(&mut self, err: InputError) -> InputError {
        self.results = None;
        self.collage = None;
        self.error = Some(err.to_string());
        err
    }

    fn clear_outputs(&mut self) {
        self.results = None;
        self.collage = None;
        self.error = None;
    }
}

/// Display text of `err`, or the generic message when it has none.
pub fn user_message(err: &dyn fmt::Display) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        GENERIC_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}
