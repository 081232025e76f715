use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::InputError;

const MAGIC_SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"BM", "image/bmp"),
];

/// Formats accepted as the design graphic.
pub const UPLOAD_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp"];

/// Base64 payload plus MIME type, the shape the generation API takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: String,
    pub base64: String,
}

impl EncodedImage {
    pub fn from_bytes(bytes: &[u8], mime_hint: Option<&str>) -> Self {
        let mime_type = sniff_mime(bytes)
            .or(mime_hint)
            .unwrap_or("image/png")
            .to_string();
        Self {
            mime_type,
            base64: BASE64.encode(bytes),
        }
    }

    /// Like [`EncodedImage::from_bytes`], but only for PNG, JPEG or WEBP input.
    ///
    /// Magic bytes decide. `mime_hint` is consulted only when they match nothing.
    pub fn from_upload(
        file_name: &str,
        bytes: &[u8],
        mime_hint: Option<&str>,
    ) -> Result<Self, InputError> {
        let mime_type = upload_mime(bytes, mime_hint)
            .ok_or_else(|| InputError::UnsupportedImage(file_name.to_string()))?;
        Ok(Self::from_bytes(bytes, Some(mime_type)))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|value| value.to_str())
            .unwrap_or_default();
        Ok(Self::from_upload(file_name, &bytes, mime_for_path(path))?)
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(self.base64.as_bytes())
            .context("image base64 decode failed")
    }

    pub fn to_data_url(&self) -> DataUrl {
        DataUrl {
            mime_type: self.mime_type.clone(),
            base64: self.base64.clone(),
        }
    }
}

/// `data:{mime};base64,{payload}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub base64: String,
}

impl DataUrl {
    pub fn new(mime_type: impl Into<String>, base64: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64: base64.into(),
        }
    }

    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(mime_type, BASE64.encode(bytes))
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(self.base64.as_bytes())
            .context("data URL base64 decode failed")
    }

    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime_type)
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.base64)
    }
}

impl FromStr for DataUrl {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let Some(rest) = raw.trim().strip_prefix("data:") else {
            bail!("not a data URL");
        };
        let Some((mime_type, payload)) = rest.split_once(";base64,") else {
            bail!("data URL is missing the ;base64, marker");
        };
        let mime_type = if mime_type.is_empty() {
            "application/octet-stream"
        } else {
            mime_type
        };
        Ok(Self::new(mime_type, payload))
    }
}

/// Anything the compositor or exporter can draw from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Data(DataUrl),
    File(PathBuf),
}

impl ImageSource {
    pub fn bytes(&self) -> Result<Vec<u8>> {
        match self {
            ImageSource::Data(url) => url.decode(),
            ImageSource::File(path) => {
                fs::read(path).with_context(|| format!("failed reading {}", path.display()))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ImageSource::Data(url) => format!("data URL ({})", url.mime_type),
            ImageSource::File(path) => path.display().to_string(),
        }
    }
}

impl From<DataUrl> for ImageSource {
    fn from(value: DataUrl) -> Self {
        ImageSource::Data(value)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(value: PathBuf) -> Self {
        ImageSource::File(value)
    }
}

pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    MAGIC_SIGNATURES
        .iter()
        .find(|(magic, _)| bytes.starts_with(magic))
        .map(|(_, mime)| *mime)
}

pub fn upload_mime(bytes: &[u8], mime_hint: Option<&str>) -> Option<&'static str> {
    match sniff_mime(bytes) {
        Some(detected) => UPLOAD_MIME_TYPES.contains(&detected).then_some(detected),
        None => {
            let hint = mime_hint?.trim();
            UPLOAD_MIME_TYPES
                .iter()
                .copied()
                .find(|mime| mime.eq_ignore_ascii_case(hint))
        }
    }
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

pub fn extension_for_mime(mime: &str) -> &'static str {
    let lowered = mime.to_ascii_lowercase();
    if lowered.contains("jpeg") || lowered.contains("jpg") {
        return "jpg";
    }
    if lowered.contains("webp") {
        return "webp";
    }
    if lowered.contains("gif") {
        return "gif";
    }
    if lowered.contains("bmp") {
        return "bmp";
    }
    "png"
}
