use thiserror::Error;

/// Problems with what the user asked for. Raised before any external call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please upload a mockup image first.")]
    MissingSource,
    #[error("Please select at least one color.")]
    NoColorsSelected,
    #[error("'{0}' is not a PNG, JPEG or WEBP image")]
    UnsupportedImage(String),
    #[error("a generation run is already in progress")]
    Busy,
    #[error("unknown shirt color '{0}'")]
    UnknownColor(String),
    #[error("unknown shot type '{0}' (expected 'full' or 'close-up')")]
    UnknownShot(String),
    #[error("unsupported download size '{0}' (expected 2048 or 4096)")]
    UnknownDownloadSize(String),
}
