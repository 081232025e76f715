use teeshot_contracts::ShirtColor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API_KEY environment variable is not set")]
    MissingCredential,
    #[error("Failed to generate image for {color}: {detail}")]
    Request { color: ShirtColor, detail: String },
    #[error("Failed to generate image for {color}: No image data found in the API response.")]
    NoImageData { color: ShirtColor },
    #[error("unknown generation provider '{0}'")]
    UnknownProvider(String),
}

impl GenerationError {
    pub(crate) fn request(color: ShirtColor, err: &anyhow::Error) -> Self {
        GenerationError::Request {
            color,
            detail: error_chain_text(err, 512),
        }
    }

    /// Color whose request failed, when the failure is tied to one.
    pub fn color(&self) -> Option<ShirtColor> {
        match self {
            GenerationError::Request { color, .. } | GenerationError::NoImageData { color } => {
                Some(*color)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Need at least 5 images to create a collage (got {got}).")]
    NotEnoughImages { got: usize },
    #[error("Could not get canvas context for a {width}x{height} surface")]
    Surface { width: u32, height: u32 },
    #[error("failed to decode image {index} ({label}): {detail}")]
    Decode {
        index: usize,
        label: String,
        detail: String,
    },
    #[error("failed to encode {format}: {detail}")]
    Encode { format: &'static str, detail: String },
}

/// Anything that can abort a generation run after input validation passed.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

pub(crate) fn error_chain_text(err: &anyhow::Error, max_chars: usize) -> String {
    let mut parts = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        if parts
            .last()
            .map(|existing: &String| existing == trimmed)
            .unwrap_or(false)
        {
            continue;
        }
        parts.push(trimmed.to_string());
    }
    if parts.is_empty() {
        return truncate_text(&err.to_string(), max_chars);
    }
    truncate_text(&parts.join(": "), max_chars)
}

pub(crate) fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use teeshot_contracts::ShirtColor;

    use super::{error_chain_text, truncate_text, GenerationError};

    #[test]
    fn request_error_names_color_and_cause_chain() {
        let err = anyhow!("connection reset").context("Gemini request failed");
        let wrapped = GenerationError::request(ShirtColor::Moss, &err);
        assert_eq!(
            wrapped.to_string(),
            "Failed to generate image for Moss: Gemini request failed: connection reset"
        );
        assert_eq!(wrapped.color(), Some(ShirtColor::Moss));
        assert_eq!(GenerationError::MissingCredential.color(), None);
    }

    #[test]
    fn no_image_data_matches_user_message() {
        let err = GenerationError::NoImageData {
            color: ShirtColor::BlueJean,
        };
        assert_eq!(
            err.to_string(),
            "Failed to generate image for Blue Jean: No image data found in the API response."
        );
    }

    #[test]
    fn chain_text_skips_duplicates_and_truncates() {
        let err = anyhow!("same").context("same").context("outer");
        assert_eq!(error_chain_text(&err, 100), "outer: same");
        assert_eq!(truncate_text("abcdef", 3), "abc…");
    }
}
