use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use sha2::{Digest, Sha256};
use teeshot_contracts::prompts::build_prompt;
use teeshot_contracts::{DataUrl, EncodedImage, ShirtColor, ShotType};

use crate::error::GenerationError;
use crate::provider::MockupGenerator;

/// Deterministic stand-in that never touches the network.
///
/// Renders a flat square in the shirt's swatch color, nudged by a hash of the
/// prompt and source so different inputs stay distinguishable.
#[derive(Debug, Clone)]
pub struct DryrunGenerator {
    side: u32,
}

impl Default for DryrunGenerator {
    fn default() -> Self {
        Self { side: 512 }
    }
}

impl DryrunGenerator {
    pub fn with_side(side: u32) -> Self {
        Self { side: side.max(1) }
    }
}

impl MockupGenerator for DryrunGenerator {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn model(&self) -> Option<&str> {
        Some("dryrun-image-1")
    }

    fn generate(
        &self,
        source: &EncodedImage,
        color: ShirtColor,
        shot: ShotType,
    ) -> Result<DataUrl, GenerationError> {
        let prompt = build_prompt(color, shot);
        let [r, g, b] = tinted(color.rgb(), &prompt, &source.base64);
        let image = RgbImage::from_pixel(self.side, self.side, Rgb([r, g, b]));

        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|err| GenerationError::request(color, &anyhow::Error::new(err)))?;
        Ok(DataUrl::from_bytes("image/png", &bytes))
    }
}

fn tinted(base: [u8; 3], prompt: &str, source: &str) -> [u8; 3] {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    hasher.update(source.as_bytes());
    let digest = hasher.finalize();
    let mut out = base;
    for (idx, channel) in out.iter_mut().enumerate() {
        let jitter = (digest[idx] % 16) as i16 - 8;
        *channel = (*channel as i16 + jitter).clamp(0, 255) as u8;
    }
    out
}
