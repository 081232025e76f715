use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use teeshot_contracts::prompts::build_prompt;
use teeshot_contracts::runs::receipts::{
    receipt_path_for, write_receipt, MockupReceipt, RECEIPT_SCHEMA_VERSION,
};
use teeshot_contracts::{DataUrl, EncodedImage};

use crate::provider::MockupGenerator;
use crate::state::GeneratedMockups;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedMockup {
    pub index: usize,
    pub image_path: PathBuf,
    pub receipt_path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArtifacts {
    pub mockups: Vec<SavedMockup>,
    pub collage: Option<PathBuf>,
}

/// Writes each mockup as the model returned it, with a receipt beside it.
pub fn save_run_artifacts(
    out_dir: &Path,
    run_id: &str,
    generator: &dyn MockupGenerator,
    source: &EncodedImage,
    mockups: &GeneratedMockups,
    collage: Option<&DataUrl>,
) -> Result<RunArtifacts> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let source_sha256 = sha256_hex(&source.decode()?);

    let mut artifacts = RunArtifacts::default();
    for (index, image) in mockups.images.iter().enumerate() {
        let color = mockups.color_at(index);
        let label = color
            .map(|color| color.slug())
            .unwrap_or_else(|| format!("variation-{}", index + 1));
        let image_path = out_dir.join(format!(
            "mockup-{:02}-{label}.{}",
            index + 1,
            image.extension()
        ));
        write_data_url(&image_path, image)?;

        let receipt_path = receipt_path_for(&image_path);
        let receipt = MockupReceipt {
            schema_version: RECEIPT_SCHEMA_VERSION,
            run_id: run_id.to_string(),
            index,
            provider: generator.name().to_string(),
            model: generator.model().map(str::to_string),
            color: color.map(|color| color.name().to_string()).unwrap_or_default(),
            shot: mockups.shot.id().to_string(),
            prompt: color
                .map(|color| build_prompt(color, mockups.shot))
                .unwrap_or_default(),
            source_mime: source.mime_type.clone(),
            source_sha256: source_sha256.clone(),
            output_mime: image.mime_type.clone(),
            image_path: image_path.to_string_lossy().to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
        };
        write_receipt(&receipt_path, &receipt)?;
        tracing::debug!(path = %image_path.display(), "saved mockup");

        artifacts.mockups.push(SavedMockup {
            index,
            image_path,
            receipt_path,
        });
    }

    if let Some(collage) = collage {
        let path = out_dir.join(format!("collage.{}", collage.extension()));
        write_data_url(&path, collage)?;
        artifacts.collage = Some(path);
    }
    Ok(artifacts)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn write_data_url(path: &Path, image: &DataUrl) -> Result<()> {
    let bytes = image
        .decode()
        .with_context(|| format!("invalid image payload for {}", path.display()))?;
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}
