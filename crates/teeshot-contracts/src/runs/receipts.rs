use std::path::Path;

use serde::{Deserialize, Serialize};

pub const RECEIPT_SCHEMA_VERSION: u64 = 1;

/// Provenance for one generated mockup, stored next to the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockupReceipt {
    pub schema_version: u64,
    pub run_id: String,
    pub index: usize,
    pub provider: String,
    pub model: Option<String>,
    pub color: String,
    pub shot: String,
    pub prompt: String,
    pub source_mime: String,
    pub source_sha256: String,
    pub output_mime: String,
    pub image_path: String,
    pub created_at: String,
}

pub fn receipt_path_for(image_path: &Path) -> std::path::PathBuf {
    let stem = image_path
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("mockup");
    image_path.with_file_name(format!("receipt-{stem}.json"))
}

pub fn write_receipt(path: &Path, receipt: &MockupReceipt) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(receipt)?)?;
    Ok(())
}

pub fn read_receipt(path: &Path) -> anyhow::Result<MockupReceipt> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
