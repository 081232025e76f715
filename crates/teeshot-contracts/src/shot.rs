use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShotType {
    #[default]
    Full,
    CloseUp,
}

impl ShotType {
    pub fn id(self) -> &'static str {
        match self {
            ShotType::Full => "full",
            ShotType::CloseUp => "close-up",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShotType::Full => "Full Body",
            ShotType::CloseUp => "Close-up",
        }
    }
}

impl fmt::Display for ShotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ShotType {
    type Err = InputError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "full" | "full-body" | "full_body" | "fullbody" => Ok(ShotType::Full),
            "close-up" | "closeup" | "close_up" | "close" => Ok(ShotType::CloseUp),
            _ => Err(InputError::UnknownShot(raw.trim().to_string())),
        }
    }
}

/// Square export resolution picked in the results view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadSize {
    #[default]
    Web,
    Print,
}

impl DownloadSize {
    pub fn pixels(self) -> u32 {
        match self {
            DownloadSize::Web => 2048,
            DownloadSize::Print => 4096,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DownloadSize::Web => "2048px (Web)",
            DownloadSize::Print => "4096px (Print)",
        }
    }
}

impl FromStr for DownloadSize {
    type Err = InputError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().trim_end_matches("px").to_ascii_lowercase().as_str() {
            "2048" | "web" => Ok(DownloadSize::Web),
            "4096" | "print" => Ok(DownloadSize::Print),
            _ => Err(InputError::UnknownDownloadSize(raw.trim().to_string())),
        }
    }
}
