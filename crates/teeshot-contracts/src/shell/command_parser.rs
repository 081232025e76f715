use std::path::PathBuf;

use super::command_registry::is_known_command;
use crate::catalog::ShirtColor;
use crate::shot::{DownloadSize, ShotType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadTarget {
    #[default]
    All,
    Collage,
    Original,
    /// 1-based position in the result grid.
    Variation(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Noop,
    Upload(PathBuf),
    ToggleColors(Vec<ShirtColor>),
    SelectAll,
    ClearColors,
    Shot(ShotType),
    Size(DownloadSize),
    Generate,
    Download(DownloadTarget),
    Status,
    Colors,
    Help,
    Quit,
    Invalid { command: String, message: String },
    Unknown { command: String, arg: String },
}

impl ShellCommand {
    fn invalid(command: &str, message: impl Into<String>) -> Self {
        ShellCommand::Invalid {
            command: command.to_string(),
            message: message.into(),
        }
    }
}

fn split_args(arg: &str) -> Vec<String> {
    if arg.trim().is_empty() {
        return Vec::new();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect(),
        Err(_) => arg
            .split_whitespace()
            .map(str::to_string)
            .filter(|value| !value.is_empty())
            .collect(),
    }
}

fn single_arg(arg: &str) -> String {
    let parts = split_args(arg);
    match parts.len() {
        0 => String::new(),
        1 => parts[0].clone(),
        _ => parts.join(" "),
    }
}

/// Two-word catalog names (`Blue Jean`) may arrive as separate tokens.
fn parse_colors(tokens: &[String]) -> Result<Vec<ShirtColor>, String> {
    let mut colors = Vec::new();
    let mut idx = 0;
    while idx < tokens.len() {
        if let Some(next) = tokens.get(idx + 1) {
            if let Ok(color) = format!("{} {}", tokens[idx], next).parse::<ShirtColor>() {
                colors.push(color);
                idx += 2;
                continue;
            }
        }
        match tokens[idx].parse::<ShirtColor>() {
            Ok(color) => colors.push(color),
            Err(err) => return Err(err.to_string()),
        }
        idx += 1;
    }
    Ok(colors)
}

fn parse_download_target(arg: &str) -> Result<DownloadTarget, String> {
    let normalized = arg.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "" | "all" => Ok(DownloadTarget::All),
        "collage" => Ok(DownloadTarget::Collage),
        "original" => Ok(DownloadTarget::Original),
        other => match other.parse::<usize>() {
            Ok(position) if position > 0 => Ok(DownloadTarget::Variation(position)),
            _ => Err(format!("unknown download target '{}'", arg.trim())),
        },
    }
}

pub fn parse_command(text: &str) -> ShellCommand {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return ShellCommand::Noop;
    }

    let Some(slash_tail) = raw_trimmed.strip_prefix('/') else {
        return ShellCommand::Unknown {
            command: String::new(),
            arg: raw_trimmed.to_string(),
        };
    };
    let command_len = slash_tail
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .count();
    let command = slash_tail[..command_len].to_ascii_lowercase();
    let arg = slash_tail[command_len..].trim();

    if !is_known_command(&command) {
        return ShellCommand::Unknown {
            command,
            arg: arg.to_string(),
        };
    }

    match command.as_str() {
        "upload" => {
            let path = single_arg(arg);
            if path.is_empty() {
                ShellCommand::invalid(&command, "/upload requires a path")
            } else {
                ShellCommand::Upload(PathBuf::from(path))
            }
        }
        "color" => {
            let tokens = split_args(arg);
            if tokens.is_empty() {
                return ShellCommand::invalid(&command, "/color requires at least one color");
            }
            match parse_colors(&tokens) {
                Ok(colors) => ShellCommand::ToggleColors(colors),
                Err(message) => ShellCommand::invalid(&command, message),
            }
        }
        "all" => ShellCommand::SelectAll,
        "clear" => ShellCommand::ClearColors,
        "shot" => match arg.parse::<ShotType>() {
            Ok(shot) => ShellCommand::Shot(shot),
            Err(err) => ShellCommand::invalid(&command, err.to_string()),
        },
        "size" => match arg.parse::<DownloadSize>() {
            Ok(size) => ShellCommand::Size(size),
            Err(err) => ShellCommand::invalid(&command, err.to_string()),
        },
        "generate" => ShellCommand::Generate,
        "download" => match parse_download_target(arg) {
            Ok(target) => ShellCommand::Download(target),
            Err(message) => ShellCommand::invalid(&command, message),
        },
        "status" => ShellCommand::Status,
        "colors" => ShellCommand::Colors,
        "help" => ShellCommand::Help,
        _ => ShellCommand::Quit,
    }
}
