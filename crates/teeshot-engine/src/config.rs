use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

pub const CREDENTIAL_ENV_KEYS: &[&str] = &["API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"];
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_TIMEOUT_SECS: f64 = 120.0;

/// Settings for the hosted generation client, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub request_timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GeneratorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let api_key = CREDENTIAL_ENV_KEYS.iter().find_map(|key| non_empty(*key));
        let api_base = non_empty("GEMINI_API_BASE")
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let model = non_empty("TEESHOT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout_s = non_empty("TEESHOT_REQUEST_TIMEOUT")
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(15.0, 600.0);
        Self {
            api_key,
            api_base,
            model,
            request_timeout: Duration::from_secs_f64(timeout_s),
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model.filter(|value| !value.trim().is_empty()) {
            self.model = model.trim().to_string();
        }
        self
    }
}

/// Parses `KEY=VALUE` lines; `#` comments, `export ` prefixes and matching quotes are tolerated.
pub fn parse_dotenv(content: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    for raw_line in content.lines() {
        let mut line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("export ") {
            line = stripped.trim();
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let mut value = value.trim().to_string();
        if value.len() >= 2 {
            let bytes = value.as_bytes();
            let quoted = (bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
                || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\'');
            if quoted {
                value = value[1..value.len() - 1].to_string();
            }
        }
        vars.insert(key.to_string(), value);
    }
    vars
}

/// Exports variables from a `.env` file that the process does not already define.
/// Returns how many were applied; a missing file applies none.
pub fn load_dotenv(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;
    let mut applied = 0;
    for (key, value) in parse_dotenv(&content) {
        if env::var_os(&key).is_some() {
            continue;
        }
        env::set_var(&key, value);
        applied += 1;
    }
    tracing::debug!(path = %path.display(), applied, "loaded dotenv");
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::{load_dotenv, parse_dotenv, GeneratorConfig, DEFAULT_API_BASE, DEFAULT_MODEL};

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = GeneratorConfig::from_lookup(lookup(&[]));
        assert_eq!(config.api_key, None);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
    }

    #[test]
    fn credential_keys_are_checked_in_order() {
        let config = GeneratorConfig::from_lookup(lookup(&[
            ("API_KEY", "  "),
            ("GEMINI_API_KEY", "gemini-key"),
            ("GOOGLE_API_KEY", "google-key"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("gemini-key"));
    }

    #[test]
    fn overrides_are_trimmed_and_clamped() {
        let config = GeneratorConfig::from_lookup(lookup(&[
            ("API_KEY", "k"),
            ("GEMINI_API_BASE", "http://localhost:9000/v1/"),
            ("TEESHOT_MODEL", "custom-image"),
            ("TEESHOT_REQUEST_TIMEOUT", "5"),
        ]));
        assert_eq!(config.api_base, "http://localhost:9000/v1");
        assert_eq!(config.model, "custom-image");
        assert_eq!(config.request_timeout, Duration::from_secs(15));

        let overridden = config.with_model(Some("other".to_string()));
        assert_eq!(overridden.model, "other");
        assert_eq!(overridden.clone().with_model(Some(" ".to_string())).model, "other");
    }

    #[test]
    fn dotenv_parsing_handles_comments_exports_and_quotes() {
        let vars = parse_dotenv(
            "# comment\nexport API_KEY=\"abc 123\"\nTEESHOT_MODEL='m'\nBROKEN\n=novalue\nPLAIN = x \n",
        );
        assert_eq!(vars.get("API_KEY").map(String::as_str), Some("abc 123"));
        assert_eq!(vars.get("TEESHOT_MODEL").map(String::as_str), Some("m"));
        assert_eq!(vars.get("PLAIN").map(String::as_str), Some("x"));
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn load_dotenv_skips_missing_file() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        assert_eq!(load_dotenv(&temp.path().join(".env"))?, 0);
        Ok(())
    }

    #[test]
    fn load_dotenv_keeps_existing_values() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join(".env");
        std::fs::write(
            &path,
            "TEESHOT_TEST_DOTENV_FRESH=from-file\nPATH=should-not-win\n",
        )?;
        let applied = load_dotenv(&path)?;
        assert_eq!(applied, 1);
        assert_eq!(
            std::env::var("TEESHOT_TEST_DOTENV_FRESH").ok().as_deref(),
            Some("from-file")
        );
        assert_ne!(std::env::var("PATH").ok().as_deref(), Some("should-not-win"));
        Ok(())
    }
}
