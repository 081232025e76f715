use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::{json, Value};
use teeshot_contracts::prompts::build_prompt;
use teeshot_contracts::{DataUrl, EncodedImage, ShirtColor, ShotType};

use crate::config::GeneratorConfig;
use crate::error::{truncate_text, GenerationError};
use crate::provider::MockupGenerator;

/// Client for the hosted Gemini image model (`generateContent`).
pub struct GeminiGenerator {
    config: GeneratorConfig,
    http: HttpClient,
}

impl GeminiGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| HttpClient::new());
        Self { config, http }
    }

    fn endpoint(&self) -> String {
        let trimmed = self.config.model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.config.api_base, model_path)
    }

    fn build_payload(source: &EncodedImage, prompt: &str) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": source.mime_type,
                            "data": source.base64,
                        }
                    },
                    { "text": prompt },
                ],
            }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
            },
        })
    }

    fn post(&self, endpoint: &str, api_key: &str, payload: &Value) -> Result<Value> {
        let response = self
            .http
            .post(endpoint)
            .query(&[("key", api_key)])
            .json(payload)
            .send()
            .with_context(|| format!("Gemini request failed ({endpoint})"))?;
        response_json_or_error(response)
    }

    /// First inline image part of the first candidate, as a data URL.
    fn extract_image(response_payload: &Value) -> Option<DataUrl> {
        let parts = response_payload
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)?;

        parts.iter().find_map(|part| {
            let inline = part
                .get("inlineData")
                .or_else(|| part.get("inline_data"))?;
            let data = inline.get("data").and_then(Value::as_str)?;
            if data.is_empty() {
                return None;
            }
            let mime_type = inline
                .get("mimeType")
                .or_else(|| inline.get("mime_type"))
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
                .unwrap_or("image/png");
            Some(DataUrl::new(mime_type, data))
        })
    }
}

impl MockupGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> Option<&str> {
        Some(self.config.model.as_str())
    }

    fn generate(
        &self,
        source: &EncodedImage,
        color: ShirtColor,
        shot: ShotType,
    ) -> Result<DataUrl, GenerationError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(GenerationError::MissingCredential);
        };
        let prompt = build_prompt(color, shot);
        let payload = Self::build_payload(source, &prompt);
        let endpoint = self.endpoint();
        tracing::debug!(%color, %shot, model = %self.config.model, "requesting mockup");

        let response_payload = self.post(&endpoint, api_key, &payload).map_err(|err| {
            tracing::error!(%color, error = %format!("{err:#}"), "error generating mockup");
            GenerationError::request(color, &err)
        })?;

        match Self::extract_image(&response_payload) {
            Some(image) => Ok(image),
            None => {
                tracing::error!(%color, "Gemini response carried no image data");
                Err(GenerationError::NoImageData { color })
            }
        }
    }
}

fn response_json_or_error(response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .context("Gemini response body read failed")?;
    if !status.is_success() {
        bail!("Gemini request failed ({code}): {}", truncate_text(&body, 512));
    }
    let parsed: Value =
        serde_json::from_str(&body).context("Gemini returned invalid JSON payload")?;
    Ok(parsed)
}
