// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gemini client for estimating a dish's nutrition from a photo.
//!
//! Handles:
//! - Image payload validation (base64, size limit)
//! - The `generateContent` request with a fixed JSON-only prompt
//! - Pulling the JSON object out of the model's reply text
//! - A deterministic mock for tests and key-less development

use crate::error::AppError;
use crate::models::Macros;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Largest accepted decoded image.
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

const DEFAULT_MIME_TYPE: &str = "image/jpeg";

const PROMPT: &str = "You are a nutrition assistant.
Analyze the food photo and return JSON only:
{
  \"name\": \"Dish Name\",
  \"calories\": 123,
  \"macros\": { \"protein\": 10, \"carbs\": 20, \"fats\": 5 }
}
Respond with JSON only, no Markdown.";

/// Estimated nutrition for a photographed dish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct FoodAnalysis {
    pub name: String,
    pub calories: f64,
    #[cfg_attr(
        feature = "binding-generation",
        ts(type = "{ protein: number, carbs: number, fats: number }")
    )]
    pub macros: Macros,
}

impl FoodAnalysis {
    /// Result returned when analysis is mocked.
    pub fn mock() -> Self {
        Self {
            name: "Braised Pork Rice".to_string(),
            calories: 650.0,
            macros: Macros {
                protein: 28.0,
                carbs: 72.0,
                fats: 18.0,
            },
        }
    }
}

/// Reply shape before required fields are checked.
#[derive(Deserialize)]
struct RawAnalysis {
    name: Option<String>,
    calories: Option<f64>,
    macros: Option<Macros>,
}

/// Extract and check the analysis object embedded in model output.
///
/// The model sometimes wraps JSON in prose or code fences, so everything
/// from the first `{` to the last `}` is parsed.
pub fn extract_json(text: &str) -> Result<FoodAnalysis, AppError> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(AppError::FoodAnalysis(
            "Response did not include JSON".to_string(),
        ));
    };
    if start >= end {
        return Err(AppError::FoodAnalysis(
            "Response did not include JSON".to_string(),
        ));
    }

    let raw: RawAnalysis = serde_json::from_str(&text[start..=end])
        .map_err(|e| AppError::FoodAnalysis(format!("JSON parse error: {}", e)))?;

    match raw {
        RawAnalysis {
            name: Some(name),
            calories: Some(calories),
            macros: Some(macros),
        } if !name.trim().is_empty() && calories >= 0.0 => Ok(FoodAnalysis {
            name,
            calories,
            macros,
        }),
        _ => Err(AppError::FoodAnalysis(
            "Response JSON missing required fields".to_string(),
        )),
    }
}

/// Check that an image payload is non-empty base64 within the size limit.
pub fn validate_image_payload(base64_image: &str) -> Result<(), AppError> {
    let bytes = STANDARD
        .decode(base64_image.trim())
        .map_err(|e| AppError::BadRequest(format!("Image is not valid base64: {}", e)))?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest("Image is empty".to_string()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::BadRequest(format!(
            "Image is {} bytes, limit is {}",
            bytes.len(),
            MAX_IMAGE_BYTES
        )));
    }
    Ok(())
}

// ─── Gemini wire types ───────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 2],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData { mime_type: &'a str, data: &'a str },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Food photo analyzer.
#[derive(Clone)]
pub struct FoodAnalyzer {
    http: reqwest::Client,
    base_url: String,
    model: String,
    /// `None` means mock mode
    api_key: Option<String>,
}

impl FoodAnalyzer {
    /// Create an analyzer. Without a key, or with `mock` set, every call
    /// returns [`FoodAnalysis::mock`].
    pub fn new(api_key: Option<String>, model: String, mock: bool) -> Self {
        let api_key = match (mock, api_key) {
            (true, _) => None,
            (false, None) => {
                tracing::warn!("Gemini API key is missing, using mock food analysis");
                None
            }
            (false, Some(key)) => Some(key),
        };

        Self {
            http: reqwest::Client::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model,
            api_key,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.api_key.is_none()
    }

    /// Estimate nutrition for a base64-encoded image.
    pub async fn analyze(
        &self,
        base64_image: &str,
        mime_type: Option<&str>,
    ) -> Result<FoodAnalysis, AppError> {
        validate_image_payload(base64_image)?;

        let Some(api_key) = &self.api_key else {
            return Ok(FoodAnalysis::mock());
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [
                    Part::Text(PROMPT),
                    Part::InlineData {
                        mime_type: mime_type.unwrap_or(DEFAULT_MIME_TYPE),
                        data: base64_image.trim(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 256,
            },
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::FoodAnalysis(e.to_string()))?;

        let payload: GenerateContentResponse = self.check_response_json(response).await?;
        let text = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| AppError::FoodAnalysis("Response missing content".to_string()))?;

        let analysis = extract_json(&text)?;
        tracing::debug!(name = %analysis.name, calories = analysis.calories, "Analyzed food image");
        Ok(analysis)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Gemini rate limit hit (429)");
            }

            return Err(AppError::FoodAnalysis(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::FoodAnalysis(format!("JSON parse error: {}", e)))
    }
}
