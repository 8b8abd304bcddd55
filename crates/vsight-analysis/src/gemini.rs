//! Direct Gemini backend.
//!
//! Sends the forensic prompt, the frames and the audio as inline data to
//! `models/{model}:generateContent` with a response schema, so no relay is
//! needed when an API key is available locally.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use vsight_models::{RawAnalysis, SessionContext};

use crate::client::ForensicAnalyzer;
use crate::error::{AnalysisError, AnalysisResult};
use crate::relay::parse_raw_analysis;
use crate::types::AnalysisRequest;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

const FORENSIC_PROMPT: &str = r#"You are a Forensic Video Analyst.
Analyze the provided video frames and audio for digital manipulation.

RULES:
1. Visuals: look for face warping, inconsistent lighting and bad lip-sync.
2. Audio: look for robotic artifacts or background noise mismatches.
3. Text: if you see "Deepfake", "Face Swap" or "AI Generated" text, INSTANTLY set score to 0 and status FAIL.

Report one finding per detection vector: Deepfake/Identity Swap, AI Voice/TTS,
Lip-Sync, Generative AI, Puppetry, Morphing, Lighting/Shadows, Splicing,
Speed Artifacts, Metadata/Text.

Return a strict JSON report based on the provided schema."#;

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> AnalysisResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AnalysisError::config("GEMINI_API_KEY not set"));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            model: model.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(&self, request: &'a AnalysisRequest) -> GenerateRequest<'a> {
        let mut parts = vec![Part::Text {
            text: FORENSIC_PROMPT,
        }];

        parts.extend(request.frames.iter().map(|frame| Part::Inline {
            inline_data: InlineData {
                mime_type: "image/jpeg",
                data: frame.to_base64(),
            },
        }));

        if let Some(audio) = &request.audio_base64 {
            parts.push(Part::Inline {
                inline_data: InlineData {
                    mime_type: "audio/wav",
                    data: audio.to_base64(),
                },
            });
        }

        GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: report_schema(),
            },
            safety_settings: SAFETY_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
        }
    }
}

#[async_trait]
impl ForensicAnalyzer for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn submit(
        &self,
        request: &AnalysisRequest,
        _session: &SessionContext,
    ) -> AnalysisResult<RawAnalysis> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&self.build_request(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = match serde_json::from_slice::<ApiErrorBody>(&body) {
                Ok(parsed) => match parsed.error.status {
                    Some(code) => format!("{} ({})", parsed.error.message, code),
                    None => parsed.error.message,
                },
                Err(_) => format!("Gemini API returned {}", status),
            };
            return Err(AnalysisError::from_http_status(status.as_u16(), message));
        }

        let parsed: GenerateResponse = serde_json::from_slice(&body)
            .map_err(|e| AnalysisError::malformed(format!("invalid Gemini response: {}", e)))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| AnalysisError::malformed("no content in Gemini response"))?;

        debug!(model = %self.model, chars = text.len(), "Gemini response received");
        parse_raw_analysis(strip_code_fence(&text).as_bytes())
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Remove a surrounding markdown code fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

fn report_schema() -> Value {
    json!({
        "type": "OBJECT",
        "description": "Forensic Video Analysis Report",
        "properties": {
            "isAuthentic": { "type": "BOOLEAN" },
            "score": { "type": "NUMBER", "description": "0-100 Integrity Score" },
            "summary": { "type": "STRING", "description": "Executive forensic summary" },
            "confidenceLevel": { "type": "STRING", "enum": ["HIGH", "MEDIUM", "LOW"] },
            "analysis": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "category": { "type": "STRING" },
                        "confidence": { "type": "NUMBER" },
                        "detail": { "type": "STRING" },
                        "status": { "type": "STRING", "enum": ["PASS", "WARN", "FAIL"] }
                    },
                    "required": ["category", "confidence", "detail", "status"]
                }
            }
        },
        "required": ["isAuthentic", "score", "summary", "confidenceLevel", "analysis"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsight_models::{AudioPayload, MediaFrame};

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_empty_key_is_config_error() {
        let err = GeminiClient::new("  ", DEFAULT_GEMINI_MODEL, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }

    #[test]
    fn test_request_parts_layout() {
        let client = GeminiClient::new("k", DEFAULT_GEMINI_MODEL, Duration::from_secs(5)).unwrap();
        let frames = vec![
            MediaFrame::new(vec![1], 0.0),
            MediaFrame::new(vec![2], 1.0),
            MediaFrame::new(vec![3], 2.0),
        ];
        let audio = AudioPayload::from_wav_bytes(vec![9]);
        let request = AnalysisRequest::new(&frames, Some(&audio));

        let body = serde_json::to_value(client.build_request(&request)).unwrap();
        let parts = body["contents"][0]["parts"].as_array().unwrap();

        // prompt + 2 even-indexed frames + audio
        assert_eq!(parts.len(), 4);
        assert!(parts[0]["text"].as_str().unwrap().contains("Forensic Video Analyst"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[2]["inlineData"]["data"], "Aw==");
        assert_eq!(parts[3]["inlineData"]["mimeType"], "audio/wav");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(body["safetySettings"][0]["threshold"], "BLOCK_NONE");
    }

    #[test]
    fn test_schema_requires_analysis() {
        let schema = report_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "analysis"));
    }
}
