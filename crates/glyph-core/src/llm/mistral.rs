//! Mistral provider using the Chat Completions API.
//!
//! Sends the image via data URL in the user message content array, with
//! the conversion instructions as a system message.

use super::provider::{status_error, VisionProvider, VisionRequest, VisionResponse};
use crate::error::ConvertError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Mistral provider using the Chat Completions API.
pub struct MistralProvider {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl MistralProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ChatMessage {
    System { role: String, content: String },
    User { role: String, content: Vec<ChatContent> },
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[async_trait]
impl VisionProvider for MistralProvider {
    fn name(&self) -> &str {
        "mistral"
    }

    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse, ConvertError> {
        let url = format!("{}/v1/chat/completions", self.endpoint);
        let start = Instant::now();

        let body = ChatRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![
                ChatMessage::System {
                    role: "system".to_string(),
                    content: request.system.clone(),
                },
                ChatMessage::User {
                    role: "user".to_string(),
                    content: vec![
                        ChatContent::Text {
                            text: request.user.clone(),
                        },
                        ChatContent::ImageUrl {
                            image_url: ImageUrl {
                                url: request.image.data_url(),
                            },
                        },
                    ],
                },
            ],
        };

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ConvertError::Transport {
                provider: self.name().to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(status_error(self.name(), status.as_u16(), text));
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| ConvertError::Api {
            provider: self.name().to_string(),
            status: None,
            message: format!("Failed to parse response: {e}"),
        })?;

        let text = chat_resp
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConvertError::Api {
                provider: self.name().to_string(),
                status: None,
                message: "empty choices array, no content generated".to_string(),
            })?;

        Ok(VisionResponse {
            text,
            model: chat_resp.model,
            tokens_used: chat_resp.usage.map(|u| u.total_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ImageInput;

    #[test]
    fn request_body_carries_system_and_data_url() {
        let image = ImageInput::from_bytes(&[0xFF, 0xD8], "jpg");
        let body = ChatRequest {
            model: "pixtral-12b-2409".to_string(),
            max_tokens: 4096,
            temperature: 0.0,
            messages: vec![
                ChatMessage::System {
                    role: "system".to_string(),
                    content: "rules".to_string(),
                },
                ChatMessage::User {
                    role: "user".to_string(),
                    content: vec![
                        ChatContent::Text {
                            text: "describe".to_string(),
                        },
                        ChatContent::ImageUrl {
                            image_url: ImageUrl {
                                url: image.data_url(),
                            },
                        },
                    ],
                },
            ],
        };

        let json: serde_json::Value = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "rules");
        assert_eq!(json["messages"][1]["content"][1]["type"], "image_url");
        let url = json["messages"][1]["content"][1]["image_url"]["url"]
            .as_str()
            .unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn response_parses_first_choice() {
        let raw = r#"{
            "choices": [{"message": {"content": "| a | b |"}}],
            "model": "pixtral-12b-2409",
            "usage": {"total_tokens": 77}
        }"#;
        let resp: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            resp.choices[0].message.content.as_deref(),
            Some("| a | b |")
        );
        assert_eq!(resp.usage.map(|u| u.total_tokens), Some(77));
    }

    #[test]
    fn trailing_slash_endpoint_is_normalised() {
        let p = MistralProvider::new(
            "https://api.mistral.ai/",
            "key",
            "pixtral-12b-2409",
            Duration::from_secs(60),
        );
        assert_eq!(p.endpoint, "https://api.mistral.ai");
    }
}
