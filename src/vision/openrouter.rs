use async_trait::async_trait;
use base64::Engine as _;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::VisionConfig;
use crate::imaging::{CardSide, DetectionMethod, SideDetection};
use crate::vision::checker::{VisionChecker, VisionRequest};
use crate::vision::error::VisionError;

const MAX_TOKENS: u32 = 50;

/// Vision checker backed by the OpenRouter chat-completions API.
pub struct OpenRouterChecker {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl OpenRouterChecker {
    pub fn new(config: &VisionConfig) -> Self {
        OpenRouterChecker {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        }
    }

    fn build_prompt(request: &VisionRequest) -> String {
        let mut prompt = String::from(
            "Is this image the FRONT or the BACK of a trading card? \
             Reply with exactly one word: FRONT, BACK, or UNKNOWN.",
        );
        if request.trust_tier >= 2 {
            if let (Some(number), Some(set_code)) = (&request.card_number, &request.set_code) {
                prompt.push_str(&format!(
                    " The card should be number {} from set {}. \
                     If the image clearly shows a different card, reply WRONG_CARD.",
                    number, set_code
                ));
            }
        }
        prompt
    }
}

/// Map the model's reply to a side verdict by substring containment.
pub fn parse_verdict(content: &str) -> SideDetection {
    let upper = content.to_uppercase();
    if upper.contains("FRONT") {
        SideDetection {
            side: CardSide::Front,
            confidence: 0.95,
            method: DetectionMethod::Vision,
        }
    } else if upper.contains("BACK") {
        SideDetection {
            side: CardSide::Back,
            confidence: 0.95,
            method: DetectionMethod::Vision,
        }
    } else if upper.contains("WRONG_CARD") {
        SideDetection {
            side: CardSide::Unknown,
            confidence: 0.3,
            method: DetectionMethod::Vision,
        }
    } else {
        SideDetection {
            side: CardSide::Unknown,
            confidence: 0.5,
            method: DetectionMethod::Vision,
        }
    }
}

#[async_trait]
impl VisionChecker for OpenRouterChecker {
    async fn check(
        &self,
        bytes: &[u8],
        content_type: &str,
        request: &VisionRequest,
    ) -> Result<SideDetection, VisionError> {
        let Some(api_key) = &self.api_key else {
            warn!("no vision API key configured, skipping vision check");
            return Ok(SideDetection {
                side: CardSide::Unknown,
                confidence: 0.5,
                method: DetectionMethod::Vision,
            });
        };

        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": Self::build_prompt(request) },
                    {
                        "type": "image_url",
                        "image_url": {
                            "url": format!("data:{};base64,{}", content_type, payload)
                        }
                    }
                ]
            }],
            "max_tokens": MAX_TOKENS,
            "temperature": 0
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VisionError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VisionError::HttpStatus(response.status().as_u16()));
        }

        let reply: serde_json::Value = response
            .json()
            .await
            .map_err(|e| VisionError::ParseError(e.to_string()))?;

        let content = reply["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| VisionError::ParseError("missing choices[0].message.content".to_string()))?;

        debug!("vision model replied: {}", content.trim());
        Ok(parse_verdict(content))
    }
}
