use super::wire::{ErrorEnvelope, GenerateContentResponse};
use super::{Citation, Generate, Generation, GenerationRequest, ModelError};
use crate::config::ModelConfig;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, warn};

pub const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// Longest slice of a non-JSON error body quoted back to the user.
const MAX_ERROR_DETAIL: usize = 200;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// One POST of a JSON body. Connection-level failures are
/// [`ModelError::Network`]; any HTTP status is a successful exchange.
pub trait Transport {
    fn post_json(&self, url: &str, api_key: &str, body: &[u8]) -> Result<RawResponse, ModelError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ModelError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, api_key: &str, body: &[u8]) -> Result<RawResponse, ModelError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, api_key)
            .body(body.to_vec())
            .send()
            .map_err(|e| ModelError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| ModelError::Network(e.to_string()))?;
        Ok(RawResponse { status, body })
    }
}

// ---------------------------------------------------------------------------
// ModelClient
// ---------------------------------------------------------------------------

/// Blocks the caller between retries. Swapped out in tests.
pub type Sleeper = Box<dyn Fn(Duration)>;

pub struct ModelClient {
    config: ModelConfig,
    api_key: Option<String>,
    transport: Box<dyn Transport>,
    sleep: Sleeper,
}

impl ModelClient {
    /// Client over HTTP. A missing `api_key` is only reported when a
    /// request is attempted.
    pub fn new(config: ModelConfig, api_key: Option<String>) -> Result<Self, ModelError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, api_key, transport))
    }

    pub fn with_transport(
        config: ModelConfig,
        api_key: Option<String>,
        transport: impl Transport + 'static,
    ) -> Self {
        Self {
            config,
            api_key,
            transport: Box::new(transport),
            sleep: Box::new(std::thread::sleep),
        }
    }

    pub fn with_sleeper(mut self, sleep: impl Fn(Duration) + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send `request`, retrying only on HTTP 429 with exponential backoff.
    pub fn generate(&self, request: &GenerationRequest) -> Result<Generation, ModelError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ModelError::MissingApiKey {
                env: self.config.api_key_env.clone(),
            });
        };
        let url = self.config.endpoint(request.grounded);
        let body = serde_json::to_vec(&request.to_wire())
            .map_err(|e| ModelError::Encode(e.to_string()))?;

        let attempts = self.config.max_attempts;
        for attempt in 0..attempts {
            debug!(%url, attempt, grounded = request.grounded, "sending generation request");
            let response = self.transport.post_json(&url, api_key, &body)?;
            match response.status {
                200..=299 => return parse_response(&response.body, request.grounded),
                429 => {
                    if attempt + 1 < attempts {
                        let delay = self.config.backoff(attempt);
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "rate limited (429), retrying"
                        );
                        (self.sleep)(delay);
                    }
                }
                status => {
                    return Err(ModelError::Http {
                        status,
                        detail: error_detail(&response.body),
                    })
                }
            }
        }
        Err(ModelError::RetriesExhausted { attempts })
    }
}

impl Generate for ModelClient {
    fn generate(&self, request: &GenerationRequest) -> Result<Generation, ModelError> {
        ModelClient::generate(self, request)
    }
}

fn parse_response(body: &str, grounded: bool) -> Result<Generation, ModelError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|_| ModelError::Decode)?;
    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or(ModelError::EmptyCandidate)?;
    let text = candidate
        .content
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or(ModelError::EmptyCandidate)?;

    let citations = match candidate.grounding_metadata {
        Some(meta) if grounded => meta
            .grounding_attributions
            .into_iter()
            .map(Citation::from)
            .collect(),
        _ => Vec::new(),
    };
    Ok(Generation { text, citations })
}

/// Prefer the API's own error message; fall back to the raw body.
fn error_detail(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if !envelope.error.message.is_empty() {
            return envelope.error.message;
        }
    }
    body.trim().chars().take(MAX_ERROR_DETAIL).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
