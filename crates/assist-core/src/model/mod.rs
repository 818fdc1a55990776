//! Client for a Gemini-style `generateContent` endpoint.
//!
//! [`ModelClient`] owns the HTTP transport and the rate-limit retry policy.
//! Callers describe a call with [`GenerationRequest`] and get back either a
//! [`Generation`] or a [`ModelError`] whose `Display` text is what the
//! interactive menu prints.

mod client;
pub mod wire;

pub use client::{HttpTransport, ModelClient, RawResponse, Sleeper, Transport, API_KEY_HEADER};

use crate::extract::EncodedImage;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use wire::{Content, GenerateContentRequest, Part, Tool};

// ---------------------------------------------------------------------------
// GenerationRequest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Attach the web-search tool and collect citations from the reply.
    pub grounded: bool,
    pub image: Option<EncodedImage>,
    pub system_instruction: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn grounded(mut self) -> Self {
        self.grounded = true;
        self
    }

    pub fn with_image(mut self, image: EncodedImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Build the request body. The image, if any, becomes the first part of
    /// the first content entry.
    pub fn to_wire(&self) -> GenerateContentRequest {
        let mut contents = vec![Content {
            parts: vec![Part::text(&self.prompt)],
        }];
        if let (Some(image), Some(first)) = (&self.image, contents.first_mut()) {
            first
                .parts
                .insert(0, Part::inline(EncodedImage::MIME_TYPE, image.to_base64()));
        }
        GenerateContentRequest {
            contents,
            tools: if self.grounded {
                vec![Tool::default()]
            } else {
                Vec::new()
            },
            system_instruction: self.system_instruction.as_ref().map(|s| Content {
                parts: vec![Part::text(s)],
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Generation / Citation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    pub text: String,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- [{}]({})", self.title, self.uri)
    }
}

impl From<wire::GroundingAttribution> for Citation {
    fn from(attr: wire::GroundingAttribution) -> Self {
        let (title, uri) = match attr.web {
            Some(web) => (web.title, web.uri),
            None => (None, None),
        };
        Self {
            title: title.unwrap_or_else(|| "Source".to_string()),
            uri: uri.unwrap_or_else(|| "#".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// ModelError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No credential; never retried.
    Configuration,
    /// Rate limited until the attempt budget ran out.
    Transient,
    /// The endpoint answered but the answer is unusable.
    Permanent,
    Network,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("Error: API Key is not set. Please set the {env} environment variable.")]
    MissingApiKey { env: String },

    #[error("HTTP Error: {status} {detail}")]
    Http { status: u16, detail: String },

    #[error("Error: Failed to get a response after multiple retries.")]
    RetriesExhausted { attempts: u32 },

    #[error("Network Error: {0}")]
    Network(String),

    #[error("Error: Failed to encode request: {0}")]
    Encode(String),

    #[error("Error: Failed to decode JSON response from API.")]
    Decode,

    #[error("Error: AI response candidate was empty or malformed.")]
    EmptyCandidate,
}

impl ModelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::MissingApiKey { .. } => ErrorKind::Configuration,
            ModelError::RetriesExhausted { .. } => ErrorKind::Transient,
            ModelError::Network(_) => ErrorKind::Network,
            ModelError::Http { .. }
            | ModelError::Encode(_)
            | ModelError::Decode
            | ModelError::EmptyCandidate => ErrorKind::Permanent,
        }
    }
}

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

/// Anything that can answer a [`GenerationRequest`].
pub trait Generate {
    fn generate(&self, request: &GenerationRequest) -> Result<Generation, ModelError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
