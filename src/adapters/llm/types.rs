//! Cohere Chat API Request/Response Types
//!
//! Only the fields the service reads are modelled; unknown fields in
//! responses are ignored.

use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    /// Model identifier.
    pub model: &'a str,
    /// Single-turn user message.
    pub message: &'a str,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Response body from `POST /v1/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Completion text.
    pub text: String,
    /// Provider-side generation ID.
    pub generation_id: Option<String>,
    /// Why generation stopped (`COMPLETE`, `MAX_TOKENS`, ...).
    pub finish_reason: Option<String>,
    /// Billing metadata.
    pub meta: Option<ChatMeta>,
}

/// Response metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMeta {
    pub billed_units: Option<BilledUnits>,
}

/// Billed token counts. Cohere reports these as JSON numbers that may
/// carry a fractional part.
#[derive(Debug, Clone, Deserialize)]
pub struct BilledUnits {
    pub input_tokens: Option<f64>,
    pub output_tokens: Option<f64>,
}

impl ChatResponse {
    pub fn input_tokens(&self) -> Option<u32> {
        self.billed_units()?.input_tokens.map(tokens_to_u32)
    }

    pub fn output_tokens(&self) -> Option<u32> {
        self.billed_units()?.output_tokens.map(tokens_to_u32)
    }

    fn billed_units(&self) -> Option<&BilledUnits> {
        self.meta.as_ref()?.billed_units.as_ref()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn tokens_to_u32(value: f64) -> u32 {
    value.max(0.0).round() as u32
}
