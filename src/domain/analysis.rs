//! Trade idea analysis types.
//!
//! Covers the three steps that do not need the network: validating the
//! user's idea, rendering the research-assistant prompt, and turning the
//! LLM's reply back into a structured [`TradeAnalysis`].

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Default upper bound on idea length, in characters.
pub const DEFAULT_MAX_IDEA_CHARS: usize = 2000;

/// A validated, trimmed natural-language trade idea.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeIdea(String);

impl TradeIdea {
    /// Validate with the default length limit.
    pub fn new(text: &str) -> Result<Self, DomainError> {
        Self::with_limit(text, DEFAULT_MAX_IDEA_CHARS)
    }

    /// Validate with an explicit character limit.
    pub fn with_limit(text: &str, max_chars: usize) -> Result<Self, DomainError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyIdea);
        }
        let len = trimmed.chars().count();
        if len > max_chars {
            return Err(DomainError::IdeaTooLong { len, max: max_chars });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Structured analysis returned by the LLM.
///
/// Field names are the JSON keys the prompt asks for, so the struct
/// doubles as the public response schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeAnalysis {
    /// Strategy type (momentum, breakout, swing, ...).
    pub strategy: String,
    /// Free-form risk label, normally `Low`, `Moderate` or `High`.
    pub risk_level: String,
    /// Technical indicators worth monitoring.
    #[serde(default)]
    pub indicators_to_watch: Vec<String>,
    /// Plain-English explanation without hype or advice.
    pub summary: String,
}

impl TradeAnalysis {
    pub fn risk(&self) -> RiskLevel {
        RiskLevel::classify(&self.risk_level)
    }
}

/// Coarse risk bucket derived from the LLM's free-text risk label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Unknown,
}

impl RiskLevel {
    /// Case-insensitive prefix match, so "High (earnings volatility)" is High.
    pub fn classify(label: &str) -> Self {
        let label = label.trim().to_ascii_lowercase();
        if label.starts_with("low") {
            Self::Low
        } else if label.starts_with("moderate") || label.starts_with("medium") {
            Self::Moderate
        } else if label.starts_with("high") {
            Self::High
        } else {
            Self::Unknown
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render the prompt sent to the LLM for a trade idea.
///
/// The model is asked to answer with bare JSON matching [`TradeAnalysis`].
pub fn build_analysis_prompt(idea: &TradeIdea) -> String {
    format!(
        r#"
You are an AI based professional Equity and Trade research assistant who helps retail traders understand trade ideas. Your tone is factual, ethical, and concise.

Analyze the following trade idea and respond ONLY in JSON format. Do NOT include markdown, headings, or text outside the JSON.

Required JSON structure:
{{
  "strategy": "Describe the trading strategy type (e.g., momentum, breakout, swing)",
  "risk_level": "Low | Moderate | High (based on volatility, timing, leverage)",
  "indicators_to_watch": ["List relevant technical indicators"],
  "summary": "Short, ethical explanation for the trade idea in plain English (no hype, no financial advice)"
}}

Trade idea: "{}"
"#,
        idea.as_str()
    )
}

/// Remove a surrounding markdown code fence, if any.
///
/// Handles ```` ```json ```` and bare ```` ``` ```` openers; text without
/// a fence is returned trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. "json") up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) if rest[..idx].chars().all(|c| c.is_ascii_alphanumeric()) => &rest[idx + 1..],
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse the LLM's reply into a [`TradeAnalysis`].
///
/// # Errors
/// [`DomainError::InvalidLlmOutput`] with the fence-stripped text when the
/// reply is not JSON of the expected shape.
pub fn parse_analysis(raw: &str) -> Result<TradeAnalysis, DomainError> {
    let cleaned = strip_code_fence(raw);
    serde_json::from_str(cleaned).map_err(|_| DomainError::InvalidLlmOutput {
        raw: cleaned.to_string(),
    })
}
