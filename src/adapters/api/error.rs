//! API Errors - Status Mapping for the Public Interface
//!
//! | Failure                         | Status |
//! |---------------------------------|--------|
//! | malformed body/query, bad input | 400    |
//! | unknown symbol, no listing      | 404    |
//! | upstream rate limit             | 429    |
//! | upstream failure, bad LLM JSON  | 502    |
//! | upstream timeout                | 504    |

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, warn};

use super::types::ErrorBody;
use crate::domain::DomainError;
use crate::ports::ProviderError;
use crate::usecases::ServiceError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be extracted.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self::Service(e.into())
    }
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        Self::Service(e.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Service(ServiceError::Domain(DomainError::InvalidLlmOutput { .. })) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Service(ServiceError::Domain(_)) => StatusCode::BAD_REQUEST,
            Self::Service(ServiceError::NoMarketData(_)) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::Provider(e)) => match e {
                ProviderError::NotFound(_) => StatusCode::NOT_FOUND,
                ProviderError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                ProviderError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                ProviderError::Upstream { .. }
                | ProviderError::Transport { .. }
                | ProviderError::Decode { .. } => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn body(self) -> ErrorBody {
        match self {
            Self::Service(ServiceError::Domain(DomainError::InvalidLlmOutput { raw })) => ErrorBody {
                error: "LLM response is not valid JSON".to_string(),
                details: None,
                raw_output: Some(raw),
            },
            Self::Service(ServiceError::Provider(
                e @ (ProviderError::Upstream { .. }
                | ProviderError::Transport { .. }
                | ProviderError::Decode { .. }),
            )) => ErrorBody {
                error: "Upstream provider error".to_string(),
                details: Some(e.to_string()),
                raw_output: None,
            },
            other => ErrorBody {
                error: other.to_string(),
                details: None,
                raw_output: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (DomainError::EmptyIdea.into(), StatusCode::BAD_REQUEST),
            (DomainError::InvalidSymbol("$$".into()).into(), StatusCode::BAD_REQUEST),
            (ProviderError::NotFound("ZZZZ".into()).into(), StatusCode::NOT_FOUND),
            (ProviderError::RateLimited { provider: "cohere" }.into(), StatusCode::TOO_MANY_REQUESTS),
            (ProviderError::Timeout { provider: "yahoo" }.into(), StatusCode::GATEWAY_TIMEOUT),
            (
                ProviderError::Upstream { provider: "yahoo", status: 500, body: String::new() }.into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                DomainError::InvalidLlmOutput { raw: "nope".into() }.into(),
                StatusCode::BAD_GATEWAY,
            ),
            (ServiceError::NoMarketData("X".into()).into(), StatusCode::NOT_FOUND),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status(), expected, "{error}");
        }
    }

    #[test]
    fn test_invalid_llm_output_body_keeps_raw_text() {
        let body = ApiError::from(DomainError::InvalidLlmOutput { raw: "Sure! Here".into() }).body();
        assert_eq!(body.error, "LLM response is not valid JSON");
        assert_eq!(body.raw_output.as_deref(), Some("Sure! Here"));
    }

    #[test]
    fn test_upstream_body_has_details() {
        let body = ApiError::from(ProviderError::Transport {
            provider: "yahoo",
            message: "connection reset".into(),
        })
        .body();
        assert_eq!(body.error, "Upstream provider error");
        assert!(body.details.unwrap().contains("connection reset"));
    }
}
