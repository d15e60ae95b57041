//! Normalized provider results.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::types::GeneratedArtifact;
use crate::{Error, Result};

/// Reported when neither a result nor an error envelope could be read.
pub const NO_RESPONSE: &str = "no response from model";

/// A failure reported by the provider in its own error envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub provider: &'static str,
    pub status: u16,
    pub message: String,
    pub error_type: Option<String>,
}

impl ProviderError {
    pub fn new(provider: &'static str, status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            provider,
            status,
            message: if message.trim().is_empty() {
                NO_RESPONSE.to_string()
            } else {
                message
            },
            error_type: None,
        }
    }

    pub fn no_response(provider: &'static str, status: u16) -> Self {
        Self::new(provider, status, NO_RESPONSE)
    }

    pub fn with_type(mut self, error_type: Option<String>) -> Self {
        self.error_type = error_type.filter(|t| !t.is_empty());
        self
    }
}

impl From<ProviderError> for Error {
    fn from(e: ProviderError) -> Self {
        Error::Provider {
            provider: e.provider,
            status: e.status,
            message: e.message,
            error_type: e.error_type,
        }
    }
}

/// Outcome of one provider call, decoded in a single pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    Success(GeneratedArtifact),
    Failure(ProviderError),
}

impl ProviderOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn into_result(self) -> Result<GeneratedArtifact> {
        match self {
            Self::Success(artifact) => Ok(artifact),
            Self::Failure(e) => Err(e.into()),
        }
    }
}

/// Error body of one provider family.
pub(crate) trait ErrorEnvelope {
    fn into_provider_error(self, provider: &'static str, status: u16) -> ProviderError;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<S, F> {
    Failure(F),
    Success(S),
}

/// Decodes `body` as either the success payload `S` or the error envelope `F`.
///
/// A success payload on a non-2xx status, an undecodable body, or a payload
/// without a first entry all collapse to [`NO_RESPONSE`].
pub(crate) fn decode<S, F>(
    provider: &'static str,
    status: u16,
    body: &[u8],
    extract: impl FnOnce(S) -> Option<GeneratedArtifact>,
) -> ProviderOutcome
where
    S: DeserializeOwned,
    F: DeserializeOwned + ErrorEnvelope,
{
    let success = (200..300).contains(&status);
    match serde_json::from_slice::<Envelope<S, F>>(body) {
        Ok(Envelope::Failure(err)) => {
            ProviderOutcome::Failure(err.into_provider_error(provider, status))
        }
        Ok(Envelope::Success(payload)) if success => match extract(payload) {
            Some(artifact) => ProviderOutcome::Success(artifact),
            None => ProviderOutcome::Failure(ProviderError::no_response(provider, status)),
        },
        Ok(Envelope::Success(_)) | Err(_) => {
            ProviderOutcome::Failure(ProviderError::no_response(provider, status))
        }
    }
}
