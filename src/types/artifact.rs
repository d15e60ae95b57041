use serde::{Deserialize, Serialize};

use super::Modality;

/// Normalized output of a provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "modality", rename_all = "lowercase")]
pub enum GeneratedArtifact {
    Text { content: String },
    Image { url: String },
}

impl GeneratedArtifact {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::Image { url: url.into() }
    }

    pub fn modality(&self) -> Modality {
        match self {
            Self::Text { .. } => Modality::Text,
            Self::Image { .. } => Modality::Image,
        }
    }

    /// Text body, or the image URL for image artifacts.
    pub fn content(&self) -> &str {
        match self {
            Self::Text { content } => content,
            Self::Image { url } => url,
        }
    }

    pub fn into_content(self) -> String {
        match self {
            Self::Text { content } => content,
            Self::Image { url } => url,
        }
    }
}
