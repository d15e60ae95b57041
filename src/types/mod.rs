//! Core conversation types shared by every component.

mod artifact;
mod ids;
mod message;

pub use artifact::GeneratedArtifact;
pub use ids::MessageId;
pub use message::{ApiMessage, Message, Modality, Role};
