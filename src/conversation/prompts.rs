//! Prompts the conversation is seeded with.

use crate::types::Message;

/// The assistant turn that closes the seeded pair.
pub const SEED_ACKNOWLEDGEMENT: &str =
    "Understood. I have read your solidity codebase and am ready to answer questions about it.";

pub fn seed_prompt(source_text: &str) -> String {
    format!("The code in triple quotes is my solidity codebase: '''{source_text}'''")
}

/// The fixed user/assistant pair every conversation starts with.
pub fn initial_pair(source_text: &str) -> [Message; 2] {
    [
        Message::user(seed_prompt(source_text)),
        Message::assistant(SEED_ACKNOWLEDGEMENT),
    ]
}
