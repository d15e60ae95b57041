//! The per-session message log and the transforms applied to it.

mod filter;
mod prompts;
mod store;

pub use filter::pair_turns;
pub use prompts::{SEED_ACKNOWLEDGEMENT, initial_pair, seed_prompt};
pub use store::{ConversationStore, SEED_LEN};
