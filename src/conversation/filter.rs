//! Turn pairing for providers that require strict user/assistant alternation.

use crate::types::{ApiMessage, Role};

/// Returns the subsequence of `messages` that strictly alternates user and
/// assistant turns.
///
/// A user message survives only when it is immediately followed by an
/// assistant reply (the two are kept together) or when it is the final
/// element, the in-flight prompt. Any other user message is an orphan of an
/// earlier failed or cancelled exchange and is dropped. Non-user messages are
/// always kept. Relative order is preserved.
pub fn pair_turns(messages: &[ApiMessage]) -> Vec<ApiMessage> {
    let mut out = Vec::with_capacity(messages.len());
    let mut i = 0;

    while i < messages.len() {
        let current = &messages[i];
        if current.role != Role::User {
            out.push(current.clone());
            i += 1;
            continue;
        }

        match messages.get(i + 1) {
            Some(next) if next.role == Role::Assistant => {
                out.push(current.clone());
                out.push(next.clone());
                i += 2;
            }
            None => {
                out.push(current.clone());
                i += 1;
            }
            Some(_) => i += 1,
        }
    }

    out
}
