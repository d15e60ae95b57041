//! Mutex-guarded conversation log.

use tokio::sync::Mutex;

use super::prompts::initial_pair;
use crate::types::{Message, MessageId, Role};
use crate::{Error, Result};

/// Number of seeded messages at the head of every conversation.
pub const SEED_LEN: usize = 2;

/// Ordered message log for one session.
///
/// The first [`SEED_LEN`] entries are the seeded pair and survive every
/// mutation. The lock is held for one operation at a time and never across a
/// provider call, so concurrent prompts on the same store interleave in
/// lock-acquisition order.
#[derive(Debug)]
pub struct ConversationStore {
    messages: Mutex<Vec<Message>>,
}

impl ConversationStore {
    /// A store seeded with the initial pair for `source_text`.
    pub fn seeded(source_text: &str) -> Self {
        Self::from_seed(initial_pair(source_text))
    }

    pub fn from_seed(seed: [Message; SEED_LEN]) -> Self {
        Self {
            messages: Mutex::new(seed.into()),
        }
    }

    pub async fn append_user(&self, message: Message) -> Result<MessageId> {
        self.append(message, Role::User).await
    }

    pub async fn append_assistant(&self, message: Message) -> Result<MessageId> {
        self.append(message, Role::Assistant).await
    }

    async fn append(&self, message: Message, expected: Role) -> Result<MessageId> {
        if message.role != expected {
            return Err(Error::Internal(format!(
                "expected a {} message, got {}",
                expected.as_str(),
                message.role.as_str()
            )));
        }

        let id = message.id;
        self.messages.lock().await.push(message);
        Ok(id)
    }

    /// Removes the message with `id` if it is past the seeded pair.
    ///
    /// Returns whether a message was removed.
    pub async fn retract(&self, id: MessageId) -> bool {
        let mut messages = self.messages.lock().await;
        let position = messages
            .iter()
            .skip(SEED_LEN)
            .position(|m| m.id == id)
            .map(|p| p + SEED_LEN);

        match position {
            Some(p) => {
                messages.remove(p);
                true
            }
            None => false,
        }
    }

    /// Truncates back to the seeded pair.
    pub async fn reset(&self) {
        self.messages.lock().await.truncate(SEED_LEN);
    }

    /// Every message, seeded pair and hidden messages included.
    pub async fn snapshot(&self) -> Vec<Message> {
        self.messages.lock().await.clone()
    }

    /// Messages a caller may see: past the seeded pair and not hidden.
    pub async fn visible(&self) -> Vec<Message> {
        self.messages
            .lock()
            .await
            .iter()
            .skip(SEED_LEN)
            .filter(|m| !m.hidden)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_fresh_store_has_no_visible_messages() {
        let store = ConversationStore::seeded("contract A {}");
        assert_eq!(store.len().await, SEED_LEN);
        assert!(store.visible().await.is_empty());
    }

    #[tokio::test]
    async fn test_append_roles_enforced() {
        let store = ConversationStore::seeded("");
        assert!(store.append_user(Message::assistant("x")).await.is_err());
        assert!(store.append_assistant(Message::user("x")).await.is_err());
        assert_eq!(store.len().await, SEED_LEN);

        store.append_user(Message::user("q")).await.unwrap();
        store.append_assistant(Message::assistant("a")).await.unwrap();

        let visible = store.visible().await;
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].content, "q");
        assert_eq!(visible[1].content, "a");
    }

    #[tokio::test]
    async fn test_hidden_excluded_from_visible() {
        let store = ConversationStore::seeded("");
        store.append_user(Message::user("report").hidden()).await.unwrap();
        store.append_assistant(Message::assistant("done")).await.unwrap();

        let visible = store.visible().await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].content, "done");
        assert_eq!(store.snapshot().await.len(), 4);
    }

    #[tokio::test]
    async fn test_reset_always_leaves_seed() {
        for extra in [0, 1, 5, 20] {
            let store = ConversationStore::seeded("src");
            for i in 0..extra {
                store.append_user(Message::user(format!("q{i}"))).await.unwrap();
            }
            store.reset().await;

            let snapshot = store.snapshot().await;
            assert_eq!(snapshot.len(), SEED_LEN);
            assert!(snapshot[0].content.contains("src"));
        }
    }

    #[tokio::test]
    async fn test_retract() {
        let store = ConversationStore::seeded("");
        let seed_id = store.snapshot().await[0].id;
        let first = store.append_user(Message::user("first")).await.unwrap();
        store.append_user(Message::user("second")).await.unwrap();

        assert!(!store.retract(seed_id).await);
        assert!(store.retract(first).await);
        assert!(!store.retract(first).await);

        let visible = store.visible().await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].content, "second");
    }

    #[tokio::test]
    async fn test_concurrent_appends() {
        let store = Arc::new(ConversationStore::seeded(""));
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.append_user(Message::user(format!("m{i}"))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.len().await, SEED_LEN + 16);
    }
}
