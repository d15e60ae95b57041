//! The operations exposed to the HTTP and CLI layers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::client::RequestOrchestrator;
use crate::config::{GatewayConfig, OrphanPolicy};
use crate::conversation::{ConversationStore, initial_pair};
use crate::reports::{FileFetcher, HttpFileFetcher, ReportKind, report_prompt};
use crate::types::{ApiMessage, Message};
use crate::{Error, Result};

/// One session's conversation with the model backend.
///
/// The store's lock is never held across a provider call, so a gateway may be
/// shared between concurrent callers. Their messages interleave in whatever
/// order they reach the store.
pub struct ConversationGateway {
    store: ConversationStore,
    orchestrator: Arc<RequestOrchestrator>,
    fetcher: Arc<dyn FileFetcher>,
    orphan_policy: OrphanPolicy,
}

impl std::fmt::Debug for ConversationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationGateway")
            .field("store", &self.store)
            .field("orchestrator", &self.orchestrator)
            .field("orphan_policy", &self.orphan_policy)
            .finish()
    }
}

impl ConversationGateway {
    /// Seeds a conversation with `source_text`.
    ///
    /// Fails with [`Error::BudgetExceeded`](crate::Error::BudgetExceeded) when
    /// the seeded pair alone does not fit the default model's context.
    pub fn new(
        source_text: &str,
        orchestrator: Arc<RequestOrchestrator>,
        fetcher: Arc<dyn FileFetcher>,
        config: &GatewayConfig,
    ) -> Result<Self> {
        let seed = initial_pair(source_text);
        let default = orchestrator.registry().default();
        let payload: Vec<ApiMessage> = seed.iter().map(ApiMessage::from).collect();
        let estimated = orchestrator
            .estimator()
            .ensure_within_budget(&payload, default)?;

        tracing::info!(
            model = %default.id,
            estimated,
            limit = default.max_context_tokens,
            "conversation seeded"
        );

        Ok(Self {
            store: ConversationStore::from_seed(seed),
            orchestrator,
            fetcher,
            orphan_policy: config.orphan_policy,
        })
    }

    /// Gateway over the built-in models, fetching report samples over HTTP.
    pub fn from_config(source_text: &str, config: &GatewayConfig) -> Result<Self> {
        let orchestrator = RequestOrchestrator::from_config(config)?;
        let fetcher = HttpFileFetcher::new(orchestrator.http().clone());
        Self::new(
            source_text,
            Arc::new(orchestrator),
            Arc::new(fetcher),
            config,
        )
    }

    pub fn orchestrator(&self) -> &RequestOrchestrator {
        &self.orchestrator
    }

    /// Visible messages: past the seeded pair and not hidden.
    pub async fn conversation(&self) -> Vec<Message> {
        self.store.visible().await
    }

    /// Every message including the seeded pair and hidden prompts.
    pub async fn full_conversation(&self) -> Vec<Message> {
        self.store.snapshot().await
    }

    pub async fn prompt_model(
        &self,
        text: &str,
        model_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Message>> {
        self.exchange(Message::user(text), model_id, cancel).await
    }

    /// Asks the model for a `kind` report. The prompt is sent hidden; only the
    /// reply shows up in the visible conversation.
    pub async fn generate_report(
        &self,
        kind: ReportKind,
        extra_instructions: &str,
        model_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Message>> {
        self.orchestrator.resolve(model_id)?;

        let sample = self.fetcher.fetch(&kind.sample_url()).await?;
        let prompt = report_prompt(kind, &sample, extra_instructions);

        tracing::debug!(report = %kind, sample_bytes = sample.len(), "generating report");
        self.exchange(Message::user(prompt).hidden(), model_id, cancel)
            .await
    }

    /// Truncates the conversation back to the seeded pair.
    pub async fn reset_conversation(&self) {
        self.store.reset().await;
        tracing::debug!("conversation reset");
    }

    pub fn report_kinds() -> &'static [ReportKind] {
        ReportKind::all()
    }

    async fn exchange(
        &self,
        user: Message,
        model_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Message>> {
        // Pre-flight against the conversation as it will be once the prompt
        // lands, so rejected prompts leave no trace.
        let mut pending = self.store.snapshot().await;
        pending.push(user.clone());

        let prepared = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(model = model_id, "cancelled before dispatch");
                return Err(Error::Cancelled);
            }
            prepared = self.orchestrator.prepare(&pending, model_id) => prepared?,
        };

        let model_id = prepared.model().id.clone();
        let user_id = self
            .store
            .append_user(user.with_origin_model(&model_id))
            .await?;

        match self.orchestrator.dispatch(prepared, cancel).await {
            Ok(artifact) => {
                let reply = Message::from_artifact(artifact).with_origin_model(&model_id);
                self.store.append_assistant(reply).await?;
                Ok(self.store.visible().await)
            }
            Err(e) => {
                if self.orphan_policy == OrphanPolicy::Rollback {
                    let removed = self.store.retract(user_id).await;
                    tracing::debug!(removed, "rolled back unanswered prompt");
                }
                Err(e)
            }
        }
    }
}
