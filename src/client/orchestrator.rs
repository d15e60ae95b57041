//! Budgeted, cancellable dispatch of a conversation to a provider.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::adapter::Capability;
use crate::config::{GatewayConfig, TurnFilterPolicy};
use crate::conversation::pair_turns;
use crate::models::{ModelDescriptor, ModelRegistry};
use crate::tokens::TokenEstimator;
use crate::types::{ApiMessage, GeneratedArtifact, Message};
use crate::{Error, Result};

/// Lifecycle of a single provider request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Sending,
    Completed,
    Cancelled,
    Failed,
}

impl RequestState {
    /// Terminal state for a settled request.
    pub fn settled(result: &Result<GeneratedArtifact>) -> Self {
        match result {
            Ok(_) => Self::Completed,
            Err(e) if e.is_cancelled() => Self::Cancelled,
            Err(_) => Self::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

fn transition(from: RequestState, to: RequestState) {
    tracing::debug!(from = ?from, to = ?to, "request state");
}

/// A request that passed every pre-flight check and is ready to go on the
/// wire.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    model: ModelDescriptor,
    messages: Vec<ApiMessage>,
    estimated_tokens: u64,
}

impl PreparedRequest {
    pub fn model(&self) -> &ModelDescriptor {
        &self.model
    }

    /// The exact payload the adapter will send.
    pub fn messages(&self) -> &[ApiMessage] {
        &self.messages
    }

    pub fn estimated_tokens(&self) -> u64 {
        self.estimated_tokens
    }
}

/// Which channel settled a dispatch first.
enum Settled {
    Cancelled,
    Result(std::result::Result<GeneratedArtifact, RecvError>),
    Error(std::result::Result<Error, RecvError>),
}

pub struct RequestOrchestrator {
    registry: Arc<ModelRegistry>,
    estimator: TokenEstimator,
    turn_filter: TurnFilterPolicy,
    http: reqwest::Client,
}

impl std::fmt::Debug for RequestOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOrchestrator")
            .field("models", &self.registry.len())
            .field("turn_filter", &self.turn_filter)
            .finish()
    }
}

impl RequestOrchestrator {
    /// Builds the shared HTTP client with the configured blanket timeout.
    pub fn new(registry: Arc<ModelRegistry>, config: &GatewayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            registry,
            estimator: TokenEstimator::default(),
            turn_filter: config.turn_filter,
            http,
        })
    }

    /// Orchestrator over the built-in models.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let registry = ModelRegistry::builtins(config)?;
        Self::new(Arc::new(registry), config)
    }

    pub fn with_estimator(mut self, estimator: TokenEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn estimator(&self) -> &TokenEstimator {
        &self.estimator
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Looks up `model_id`; an empty id selects the default model. A miss is
    /// logged as a rejected request.
    pub fn resolve(&self, model_id: &str) -> Result<&ModelDescriptor> {
        self.registry
            .resolve(model_id)
            .inspect_err(|e| reject(model_id, e))
    }

    /// Every pre-flight step: model lookup, turn filtering, payload shaping
    /// and the budget gate. No network call and no side effects.
    ///
    /// Tokenizing runs on the blocking pool, so a large conversation never
    /// stalls the runtime.
    pub async fn prepare(&self, conversation: &[Message], model_id: &str) -> Result<PreparedRequest> {
        self.preflight(conversation, model_id)
            .await
            .inspect_err(|e| reject(model_id, e))
    }

    async fn preflight(&self, conversation: &[Message], model_id: &str) -> Result<PreparedRequest> {
        let model = self.registry.resolve(model_id)?.clone();
        let messages = self.shape(&model, conversation);

        let estimator = self.estimator;
        let span = tracing::Span::current();
        let (model, messages, estimated) = tokio::task::spawn_blocking(move || {
            let estimated = span.in_scope(|| estimator.ensure_within_budget(&messages, &model));
            (model, messages, estimated)
        })
        .await
        .map_err(|e| Error::Internal(format!("budget estimate task failed: {e}")))?;

        Ok(PreparedRequest {
            model,
            messages,
            estimated_tokens: estimated?,
        })
    }

    fn shape(&self, model: &ModelDescriptor, conversation: &[Message]) -> Vec<ApiMessage> {
        let adapter = model.adapter();

        let mut messages: Vec<ApiMessage> = conversation.iter().map(ApiMessage::from).collect();
        if adapter.capability() == Capability::TextChat
            && self.turn_filter.applies(adapter.requires_alternation())
        {
            let before = messages.len();
            messages = pair_turns(&messages);
            if messages.len() != before {
                tracing::debug!(
                    model = %model.id,
                    dropped = before - messages.len(),
                    "dropped unpaired user turns"
                );
            }
        }
        adapter.payload(messages)
    }

    /// Sends `prepared` on a background task and waits for its result, its
    /// error, or `cancel`, whichever comes first.
    ///
    /// On cancellation the task is left to finish on its own and whatever it
    /// produces is discarded.
    pub async fn dispatch(
        &self,
        prepared: PreparedRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedArtifact> {
        let span = tracing::debug_span!(
            "provider_request",
            model = %prepared.model.id,
            provider = prepared.model.adapter().name(),
            estimated_tokens = prepared.estimated_tokens,
        );

        async move {
            if cancel.is_cancelled() {
                transition(RequestState::Idle, RequestState::Cancelled);
                return Err(Error::Cancelled);
            }
            transition(RequestState::Idle, RequestState::Sending);

            let (result_tx, mut result_rx) = oneshot::channel::<GeneratedArtifact>();
            let (error_tx, mut error_rx) = oneshot::channel::<Error>();

            let http = self.http.clone();
            let PreparedRequest {
                model, messages, ..
            } = prepared;

            tokio::spawn(
                async move {
                    match model.adapter().send(&http, &model, &messages).await {
                        Ok(artifact) => {
                            let _ = result_tx.send(artifact);
                        }
                        Err(e) => {
                            let _ = error_tx.send(e);
                        }
                    }
                }
                .in_current_span(),
            );

            let settled = tokio::select! {
                biased;
                _ = cancel.cancelled() => Settled::Cancelled,
                r = &mut result_rx => Settled::Result(r),
                e = &mut error_rx => Settled::Error(e),
            };

            // A closed channel means the task answered on the other one, or
            // died without answering.
            let result = match settled {
                Settled::Cancelled => Err(Error::Cancelled),
                Settled::Result(Ok(artifact)) => Ok(artifact),
                Settled::Error(Ok(e)) => Err(e),
                Settled::Result(Err(_)) => match error_rx.await {
                    Ok(e) => Err(e),
                    Err(_) => Err(task_lost()),
                },
                Settled::Error(Err(_)) => result_rx.await.map_err(|_| task_lost()),
            };

            let state = RequestState::settled(&result);
            transition(RequestState::Sending, state);
            if let Err(e) = &result
                && !e.is_cancelled()
            {
                tracing::warn!(error = %e, "provider request failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    /// [`prepare`](Self::prepare) followed by [`dispatch`](Self::dispatch).
    pub async fn send(
        &self,
        conversation: &[Message],
        model_id: &str,
        cancel: &CancellationToken,
    ) -> Result<GeneratedArtifact> {
        let prepared = self.prepare(conversation, model_id).await?;
        self.dispatch(prepared, cancel).await
    }
}

fn reject(model_id: &str, e: &Error) {
    tracing::debug!(model = model_id, error = %e, "pre-flight rejected request");
    transition(RequestState::Idle, RequestState::Failed);
}

fn task_lost() -> Error {
    Error::Internal("provider task ended without a result".into())
}
