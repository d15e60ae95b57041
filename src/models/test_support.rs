//! In-crate stubs for exercising the registry and orchestrator without a
//! network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::field::{Field, Visit};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use url::Url;

use super::ModelDescriptor;
use crate::client::{Capability, ProviderAdapter, ProviderConfig, ProviderError, ProviderOutcome};
use crate::tokens::TokenizerKind;
use crate::types::{ApiMessage, GeneratedArtifact};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StubBehavior {
    Reply,
    Fail,
    /// Sleeps before replying, long enough for a caller to cancel.
    Slow,
}

/// Adapter that records every call instead of touching the network.
#[derive(Debug)]
pub(crate) struct StubAdapter {
    config: ProviderConfig,
    capability: Capability,
    strict: bool,
    behavior: StubBehavior,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<Vec<ApiMessage>>>,
}

impl StubAdapter {
    fn with(capability: Capability, strict: bool, behavior: StubBehavior) -> Self {
        Self {
            config: ProviderConfig::default(),
            capability,
            strict,
            behavior,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn text() -> Self {
        Self::with(Capability::TextChat, false, StubBehavior::Reply)
    }

    pub fn strict() -> Self {
        Self::with(Capability::TextChat, true, StubBehavior::Reply)
    }

    pub fn image() -> Self {
        Self::with(Capability::ImageGeneration, false, StubBehavior::Reply)
    }

    pub fn behavior(mut self, behavior: StubBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_seen(&self) -> Option<Vec<ApiMessage>> {
        self.seen.lock().ok().and_then(|s| s.last().cloned())
    }
}

#[async_trait]
impl ProviderAdapter for StubAdapter {
    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "stub"
    }

    fn capability(&self) -> Capability {
        self.capability
    }

    fn requires_alternation(&self) -> bool {
        self.strict
    }

    fn transform_request(
        &self,
        model: &ModelDescriptor,
        messages: &[ApiMessage],
    ) -> Result<serde_json::Value> {
        Ok(serde_json::json!({ "model": model.id, "messages": messages }))
    }

    fn transform_response(&self, status: u16, body: &[u8]) -> ProviderOutcome {
        match std::str::from_utf8(body) {
            Ok(content) if status == 200 => ProviderOutcome::Success(match self.capability {
                Capability::TextChat => GeneratedArtifact::text(content),
                Capability::ImageGeneration => GeneratedArtifact::image(content),
            }),
            _ => ProviderOutcome::Failure(ProviderError::new("stub", status, "stub failure")),
        }
    }

    async fn apply_auth_headers(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder> {
        Ok(req)
    }

    async fn send(
        &self,
        _http: &reqwest::Client,
        model: &ModelDescriptor,
        messages: &[ApiMessage],
    ) -> Result<GeneratedArtifact> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let body = self.transform_request(model, messages)?;
        let sent: Vec<ApiMessage> = serde_json::from_value(body["messages"].clone())?;
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(sent);
        }

        let reply = match self.capability {
            Capability::TextChat => format!("reply {n} from {}", model.id),
            Capability::ImageGeneration => format!("https://images.test/{n}.png"),
        };
        let (status, reply) = match self.behavior {
            StubBehavior::Reply => (200, reply),
            StubBehavior::Fail => (500, String::new()),
            StubBehavior::Slow => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                (200, reply)
            }
        };
        self.transform_response(status, reply.as_bytes()).into_result()
    }
}

/// Records the `from`/`to` fields of request state transitions emitted on
/// the current thread while installed.
#[derive(Clone, Default)]
pub(crate) struct TransitionLog(Arc<Mutex<Vec<(String, String)>>>);

impl TransitionLog {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn transitions(&self) -> Vec<(String, String)> {
        self.0.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

impl<S: tracing::Subscriber> Layer<S> for TransitionLog {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = TransitionFields::default();
        event.record(&mut fields);
        if let (Some(from), Some(to)) = (fields.from, fields.to)
            && let Ok(mut log) = self.0.lock()
        {
            log.push((from, to));
        }
    }
}

#[derive(Default)]
struct TransitionFields {
    from: Option<String>,
    to: Option<String>,
}

impl Visit for TransitionFields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "from" => self.from = Some(format!("{value:?}")),
            "to" => self.to = Some(format!("{value:?}")),
            _ => {}
        }
    }
}

pub(crate) fn model_with_adapter(
    id: &str,
    max_context_tokens: u64,
    adapter: Arc<dyn ProviderAdapter>,
) -> ModelDescriptor {
    let endpoint = Url::parse(&format!("http://stub.test/{id}")).unwrap();
    ModelDescriptor::new(id, id, endpoint, max_context_tokens, adapter)
        .with_tokenizer(TokenizerKind::Heuristic)
}

pub(crate) fn stub_model(id: &str, max_context_tokens: u64) -> ModelDescriptor {
    model_with_adapter(id, max_context_tokens, Arc::new(StubAdapter::text()))
}
