//! Pre-flight context budgeting.

use super::tokenizer::{Tokenizer, tokenizer_for};
use crate::models::ModelDescriptor;
use crate::types::ApiMessage;
use crate::{Error, Result};

/// Default warning threshold for context utilization (80%)
pub const DEFAULT_WARNING_THRESHOLD: f64 = 0.80;

/// Role and delimiter tokens every chat message carries.
pub const TOKENS_PER_MESSAGE: u64 = 4;

/// Tokens the provider spends priming the reply.
pub const REPLY_PRIMING_TOKENS: u64 = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum PreflightResult {
    Ok {
        estimated_tokens: u64,
        remaining: u64,
    },
    Warning {
        estimated_tokens: u64,
        utilization: f64,
    },
    Exceeded {
        estimated_tokens: u64,
        limit: u64,
        overage: u64,
    },
}

impl PreflightResult {
    pub fn should_proceed(&self) -> bool {
        !matches!(self, Self::Exceeded { .. })
    }

    pub fn estimated_tokens(&self) -> u64 {
        match self {
            Self::Ok {
                estimated_tokens, ..
            }
            | Self::Warning {
                estimated_tokens, ..
            }
            | Self::Exceeded {
                estimated_tokens, ..
            } => *estimated_tokens,
        }
    }
}

/// Counts the context cost of a message list for a given model.
///
/// Counts are deterministic and monotonic: appending a message never lowers
/// the total, since every message adds at least its framing overhead.
#[derive(Debug, Clone, Copy)]
pub struct TokenEstimator {
    warning_threshold: f64,
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenEstimator {
    pub fn new() -> Self {
        Self {
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
        }
    }

    pub fn warning_threshold(mut self, threshold: f64) -> Self {
        self.warning_threshold = threshold;
        self
    }

    pub fn estimate(&self, messages: &[ApiMessage], tokenizer: &dyn Tokenizer) -> Result<u64> {
        if messages.is_empty() {
            return Ok(0);
        }

        messages.iter().try_fold(REPLY_PRIMING_TOKENS, |total, m| {
            Ok(total + tokenizer.count(&m.content)? as u64 + TOKENS_PER_MESSAGE)
        })
    }

    pub fn estimate_for(&self, messages: &[ApiMessage], model: &ModelDescriptor) -> Result<u64> {
        let tokenizer = tokenizer_for(model.tokenizer)?;
        self.estimate(messages, tokenizer.as_ref())
    }

    pub fn check_budget(
        &self,
        messages: &[ApiMessage],
        model: &ModelDescriptor,
    ) -> Result<PreflightResult> {
        let estimated_tokens = self.estimate_for(messages, model)?;
        let limit = model.max_context_tokens;

        if estimated_tokens > limit {
            return Ok(PreflightResult::Exceeded {
                estimated_tokens,
                limit,
                overage: estimated_tokens - limit,
            });
        }

        let utilization = if limit == 0 {
            0.0
        } else {
            estimated_tokens as f64 / limit as f64
        };

        if utilization >= self.warning_threshold {
            Ok(PreflightResult::Warning {
                estimated_tokens,
                utilization,
            })
        } else {
            Ok(PreflightResult::Ok {
                estimated_tokens,
                remaining: limit - estimated_tokens,
            })
        }
    }

    /// Like [`check_budget`](Self::check_budget), but an over-budget list is an error.
    pub fn ensure_within_budget(
        &self,
        messages: &[ApiMessage],
        model: &ModelDescriptor,
    ) -> Result<u64> {
        match self.check_budget(messages, model)? {
            PreflightResult::Exceeded {
                estimated_tokens,
                limit,
                ..
            } => Err(Error::BudgetExceeded {
                model: model.id.clone(),
                estimated: estimated_tokens,
                limit,
            }),
            PreflightResult::Warning {
                estimated_tokens,
                utilization,
            } => {
                tracing::warn!(
                    model = %model.id,
                    estimated = estimated_tokens,
                    utilization,
                    "context budget nearly exhausted"
                );
                Ok(estimated_tokens)
            }
            PreflightResult::Ok {
                estimated_tokens, ..
            } => Ok(estimated_tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::stub_model;
    use crate::tokens::{HeuristicTokenizer, TokenizerKind};
    use crate::types::Role;

    fn msg(role: Role, content: &str) -> ApiMessage {
        ApiMessage::new(role, content)
    }

    #[test]
    fn test_estimate_empty() {
        assert_eq!(
            TokenEstimator::new()
                .estimate(&[], &HeuristicTokenizer)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_estimate_counts_framing() {
        let estimator = TokenEstimator::new();
        let tokens = estimator
            .estimate(&[msg(Role::User, "")], &HeuristicTokenizer)
            .unwrap();
        assert_eq!(tokens, TOKENS_PER_MESSAGE + REPLY_PRIMING_TOKENS);
    }

    #[test]
    fn test_estimate_is_monotonic() {
        let estimator = TokenEstimator::new();
        let contents = ["", "a", "hello there", &"x".repeat(1000), ""];
        let mut messages = Vec::new();
        let mut previous = estimator.estimate(&messages, &HeuristicTokenizer).unwrap();

        for (i, content) in contents.iter().enumerate() {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            messages.push(msg(role, content));
            let current = estimator.estimate(&messages, &HeuristicTokenizer).unwrap();
            assert!(current >= previous, "{current} < {previous} after {i}");
            previous = current;
        }
    }

    #[test]
    fn test_estimate_is_deterministic_with_bpe() {
        let estimator = TokenEstimator::new();
        let model = stub_model("m", 1_000).with_tokenizer(TokenizerKind::Cl100kBase);
        let messages = vec![msg(Role::User, "function transfer(address to) external")];
        let a = estimator.estimate_for(&messages, &model).unwrap();
        let b = estimator.estimate_for(&messages, &model).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_check_budget_tiers() {
        let estimator = TokenEstimator::new();
        let model = stub_model("m", 100);

        let small = vec![msg(Role::User, "hi")];
        assert!(matches!(
            estimator.check_budget(&small, &model).unwrap(),
            PreflightResult::Ok { .. }
        ));

        // 300 bytes -> 75 + 7 = 82 content tokens, + 4 framing + 3 priming = 89
        let near = vec![msg(Role::User, &"a".repeat(300))];
        assert!(matches!(
            estimator.check_budget(&near, &model).unwrap(),
            PreflightResult::Warning { .. }
        ));

        let over = vec![msg(Role::User, &"a".repeat(1_000))];
        let result = estimator.check_budget(&over, &model).unwrap();
        assert!(!result.should_proceed());
        assert!(result.estimated_tokens() > 100);
    }

    #[test]
    fn test_ensure_within_budget_error() {
        let estimator = TokenEstimator::new();
        let model = stub_model("tiny", 10);
        let err = estimator
            .ensure_within_budget(&[msg(Role::User, &"a".repeat(200))], &model)
            .unwrap_err();
        match err {
            Error::BudgetExceeded {
                model,
                estimated,
                limit,
            } => {
                assert_eq!(model, "tiny");
                assert_eq!(limit, 10);
                assert!(estimated > limit);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    struct RejectingTokenizer;

    impl Tokenizer for RejectingTokenizer {
        fn name(&self) -> &'static str {
            "rejecting"
        }

        fn count(&self, _text: &str) -> Result<usize> {
            Err(Error::Tokenizer("cannot encode".into()))
        }
    }

    #[test]
    fn test_tokenizer_failure_is_an_error() {
        let err = TokenEstimator::new()
            .estimate(&[msg(Role::User, "hi")], &RejectingTokenizer)
            .unwrap_err();
        assert!(matches!(err, Error::Tokenizer(_)));
    }

    #[test]
    fn test_long_run_within_large_budget() {
        let model = stub_model("wide", 1_048_576).with_tokenizer(TokenizerKind::Cl100kBase);
        let estimated = TokenEstimator::new()
            .ensure_within_budget(&[msg(Role::User, &"a".repeat(1_000_000))], &model)
            .unwrap();
        assert!(estimated < 1_048_576);
    }
}
