mod estimator;
mod tokenizer;

pub use estimator::{
    DEFAULT_WARNING_THRESHOLD, PreflightResult, REPLY_PRIMING_TOKENS, TOKENS_PER_MESSAGE,
    TokenEstimator,
};
pub use tokenizer::{BpeTokenizer, HeuristicTokenizer, Tokenizer, TokenizerKind, tokenizer_for};
