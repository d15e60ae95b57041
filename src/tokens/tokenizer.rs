//! Model-specific tokenizers.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tiktoken_rs::CoreBPE;

use crate::{Error, Result};

/// Which tokenizer a model's context budget is measured in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    #[default]
    Cl100kBase,
    O200kBase,
    /// Byte-length estimate for models without a published vocabulary.
    Heuristic,
}

/// Longest slice handed to the BPE encoder in one call.
///
/// The encoder's pre-tokenizer backtracks over runs of a single character
/// class, so both its stack depth and its running time grow with the run
/// length. Bounding each call keeps counting linear in the input.
pub const MAX_ENCODE_CHUNK: usize = 512;

pub trait Tokenizer: Send + Sync {
    fn name(&self) -> &'static str;

    fn count(&self, text: &str) -> Result<usize>;
}

pub struct BpeTokenizer {
    name: &'static str,
    bpe: Arc<CoreBPE>,
}

impl std::fmt::Debug for BpeTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BpeTokenizer")
            .field("name", &self.name)
            .finish()
    }
}

impl Tokenizer for BpeTokenizer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn count(&self, text: &str) -> Result<usize> {
        chunks(text, MAX_ENCODE_CHUNK).try_fold(0, |total, chunk| {
            panic::catch_unwind(AssertUnwindSafe(|| {
                self.bpe.encode_with_special_tokens(chunk).len()
            }))
            .map(|n| total + n)
            .map_err(|_| {
                Error::Tokenizer(format!(
                    "{} could not encode a {}-byte chunk",
                    self.name,
                    chunk.len()
                ))
            })
        })
    }
}

/// Splits `text` into slices of at most `max` bytes, preferring to cut just
/// after a newline so ordinary source lines stay whole.
fn chunks(text: &str, max: usize) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let (chunk, tail) = rest.split_at(split_point(rest, max));
        rest = tail;
        Some(chunk)
    })
}

fn split_point(text: &str, max: usize) -> usize {
    if text.len() <= max {
        return text.len();
    }

    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    match text[..end].rfind('\n') {
        Some(newline) if newline + 1 > end / 2 => newline + 1,
        _ => end,
    }
}

/// Roughly four bytes per token, plus a 10% margin for special tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenizer;

const BYTES_PER_TOKEN: usize = 4;

impl Tokenizer for HeuristicTokenizer {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn count(&self, text: &str) -> Result<usize> {
        let base = text.len().div_ceil(BYTES_PER_TOKEN);
        Ok(base + base / 10)
    }
}

type SharedBpe = std::result::Result<Arc<CoreBPE>, String>;

static CL100K: OnceLock<SharedBpe> = OnceLock::new();
static O200K: OnceLock<SharedBpe> = OnceLock::new();

fn load(cell: &'static OnceLock<SharedBpe>, init: fn() -> SharedBpe) -> Result<Arc<CoreBPE>> {
    cell.get_or_init(init).clone().map_err(Error::Tokenizer)
}

/// Resolves the tokenizer for `kind`. BPE tables are loaded once per process.
pub fn tokenizer_for(kind: TokenizerKind) -> Result<Arc<dyn Tokenizer>> {
    match kind {
        TokenizerKind::Cl100kBase => {
            let bpe = load(&CL100K, || {
                tiktoken_rs::cl100k_base()
                    .map(Arc::new)
                    .map_err(|e| e.to_string())
            })?;
            Ok(Arc::new(BpeTokenizer {
                name: "cl100k_base",
                bpe,
            }))
        }
        TokenizerKind::O200kBase => {
            let bpe = load(&O200K, || {
                tiktoken_rs::o200k_base()
                    .map(Arc::new)
                    .map_err(|e| e.to_string())
            })?;
            Ok(Arc::new(BpeTokenizer {
                name: "o200k_base",
                bpe,
            }))
        }
        TokenizerKind::Heuristic => Ok(Arc::new(HeuristicTokenizer)),
    }
}
