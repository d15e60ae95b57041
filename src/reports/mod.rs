//! Report generation from sample templates.

mod fetcher;
mod kind;

pub use fetcher::{FileFetcher, HttpFileFetcher};
pub use kind::{REPORT_DATASET_BASE_URL, ReportKind};

/// Builds the prompt asking the model to write a `kind` report modelled on
/// `sample`.
pub fn report_prompt(kind: ReportKind, sample: &str, extra_instructions: &str) -> String {
    let mut prompt = format!(
        "Write a {kind} report for my solidity codebase. \
         Follow the structure and tone of the sample report in triple quotes, \
         but base every finding on my code: '''{sample}'''"
    );

    let extra = extra_instructions.trim();
    if !extra.is_empty() {
        prompt.push_str("\n\nAdditional instructions: ");
        prompt.push_str(extra);
    }
    prompt
}
