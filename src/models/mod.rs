//! Model descriptors and the registry that owns them.

mod builtin;
mod registry;
mod spec;

pub use builtin::{CLAUDE_3_5_SONNET, DALL_E_3, DEFAULT_MODEL, GPT_4_TURBO};
pub use registry::{ModelRegistry, ModelRegistryBuilder};
pub use spec::ModelDescriptor;

#[cfg(test)]
pub(crate) mod test_support;
