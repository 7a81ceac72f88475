//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use cli::LoadArgs;
pub use types::{Amount, HttpMethod, PositiveU64, PositiveUsize, TargetPreset, TaskKind};

pub(crate) use defaults::DEFAULT_USER_AGENT;
