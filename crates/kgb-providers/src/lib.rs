//! kgb-providers: LLM provider integrations and tool configuration.
//!
//! Implements the `LlmProvider` trait for OpenAI-compatible and Anthropic
//! APIs, plus a scripted mock, and loads the `kgb` TOML configuration.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, load_config_from, KgbConfig, ProviderConfig};
pub use error::ProviderError;
