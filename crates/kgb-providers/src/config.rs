//! Tool configuration and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use kgb_core::cycle::{CycleConfig, DEFAULT_CYCLE_LENGTH_YEARS, DEFAULT_REVIEW_WINDOW_DAYS};
use kgb_core::import::ImportStrategy;
use kgb_core::traits::LlmProvider;

use crate::anthropic::AnthropicProvider;
use crate::openai::OpenAiProvider;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "kgb.toml";

/// Connection settings for one LLM provider.
///
/// `Debug` masks API keys.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                base_url, org_id, ..
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Anthropic { base_url, .. } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

impl ProviderConfig {
    fn expand_env(&self, lookup: &impl Fn(&str) -> Option<String>) -> ProviderConfig {
        let expand = |s: &String| resolve_env_vars(s, lookup);
        match self {
            ProviderConfig::OpenAI {
                api_key,
                base_url,
                org_id,
            } => ProviderConfig::OpenAI {
                api_key: expand(api_key),
                base_url: base_url.as_ref().map(expand),
                org_id: org_id.as_ref().map(expand),
            },
            ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
                api_key: expand(api_key),
                base_url: base_url.as_ref().map(expand),
            },
        }
    }
}

/// Top-level `kgb` configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KgbConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used by `kgb suggest` when none is given.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    /// Years between salary steps.
    #[serde(default = "default_cycle_length")]
    pub cycle_length_years: u32,
    /// How far ahead `kgb reviews` looks.
    #[serde(default = "default_review_window")]
    pub review_window_days: u32,
    /// Layout expected by `kgb import` for sheets.
    #[serde(default)]
    pub import_strategy: ImportStrategy,
    /// Directory holding the persisted record collection.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}
fn default_temperature() -> f64 {
    0.2
}
fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH_YEARS
}
fn default_review_window() -> u32 {
    DEFAULT_REVIEW_WINDOW_DAYS as u32
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./kgb-data")
}

impl Default for KgbConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            cycle_length_years: default_cycle_length(),
            review_window_days: default_review_window(),
            import_strategy: ImportStrategy::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl KgbConfig {
    pub fn cycle(&self) -> CycleConfig {
        CycleConfig::new(self.cycle_length_years)
    }

    pub fn review_window(&self) -> i64 {
        i64::from(self.review_window_days)
    }

    /// Reject settings the cycle math or providers cannot work with.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.cycle_length_years >= 1,
            "cycle_length_years must be at least 1"
        );
        anyhow::ensure!(
            (0.0..=2.0).contains(&self.default_temperature),
            "default_temperature must be between 0.0 and 2.0"
        );
        Ok(())
    }

    /// Look up a provider by name, or the default provider.
    pub fn provider(&self, name: Option<&str>) -> Result<(&str, &ProviderConfig)> {
        let name = name.unwrap_or(&self.default_provider);
        self.providers
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .with_context(|| {
                format!("provider '{name}' is not configured; add [providers.{name}] to {CONFIG_FILE_NAME}")
            })
    }
}

/// Replace `${VAR}` references using `lookup`. Unknown variables expand to
/// an empty string; an unterminated `${` is left as is.
fn resolve_env_vars(s: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&lookup(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from the default locations.
///
/// Search order:
/// 1. `kgb.toml` in the current directory
/// 2. `~/.config/kgb/config.toml`
///
/// Environment overrides: `KGB_OPENAI_KEY`, `KGB_ANTHROPIC_KEY`, `KGB_DATA_DIR`.
pub fn load_config() -> Result<KgbConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<KgbConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() {
                Some(local)
            } else {
                global_config_path().filter(|p| p.exists())
            }
        }
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => KgbConfig::default(),
    };

    let config = apply_env(config, |name| std::env::var(name).ok());
    config.validate()?;
    Ok(config)
}

/// Parse TOML config text.
pub fn parse_config(content: &str) -> Result<KgbConfig> {
    Ok(toml::from_str::<KgbConfig>(content)?)
}

/// Apply environment overrides and expand `${VAR}` references.
pub fn apply_env(mut config: KgbConfig, lookup: impl Fn(&str) -> Option<String>) -> KgbConfig {
    if let Some(key) = lookup("KGB_ANTHROPIC_KEY") {
        match config.providers.get_mut("anthropic") {
            Some(ProviderConfig::Anthropic { api_key, .. }) => *api_key = key,
            _ => {
                config.providers.insert(
                    "anthropic".into(),
                    ProviderConfig::Anthropic {
                        api_key: key,
                        base_url: None,
                    },
                );
            }
        }
    }

    if let Some(key) = lookup("KGB_OPENAI_KEY") {
        match config.providers.get_mut("openai") {
            Some(ProviderConfig::OpenAI { api_key, .. }) => *api_key = key,
            _ => {
                config.providers.insert(
                    "openai".into(),
                    ProviderConfig::OpenAI {
                        api_key: key,
                        base_url: None,
                        org_id: None,
                    },
                );
            }
        }
    }

    if let Some(dir) = lookup("KGB_DATA_DIR").filter(|d| !d.trim().is_empty()) {
        config.data_dir = PathBuf::from(dir);
    }

    config.providers = config
        .providers
        .iter()
        .map(|(name, provider)| (name.clone(), provider.expand_env(&lookup)))
        .collect();
    config
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|h| {
        PathBuf::from(h)
            .join(".config")
            .join("kgb")
            .join("config.toml")
    })
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    let provider: Box<dyn LlmProvider> = match config {
        ProviderConfig::Anthropic { api_key, base_url } => {
            Box::new(AnthropicProvider::new(api_key, base_url.clone())?)
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Box::new(OpenAiProvider::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
        )?),
    };
    tracing::debug!(name, provider = provider.name(), "provider created");
    Ok(provider)
}

/// Config written by `kgb init`.
pub const STARTER_CONFIG: &str = r#"# kgb configuration

default_provider = "openai"
default_model = "gpt-4.1-mini"
default_temperature = 0.2

# Years between salary steps, and how far ahead `kgb reviews` looks.
cycle_length_years = 2
review_window_days = 90

# auto, year-matrix or date-column
import_strategy = "auto"
data_dir = "./kgb-data"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"
"#;
