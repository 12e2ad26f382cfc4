//! Formally MAD configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::resolver::{ResolveError, ResolverConfig, Roster, RosterEntry};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Proposal resolver settings
    pub resolver: ResolverConfig,

    /// Worker agents and their credibility
    pub workers: Vec<WorkerConfig>,

    /// Debate loop settings
    pub debate: DebateConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            resolver: ResolverConfig::default(),
            workers: default_workers(),
            debate: DebateConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration before talking to a model
    ///
    /// Fails fast when the API key variable is missing or the worker roster
    /// is unusable.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        if self.workers.is_empty() {
            return Err(eyre::eyre!("At least one worker must be configured"));
        }
        self.roster().context("Invalid worker roster")?;
        Ok(())
    }

    /// Proposer roster built from the configured workers
    pub fn roster(&self) -> std::result::Result<Roster, ResolveError> {
        Roster::new(
            self.workers
                .iter()
                .map(|w| RosterEntry::new(w.id.clone(), w.strength))
                .collect(),
        )
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .formallymad.yml
        let local_config = PathBuf::from(".formallymad.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/formallymad/formallymad.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("formallymad").join("formallymad.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-5".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 2000,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).context(format!("Environment variable {} is not set", self.api_key_env))
    }
}

/// One worker agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Proposer identity, unique within the roster
    pub id: String,

    /// Credibility used as the proposer's initial strength
    pub strength: f64,

    /// Extra instructions appended to the worker prompt
    #[serde(rename = "extra-prompt", default)]
    pub extra_prompt: Option<String>,
}

fn default_workers() -> Vec<WorkerConfig> {
    vec![
        WorkerConfig {
            id: "A1".to_string(),
            strength: 0.1,
            extra_prompt: Some("Please do not use any tool to list files.".to_string()),
        },
        WorkerConfig {
            id: "A2".to_string(),
            strength: 0.9,
            extra_prompt: Some("Read as few files as possible, this is expensive. At most one or two.".to_string()),
        },
        WorkerConfig {
            id: "A3".to_string(),
            strength: 0.2,
            extra_prompt: None,
        },
    ]
}

/// Debate loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateConfig {
    /// Tool rounds per user turn before the coordinator must answer
    #[serde(rename = "max-rounds")]
    pub max_rounds: u32,

    /// Concurrent proposal requests (0 = one slot per worker)
    #[serde(rename = "proposal-concurrency")]
    pub proposal_concurrency: usize,

    /// Keep tool file access inside the working directory
    pub sandbox: bool,

    /// Write each round's argument graph to this Graphviz DOT file
    #[serde(rename = "graph-file", skip_serializing_if = "Option::is_none")]
    pub graph_file: Option<PathBuf>,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            max_rounds: 8,
            proposal_concurrency: 0,
            sandbox: true,
            graph_file: None,
        }
    }
}
