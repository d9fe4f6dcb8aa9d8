//! Orchestrator configuration.
//!
//! Loaded from a TOML file, then overridden by environment variables:
//!
//! ```toml
//! [engine]
//! endpoint = "https://my-resource.openai.azure.com"
//! deployment = "gpt-4o"
//! api_version = "2024-06-01"
//! temperature = 0.0
//! max_iterations = 10
//!
//! [transport]
//! request_timeout_secs = 30
//! handshake_timeout_secs = 10
//! shutdown_grace_ms = 2000
//!
//! [[providers]]
//! name = "math"
//! command = "switchboard-provider"
//! args = ["math"]
//! ```
//!
//! Without a `[[providers]]` section every standard toolset is launched from
//! the `switchboard-provider` binary next to the running executable.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use switchboard_core::{IdValidationError, ProviderId};
use switchboard_protocol::ChannelConfig;
use switchboard_tools::Toolset;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "SWITCHBOARD_CONFIG";
/// File read from the working directory when `SWITCHBOARD_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "switchboard.toml";
pub const DEFAULT_API_VERSION: &str = "2024-06-01";
pub const PROVIDER_BINARY: &str = "switchboard-provider";

pub const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const ENV_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";
pub const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
pub const ENV_REQUEST_TIMEOUT: &str = "SWITCHBOARD_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    #[error("no providers configured")]
    NoProviders,

    #[error("provider name '{name}' is invalid: {source}")]
    InvalidProviderName {
        name: String,
        #[source]
        source: IdValidationError,
    },

    #[error("provider '{0}' is configured more than once")]
    DuplicateProvider(String),

    #[error("provider '{0}' has an empty command")]
    EmptyCommand(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("engine.{setting} is not set (use {env} or the config file)")]
    MissingEngineSetting {
        setting: &'static str,
        env: &'static str,
    },

    #[error("engine.endpoint '{0}' is not a valid URL")]
    InvalidEndpoint(String),
}

/// Credential for the reasoning engine. Never printed, zeroed on drop.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Azure OpenAI resource URL, e.g. `https://name.openai.azure.com`
    pub endpoint: Option<String>,
    pub deployment: Option<String>,
    pub api_version: String,
    pub api_key: Option<ApiKey>,
    pub temperature: f32,
    /// Upper bound on engine round-trips per query
    pub max_iterations: usize,
    pub system_prompt: Option<String>,
    /// HTTP timeout for one completion request
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            deployment: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            api_key: None,
            temperature: 0.0,
            max_iterations: 10,
            system_prompt: None,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub request_timeout_secs: u64,
    pub handshake_timeout_secs: u64,
    pub shutdown_grace_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            handshake_timeout_secs: 10,
            shutdown_grace_ms: 2000,
        }
    }
}

impl TransportConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            request_timeout: self.request_timeout(),
            handshake_timeout: self.handshake_timeout(),
        }
    }
}

/// How to launch one provider process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// The standard provider binary serving `toolset`
    pub fn for_toolset(toolset: Toolset) -> Self {
        Self::new(toolset.name(), provider_binary().to_string_lossy()).with_args([toolset.name()])
    }
}

/// Location of `switchboard-provider`: next to the running executable when
/// present there, otherwise looked up on `PATH`.
pub fn provider_binary() -> PathBuf {
    let file_name = format!("{PROVIDER_BINARY}{}", std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(file_name))
}

pub fn default_providers() -> Vec<ProviderConfig> {
    Toolset::all()
        .iter()
        .map(|toolset| ProviderConfig::for_toolset(*toolset))
        .collect()
}

/// Everything the orchestrator needs, handed over explicitly at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SwitchboardConfig {
    pub engine: EngineConfig,
    pub transport: TransportConfig,
    pub providers: Vec<ProviderConfig>,
}

impl Default for SwitchboardConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            transport: TransportConfig::default(),
            providers: default_providers(),
        }
    }
}

impl SwitchboardConfig {
    /// Load from the process environment and validate.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|var| std::env::var(var).ok())
    }

    /// Load using `env` to look up variables, then validate.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match env(CONFIG_ENV) {
            Some(path) => Self::load_from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load_from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_from_toml(&content)
    }

    pub fn load_from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply the `AZURE_OPENAI_*` and `SWITCHBOARD_*` overrides
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let set = |var: &str| env(var).filter(|value| !value.trim().is_empty());

        if let Some(endpoint) = set(ENV_ENDPOINT) {
            self.engine.endpoint = Some(endpoint);
        }
        if let Some(key) = set(ENV_API_KEY) {
            self.engine.api_key = Some(ApiKey::new(key));
        }
        if let Some(deployment) = set(ENV_DEPLOYMENT) {
            self.engine.deployment = Some(deployment);
        }
        if let Some(version) = set(ENV_API_VERSION) {
            self.engine.api_version = version;
        }
        if let Some(value) = set(ENV_REQUEST_TIMEOUT) {
            self.transport.request_timeout_secs =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnv {
                        var: ENV_REQUEST_TIMEOUT,
                        value,
                    })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_providers()?;
        self.validate_transport()?;
        self.validate_engine()
    }

    /// Provider ids in configuration order. Fails on the first invalid,
    /// duplicated or commandless entry.
    pub fn validate_providers(&self) -> Result<Vec<ProviderId>, ConfigError> {
        if self.providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }
        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            let id = ProviderId::parse(&provider.name).map_err(|source| {
                ConfigError::InvalidProviderName {
                    name: provider.name.clone(),
                    source,
                }
            })?;
            if !seen.insert(id.clone()) {
                return Err(ConfigError::DuplicateProvider(provider.name.clone()));
            }
            if provider.command.trim().is_empty() {
                return Err(ConfigError::EmptyCommand(provider.name.clone()));
            }
            ids.push(id);
        }
        Ok(ids)
    }

    fn validate_transport(&self) -> Result<(), ConfigError> {
        let transport = &self.transport;
        if transport.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroValue("transport.request_timeout_secs"));
        }
        if transport.handshake_timeout_secs == 0 {
            return Err(ConfigError::ZeroValue("transport.handshake_timeout_secs"));
        }
        if self.engine.max_iterations == 0 {
            return Err(ConfigError::ZeroValue("engine.max_iterations"));
        }
        if self.engine.timeout_secs == 0 {
            return Err(ConfigError::ZeroValue("engine.timeout_secs"));
        }
        Ok(())
    }

    fn validate_engine(&self) -> Result<(), ConfigError> {
        let engine = &self.engine;
        let endpoint = engine
            .endpoint
            .as_deref()
            .ok_or(ConfigError::MissingEngineSetting {
                setting: "endpoint",
                env: ENV_ENDPOINT,
            })?;
        if reqwest::Url::parse(endpoint).is_err() {
            return Err(ConfigError::InvalidEndpoint(endpoint.to_string()));
        }
        if engine.deployment.is_none() {
            return Err(ConfigError::MissingEngineSetting {
                setting: "deployment",
                env: ENV_DEPLOYMENT,
            });
        }
        if engine.api_key.is_none() {
            return Err(ConfigError::MissingEngineSetting {
                setting: "api_key",
                env: ENV_API_KEY,
            });
        }
        Ok(())
    }
}
