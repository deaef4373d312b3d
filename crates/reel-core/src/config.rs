//! Studio configuration
//!
//! ```toml
//! fallback_enabled = true
//! initial_scope = "toddlers"
//! reject_stale_completions = false
//! event_capacity = 64
//! script_fallback_limit = 10
//!
//! [agents]
//! hookLab = "my-hook-agent"
//! ```

use crate::compose::DEFAULT_SCRIPT_FALLBACK_LIMIT;
use crate::error::{ConfigError, StudioResult};
use crate::events::DEFAULT_EVENT_CAPACITY;
use reel_stages::{AgentId, BrandScope, StageId, StageRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Environment variable overriding [`StudioConfig::fallback_enabled`]
pub const FALLBACK_ENV: &str = "REEL_FALLBACK";

/// Studio configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Serve seed datasets for stages without a live result
    pub fallback_enabled: bool,
    /// Brand scope at startup
    pub initial_scope: BrandScope,
    /// Drop completions that are not the latest invocation of their stage
    pub reject_stale_completions: bool,
    /// Event channel buffer size
    pub event_capacity: usize,
    /// Hooks forwarded to scriptEngine when none are approved
    pub script_fallback_limit: usize,
    /// Agent overrides, keyed by stage id
    pub agents: BTreeMap<String, String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            fallback_enabled: false,
            initial_scope: BrandScope::All,
            reject_stale_completions: false,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            script_fallback_limit: DEFAULT_SCRIPT_FALLBACK_LIMIT,
            agents: BTreeMap::new(),
        }
    }
}

impl StudioConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With sample mode on or off
    #[inline]
    #[must_use]
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    /// With initial scope
    #[inline]
    #[must_use]
    pub fn with_scope(mut self, scope: BrandScope) -> Self {
        self.initial_scope = scope;
        self
    }

    /// With stale-completion fencing on or off
    #[inline]
    #[must_use]
    pub fn with_stale_rejection(mut self, enabled: bool) -> Self {
        self.reject_stale_completions = enabled;
        self
    }

    /// With event buffer size
    #[inline]
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// With scriptEngine fallback limit
    #[inline]
    #[must_use]
    pub fn with_script_fallback_limit(mut self, limit: usize) -> Self {
        self.script_fallback_limit = limit;
        self
    }

    /// With a stage bound to a different agent
    #[must_use]
    pub fn with_agent(mut self, stage: StageId, agent: impl Into<String>) -> Self {
        self.agents.insert(stage.as_str().to_string(), agent.into());
        self
    }

    /// Parse TOML
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown scope names.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, or a parse error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded studio config");
        Ok(config)
    }

    /// Apply environment overrides
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidEnv`] if `REEL_FALLBACK` is set to
    /// something other than a boolean.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_fallback_override(std::env::var(FALLBACK_ENV).ok().as_deref())
    }

    fn apply_fallback_override(mut self, value: Option<&str>) -> Result<Self, ConfigError> {
        let Some(value) = value else {
            return Ok(self);
        };
        self.fallback_enabled = match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                return Err(ConfigError::InvalidEnv {
                    var: FALLBACK_ENV,
                    value: value.to_string(),
                })
            }
        };
        Ok(self)
    }

    /// Configuration for a run: the file at `path` if given, else defaults,
    /// with environment overrides applied and agent overrides checked
    ///
    /// # Errors
    /// Returns [`crate::StudioError::Config`] for any of the failures of
    /// [`Self::load`], [`Self::apply_env`] or [`Self::registry`].
    pub fn resolve(path: Option<&Path>) -> StudioResult<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        let config = config.apply_env()?;
        config.registry()?;
        Ok(config)
    }

    /// Stage registry with agent overrides applied
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownStage`] for an override naming no stage.
    pub fn registry(&self) -> Result<StageRegistry, ConfigError> {
        let mut registry = StageRegistry::with_defaults();
        for (stage, agent) in &self.agents {
            let id: StageId = stage
                .parse()
                .map_err(|_| ConfigError::UnknownStage(stage.clone()))?;
            registry.set_agent(id, AgentId::new(agent.as_str()));
        }
        Ok(registry)
    }
}
