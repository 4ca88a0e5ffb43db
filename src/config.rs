//! Session configuration
//!
//! A [`SessionConfig`] is built either in code through
//! [`SessionConfig::builder`] or from TOML:
//!
//! ```toml
//! group = "waveforms"
//! index_template = "standard"   # preset name or custom template
//! policy = "warn"               # warn | raise | ignore | skip
//! ignore = ["processing"]
//! headonly = false
//! ```
//!
//! Template and policy strings are validated when the configuration is
//! built, so a bad value never reaches the file.

use crate::error::Result;
use crate::index::IndexTemplate;
use crate::writer::{CollisionPolicy, IgnoreSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Default data group
pub const DEFAULT_GROUP: &str = "waveforms";

/// Validated session settings
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Group all traces live under
    pub group: String,
    /// Template for files that have none stored yet
    pub index_template: IndexTemplate,
    /// Collision policy for writes
    pub policy: CollisionPolicy,
    /// Extra keys never stored
    pub ignore: IgnoreSet,
    /// Writes replace headers only; reads skip payloads
    pub headonly: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            group: DEFAULT_GROUP.to_string(),
            index_template: IndexTemplate::standard(),
            policy: CollisionPolicy::default(),
            ignore: IgnoreSet::default(),
            headonly: false,
        }
    }
}

impl SessionConfig {
    /// Start building a configuration
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let raw: SessionConfigBuilder = toml::from_str(s)?;
        raw.build()
    }

    /// Load a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading session configuration from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

/// Unvalidated settings, as written by a caller or found in TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfigBuilder {
    group: Option<String>,
    index_template: Option<String>,
    policy: Option<String>,
    ignore: Vec<String>,
    headonly: bool,
}

impl SessionConfigBuilder {
    /// Data group
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Preset name or custom template
    pub fn index_template(mut self, template: impl Into<String>) -> Self {
        self.index_template = Some(template.into());
        self
    }

    /// Collision policy name
    pub fn policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    /// Add a key that is never stored
    pub fn ignore(mut self, key: impl Into<String>) -> Self {
        self.ignore.push(key.into());
        self
    }

    /// Header-only mode
    pub fn headonly(mut self, headonly: bool) -> Self {
        self.headonly = headonly;
        self
    }

    /// Validate and produce the configuration
    pub fn build(self) -> Result<SessionConfig> {
        let index_template = match self.index_template.as_deref() {
            Some(t) => IndexTemplate::resolve(t)?,
            None => IndexTemplate::standard(),
        };
        let policy = match self.policy.as_deref() {
            Some(p) => p.parse()?,
            None => CollisionPolicy::default(),
        };
        Ok(SessionConfig {
            group: self.group.unwrap_or_else(|| DEFAULT_GROUP.to_string()),
            index_template,
            policy,
            ignore: IgnoreSet::new(self.ignore),
            headonly: self.headonly,
        })
    }
}
