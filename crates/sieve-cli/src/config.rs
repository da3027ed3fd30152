use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use sieve_merge::{CompositeMerger, MergeConfig};
use sieve_wire::ScalarTypeRegistry;

/// On-disk configuration for the `sieve` binary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SieveConfig {
    pub merge: MergeConfig,
    /// Extra scalar type names that reuse a built-in codec.
    #[serde(rename = "scalar_alias")]
    pub scalar_aliases: Vec<ScalarAlias>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarAlias {
    pub name: String,
    pub base: String,
}

impl SieveConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        let config: Self =
            toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            aliases = config.scalar_aliases.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// The built-in scalar types plus the configured aliases.
    pub fn registry(&self) -> anyhow::Result<ScalarTypeRegistry> {
        let mut registry = ScalarTypeRegistry::with_builtins();
        for alias in &self.scalar_aliases {
            registry
                .alias(alias.name.as_str(), &alias.base)
                .with_context(|| format!("scalar alias '{}'", alias.name))?;
        }
        Ok(registry)
    }

    /// A merger comparing literals through `registry`.
    pub fn merger(&self, registry: Arc<ScalarTypeRegistry>) -> CompositeMerger {
        CompositeMerger::new(self.merge).with_scalars(registry)
    }
}
