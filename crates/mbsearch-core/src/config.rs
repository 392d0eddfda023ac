//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Cores live under `[cores.<name>]`; every core's entity type is checked at
//! load time so a misconfigured core never serves a query.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::types::{EntityType, DEFAULT_FIELD_LIST, SCORE_FIELD, STORE_FIELD};

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Load `config.toml` and its env overlay from `dir`.
    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file(dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: dir.to_path_buf() };
        config.validate()?;
        Ok(config)
    }

    /// Build a config from an inline TOML document; paths resolve against `base_dir`.
    pub fn from_toml_str(toml: &str, base_dir: &Path) -> anyhow::Result<Self> {
        let config = Self { figment: Figment::from(Toml::string(toml)), base_dir: base_dir.to_path_buf() };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn cores(&self) -> anyhow::Result<BTreeMap<String, CoreConfig>> {
        if !self.figment.contains("cores") {
            return Ok(BTreeMap::new());
        }
        self.get("cores")
    }

    pub fn core(&self, name: &str) -> anyhow::Result<CoreConfig> {
        self.cores()?
            .remove(name)
            .ok_or_else(|| Error::InvalidConfig(format!("no core named '{}' is configured", name)).into())
    }

    fn validate(&self) -> anyhow::Result<()> {
        for (name, core) in self.cores()? {
            core.writer.entity_type().map_err(|e| {
                Error::InvalidConfig(format!("core '{}': {}", name, e))
            })?;
            if core.writer.store_field.is_empty() || core.writer.score_field.is_empty() {
                return Err(Error::InvalidConfig(format!("core '{}': store and score field names must not be empty", name)).into());
            }
        }
        Ok(())
    }
}

/// Settings the response writer is constructed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterConfig {
    pub entity_type: String,
    #[serde(default = "default_store_field")]
    pub store_field: String,
    #[serde(default = "default_score_field")]
    pub score_field: String,
    #[serde(default = "default_field_list")]
    pub default_field_list: String,
}

impl WriterConfig {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            store_field: default_store_field(),
            score_field: default_score_field(),
            default_field_list: default_field_list(),
        }
    }

    pub fn entity_type(&self) -> crate::error::Result<EntityType> {
        self.entity_type.parse()
    }
}

fn default_store_field() -> String { STORE_FIELD.to_string() }
fn default_score_field() -> String { SCORE_FIELD.to_string() }
fn default_field_list() -> String { DEFAULT_FIELD_LIST.to_string() }

/// One `[cores.<name>]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    pub index_dir: String,
    #[serde(default)]
    pub payload_dir: Option<String>,
    /// Text fields indexed for querying, taken from the entity's attributes
    /// and direct child elements.
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(flatten)]
    pub writer: WriterConfig,
}

impl CoreConfig {
    pub fn index_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.index_dir)
    }

    pub fn payload_path(&self, base: &Path) -> Option<PathBuf> {
        self.payload_dir.as_ref().map(|p| resolve_with_base(base, p))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
