//! Render defaults shared by every query built from one configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default alias prefix for projected sort keys.
pub const DEFAULT_SORT_ALIAS_PREFIX: &str = "__sort_";

/// Render defaults applied through [`crate::query::Query::with_config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// `TIMEOUT` used when a query sets none.
    #[serde(with = "duration_text", skip_serializing_if = "Option::is_none")]
    pub default_timeout: Option<Duration>,
    /// Emit `PARALLEL` on every non-live query.
    pub default_parallel: bool,
    /// Ceiling applied to explicit `LIMIT` values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_limit: Option<u64>,
    /// Prefix for generated sort aliases.
    pub sort_alias_prefix: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            default_timeout: None,
            default_parallel: false,
            max_limit: None,
            sort_alias_prefix: DEFAULT_SORT_ALIAS_PREFIX.to_owned(),
        }
    }
}

impl CompilerConfig {
    /// Bounded profile for multi-tenant services: every statement carries a
    /// timeout and result sets are capped.
    pub fn strict() -> Self {
        Self {
            default_timeout: Some(Duration::from_secs(5)),
            default_parallel: false,
            max_limit: Some(1_000),
            sort_alias_prefix: DEFAULT_SORT_ALIAS_PREFIX.to_owned(),
        }
    }

    /// Parses TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a TOML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Writes the configuration to `path` as TOML.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let text = self.to_toml_string()?;
        fs::write(path, text).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.max_limit == Some(0) {
            return Err(Error::InvalidArgument("max_limit must be positive".into()));
        }
        let prefix = &self.sort_alias_prefix;
        let valid_ident = !prefix.is_empty()
            && !prefix.starts_with(|c: char| c.is_ascii_digit())
            && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_ident {
            return Err(Error::InvalidArgument(format!(
                "sort_alias_prefix '{prefix}' is not a valid identifier"
            )));
        }
        Ok(())
    }
}

/// `Option<Duration>` as human-readable text (`"5s"`, `"250ms"`).
mod duration_text {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::query::value::format_duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_str(&format_duration(*duration)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = Option::<String>::deserialize(deserializer)?;
        text.map(|t| parse(&t).map_err(de::Error::custom)).transpose()
    }

    pub fn parse(text: &str) -> Result<Duration, String> {
        let mut total = Duration::ZERO;
        let mut rest = text.trim();
        if rest.is_empty() {
            return Err("empty duration".into());
        }
        while !rest.is_empty() {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            if digits == 0 {
                return Err(format!("invalid duration '{text}'"));
            }
            let count: u64 = rest[..digits]
                .parse()
                .map_err(|err| format!("invalid duration '{text}': {err}"))?;
            rest = &rest[digits..];
            let unit_len = rest
                .bytes()
                .take_while(|b| b.is_ascii_alphabetic())
                .count();
            let unit = &rest[..unit_len];
            rest = &rest[unit_len..];
            let step = match unit {
                "d" => Duration::from_secs(count.saturating_mul(86_400)),
                "h" => Duration::from_secs(count.saturating_mul(3_600)),
                "m" => Duration::from_secs(count.saturating_mul(60)),
                "s" => Duration::from_secs(count),
                "ms" => Duration::from_millis(count),
                "us" => Duration::from_micros(count),
                "ns" => Duration::from_nanos(count),
                other => return Err(format!("unknown duration unit '{other}' in '{text}'")),
            };
            total = total.saturating_add(step);
        }
        Ok(total)
    }
}
