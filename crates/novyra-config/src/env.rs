// crates/novyra-config/src/env.rs
// ============================================================================
// Module: Environment Sources
// Description: Layered capture of contract variables from env and dotenv.
// Purpose: Produce a deterministic, size-bounded snapshot of operator input.
// Dependencies: dotenvy, serde_json
// ============================================================================

//! ## Overview
//! An [`EnvSnapshot`] holds the raw string of every contract variable that was
//! found in a stack of [`EnvSource`] layers. The first layer that defines a key
//! wins, so placing [`ProcessEnv`] before a [`DotenvFile`] reproduces dotenv
//! semantics: a `.env` file never overrides the real environment.
//!
//! Keys outside [`ENV_CONTRACT`](crate::ENV_CONTRACT) are never captured.
//!
//! ## Invariants
//! - Capture never mutates the process environment.
//! - Values above [`MAX_ENV_VALUE_BYTES`] fail closed.
//! - [`EnvSnapshot::to_dotenv`] reads back identically through `dotenvy`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::contract::ENV_CONTRACT;
use crate::contract::contract_var;
use crate::error::ConfigError;
use crate::secret::REDACTED;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum bytes accepted for a single environment value.
pub const MAX_ENV_VALUE_BYTES: usize = 64 * 1024;
/// Maximum size of a dotenv file in bytes.
pub const MAX_DOTENV_FILE_BYTES: u64 = 1024 * 1024;
/// Default dotenv filename looked up in the project directory.
pub const DEFAULT_DOTENV_NAME: &str = ".env";

// ============================================================================
// SECTION: Sources
// ============================================================================

/// Where a captured value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvOrigin {
    /// Process environment (platform secret store at runtime).
    Process,
    /// Local dotenv file.
    #[serde(rename = "dotenv")]
    DotenvFile,
    /// Explicit in-memory override.
    Override,
}

impl EnvOrigin {
    /// Returns the stable label used in output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::DotenvFile => "dotenv",
            Self::Override => "override",
        }
    }
}

/// A layer that can resolve environment variables.
pub trait EnvSource {
    /// Returns the raw value of `key`, if defined by this layer.
    fn var(&self, key: &str) -> Option<String>;

    /// Returns the origin label for values from this layer.
    fn origin(&self) -> EnvOrigin;
}

/// Reads from the live process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn origin(&self) -> EnvOrigin {
        EnvOrigin::Process
    }
}

/// In-memory variable map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    /// Variable values by name.
    values: BTreeMap<String, String>,
}

impl MapEnv {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(key, value)| (key.into(), value.into())).collect(),
        }
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn origin(&self) -> EnvOrigin {
        EnvOrigin::Override
    }
}

/// Parsed dotenv file.
///
/// # Invariants
/// - When a key repeats, the first definition wins (as `dotenvy` loading does).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotenvFile {
    /// Source path.
    path: PathBuf,
    /// Parsed values by name.
    values: BTreeMap<String, String>,
}

impl DotenvFile {
    /// Parses the dotenv file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read or is too large,
    /// and [`ConfigError::Parse`] when a line is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_DOTENV_FILE_BYTES {
            return Err(ConfigError::Io(format!(
                "dotenv file {} exceeds size limit",
                path.display()
            )));
        }
        let iter = dotenvy::from_path_iter(path).map_err(dotenv_error)?;
        let mut values = BTreeMap::new();
        for item in iter {
            let (key, value) = item.map_err(dotenv_error)?;
            values.entry(key).or_insert(value);
        }
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    /// Parses `path` when it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an existing file cannot be parsed.
    pub fn load_optional(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.is_file() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Returns the source path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of parsed variables (including non-contract keys).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the file defined no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl EnvSource for DotenvFile {
    fn var(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn origin(&self) -> EnvOrigin {
        EnvOrigin::DotenvFile
    }
}

/// Maps `dotenvy` failures without echoing line contents, which may hold secrets.
fn dotenv_error(err: dotenvy::Error) -> ConfigError {
    match err {
        dotenvy::Error::LineParse(_, index) => {
            ConfigError::Parse(format!("malformed dotenv line (at character {index})"))
        }
        dotenvy::Error::Io(err) => ConfigError::Io(err.to_string()),
        other => ConfigError::Parse(other.to_string()),
    }
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// A captured contract value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    /// Raw value, untransformed.
    pub value: String,
    /// Layer that supplied the value.
    pub origin: EnvOrigin,
}

/// Raw contract values captured at process start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    /// Captured entries keyed by contract name.
    entries: BTreeMap<&'static str, EnvEntry>,
}

impl EnvSnapshot {
    /// Captures every contract variable from `layers`; the first layer wins.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value exceeds the size limit.
    pub fn capture(layers: &[&dyn EnvSource]) -> Result<Self, ConfigError> {
        let mut entries = BTreeMap::new();
        for spec in ENV_CONTRACT {
            let found = layers
                .iter()
                .find_map(|layer| layer.var(spec.name).map(|value| (value, layer.origin())));
            if let Some((value, origin)) = found {
                check_value_size(spec.name, &value)?;
                entries.insert(spec.name, EnvEntry {
                    value,
                    origin,
                });
            }
        }
        Ok(Self {
            entries,
        })
    }

    /// Builds a snapshot from explicit pairs; unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value exceeds the size limit.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = MapEnv::from_pairs(pairs);
        Self::capture(&[&map])
    }

    /// Returns the raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|entry| entry.value.as_str())
    }

    /// Returns the raw value of `key` when it is not blank.
    #[must_use]
    pub fn get_nonblank(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.trim().is_empty())
    }

    /// Returns the layer that supplied `key`.
    #[must_use]
    pub fn origin(&self, key: &str) -> Option<EnvOrigin> {
        self.entries.get(key).map(|entry| entry.origin)
    }

    /// Returns true when `key` was captured (blank values count).
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of captured variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates captured entries in contract order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &EnvEntry)> {
        ENV_CONTRACT
            .iter()
            .filter_map(|spec| self.entries.get(spec.name).map(|entry| (spec.name, entry)))
    }

    /// Returns a copy with every secret value replaced by a placeholder.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(key, entry)| {
                let secret = contract_var(key).is_some_and(|spec| spec.secret);
                let value = if secret && !entry.value.is_empty() {
                    REDACTED.to_string()
                } else {
                    entry.value.clone()
                };
                (*key, EnvEntry {
                    value,
                    origin: entry.origin,
                })
            })
            .collect();
        Self {
            entries,
        }
    }

    /// Renders the snapshot as a dotenv document in contract order.
    #[must_use]
    pub fn to_dotenv(&self) -> String {
        let mut out = String::new();
        for (key, entry) in self.iter() {
            let _ = writeln!(out, "{key}={}", quote_dotenv_value(&entry.value));
        }
        out
    }

    /// Renders the snapshot as a JSON object in contract order.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, entry) in self.iter() {
            map.insert(key.to_string(), Value::String(entry.value.clone()));
        }
        Value::Object(map)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects values above [`MAX_ENV_VALUE_BYTES`].
fn check_value_size(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.len() > MAX_ENV_VALUE_BYTES {
        return Err(ConfigError::invalid(key, "value exceeds size limit"));
    }
    Ok(())
}

/// Quotes a value so `dotenvy` reads it back verbatim.
///
/// Single quotes suppress `$` substitution and are used whenever the value
/// allows it. `dotenvy` still reads `\'` inside them as an escaped quote, so
/// any value containing a backslash takes the escaped double-quote form.
pub fn quote_dotenv_value(value: &str) -> String {
    if !value.contains(['\'', '\n', '\\']) {
        return format!("'{value}'");
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
