//! API key resolution
//!
//! A key is looked up through an ordered list of [`KeySource`]s; the first
//! source yielding a non-empty value wins. Sources never fail: a missing,
//! unreadable or malformed backing store simply yields nothing.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Environment variable holding the OpenAI API key
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// A secret API key
///
/// `Debug` output is redacted so keys do not leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key, trimming surrounding whitespace
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    /// The raw key
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// A place an API key may be stored
pub trait KeySource: Send + Sync {
    /// Look the key up, returning `None` when absent or empty
    fn resolve(&self) -> Option<String>;

    /// Human-readable description used in logs
    fn describe(&self) -> String;
}

/// Reads the key from a process environment variable
#[derive(Debug, Clone)]
pub struct EnvVar {
    name: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl KeySource for EnvVar {
    fn resolve(&self) -> Option<String> {
        std::env::var(&self.name).ok().and_then(non_empty)
    }

    fn describe(&self) -> String {
        format!("environment variable {}", self.name)
    }
}

/// Reads `NAME=value` from a `.env`-style file
#[derive(Debug, Clone)]
pub struct DotEnvFile {
    path: PathBuf,
    name: String,
}

impl DotEnvFile {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }
}

impl KeySource for DotEnvFile {
    fn resolve(&self) -> Option<String> {
        let entries = dotenvy::from_path_iter(&self.path).ok()?;
        // Malformed lines are skipped. Unquoted values expand `$NAME`;
        // single-quoted values are taken literally.
        entries
            .filter_map(Result::ok)
            .find(|(key, _)| key == &self.name)
            .and_then(|(_, value)| non_empty(strip_quotes(&value).to_string()))
    }

    fn describe(&self) -> String {
        format!("{} in {}", self.name, self.path.display())
    }
}

/// Reads the whole file as the key
#[derive(Debug, Clone)]
pub struct PlainTextFile {
    path: PathBuf,
}

impl PlainTextFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl KeySource for PlainTextFile {
    fn resolve(&self) -> Option<String> {
        std::fs::read_to_string(&self.path).ok().and_then(non_empty)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Ordered chain of key sources
#[derive(Default)]
pub struct KeyResolver {
    sources: Vec<Box<dyn KeySource>>,
}

impl KeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source with lower priority than those already added
    pub fn with_source(mut self, source: impl KeySource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// The OpenAI lookup order: `OPENAI_API_KEY`, then `<root>/.env`,
    /// then `<root>/api_key.txt`
    pub fn openai(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new()
            .with_source(EnvVar::new(OPENAI_API_KEY_VAR))
            .with_source(DotEnvFile::new(root.join(".env"), OPENAI_API_KEY_VAR))
            .with_source(PlainTextFile::new(root.join("api_key.txt")))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Resolve the key from the first source that has one
    pub fn resolve(&self) -> Option<ApiKey> {
        for source in &self.sources {
            if let Some(key) = source.resolve() {
                debug!("API key resolved from {}", source.describe());
                return Some(ApiKey::new(key));
            }
            debug!("No API key in {}", source.describe());
        }
        None
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn strip_quotes(value: &str) -> &str {
    value.trim().trim_matches('"').trim_matches('\'')
}
