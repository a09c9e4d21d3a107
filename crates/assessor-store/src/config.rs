//! Store configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use assessor_core::traits::ResultStore;

use crate::file::FileStore;
use crate::memory::MemoryStore;
use crate::policy::OverwritePolicy;
use crate::timeout::TimeoutStore;

/// Local config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "assessor.toml";

/// Which store implementation to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Memory,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StoreBackend::File => "file",
            StoreBackend::Memory => "memory",
        })
    }
}

/// The `[store]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Root directory for the file backend. `${VAR}` references are expanded.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// What a second submission for the same candidate does.
    #[serde(default)]
    pub overwrite: OverwritePolicy,
    /// Per-call budget in milliseconds. 0 disables the bound.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./assessor-results")
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
            overwrite: OverwritePolicy::default(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

/// Top-level assessor configuration.
///
/// The phase table lives in the same file but is parsed separately by
/// `assessor_core::parser`, so unknown sections are ignored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessorConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// File this configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `assessor.toml` in the current directory
/// 2. `~/.config/assessor/config.toml`
///
/// Environment variable overrides: `ASSESSOR_STORE_PATH`,
/// `ASSESSOR_OVERWRITE`, `ASSESSOR_STORE_TIMEOUT_MS`.
pub fn load_config() -> Result<AssessorConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AssessorConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => find_config(),
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AssessorConfig::default(),
    };
    config.source = config_path;

    apply_env_overrides(&mut config.store)?;
    config.store.path = PathBuf::from(resolve_env_vars(&config.store.path.to_string_lossy()));

    tracing::debug!(
        source = ?config.source,
        backend = ?config.store.backend,
        overwrite = %config.store.overwrite,
        "loaded config"
    );
    Ok(config)
}

/// Parse a config document without touching the environment.
pub fn parse_config_str(content: &str) -> Result<AssessorConfig> {
    Ok(toml::from_str::<AssessorConfig>(content)?)
}

fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    let global = dirs_path()?.join("config.toml");
    global.exists().then_some(global)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("assessor"))
}

fn apply_env_overrides(store: &mut StoreConfig) -> Result<()> {
    if let Ok(path) = std::env::var("ASSESSOR_STORE_PATH") {
        store.path = PathBuf::from(path);
    }
    if let Ok(policy) = std::env::var("ASSESSOR_OVERWRITE") {
        store.overwrite = policy
            .parse()
            .map_err(|e: String| anyhow::anyhow!("ASSESSOR_OVERWRITE: {e}"))?;
    }
    if let Ok(ms) = std::env::var("ASSESSOR_STORE_TIMEOUT_MS") {
        store.timeout_ms = ms
            .trim()
            .parse()
            .with_context(|| format!("ASSESSOR_STORE_TIMEOUT_MS: invalid value {ms:?}"))?;
    }
    Ok(())
}

/// Open the store a configuration describes.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn ResultStore>> {
    let store = match config.backend {
        StoreBackend::File => {
            let store = FileStore::open(&config.path, config.overwrite)?;
            bounded(store, config.timeout())
        }
        StoreBackend::Memory => bounded(MemoryStore::new(config.overwrite), config.timeout()),
    };
    tracing::debug!(backend = store.name(), "opened result store");
    Ok(store)
}

fn bounded<S: ResultStore + 'static>(store: S, timeout: Option<Duration>) -> Arc<dyn ResultStore> {
    match timeout {
        Some(timeout) => Arc::new(TimeoutStore::new(store).with_timeout(timeout)),
        None => Arc::new(store),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_ASSESSOR_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_ASSESSOR_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_ASSESSOR_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no_close_${"), "no_close_${");
        std::env::remove_var("_ASSESSOR_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = AssessorConfig::default();
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.store.overwrite, OverwritePolicy::Reject);
        assert_eq!(config.store.timeout(), Some(Duration::from_secs(5)));
        assert!(config.source.is_none());
    }

    #[test]
    fn parse_store_section_ignoring_phases() {
        let config = parse_config_str(
            r#"
[store]
backend = "memory"
overwrite = "version"
timeout_ms = 0

[[phases]]
name = "aptitude"
answer_key = ["A"]
"#,
        )
        .unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.overwrite, OverwritePolicy::Version);
        assert_eq!(config.store.timeout(), None);
        assert_eq!(config.store.path, PathBuf::from("./assessor-results"));
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(parse_config_str("[store]\nbackend = \"postgres\"\n").is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_recorded_and_env_overrides_apply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assessor.toml");
        std::fs::write(&path, "[store]\npath = \"${_ASSESSOR_ROOT}/results\"\n").unwrap();

        std::env::set_var("_ASSESSOR_ROOT", "/srv/assessor");
        std::env::set_var("ASSESSOR_OVERWRITE", "replace");
        let config = load_config_from(Some(&path)).unwrap();
        std::env::remove_var("ASSESSOR_OVERWRITE");
        std::env::remove_var("_ASSESSOR_ROOT");

        assert_eq!(config.source.as_deref(), Some(path.as_path()));
        assert_eq!(config.store.path, PathBuf::from("/srv/assessor/results"));
        assert_eq!(config.store.overwrite, OverwritePolicy::Replace);
    }

    #[tokio::test]
    async fn open_configured_stores() {
        let dir = tempfile::tempdir().unwrap();
        let file = StoreConfig {
            path: dir.path().join("results"),
            ..StoreConfig::default()
        };
        assert_eq!(open_store(&file).unwrap().name(), "file");
        assert!(dir.path().join("results").is_dir());

        let memory = StoreConfig {
            backend: StoreBackend::Memory,
            timeout_ms: 0,
            ..StoreConfig::default()
        };
        let store = open_store(&memory).unwrap();
        let stored = store.put(crate::testing::result("cand-1", 4)).await.unwrap();
        assert_eq!(store.get("cand-1").await.unwrap(), stored);
    }
}
