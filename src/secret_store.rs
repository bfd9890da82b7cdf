//! Credential lookup for external capabilities.
//!
//! Secrets come from the process environment first, then from an optional
//! YAML file at `~/.balmitra/secrets.yaml`. The required `GROQ_API_KEY` being
//! absent in both places is a fatal startup error for the shells.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Looks up named secrets from the environment and an optional file.
#[derive(Debug, Default)]
pub struct SecretStore {
    file_secrets: HashMap<String, String>,
}

impl SecretStore {
    /// Creates a store backed by the default secrets file, if one exists.
    pub fn new() -> Self {
        let file_secrets = Self::default_path()
            .map(|path| Self::load_file(&path))
            .unwrap_or_default();
        Self { file_secrets }
    }

    fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".balmitra").join("secrets.yaml"))
    }

    fn load_file(path: &Path) -> HashMap<String, String> {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return HashMap::new();
        };
        match serde_yaml::from_str(&contents) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("ignoring malformed secrets file {}: {e}", path.display());
                HashMap::new()
            }
        }
    }

    /// Creates a store backed by a specific secrets file.
    pub fn with_file(path: &Path) -> Self {
        Self {
            file_secrets: Self::load_file(path),
        }
    }

    /// Returns the secret for `key`, environment taking precedence over the
    /// file.
    pub fn get(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.file_secrets.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn store_with_yaml(contents: &str) -> (tempfile::TempDir, SecretStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{contents}").unwrap();
        let store = SecretStore::with_file(&path);
        (dir, store)
    }

    #[test]
    fn test_reads_secrets_from_file() {
        let (_dir, store) = store_with_yaml("SOME_TEST_ONLY_KEY: file-value\n");
        assert_eq!(store.get("SOME_TEST_ONLY_KEY").as_deref(), Some("file-value"));
        assert_eq!(store.get("MISSING_KEY"), None);
    }

    #[test]
    fn test_environment_takes_precedence() {
        let (_dir, store) = store_with_yaml("BALMITRA_PRECEDENCE_KEY: file-value\n");
        std::env::set_var("BALMITRA_PRECEDENCE_KEY", "env-value");
        assert_eq!(
            store.get("BALMITRA_PRECEDENCE_KEY").as_deref(),
            Some("env-value")
        );
        std::env::remove_var("BALMITRA_PRECEDENCE_KEY");
    }

    #[test]
    fn test_malformed_file_yields_empty_store() {
        let (_dir, store) = store_with_yaml("not: [valid, yaml");
        assert_eq!(store.get("ANYTHING"), None);
    }

    #[test]
    fn test_missing_file_yields_empty_store() {
        let store = SecretStore::with_file(Path::new("/nonexistent/secrets.yaml"));
        assert_eq!(store.get("ANYTHING"), None);
    }
}
