//! Environment variables as an injectable key/value store, plus the local
//! secrets loader that populates it.

pub mod loader;
pub mod parse;

pub use loader::{load_env_file, load_local_environment, LoadReport, LOCAL_ENV_PATH};
pub use parse::{parse_line, LineError};

use std::collections::BTreeMap;

/// A mutable name → value mapping of environment variables.
///
/// The loader and the provider configuration take the store as a parameter
/// so they can run against the real process environment or an isolated map.
pub trait EnvStore {
    /// Value of `key`, if set and valid unicode
    fn get(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`, replacing any previous value
    fn set(&mut self, key: &str, value: &str);

    /// Whether `key` is set at all
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// The environment of the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    // A variable holding non-unicode bytes is still set and must count as
    // present.
    fn contains(&self, key: &str) -> bool {
        std::env::var_os(key).is_some()
    }
}

/// An in-memory environment, detached from the process.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryEnv {
    vars: BTreeMap<String, String>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables set
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate variables in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl EnvStore for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_env_basics() {
        let mut env: MemoryEnv = [("A", "1")].into_iter().collect();
        assert!(env.contains("A"));
        assert!(!env.contains("B"));

        env.set("B", "2");
        env.set("A", "3");
        assert_eq!(env.get("A").as_deref(), Some("3"));
        assert_eq!(env.len(), 2);
        assert_eq!(
            env.iter().collect::<Vec<_>>(),
            vec![("A", "3"), ("B", "2")]
        );
    }

    #[test]
    fn test_empty_value_counts_as_present() {
        let env: MemoryEnv = [("EMPTY", "")].into_iter().collect();
        assert!(env.contains("EMPTY"));
        assert_eq!(env.get("EMPTY").as_deref(), Some(""));
    }
}
