use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Environment variable that relocates the store root.
pub const HOME_ENV: &str = "METACOG_HOME";

const DEFAULT_DIR: &str = ".metacog";

/// Per-invocation configuration. Built once by the caller and passed down,
/// never stored in process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetacogConfig {
    pub home: PathBuf,
}

impl MetacogConfig {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Resolve the store root: an explicit override wins, then `METACOG_HOME`,
    /// then `$HOME/.metacog`.
    pub fn resolve(home_override: Option<PathBuf>) -> Result<Self, CoreError> {
        if let Some(home) = home_override.filter(|p| !p.as_os_str().is_empty()) {
            return Ok(Self::new(home));
        }
        Self::from_env()
    }

    /// Read the store root from the environment.
    pub fn from_env() -> Result<Self, CoreError> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(dir));
        }
        let home = home_dir().ok_or_else(|| {
            CoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("cannot determine home directory; set {HOME_ENV}"),
            ))
        })?;
        Ok(Self::new(home.join(DEFAULT_DIR)))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_override_wins() {
        let config = MetacogConfig::resolve(Some(PathBuf::from("/tmp/metacog-test"))).unwrap();
        assert_eq!(config.home(), Path::new("/tmp/metacog-test"));
    }

    #[test]
    fn test_empty_override_is_ignored() {
        // Falls through to the environment; only checks that it does not pick the empty path.
        if let Ok(config) = MetacogConfig::resolve(Some(PathBuf::new())) {
            assert!(!config.home().as_os_str().is_empty());
        }
    }
}
