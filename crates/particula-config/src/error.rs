//! Failures while loading, saving or checking engine settings and scores.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Anything that can go wrong between a TOML file and a running engine.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A settings or score file could not be read.
    #[error("cannot read '{path}': {source}")]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A file or its parent directory could not be written.
    #[error("cannot write '{path}': {source}")]
    Write {
        /// File or directory that was being written.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid TOML for a config or score.
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Settings could not be encoded as TOML.
    #[error("cannot encode as TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No factory scene has this name.
    #[error("unknown scene '{0}'")]
    UnknownScene(String),

    /// A value is outside its allowed range.
    #[error("invalid settings: {0}")]
    Invalid(#[from] crate::validation::ValidationError),
}

impl ConfigError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Write `content` to `path`, creating missing parent directories first.
pub(crate) fn write_with_parents(path: &Path, content: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::write(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| ConfigError::write(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn not_found() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "gone")
    }

    #[test]
    fn read_error_names_the_file() {
        let err = ConfigError::read("/scenes/rain.toml", not_found());
        let msg = err.to_string();
        assert!(msg.contains("/scenes/rain.toml"), "got: {msg}");
        assert!(msg.contains("gone"), "got: {msg}");
        assert!(err.source().is_some());
    }

    #[test]
    fn write_into_a_file_path_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        // `blocker` is a file, so it cannot act as a parent directory.
        let err = write_with_parents(&blocker.join("score.toml"), "").unwrap_err();
        assert!(matches!(err, ConfigError::Write { .. }), "got: {err}");
    }

    #[test]
    fn write_creates_missing_parents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("scene.toml");
        write_with_parents(&path, "name = \"x\"\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "name = \"x\"\n");
    }

    #[test]
    fn unknown_scene_display() {
        let err = ConfigError::UnknownScene("fog".to_string());
        assert_eq!(err.to_string(), "unknown scene 'fog'");
        assert!(err.source().is_none());
    }
}
