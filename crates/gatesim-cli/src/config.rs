use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use miette::{IntoDiagnostic, Result, miette};
use serde::Deserialize;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG: &str = "gatesim.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub simulate: SimulateConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulateConfig {
    /// Input vector file, one line per tick.
    pub vectors: PathBuf,
    /// Where output lines go. `None` is stdout.
    pub output: Option<PathBuf>,
}

impl Default for SimulateConfig {
    fn default() -> Self {
        Self {
            vectors: PathBuf::from("input/vectors.txt"),
            output: None,
        }
    }
}

impl Config {
    /// Loads `path`, or [`DEFAULT_CONFIG`] if it exists, or the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("loading configuration from {}", path.display());
        let text = fs::read_to_string(path)
            .map_err(|err| miette!("cannot read {}: {err}", path.display()))?;
        Self::from_toml(&text).map_err(|err| miette!("{}: {err}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).into_diagnostic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.simulate.vectors, PathBuf::from("input/vectors.txt"));
        assert_eq!(config.simulate.output, None);
    }

    #[test]
    fn test_partial_table() {
        let config = Config::from_toml("[simulate]\noutput = \"out.txt\"\n").unwrap();
        assert_eq!(config.simulate.vectors, PathBuf::from("input/vectors.txt"));
        assert_eq!(config.simulate.output, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(Config::from_toml("[simulate]\nvector = \"v.txt\"\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[simulate]\nvectors = \"stimulus.txt\"").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.simulate.vectors, PathBuf::from("stimulus.txt"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
