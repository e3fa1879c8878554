//! Runtime configuration.
//!
//! Optional TOML file; every key has a default, unknown keys are rejected.
//! The file is read from the path in `SIXPAIR_CONFIG` when that variable is
//! set, otherwise defaults apply.
//!
//! ```toml
//! max_controllers = 10
//! mac_separators = true
//! color = "auto"      # auto | always | never
//! output = "text"     # text | json
//! probe_on_list = true
//! scan_report_ids = [0x00, 0x02, 0x10]
//! ```

use crate::diagnostics::DEFAULT_SCAN_IDS;
use crate::manager::DEFAULT_MAX_CONTROLLERS;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SIXPAIR_CONFIG";

/// Filter variable for `env_logger`, e.g. `SIXPAIR_LOG=debug`.
pub const LOG_ENV: &str = "SIXPAIR_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config {path}: {reason}")]
    Invalid { path: PathBuf, reason: &'static str },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PairerConfig {
    /// Cap on controller records returned by a scan.
    pub max_controllers: usize,
    /// Print addresses as `aa:bb:..` rather than `aabb..`.
    pub mac_separators: bool,
    pub color: ColorMode,
    /// Format for `-l`, `-a` and `-d`.
    pub output: OutputFormat,
    /// Probe feature reports of each Sony interface in `-l`.
    pub probe_on_list: bool,
    /// Additional report IDs scanned by `-d`.
    pub scan_report_ids: Vec<u8>,
}

impl Default for PairerConfig {
    fn default() -> Self {
        Self {
            max_controllers: DEFAULT_MAX_CONTROLLERS,
            mac_separators: true,
            color: ColorMode::Auto,
            output: OutputFormat::Text,
            probe_on_list: true,
            scan_report_ids: DEFAULT_SCAN_IDS.to_vec(),
        }
    }
}

impl PairerConfig {
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        if config.max_controllers == 0 {
            return Err(ConfigError::Invalid {
                path: origin.to_path_buf(),
                reason: "max_controllers must be at least 1",
            });
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load from `SIXPAIR_CONFIG`, or defaults when unset.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::from_file(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_is_default() {
        let cfg = PairerConfig::from_toml_str("", Path::new("x.toml")).unwrap();
        assert_eq!(cfg, PairerConfig::default());
        assert_eq!(cfg.max_controllers, 10);
        assert_eq!(cfg.scan_report_ids.len(), 15);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = PairerConfig::from_toml_str(
            r#"
            max_controllers = 2
            mac_separators = false
            color = "never"
            output = "json"
            probe_on_list = false
            scan_report_ids = [0x10, 0xF0]
            "#,
            Path::new("x.toml"),
        )
        .unwrap();
        assert_eq!(cfg.max_controllers, 2);
        assert!(!cfg.mac_separators);
        assert_eq!(cfg.color, ColorMode::Never);
        assert_eq!(cfg.output, OutputFormat::Json);
        assert!(!cfg.probe_on_list);
        assert_eq!(cfg.scan_report_ids, vec![0x10, 0xF0]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PairerConfig::from_toml_str("colour = \"never\"", Path::new("x.toml"));
        assert!(matches!(err, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn zero_controller_limit_is_rejected() {
        let err = PairerConfig::from_toml_str("max_controllers = 0", Path::new("x.toml"));
        match err {
            Err(ConfigError::Invalid { reason, .. }) => {
                assert_eq!(reason, "max_controllers must be at least 1")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_controllers = 4").unwrap();
        let cfg = PairerConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.max_controllers, 4);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = PairerConfig::from_file(Path::new("/nonexistent/sixpair.toml"));
        assert!(matches!(err, Err(ConfigError::Read { .. })));
    }
}
