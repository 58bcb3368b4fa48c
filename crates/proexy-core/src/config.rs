use crate::error::ProexyError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunables for one processing run.
///
/// Every field has a default, so a config file only needs the keys it
/// wants to override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vertical tolerance in points for row bucketing and same-row tests.
    pub y_tolerance: f32,
    /// How many following spans are tried when rebuilding a split label.
    pub merge_window: usize,
    /// A word gap wider than this fraction of the word height starts a new span.
    pub span_gap_ratio: f32,
    /// Lines between the "Equipment ID" marker and its value.
    pub equipment_id_offset: usize,
    /// Rulings shorter than page dimension / line_scale are ignored by grid detection.
    pub line_scale: f32,
    pub proserv_dir: String,
    pub oman_dir: String,
    pub proserv_output: String,
    pub oman_output: String,
    /// Where family directories and workbooks go. Defaults to the input folder.
    pub output_dir: Option<PathBuf>,
    pub delete_retries: u32,
    pub delete_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            y_tolerance: 5.0,
            merge_window: 4,
            span_gap_ratio: 0.6,
            equipment_id_offset: 5,
            line_scale: 40.0,
            proserv_dir: "Proserv Certificates".into(),
            oman_dir: "Oman Certificates".into(),
            proserv_output: "Proserv_Certificates.xlsx".into(),
            oman_output: "Oman_Certificates.xlsx".into(),
            output_dir: None,
            delete_retries: 3,
            delete_backoff_ms: 200,
        }
    }
}

impl Config {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Config, ProexyError> {
        let content = std::fs::read_to_string(path).map_err(|e| ProexyError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|e| ProexyError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate().map_err(|reason| ProexyError::Config {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.y_tolerance <= 0.0 {
            return Err("y_tolerance must be positive".into());
        }
        if self.line_scale <= 0.0 {
            return Err("line_scale must be positive".into());
        }
        if self.proserv_dir.is_empty() || self.oman_dir.is_empty() {
            return Err("family directory names must not be empty".into());
        }
        if self.proserv_dir == self.oman_dir {
            return Err("proserv_dir and oman_dir must differ".into());
        }
        Ok(())
    }

    /// Directory that receives family folders and workbooks for a given input.
    pub fn output_root(&self, input: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| input.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "y_tolerance": 3.5, "oman_dir": "Oman" }}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.y_tolerance, 3.5);
        assert_eq!(config.oman_dir, "Oman");
        assert_eq!(config.merge_window, 4);
        assert_eq!(config.proserv_output, "Proserv_Certificates.xlsx");
    }

    #[test]
    fn rejects_same_family_dirs() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "proserv_dir": "Out", "oman_dir": "Out" }}"#).unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(ProexyError::Config { .. })
        ));
    }

    #[test]
    fn output_root_defaults_to_input() {
        let config = Config::default();
        assert_eq!(config.output_root(Path::new("/in")), PathBuf::from("/in"));
    }
}
