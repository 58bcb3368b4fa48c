pub mod classify;
pub mod extract;
pub mod fields;
pub mod process;

use proexy_core::error::ProexyError;
use proexy_core::Config;
use std::path::Path;

/// The config file when one was given, the defaults otherwise.
pub fn load_config(config_file: Option<&Path>) -> Result<Config, ProexyError> {
    match config_file {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_a_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.equipment_id_offset, 5);
        assert_eq!(config.y_tolerance, 5.0);
    }

    #[test]
    fn file_overrides_single_file_tunables() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "y_tolerance": 2.5, "equipment_id_offset": 3 }}"#).unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.y_tolerance, 2.5);
        assert_eq!(config.equipment_id_offset, 3);
        assert_eq!(config.merge_window, 4);
    }

    #[test]
    fn unreadable_file_is_a_config_error() {
        let err = load_config(Some(Path::new("/nonexistent/proexy.json"))).unwrap_err();
        assert!(matches!(err, ProexyError::Config { .. }));
    }
}
