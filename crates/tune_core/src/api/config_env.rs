use std::path::Path;
use std::{env, fs};

use crate::engine::EngineConfig;
use crate::error::Result;

pub const CONFIG_PATH_ENV: &str = "TUNE_CONFIG_PATH";

/// Load and validate a config file; `.yaml`/`.yml` are YAML, anything else JSON.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let config = if is_yaml {
        EngineConfig::from_yaml(&content)?
    } else {
        EngineConfig::from_json(&content)?
    };
    tracing::debug!(path = %path.display(), "loaded engine config");
    Ok(config)
}

/// Config named by `TUNE_CONFIG_PATH`, or `None` when unset or blank.
pub fn load_config_from_env() -> Result<Option<EngineConfig>> {
    let Ok(path) = env::var(CONFIG_PATH_ENV) else {
        return Ok(None);
    };

    let path = path.trim();
    if path.is_empty() {
        return Ok(None);
    }

    load_config_file(path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TuningError;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_json_file() {
        let file = write_temp(".json", r#"{"control": {"large_step": 4.0}}"#);
        let cfg = load_config_file(file.path()).unwrap();
        assert_eq!(cfg.control.large_step, 4.0);
    }

    #[test]
    fn test_load_yaml_file() {
        let file = write_temp(".yml", "field:\n  grid_step: 2.0\n");
        let cfg = load_config_file(file.path()).unwrap();
        assert_eq!(cfg.field.grid_step, 2.0);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let file = write_temp(".yaml", "field:\n  grid_step: 7.0\n");
        assert!(matches!(
            load_config_file(file.path()),
            Err(TuningError::InvalidConfig(_))
        ));
    }

    /// All `TUNE_CONFIG_PATH` cases live in one test; the variable is process-wide.
    #[test]
    fn test_config_from_env() {
        env::remove_var(CONFIG_PATH_ENV);
        assert!(load_config_from_env().unwrap().is_none());

        env::set_var(CONFIG_PATH_ENV, "   ");
        assert!(load_config_from_env().unwrap().is_none());

        let file = write_temp(".json", r#"{"field": {"half_extent": 10.0}}"#);
        env::set_var(CONFIG_PATH_ENV, file.path());
        let cfg = load_config_from_env().unwrap().unwrap();
        assert_eq!(cfg.field.half_extent, 10.0);

        // requests without a config fall back to the file
        let request = r#"{"schema_version": 1, "seed": 3, "commands": [], "include_grid": true}"#;
        let response: serde_json::Value =
            serde_json::from_str(&crate::api::simulate_session_json(request).unwrap()).unwrap();
        assert_eq!(response["final_frame"]["grid"]["axis"].as_array().unwrap().len(), 21);

        let bad = write_temp(".json", r#"{"field": {"grid_step": 7.0}}"#);
        env::set_var(CONFIG_PATH_ENV, bad.path());
        assert!(matches!(load_config_from_env(), Err(TuningError::InvalidConfig(_))));

        env::remove_var(CONFIG_PATH_ENV);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(load_config_file(missing), Err(TuningError::Io(_))));
    }
}
