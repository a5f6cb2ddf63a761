use std::fs;
use std::path::Path;

use cashflow_core::EngineConfig;

use super::file::resolve_path;

/// Load an engine configuration, choosing the format by file extension.
///
/// `.yaml` / `.yml` are parsed with serde_yaml, anything else as JSON.
/// Sections left out of the file keep their defaults.
pub fn load_engine_config(path: &str) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let config: EngineConfig = if is_yaml(&canonical) {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    };

    tracing::debug!(
        path = %canonical.display(),
        seasonal_months = config.seasonal_patterns.len(),
        "engine configuration loaded"
    );
    Ok(config)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn write_temp(name: &str, contents: &str) -> String {
        let path = std::env::temp_dir().join(format!("cff-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_yaml_partial_config_keeps_defaults() {
        let path = write_temp(
            "partial.yaml",
            "baseline_expense: 80000\nthresholds:\n  minimum_balance: 25000\n",
        );
        let config = load_engine_config(&path).unwrap();
        assert_eq!(config.baseline_expense, Decimal::from(80_000));
        assert_eq!(config.thresholds.minimum_balance, Decimal::from(25_000));
        assert_eq!(config.seasonal_patterns.len(), 12);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_json_config() {
        let path = write_temp("override.json", r#"{ "baseline_expense": "90000" }"#);
        let config = load_engine_config(&path).unwrap();
        assert_eq!(config.baseline_expense, Decimal::from(90_000));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_engine_config("/nonexistent/cff-config.yaml").is_err());
    }

    #[test]
    fn test_extension_detection() {
        assert!(is_yaml(Path::new("engine.yml")));
        assert!(is_yaml(Path::new("engine.yaml")));
        assert!(!is_yaml(Path::new("engine.json")));
        assert!(!is_yaml(Path::new("engine")));
    }
}
