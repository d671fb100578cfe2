//! Plugin configuration: the options bag a build tool hands the generator.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ANNOTATION_NAME: &str = "Fake";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// When false, Phase F is a no-op for the whole compilation unit.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Convenience alias for log-level >= Debug.
    #[serde(default)]
    pub debug: bool,

    /// Directory for emitted files and the signature cache file. `None`
    /// disables cache persistence.
    #[serde(default)]
    pub output_dir: Option<std::path::PathBuf>,

    /// Fully-qualified annotation names that trigger processing. Defaults to
    /// the tool's own `Fake`; a host may configure additional aliases.
    #[serde(default = "default_annotation_names")]
    pub annotation_names: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_annotation_names() -> Vec<String> {
    vec![DEFAULT_ANNOTATION_NAME.to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enabled: default_enabled(),
            debug: false,
            output_dir: None,
            annotation_names: default_annotation_names(),
        }
    }
}

impl Config {
    /// Parses a `key=value` option bag as a build system would hand it over
    /// via plugin options. Unknown keys are ignored rather than rejected.
    pub fn from_options(options: &[(String, String)]) -> Self {
        let mut config = Config::default();
        for (key, value) in options {
            match key.as_str() {
                "enabled" => config.enabled = parse_bool(value, config.enabled),
                "debug" => config.debug = parse_bool(value, config.debug),
                "outputDir" => config.output_dir = Some(std::path::PathBuf::from(value)),
                "annotationNames" => {
                    config.annotation_names =
                        value.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
                    if config.annotation_names.is_empty() {
                        config.annotation_names = default_annotation_names();
                    }
                }
                _ => {}
            }
        }
        config
    }

    pub fn matches_annotation(&self, fq_name: &str) -> bool {
        self.annotation_names.iter().any(|n| n == fq_name)
    }

    pub fn effective_log_level(&self, requested: crate::telemetry::LogLevel) -> crate::telemetry::LogLevel {
        if self.debug && requested < crate::telemetry::LogLevel::Debug {
            crate::telemetry::LogLevel::Debug
        } else {
            requested
        }
    }
}

fn parse_bool(value: &str, fallback: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_with_tool_annotation() {
        let config = Config::default();
        assert!(config.enabled);
        assert!(config.matches_annotation("Fake"));
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn from_options_parses_known_keys() {
        let config = Config::from_options(&[
            ("enabled".into(), "false".into()),
            ("outputDir".into(), "/tmp/gen".into()),
            ("annotationNames".into(), "Fake, com.example.Fake".into()),
        ]);
        assert!(!config.enabled);
        assert!(config.matches_annotation("com.example.Fake"));
        assert_eq!(config.output_dir.unwrap(), std::path::PathBuf::from("/tmp/gen"));
    }
}
