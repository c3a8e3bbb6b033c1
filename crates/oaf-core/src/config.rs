use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::transform::name_normalizer::GenericNaming;

/// Top-level project configuration loaded from `.oaf.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FixConfig {
    pub input: String,
    /// Where to write the fixed copy. Mutually exclusive with `in_place`.
    pub output: Option<String>,
    pub in_place: bool,
    pub fixes: FixToggles,
    pub naming: GenericNaming,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: None,
            in_place: false,
            fixes: FixToggles::default(),
            naming: GenericNaming::default(),
        }
    }
}

impl FixConfig {
    /// Reject settings that ask for both output disciplines at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.output {
            Some(output) if self.in_place => Err(ConfigError::ConflictingModes(output.clone())),
            _ => Ok(()),
        }
    }
}

/// Which fixes run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FixToggles {
    pub rename_generic_schemas: bool,
    pub prune_unused_schemas: bool,
    pub prune_empty_paths: bool,
}

impl Default for FixToggles {
    fn default() -> Self {
        Self {
            rename_generic_schemas: true,
            prune_unused_schemas: true,
            prune_empty_paths: false,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oaf.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<FixConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: FixConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    config.validate()?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oaf configuration (https://github.com/urmzd/openapi-fixer)
input: openapi.yaml
# output: openapi.fixed.yaml   # write the fixed copy here
in_place: false                # or rewrite the input file itself

fixes:
  rename_generic_schemas: true # Page[User] -> PageOfUser
  prune_unused_schemas: true   # drop schemas nothing references
  prune_empty_paths: false     # drop path items with no operations

naming:
  strategy: of                 # underscore | of | for | flattened | dot
  preserve_casing: false
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::name_normalizer::GenericNamingStrategy;

    #[test]
    fn test_default_config() {
        let config = FixConfig::default();
        assert_eq!(config.input, "openapi.yaml");
        assert_eq!(config.output, None);
        assert!(!config.in_place);
        assert!(config.fixes.rename_generic_schemas);
        assert!(config.fixes.prune_unused_schemas);
        assert!(!config.fixes.prune_empty_paths);
        assert_eq!(config.naming.strategy, GenericNamingStrategy::Of);
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
input: api.json
output: api.fixed.json
fixes:
  prune_unused_schemas: false
  prune_empty_paths: true
naming:
  strategy: dot
  preserve_casing: true
"#;
        let config: FixConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "api.json");
        assert_eq!(config.output.as_deref(), Some("api.fixed.json"));
        assert!(config.fixes.rename_generic_schemas);
        assert!(!config.fixes.prune_unused_schemas);
        assert!(config.fixes.prune_empty_paths);
        assert_eq!(config.naming.strategy, GenericNamingStrategy::Dot);
        assert!(config.naming.preserve_casing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_content_parses() {
        let config: FixConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config.input, "openapi.yaml");
        assert_eq!(config.naming.strategy, GenericNamingStrategy::Of);
    }

    #[test]
    fn test_conflicting_modes_rejected() {
        let config = FixConfig {
            output: Some("out.yaml".into()),
            in_place: true,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ConflictingModes(p)) if p == "out.yaml"
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "input: spec.yaml\nin_place: true\n").unwrap();
        let config = load_config(&path).unwrap().unwrap();
        assert_eq!(config.input, "spec.yaml");
        assert!(config.in_place);
    }

    #[test]
    fn test_load_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "naming:\n  strategy: camel\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
