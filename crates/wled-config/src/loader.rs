//! YAML loading with `!env_var` substitution
//!
//! Controller addresses differ between deployments, so any scalar in the
//! configuration may be written as `!env_var NAME` and is replaced by the
//! value of that environment variable at load time.

use crate::error::{ConfigError, ConfigResult};
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Load a YAML file and resolve its tags
pub fn load_yaml(path: impl AsRef<Path>) -> ConfigResult<Value> {
    let path = path.as_ref();
    debug!("Loading YAML file: {:?}", path);

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_yaml_string(&content, path)
}

/// Load YAML from a string and resolve its tags
///
/// `source_path` is only used in error messages.
pub fn load_yaml_string(content: &str, source_path: &Path) -> ConfigResult<Value> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
        path: source_path.to_path_buf(),
        source: e,
    })?;

    process_value(value)
}

fn process_value(value: Value) -> ConfigResult<Value> {
    match value {
        Value::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            trace!("Processing tag '{}' with value {:?}", tag, tagged.value);

            if tag == "!env_var" {
                process_env_var(tagged.value)
            } else {
                // Unknown tags are kept; only their inner value is resolved
                let processed = process_value(tagged.value)?;
                Ok(Value::Tagged(Box::new(serde_yaml::value::TaggedValue {
                    tag: tagged.tag,
                    value: processed,
                })))
            }
        }
        Value::Mapping(map) => {
            let mut result = serde_yaml::Mapping::new();
            for (k, v) in map {
                result.insert(process_value(k)?, process_value(v)?);
            }
            Ok(Value::Mapping(result))
        }
        Value::Sequence(seq) => {
            let result: ConfigResult<Vec<Value>> = seq.into_iter().map(process_value).collect();
            Ok(Value::Sequence(result?))
        }
        _ => Ok(value),
    }
}

fn process_env_var(value: Value) -> ConfigResult<Value> {
    let var_name = match value {
        Value::String(s) => s,
        _ => {
            return Err(ConfigError::InvalidValue {
                key: "!env_var".to_string(),
                reason: "environment variable name must be a string".to_string(),
            })
        }
    };

    let env_value = std::env::var(&var_name).map_err(|_| ConfigError::EnvVarNotFound {
        var: var_name.clone(),
    })?;

    debug!("Substituted env var: {}", var_name);
    // Re-parse so numbers and booleans keep their YAML type
    Ok(serde_yaml::from_str(&env_value).unwrap_or(Value::String(env_value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_load_simple_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wled.yaml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"wled:\n  host: 192.168.1.20\n").unwrap();

        let value = load_yaml(&path).unwrap();
        assert_eq!(value["wled"]["host"].as_str(), Some("192.168.1.20"));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_yaml(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = load_yaml_string("wled: [unclosed", Path::new("inline")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseYaml { .. }));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("WLED_CONFIG_TEST_KEEP_MAIN", "true");
        let value = load_yaml_string(
            "wled:\n  keep_main_light: !env_var WLED_CONFIG_TEST_KEEP_MAIN\n",
            Path::new("inline"),
        )
        .unwrap();
        assert_eq!(value["wled"]["keep_main_light"].as_bool(), Some(true));
    }

    #[test]
    fn test_env_var_missing() {
        let err = load_yaml_string(
            "host: !env_var WLED_CONFIG_TEST_DEFINITELY_UNSET\n",
            Path::new("inline"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarNotFound { var } if var == "WLED_CONFIG_TEST_DEFINITELY_UNSET"));
    }
}
