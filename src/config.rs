use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::errors::Result;
use crate::normalize::overrides::Overrides;

/// What to do with an element whose records fail the schema.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Abort the run on the first invalid element.
    #[default]
    FailFast,
    /// Log the element and leave it out of every table.
    Skip,
}

#[derive(Deserialize, Debug, Clone)]
pub struct UserConfig {
    pub data_path: String,
    pub dest_path: String,
    /// Falls back to the override table bundled with the crate.
    #[serde(default)]
    pub overrides_path: Option<String>,
    #[serde(default)]
    pub on_invalid: ValidationPolicy,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl UserConfig {
    pub fn overrides(&self) -> Result<Overrides> {
        match &self.overrides_path {
            Some(path) => Overrides::load(Path::new(path)),
            None => Overrides::builtin(),
        }
    }
}

pub fn load_user_config(path: &Path) -> Result<UserConfig> {
    let file = File::open(path)
        .map_err(|err| format!("Could not open config file {}: {err}", path.display()))?;
    let config = serde_json::from_reader(file)
        .map_err(|err| format!("Could not parse config {}: {err}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn optional_fields_have_defaults() {
        let config: UserConfig = serde_json::from_str(r#"{"data_path": "a.osm", "dest_path": "out"}"#)
            .expect("minimal config parses");
        assert_eq!(config.on_invalid, ValidationPolicy::FailFast);
        assert!(!config.overwrite);
        assert_eq!(config.log_level, "info");
        assert!(config.overrides_path.is_none());
    }

    #[test]
    fn reads_policy_in_snake_case() {
        let config: UserConfig = serde_json::from_str(
            r#"{"data_path": "a.osm", "dest_path": "out", "on_invalid": "skip"}"#,
        ).expect("config parses");
        assert_eq!(config.on_invalid, ValidationPolicy::Skip);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"data_path": "tampa.osm", "dest_path": "csv", "overwrite": true}}"#).expect("write config");
        let config = load_user_config(file.path()).expect("config loads");
        assert_eq!(config.data_path, "tampa.osm");
        assert!(config.overwrite);
    }

    #[test]
    fn missing_file_names_the_path() {
        let error = load_user_config(Path::new("does/not/exist.json")).expect_err("missing file");
        assert!(error.message.contains("does/not/exist.json"));
    }
}
