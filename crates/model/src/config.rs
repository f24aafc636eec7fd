//! User configuration for batch generation.
//!
//! Keys are upper-case at the top level and lower-case inside
//! `MODEL_PARAMS`:
//!
//! ```yaml
//! NUM_POPS: 2
//! SAMPLE_SIZES: [20, 20]
//! INPUT_PREFIX: mydata
//! MODEL_PARAMS:
//!   mutation_rate_dist: {type: logunif, min: 1.0e-9, max: 1.0e-7}
//!   effective_pop_size_dist: {type: unif, min: 100, max: 100000}
//!   migration_dist: {type: logunif, min: 1.0e-5, max: 1.0e-2}
//!   time_dist: {type: unif, min: 100, max: 10000}
//!   max_time_between_events: 1000
//! OUTPUT_DIR: output
//! NUM_RANDOM_MODELS: 100
//! OBS_FILES: [~/data/mydata_MAFpop0.obs]
//! SEED: 42
//! ```

use crate::errors::ConfigError;
use crate::params::ParameterPriors;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_NUM_RANDOM_MODELS: usize = 100;

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_num_random_models() -> usize {
    DEFAULT_NUM_RANDOM_MODELS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "NUM_POPS")]
    pub num_pops: usize,
    #[serde(rename = "SAMPLE_SIZES")]
    pub sample_sizes: Vec<u32>,
    #[serde(rename = "INPUT_PREFIX")]
    pub input_prefix: String,
    #[serde(rename = "MODEL_PARAMS")]
    pub model_params: ParameterPriors,
    #[serde(rename = "OUTPUT_DIR", default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(rename = "NUM_RANDOM_MODELS", default = "default_num_random_models")]
    pub num_random_models: usize,
    #[serde(rename = "OBS_FILES", default, skip_serializing_if = "Vec::is_empty")]
    pub obs_files: Vec<String>,
    #[serde(rename = "SEED", default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl UserConfig {
    /// Load and validate a configuration file. Files ending in `.json` are
    /// read as JSON, everything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&text)?
        } else {
            Self::from_yaml_str(&text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without validating.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse JSON without validating.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Check every value before any generation starts. Missing auxiliary
    /// files are reported together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_pops == 0 {
            return Err(ConfigError::InvalidValue(
                "NUM_POPS must be at least 1".into(),
            ));
        }
        if self.sample_sizes.len() != self.num_pops {
            return Err(ConfigError::InvalidValue(format!(
                "SAMPLE_SIZES has {} entries but NUM_POPS is {}",
                self.sample_sizes.len(),
                self.num_pops
            )));
        }
        if self.input_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "INPUT_PREFIX must not be empty".into(),
            ));
        }
        if self.num_random_models == 0 {
            return Err(ConfigError::InvalidValue(
                "NUM_RANDOM_MODELS must be at least 1".into(),
            ));
        }
        self.model_params.validate()?;

        let missing: Vec<String> = self
            .obs_files
            .iter()
            .filter(|file| !expand_tilde(file).exists())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingFiles(missing));
        }
        Ok(())
    }

    /// `OBS_FILES` with `~` expanded.
    pub fn obs_paths(&self) -> Vec<PathBuf> {
        self.obs_files.iter().map(|f| expand_tilde(f)).collect()
    }

    /// File name of the topology written into each replicate directory.
    pub fn tpl_file_name(&self) -> String {
        format!("{}.tpl", self.input_prefix)
    }

    pub fn est_file_name(&self) -> String {
        format!("{}.est", self.input_prefix)
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DistributionKind;

    const MINIMAL: &str = "\
NUM_POPS: 2
SAMPLE_SIZES: [10, 10]
INPUT_PREFIX: test
MODEL_PARAMS:
  mutation_rate_dist: {type: logunif, min: 1.0e-9, max: 1.0e-7}
  effective_pop_size_dist: {type: unif, min: 100, max: 100000}
  migration_dist: {type: logunif, min: 1.0e-5, max: 1.0e-2}
  time_dist: {type: unif, min: 100, max: 10000}
";

    #[test]
    fn test_defaults_are_filled() {
        let config = UserConfig::from_yaml_str(MINIMAL).unwrap();
        config.validate().unwrap();
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.num_random_models, 100);
        assert!(config.obs_files.is_empty());
        assert_eq!(config.seed, None);
        assert_eq!(config.model_params.max_time_between_events, 1000.0);
        assert_eq!(
            config.model_params.mutation_rate.kind,
            DistributionKind::LogUniform
        );
        assert_eq!(config.tpl_file_name(), "test.tpl");
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let yaml = UserConfig::from_yaml_str(MINIMAL).unwrap();
        let json = serde_json::to_string(&yaml).unwrap();
        assert_eq!(UserConfig::from_json_str(&json).unwrap(), yaml);
    }

    #[test]
    fn test_rejects_inconsistent_values() {
        let mut config = UserConfig::from_yaml_str(MINIMAL).unwrap();
        config.sample_sizes.push(5);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        let mut config = UserConfig::from_yaml_str(MINIMAL).unwrap();
        config.num_pops = 0;
        assert!(config.validate().is_err());

        let unknown = MINIMAL.replace("type: unif, min: 100, max: 10000", "type: gamma, min: 1, max: 2");
        assert!(matches!(
            UserConfig::from_yaml_str(&unknown),
            Err(ConfigError::Yaml(_))
        ));

        let missing_key = MINIMAL.replace("INPUT_PREFIX: test\n", "");
        assert!(UserConfig::from_yaml_str(&missing_key).is_err());
    }

    #[test]
    fn test_reports_all_missing_obs_files() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.obs");
        std::fs::write(&present, "1 observations\n").unwrap();

        let mut config = UserConfig::from_yaml_str(MINIMAL).unwrap();
        config.obs_files = vec![
            present.display().to_string(),
            "/nonexistent/a.obs".into(),
            "/nonexistent/b.obs".into(),
        ];
        match config.validate() {
            Err(ConfigError::MissingFiles(files)) => {
                assert_eq!(files, vec!["/nonexistent/a.obs", "/nonexistent/b.obs"]);
            }
            other => panic!("expected missing files, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.yml");
        std::fs::write(&path, MINIMAL).unwrap();
        assert_eq!(UserConfig::load(&path).unwrap().num_pops, 2);
        assert!(matches!(
            UserConfig::load(dir.path().join("absent.yml")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_tilde_expansion() {
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(expand_tilde("~/x.obs"), PathBuf::from(home).join("x.obs"));
        }
        assert_eq!(expand_tilde("/abs/x.obs"), PathBuf::from("/abs/x.obs"));
    }
}
