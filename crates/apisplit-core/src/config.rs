use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::bundle::DuplicatePolicy;
use crate::format::{Format, SpecVersion};
use crate::fsutil::RetryPolicy;

/// Project configuration loaded from `.apisplit.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApisplitConfig {
    /// Single-file document read by `split` and written by `bundle`.
    pub input: String,
    /// Directory written by `split` and read by `bundle`.
    pub output: String,
    pub spec_version: SpecVersion,
    pub format: Format,
    pub split: SplitConfig,
    pub bundle: BundleConfig,
}

impl Default for ApisplitConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "split".to_string(),
            spec_version: SpecVersion::V3_0,
            format: Format::Yaml,
            split: SplitConfig::default(),
            bundle: BundleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Extra attempts after a failed file write.
    pub write_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            write_retries: 2,
            retry_backoff_ms: 50,
        }
    }
}

impl SplitConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.write_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    pub on_duplicate: DuplicatePolicy,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".apisplit.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ApisplitConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: ApisplitConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# apisplit configuration
input: openapi.yaml     # single-file document
output: split           # split directory
spec_version: "3.0"     # "2.0" | "3.0"
format: yaml            # yaml | json

split:
  write_retries: 2      # extra attempts after a failed write
  retry_backoff_ms: 50

bundle:
  on_duplicate: fail    # fail | last_wins
"#
}
