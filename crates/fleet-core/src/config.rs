//! Configuration management for fleetops
//!
//! One explicit configuration object, loaded from a YAML or JSON file and
//! passed to the operations that need it. Replaces the module-level
//! clients, signers, and shape tables the original scripts relied on.

use crate::shapes::GpuModel;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level fleetops configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Cloud provider settings
    #[serde(default)]
    pub cloud: CloudConfig,

    /// Remote shell settings
    #[serde(default)]
    pub ssh: SshConfig,

    /// NCCL scout settings
    #[serde(default)]
    pub scout: ScoutConfig,

    /// Shape catalog override; the built-in catalog is used when absent
    #[serde(default)]
    pub models: Option<Vec<GpuModel>>,

    /// Configuration source path
    #[serde(skip)]
    source: Option<PathBuf>,
}

/// Cloud provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    /// API endpoint template; `{region}` is substituted
    pub endpoint: String,

    /// Region identifier, e.g. "us-ashburn-1"
    pub region: String,

    /// Tenancy OCID (the compartment for tag-namespace operations)
    pub tenancy_id: String,

    /// Environment variable holding the API bearer token
    pub token_env: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://iaas.{region}.oraclecloud.com/20160918".to_string(),
            region: "us-ashburn-1".to_string(),
            tenancy_id: String::new(),
            token_env: "FLEETOPS_API_TOKEN".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Remote shell settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshConfig {
    /// SSH connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Remote user; the local user when absent
    pub user: Option<String>,

    /// Extra `-o` options passed to ssh
    #[serde(default)]
    pub options: Vec<String>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            user: None,
            options: Vec::new(),
        }
    }
}

/// NCCL scout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Hard timeout for one pairwise benchmark, in seconds
    pub test_timeout_secs: u64,

    /// Worker bound for reachability probing
    pub reachability_workers: usize,

    /// Concurrent tests in parallel mode; available parallelism when absent
    pub parallel_tests: Option<usize>,

    /// Benchmark output log, appended across runs
    pub log_file: PathBuf,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            test_timeout_secs: 120,
            reachability_workers: 10,
            parallel_tests: None,
            log_file: PathBuf::from("nccl_test.log"),
        }
    }
}

impl FleetConfig {
    /// Load configuration from a file, or defaults when the file is absent
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            let mut config = Self::default();
            config.source = Some(config_path);
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let mut config: Self = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::config("could not determine config directory"))?;
        Ok(config_dir.join("fleetops").join("config.yaml"))
    }

    /// Get the configuration source path
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Shape catalog: the configured override, or the built-in table
    pub fn catalog(&self) -> crate::shapes::ShapeCatalog {
        match &self.models {
            Some(models) => crate::shapes::ShapeCatalog::new(models.clone()),
            None => crate::shapes::ShapeCatalog::default(),
        }
    }

    /// Resolved API endpoint for the configured (or an overridden) region
    pub fn api_endpoint(&self, region: Option<&str>) -> String {
        let region = region.unwrap_or(&self.cloud.region);
        self.cloud.endpoint.replace("{region}", region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = FleetConfig::default();
        assert_eq!(config.ssh.connect_timeout_secs, 5);
        assert_eq!(config.scout.test_timeout_secs, 120);
        assert_eq!(config.scout.reachability_workers, 10);
        assert!(config.models.is_none());
    }

    #[test]
    fn test_endpoint_templating() {
        let config = FleetConfig::default();
        assert_eq!(
            config.api_endpoint(None),
            "https://iaas.us-ashburn-1.oraclecloud.com/20160918"
        );
        assert_eq!(
            config.api_endpoint(Some("eu-frankfurt-1")),
            "https://iaas.eu-frankfurt-1.oraclecloud.com/20160918"
        );
    }

    #[test]
    fn test_load_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "ssh:\n  connect_timeout_secs: 7\n  user: ubuntu\nscout:\n  test_timeout_secs: 60\n  reachability_workers: 4\n  log_file: /tmp/nccl.log\n",
        )
        .unwrap();

        let config = FleetConfig::load_from_file(&path).unwrap();
        assert_eq!(config.ssh.connect_timeout_secs, 7);
        assert_eq!(config.ssh.user.as_deref(), Some("ubuntu"));
        assert_eq!(config.scout.test_timeout_secs, 60);
        assert_eq!(config.scout.reachability_workers, 4);
        assert_eq!(config.source(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.yaml");
        let config = FleetConfig::load(Some(&path)).unwrap();
        assert_eq!(config.scout.test_timeout_secs, 120);
    }

    #[test]
    fn test_catalog_override_roundtrip() {
        let yaml = "models:\n  - name: L40S\n    shapes: [\"BM.GPU.L40S.4\"]\n    threshold_gbps: 90.0\n    script: /opt/bench/nccl_l40s.sh\n";
        let config: FleetConfig = serde_yaml::from_str(yaml).unwrap();
        let models = config.models.unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "L40S");
    }
}
