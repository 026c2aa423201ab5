//! GPU shape catalog
//!
//! Maps provider hardware shape strings to a GPU model name, the expected
//! all-reduce bandwidth threshold, and the benchmark script that exercises
//! that model. The catalog is an explicitly constructed value passed to the
//! operations that need it; there is no process-wide table.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A supported GPU model and its benchmark parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuModel {
    /// Model name, e.g. "H100"
    pub name: String,

    /// Provider shape strings that carry this model
    pub shapes: Vec<String>,

    /// Minimum acceptable all-reduce bandwidth in GB/s
    pub threshold_gbps: f64,

    /// Benchmark script to run for this model
    pub script: PathBuf,
}

/// Catalog of supported GPU models, keyed by shape string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeCatalog {
    models: Vec<GpuModel>,
}

impl Default for ShapeCatalog {
    fn default() -> Self {
        Self {
            models: vec![
                GpuModel {
                    name: "A100".to_string(),
                    shapes: vec!["BM.GPU.B4.8".to_string(), "BM.GPU.A100-v2.8".to_string()],
                    threshold_gbps: 185.0,
                    script: PathBuf::from("/opt/oci-hpc/samples/gpu/nccl_run_allreduce.sh"),
                },
                GpuModel {
                    name: "H100".to_string(),
                    shapes: vec!["BM.GPU.H100.8".to_string()],
                    threshold_gbps: 365.0,
                    script: PathBuf::from(
                        "/opt/oci-hpc/samples/gpu/nccl_run_allreduce_H100_200.sh",
                    ),
                },
                GpuModel {
                    name: "H200".to_string(),
                    shapes: vec!["BM.GPU.H200.8".to_string()],
                    threshold_gbps: 365.0,
                    script: PathBuf::from(
                        "/opt/oci-hpc/samples/gpu/nccl_run_allreduce_H100_200.sh",
                    ),
                },
            ],
        }
    }
}

impl ShapeCatalog {
    /// Build a catalog from an explicit model list
    pub fn new(models: Vec<GpuModel>) -> Self {
        Self { models }
    }

    /// Look up the model for a shape string
    pub fn resolve(&self, shape: &str) -> Option<&GpuModel> {
        self.models
            .iter()
            .find(|m| m.shapes.iter().any(|s| s == shape))
    }

    /// All models in the catalog
    pub fn models(&self) -> &[GpuModel] {
        &self.models
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_resolves_known_shapes() {
        let catalog = ShapeCatalog::default();

        let a100 = catalog.resolve("BM.GPU.B4.8").unwrap();
        assert_eq!(a100.name, "A100");
        assert_eq!(a100.threshold_gbps, 185.0);

        let a100_v2 = catalog.resolve("BM.GPU.A100-v2.8").unwrap();
        assert_eq!(a100_v2.name, "A100");

        let h100 = catalog.resolve("BM.GPU.H100.8").unwrap();
        assert_eq!(h100.name, "H100");
        assert_eq!(h100.threshold_gbps, 365.0);

        let h200 = catalog.resolve("BM.GPU.H200.8").unwrap();
        assert_eq!(h200.name, "H200");
        // H200 runs the same benchmark script as H100
        assert_eq!(h200.script, h100.script);
    }

    #[test]
    fn test_unknown_shape_is_none() {
        let catalog = ShapeCatalog::default();
        assert!(catalog.resolve("BM.Standard.E4.128").is_none());
        assert!(catalog.resolve("").is_none());
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = ShapeCatalog::new(vec![GpuModel {
            name: "B200".to_string(),
            shapes: vec!["BM.GPU.B200.8".to_string()],
            threshold_gbps: 700.0,
            script: PathBuf::from("/opt/bench/nccl_b200.sh"),
        }]);
        assert!(catalog.resolve("BM.GPU.B200.8").is_some());
        assert!(catalog.resolve("BM.GPU.H100.8").is_none());
    }
}
