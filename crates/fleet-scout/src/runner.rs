//! Pairwise benchmark execution
//!
//! Runs the model's all-reduce script for one host pair under a hard
//! timeout and extracts the bandwidth figure from its output. Every
//! failure mode (spawn error, timeout, non-zero exit, unparseable output)
//! degrades to `None` with a warning; a bad pair never stops the sweep.

use crate::parser::parse_bandwidth;
use fleet_core::config::ScoutConfig;
use fleet_core::{Host, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

/// Temporary hostfile handed to a benchmark script.
///
/// Lives in the system temp directory under a unique name and is removed
/// on drop, so a failed or timed-out run never leaks it.
#[derive(Debug)]
pub struct HostsFile {
    path: PathBuf,
}

impl HostsFile {
    /// Write a two-line hostfile for the pair
    pub fn create(a: &Host, b: &Host) -> Result<Self> {
        let path = std::env::temp_dir().join(format!("hosts_{}.txt", Uuid::new_v4()));
        std::fs::write(&path, format!("{}\n{}\n", a, b))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for HostsFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove hostfile");
            }
        }
    }
}

/// Runs one benchmark per call; cheap to clone into worker tasks
#[derive(Debug, Clone)]
pub struct PairTester {
    timeout: Duration,
    log_file: PathBuf,
}

impl PairTester {
    pub fn new(config: &ScoutConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.test_timeout_secs),
            log_file: config.log_file.clone(),
        }
    }

    /// Run the benchmark script for one pair and return the measured
    /// bandwidth in GB/s, or `None` when the run failed in any way.
    ///
    /// The script is invoked as `<script> 1 <hostfile>`. On timeout the
    /// child is killed. Successful runs have their full output appended
    /// to the log file; log write errors are warned about, never fatal.
    pub async fn run(&self, a: &Host, b: &Host, script: &Path) -> Option<f64> {
        let hosts_file = match HostsFile::create(a, b) {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %e, "failed to write hostfile for ({}, {})", a, b);
                return None;
            }
        };

        debug!(script = %script.display(), "testing pair ({}, {})", a, b);

        let child = Command::new(script)
            .arg("1")
            .arg(hosts_file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!(script = %script.display(), error = %e, "failed to launch benchmark");
                return None;
            }
        };

        // Dropping the unfinished future on timeout kills the child via
        // kill_on_drop.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(error = %e, "benchmark for ({}, {}) failed", a, b);
                return None;
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "benchmark for ({}, {}) timed out", a, b
                );
                return None;
            }
        };

        if !output.status.success() {
            warn!(
                exit_code = output.status.code().unwrap_or(-1),
                "benchmark for ({}, {}) exited non-zero", a, b
            );
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        self.append_log(a, b, &stdout);

        match parse_bandwidth(&stdout) {
            Some(bandwidth) => Some(bandwidth),
            None => {
                warn!("no bandwidth figure in benchmark output for ({}, {})", a, b);
                None
            }
        }
    }

    fn append_log(&self, a: &Host, b: &Host, stdout: &str) {
        let result = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .and_then(|mut file| writeln!(file, "=== ({}, {}) ===\n{}", a, b, stdout));
        if let Err(e) = result {
            warn!(log = %self.log_file.display(), error = %e, "failed to append benchmark log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn tester(dir: &TempDir, timeout_secs: u64) -> PairTester {
        PairTester::new(&ScoutConfig {
            test_timeout_secs: timeout_secs,
            reachability_workers: 10,
            parallel_tests: None,
            log_file: dir.path().join("nccl_test.log"),
        })
    }

    #[test]
    fn test_hosts_file_removed_on_drop() {
        let file = HostsFile::create(&Host::new("gpu-1"), &Host::new("gpu-2")).unwrap();
        let path = file.path().to_path_buf();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "gpu-1\ngpu-2\n");
        drop(file);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_successful_run_parses_bandwidth() {
        let dir = TempDir::new().unwrap();
        let script = write_script(
            &dir,
            "bench.sh",
            "echo '# header'\necho '8589934592 2147483648 float sum 41290 208.0 390.1 0'\n",
        );
        let tester = tester(&dir, 30);
        let bw = tester
            .run(&Host::new("gpu-1"), &Host::new("gpu-2"), &script)
            .await;
        assert_eq!(bw, Some(390.1));

        // Full output lands in the log
        let log = std::fs::read_to_string(dir.path().join("nccl_test.log")).unwrap();
        assert!(log.contains("390.1"));
        assert!(log.contains("(gpu-1, gpu-2)"));
    }

    #[tokio::test]
    async fn test_timeout_kills_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let recorded = dir.path().join("hostfile_path");
        let script = write_script(
            &dir,
            "slow.sh",
            &format!("echo \"$2\" > {}\nsleep 30\n", recorded.display()),
        );
        let tester = tester(&dir, 1);
        let bw = tester
            .run(&Host::new("gpu-1"), &Host::new("gpu-2"), &script)
            .await;
        assert_eq!(bw, None);

        // The hostfile the script saw must be gone after the run
        let hostfile = std::fs::read_to_string(&recorded).unwrap();
        assert!(!Path::new(hostfile.trim()).exists());
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_none() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "fail.sh", "echo 'a b 99.0 0'\nexit 3\n");
        let tester = tester(&dir, 30);
        let bw = tester
            .run(&Host::new("gpu-1"), &Host::new("gpu-2"), &script)
            .await;
        assert_eq!(bw, None);
    }

    #[tokio::test]
    async fn test_unparseable_output_is_none_but_logged() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "noise.sh", "echo 'NCCL failure on rank 3'\n");
        let tester = tester(&dir, 30);
        let bw = tester
            .run(&Host::new("gpu-1"), &Host::new("gpu-2"), &script)
            .await;
        assert_eq!(bw, None);
        let log = std::fs::read_to_string(dir.path().join("nccl_test.log")).unwrap();
        assert!(log.contains("NCCL failure"));
    }

    #[tokio::test]
    async fn test_missing_script_is_none() {
        let dir = TempDir::new().unwrap();
        let tester = tester(&dir, 30);
        let bw = tester
            .run(
                &Host::new("gpu-1"),
                &Host::new("gpu-2"),
                Path::new("/nonexistent/bench.sh"),
            )
            .await;
        assert_eq!(bw, None);
    }
}
