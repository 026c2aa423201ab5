//! Sweep orchestration
//!
//! [`ScoutSession`] ties the pipeline together: host discovery,
//! reachability filtering, shape resolution, pairwise benchmarks under a
//! chosen execution strategy, classification, and the serial retest of bad
//! nodes against one known-good node.

use crate::classify::{classify, PairResults};
use crate::progress::Progress;
use crate::runner::PairTester;
use crate::shell::RemoteShell;
use crate::{hosts, prep, reach, shape};
use fleet_core::config::ScoutConfig;
use fleet_core::shapes::ShapeCatalog;
use fleet_core::{Error, Host, HostPair, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Where the candidate hosts come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSpec {
    /// Ask the local Slurm controller
    Slurm,
    /// Read a hostfile, one host per line
    File(PathBuf),
    /// Test exactly this pair, skipping discovery and reachability
    Pair(Host, Host),
}

impl HostSpec {
    /// Dispatch on positional arguments: none means Slurm discovery, one
    /// is a hostfile path, two are an explicit pair.
    pub fn from_args(args: &[String]) -> Result<Self> {
        match args {
            [] => Ok(HostSpec::Slurm),
            [file] => Ok(HostSpec::File(PathBuf::from(file))),
            [a, b] => Ok(HostSpec::Pair(Host::from(a.as_str()), Host::from(b.as_str()))),
            _ => Err(Error::config(format!(
                "expected 0, 1, or 2 host arguments, got {}",
                args.len()
            ))),
        }
    }
}

/// How the pairwise benchmarks are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// One benchmark at a time, in planning order
    Sequential,
    /// Up to `workers` benchmarks at once
    Parallel { workers: usize },
}

impl ExecutionStrategy {
    /// Parallel execution sized to the local machine
    pub fn parallel() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        ExecutionStrategy::Parallel { workers }
    }
}

/// Outcome of one pairwise benchmark
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairOutcome {
    pub pair: HostPair,

    /// Measured all-reduce bandwidth; `None` when the run failed
    pub bandwidth_gbps: Option<f64>,

    /// Threshold the pair was judged against
    pub threshold_gbps: f64,
}

impl PairOutcome {
    /// Whether the pair measured at or above its threshold
    pub fn passed(&self) -> bool {
        matches!(self.bandwidth_gbps, Some(bw) if bw >= self.threshold_gbps)
    }
}

/// Full result of one sweep
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoutReport {
    /// Per-pair outcomes, best bandwidth first, failed runs last
    pub outcomes: Vec<PairOutcome>,

    /// Hosts with at least one passing pair
    pub good_hosts: BTreeSet<Host>,

    /// Hosts with at least one failing pair; may overlap with good
    pub bad_hosts: BTreeSet<Host>,

    /// Serial retests of bad hosts against a known-good reference
    pub retests: Vec<PairOutcome>,

    /// Hosts dropped before testing (unresolvable shape or odd one out)
    pub skipped: Vec<Host>,
}

impl ScoutReport {
    pub fn good_pairs(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn bad_pairs(&self) -> usize {
        self.outcomes.len() - self.good_pairs()
    }

    pub fn max_bandwidth(&self) -> Option<f64> {
        self.outcomes
            .iter()
            .filter_map(|o| o.bandwidth_gbps)
            .reduce(f64::max)
    }

    pub fn min_bandwidth(&self) -> Option<f64> {
        self.outcomes
            .iter()
            .filter_map(|o| o.bandwidth_gbps)
            .reduce(f64::min)
    }

    fn sort_outcomes(&mut self) {
        self.outcomes.sort_by(|a, b| {
            match (a.bandwidth_gbps, b.bandwidth_gbps) {
                (Some(x), Some(y)) => y.total_cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then_with(|| a.pair.cmp(&b.pair))
        });
    }
}

/// One benchmark the planner decided to run
#[derive(Debug, Clone)]
struct PlannedPair {
    a: Host,
    b: Host,
    script: PathBuf,
    threshold: f64,
}

impl PlannedPair {
    fn pair(&self) -> HostPair {
        HostPair::new(self.a.clone(), self.b.clone())
    }
}

/// One sweep over a set of candidate hosts
pub struct ScoutSession {
    shell: Arc<dyn RemoteShell>,
    catalog: ShapeCatalog,
    tester: PairTester,
    config: ScoutConfig,
}

impl ScoutSession {
    pub fn new(shell: Arc<dyn RemoteShell>, catalog: ShapeCatalog, config: &ScoutConfig) -> Self {
        Self {
            shell,
            catalog,
            tester: PairTester::new(config),
            config: config.clone(),
        }
    }

    /// Run the sweep end to end
    pub async fn run(&self, spec: HostSpec, strategy: ExecutionStrategy) -> Result<ScoutReport> {
        prep::prepare(&self.catalog).await;

        let candidates = match spec {
            HostSpec::Pair(a, b) => return self.run_single_pair(a, b).await,
            HostSpec::Slurm => hosts::hosts_from_slurm().await?,
            HostSpec::File(path) => hosts::hosts_from_file(&path).await?,
        };
        if candidates.is_empty() {
            return Err(Error::config("no candidate hosts found"));
        }

        let reachable = reach::check_hosts(
            Arc::clone(&self.shell),
            &candidates,
            self.config.reachability_workers,
        )
        .await;
        if reachable.len() < 2 {
            return Err(Error::ssh(format!(
                "need at least 2 reachable hosts to test, found {}",
                reachable.len()
            )));
        }

        let (planned, mut report, host_info) = self.plan_pairs(&reachable).await;
        if planned.is_empty() {
            warn!("no testable pairs after shape resolution");
            return Ok(report);
        }

        info!(
            pairs = planned.len(),
            strategy = ?strategy,
            "starting pairwise bandwidth tests"
        );
        let results = match strategy {
            ExecutionStrategy::Sequential => self.run_sequential(&planned).await,
            ExecutionStrategy::Parallel { workers } => {
                self.run_parallel(planned.clone(), workers).await
            }
        };

        let thresholds: HashMap<HostPair, f64> = planned
            .iter()
            .map(|p| (p.pair(), p.threshold))
            .collect();

        for p in &planned {
            report.outcomes.push(PairOutcome {
                pair: p.pair(),
                bandwidth_gbps: results.get(&p.pair()),
                threshold_gbps: p.threshold,
            });
        }
        report.sort_outcomes();

        let classification = classify(&results, &thresholds);
        report.good_hosts = classification.good.clone();
        report.bad_hosts = classification.bad.clone();

        report.retests = self.retest_bad_nodes(&classification, &host_info).await;
        Ok(report)
    }

    /// Test one explicit pair; the first host's shape picks the script
    /// and threshold for both.
    async fn run_single_pair(&self, a: Host, b: Host) -> Result<ScoutReport> {
        let model = shape::resolve_model(self.shell.as_ref(), &self.catalog, &a)
            .await
            .ok_or_else(|| Error::config(format!("unable to resolve GPU model for {}", a)))?;
        let script = model.script.clone();
        let threshold = model.threshold_gbps;

        let bandwidth = self.tester.run(&a, &b, &script).await;
        let outcome = PairOutcome {
            pair: HostPair::new(a.clone(), b.clone()),
            bandwidth_gbps: bandwidth,
            threshold_gbps: threshold,
        };

        let mut report = ScoutReport::default();
        let bucket = if outcome.passed() {
            &mut report.good_hosts
        } else {
            &mut report.bad_hosts
        };
        bucket.insert(a);
        bucket.insert(b);
        report.outcomes.push(outcome);
        Ok(report)
    }

    /// Pair adjacent reachable hosts and resolve each pair's script and
    /// threshold. A pair is skipped when either member's shape cannot be
    /// resolved; an odd host count leaves the last host out.
    async fn plan_pairs(
        &self,
        reachable: &[Host],
    ) -> (Vec<PlannedPair>, ScoutReport, HashMap<Host, (PathBuf, f64)>) {
        let mut planned = Vec::new();
        let mut report = ScoutReport::default();
        let mut host_info = HashMap::new();

        for chunk in reachable.chunks(2) {
            let [a, b] = chunk else {
                info!(host = %chunk[0], "odd host count, host sits this sweep out");
                report.skipped.push(chunk[0].clone());
                continue;
            };

            let model_a = shape::resolve_model(self.shell.as_ref(), &self.catalog, a).await;
            let model_b = shape::resolve_model(self.shell.as_ref(), &self.catalog, b).await;
            let (Some(model_a), Some(model_b)) = (model_a, model_b) else {
                info!("skipping pair ({}, {}): unresolvable shape", a, b);
                report.skipped.push(a.clone());
                report.skipped.push(b.clone());
                continue;
            };

            host_info.insert(a.clone(), (model_a.script.clone(), model_a.threshold_gbps));
            host_info.insert(b.clone(), (model_b.script.clone(), model_b.threshold_gbps));

            // Mixed-model pairs are judged against the lower bar
            planned.push(PlannedPair {
                a: a.clone(),
                b: b.clone(),
                script: model_a.script.clone(),
                threshold: model_a.threshold_gbps.min(model_b.threshold_gbps),
            });
        }

        (planned, report, host_info)
    }

    async fn run_sequential(&self, planned: &[PlannedPair]) -> PairResults {
        let progress = Progress::new("Testing pairs", planned.len());
        let mut results = PairResults::new();
        for p in planned {
            if let Some(bandwidth) = self.tester.run(&p.a, &p.b, &p.script).await {
                results.record(p.pair(), bandwidth);
            }
            progress.tick().await;
        }
        results
    }

    async fn run_parallel(&self, planned: Vec<PlannedPair>, workers: usize) -> PairResults {
        let progress = Arc::new(Progress::new("Testing pairs", planned.len()));
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let mut tasks = JoinSet::new();

        for p in planned {
            let tester = self.tester.clone();
            let progress = Arc::clone(&progress);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // Semaphore is never closed, acquire cannot fail
                let _permit = semaphore.acquire().await;
                let bandwidth = tester.run(&p.a, &p.b, &p.script).await;
                progress.tick().await;
                (p.pair(), bandwidth)
            });
        }

        let mut results = PairResults::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((pair, Some(bandwidth))) => {
                    results.record(pair, bandwidth);
                }
                Ok((_, None)) => {}
                Err(e) => warn!(error = %e, "benchmark task failed"),
            }
        }
        results
    }

    /// Retest every bad host against one known-good reference, serially.
    ///
    /// A host that fails against a good partner is condemned with more
    /// confidence than one that only failed next to another suspect.
    async fn retest_bad_nodes(
        &self,
        classification: &crate::classify::Classification,
        host_info: &HashMap<Host, (PathBuf, f64)>,
    ) -> Vec<PairOutcome> {
        let Some(reference) = classification.good.iter().next() else {
            if !classification.bad.is_empty() {
                warn!("no known-good host available for retesting");
            }
            return Vec::new();
        };

        let mut retests = Vec::new();
        for bad in &classification.bad {
            if bad == reference {
                continue;
            }
            let Some((script, bad_threshold)) = host_info.get(bad) else {
                continue;
            };
            let reference_threshold = host_info
                .get(reference)
                .map(|(_, t)| *t)
                .unwrap_or(*bad_threshold);

            info!(host = %bad, reference = %reference, "retesting against known-good host");
            let bandwidth = self.tester.run(reference, bad, script).await;
            let outcome = PairOutcome {
                pair: HostPair::new(reference.clone(), bad.clone()),
                bandwidth_gbps: bandwidth,
                threshold_gbps: bad_threshold.min(reference_threshold),
            };
            if outcome.passed() {
                info!(host = %bad, "host passed retest");
            } else {
                warn!(host = %bad, "host failed retest against a good partner");
            }
            retests.push(outcome);
        }
        retests
    }
}
