//! # fleet-scout
//!
//! Pairwise NCCL bandwidth scouting for GPU clusters.
//!
//! The scout composes, in order:
//! - SSH reachability probing across the candidate hosts, bounded by a
//!   worker pool ([`reach::check_hosts`])
//! - hardware shape resolution through the instance metadata service
//!   ([`shape`])
//! - a timed all-reduce benchmark per host pair, with the bandwidth
//!   figure extracted by a narrow line parser ([`runner`], [`parser`])
//! - good/bad classification against per-GPU-model thresholds and a
//!   serial retest of bad nodes against one known-good node
//!   ([`classify`])
//!
//! Everything below the session layer degrades gracefully: an unreachable
//! host, an unrecognized shape, or a failed benchmark excludes that host
//! or pair and the sweep continues.

pub mod classify;
pub mod hosts;
pub mod parser;
pub mod prep;
pub mod progress;
pub mod reach;
pub mod runner;
pub mod session;
pub mod shape;
pub mod shell;

pub use classify::{classify, Classification, PairResults};
pub use parser::parse_bandwidth;
pub use runner::{HostsFile, PairTester};
pub use session::{ExecutionStrategy, HostSpec, PairOutcome, ScoutReport, ScoutSession};
pub use shell::{CommandOutput, RemoteShell, SshShell, StaticShell};

pub use fleet_core::{Error, Result};
