//! # fleet-cloud
//!
//! Cloud provider API surface for fleetops.
//!
//! This crate provides:
//! - Async traits for the compute and identity operations the tools need
//!   ([`ComputeApi`], [`IdentityApi`])
//! - A reqwest-backed REST client with list pagination ([`CloudClient`])
//! - An in-memory mock for tests ([`MockCloud`])
//! - Capacity-topology report computation ([`TopologyReport`])
//! - Unhealthy-instance tagging and tag-namespace check/setup
//!
//! All cloud API failures are fatal: the caller is expected to abort with
//! a non-zero exit rather than continue on partial results.

pub mod api;
pub mod client;
pub mod mock;
pub mod models;
pub mod tags;
pub mod topology;

pub use api::{ComputeApi, IdentityApi};
pub use client::CloudClient;
pub use mock::MockCloud;
pub use models::{Instance, TagNamespaceSummary, TagSummary};
pub use tags::{check_tag_setup, setup_tags, tag_unhealthy, TAG_KEY, TAG_NAMESPACE, TAG_VALUE};
pub use topology::{run_report, AttentionHost, TopologyReport};

pub use fleet_core::{Error, Result};
