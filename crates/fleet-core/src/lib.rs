//! # fleet-core
//!
//! Core types, traits, and utilities for fleetops - an operations toolkit
//! for bare-metal GPU compute clusters.
//!
//! This crate provides the foundational pieces shared across the other
//! fleetops components:
//!
//! - Host and host-pair identifiers used by the scouting engine
//! - Lifecycle states and the derived-status reclassification rules for
//!   capacity-topology reporting
//! - The GPU shape catalog (shape string -> model, bandwidth threshold,
//!   benchmark script)
//! - Configuration schema and file loading
//! - Error handling types and utilities

pub mod config;
pub mod error;
pub mod shapes;
pub mod types;

// Re-export commonly used types at the crate root
pub use config::{CloudConfig, FleetConfig, ScoutConfig, SshConfig};
pub use error::{Error, Result};
pub use shapes::{GpuModel, ShapeCatalog};
pub use types::{BareMetalHost, DerivedStatus, Host, HostPair, LifecycleState};
