//! Core type definitions for fleetops

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cluster host, addressed by hostname or IP
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Host(String);

impl Host {
    /// Create a new Host from a string
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the string representation of the host
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Host {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for Host {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// An unordered pair of hosts, used to key bandwidth test results.
///
/// The constructor normalizes member order, so `(a, b)` and `(b, a)`
/// compare and hash identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostPair(Host, Host);

impl HostPair {
    /// Create a pair; member order is normalized
    pub fn new(a: Host, b: Host) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// First member (in normalized order)
    pub fn first(&self) -> &Host {
        &self.0
    }

    /// Second member (in normalized order)
    pub fn second(&self) -> &Host {
        &self.1
    }

    /// Whether the given host is a member of this pair
    pub fn contains(&self, host: &Host) -> bool {
        &self.0 == host || &self.1 == host
    }
}

impl fmt::Display for HostPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// Raw lifecycle state of a bare-metal host, as reported by the
/// capacity-topology API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    #[serde(rename = "AVAILABLE")]
    Available,
    #[serde(rename = "DEGRADED")]
    Degraded,
    #[serde(rename = "UNAVAILABLE")]
    Unavailable,
    #[serde(rename = "IN_REPAIR")]
    InRepair,
    /// States this tool does not classify; carried through verbatim
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Available => write!(f, "AVAILABLE"),
            LifecycleState::Degraded => write!(f, "DEGRADED"),
            LifecycleState::Unavailable => write!(f, "UNAVAILABLE"),
            LifecycleState::InRepair => write!(f, "IN_REPAIR"),
            LifecycleState::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Status derived from (raw lifecycle state, instance attachment)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DerivedStatus {
    /// Host is available with no instance assigned
    #[serde(rename = "AVAILABLE")]
    Available,
    /// Host is available and an instance is running on it
    #[serde(rename = "RUNNING")]
    Running,
    /// Host is degraded while an instance is still assigned
    #[serde(rename = "RUNNING_DEGRADED")]
    RunningDegraded,
    /// Host is degraded with no instance assigned
    #[serde(rename = "UNAVAILABLE_DEGRADED")]
    UnavailableDegraded,
    /// Host is undergoing repair
    #[serde(rename = "IN_REPAIR")]
    InRepair,
    /// Host is out of service
    #[serde(rename = "UNAVAILABLE")]
    Unavailable,
    /// Unclassified provider state, carried through verbatim
    #[serde(untagged)]
    Other(String),
}

impl DerivedStatus {
    /// Reclassify a raw lifecycle state using host occupancy.
    ///
    /// This is a pure function of its two inputs; the same
    /// (state, attachment) always yields the same status.
    pub fn derive(state: &LifecycleState, has_instance: bool) -> Self {
        match (state, has_instance) {
            (LifecycleState::Available, true) => DerivedStatus::Running,
            (LifecycleState::Available, false) => DerivedStatus::Available,
            (LifecycleState::Degraded, true) => DerivedStatus::RunningDegraded,
            (LifecycleState::Degraded, false) => DerivedStatus::UnavailableDegraded,
            (LifecycleState::InRepair, _) => DerivedStatus::InRepair,
            (LifecycleState::Unavailable, _) => DerivedStatus::Unavailable,
            (LifecycleState::Other(s), _) => DerivedStatus::Other(s.clone()),
        }
    }

    /// Whether hosts in this status belong on the attention list
    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            DerivedStatus::RunningDegraded
                | DerivedStatus::UnavailableDegraded
                | DerivedStatus::InRepair
        )
    }
}

impl fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivedStatus::Available => write!(f, "AVAILABLE"),
            DerivedStatus::Running => write!(f, "RUNNING"),
            DerivedStatus::RunningDegraded => write!(f, "RUNNING_DEGRADED"),
            DerivedStatus::UnavailableDegraded => write!(f, "UNAVAILABLE_DEGRADED"),
            DerivedStatus::InRepair => write!(f, "IN_REPAIR"),
            DerivedStatus::Unavailable => write!(f, "UNAVAILABLE"),
            DerivedStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A bare-metal host record from the capacity-topology API.
///
/// Read-only snapshot per report run; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BareMetalHost {
    /// Host OCID
    pub id: String,

    /// Raw lifecycle state
    pub lifecycle_details: LifecycleState,

    /// OCID of the attached compute instance, if any
    pub instance_id: Option<String>,

    /// Hardware shape of the attached instance, if any
    pub instance_shape: Option<String>,
}

impl BareMetalHost {
    /// Derived status for this record
    pub fn derived_status(&self) -> DerivedStatus {
        DerivedStatus::derive(&self.lifecycle_details, self.instance_id.is_some())
    }
}
