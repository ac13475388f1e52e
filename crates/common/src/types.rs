//! Core types for CloudSim

use crate::Error;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::str::FromStr;
use std::time::Duration;

/// The eight simulated resource domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainKind {
    VirtualMachine,
    Database,
    StorageAccount,
    Disk,
    VirtualNetwork,
    NetworkSecurityGroup,
    LoadBalancer,
    PublicIp,
}

impl DomainKind {
    pub const ALL: [DomainKind; 8] = [
        DomainKind::VirtualMachine,
        DomainKind::Database,
        DomainKind::StorageAccount,
        DomainKind::Disk,
        DomainKind::VirtualNetwork,
        DomainKind::NetworkSecurityGroup,
        DomainKind::LoadBalancer,
        DomainKind::PublicIp,
    ];

    /// Canonical kebab-case name, as used in config files and on the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainKind::VirtualMachine => "virtual-machine",
            DomainKind::Database => "database",
            DomainKind::StorageAccount => "storage-account",
            DomainKind::Disk => "disk",
            DomainKind::VirtualNetwork => "virtual-network",
            DomainKind::NetworkSecurityGroup => "network-security-group",
            DomainKind::LoadBalancer => "load-balancer",
            DomainKind::PublicIp => "public-ip",
        }
    }
}

impl Display for DomainKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "virtual-machine" | "vm" | "vms" => DomainKind::VirtualMachine,
            "database" | "db" | "databases" => DomainKind::Database,
            "storage-account" | "storage" | "sa" => DomainKind::StorageAccount,
            "disk" | "disks" => DomainKind::Disk,
            "virtual-network" | "vnet" | "network" => DomainKind::VirtualNetwork,
            "network-security-group" | "nsg" => DomainKind::NetworkSecurityGroup,
            "load-balancer" | "lb" => DomainKind::LoadBalancer,
            "public-ip" | "pip" => DomainKind::PublicIp,
            _ => return Err(Error::UnknownDomain(s.to_string())),
        };
        Ok(kind)
    }
}

/// Binds a payload shape and a status enum to the lifecycle constants of one
/// resource domain. Implemented by zero-sized marker types.
pub trait Domain: Debug + Clone + Send + Sync + 'static {
    type Spec: Debug + Clone + Default + Send + Sync + Serialize + DeserializeOwned + 'static;
    type Status: Debug + Display + Copy + Eq + Send + Sync + Serialize + DeserializeOwned + 'static;

    const KIND: DomainKind;
    const ID_PREFIX: &'static str;
    /// Status assigned by `create`
    const TRANSIENT: Self::Status;
    /// Status the lifecycle simulator settles a new resource into
    const TERMINAL: Self::Status;
    const PROVISION_DELAY: Duration;

    /// Fills fields derived at creation time (endpoints, connection strings).
    fn prepare(_name: &str, _spec: &mut Self::Spec) {}

    /// Fills fields that only exist once provisioning completes.
    fn provisioned(_spec: &mut Self::Spec) {}

    /// Allowed explicit transitions. Only consulted by `ResourceStore::transition`.
    fn can_transition(_from: Self::Status, _to: Self::Status) -> bool {
        true
    }
}

/// One simulated cloud asset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Resource<D: Domain> {
    pub id: String,
    pub name: String,
    pub status: D::Status,
    pub created: DateTime<Utc>,
    #[serde(flatten)]
    pub spec: D::Spec,
}

impl<D: Domain> Resource<D> {
    pub fn kind(&self) -> DomainKind {
        D::KIND
    }
}

/// Change notification published by a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceEvent {
    pub kind: DomainKind,
    pub id: String,
    pub change: Change,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Change {
    Created { status: String },
    StatusChanged { from: String, to: String },
    Updated,
    Deleted,
}
