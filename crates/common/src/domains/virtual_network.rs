//! Virtual networks and their subnets
//!
//! Subnets live inside the network payload. The NSG a subnet points at is a
//! plain name; nothing checks that it exists.

use crate::store::ResourceStore;
use crate::types::{Domain, DomainKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VirtualNetworkStatus {
    Creating,
    Available,
    Updating,
    Failed,
}

impl std::fmt::Display for VirtualNetworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VirtualNetworkStatus::Creating => write!(f, "Creating"),
            VirtualNetworkStatus::Available => write!(f, "Available"),
            VirtualNetworkStatus::Updating => write!(f, "Updating"),
            VirtualNetworkStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    pub name: String,
    pub address_prefix: String,
    pub network_security_group: Option<String>,
}

impl Subnet {
    pub fn new(name: impl Into<String>, address_prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address_prefix: address_prefix.into(),
            network_security_group: None,
        }
    }

    pub fn with_nsg(mut self, nsg: impl Into<String>) -> Self {
        self.network_security_group = Some(nsg.into());
        self
    }
}

/// Virtual network payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkSpec {
    pub address_space: Vec<String>,
    pub subnets: Vec<Subnet>,
    pub dns_servers: Vec<String>,
    pub resource_group: String,
    pub location: String,
}

impl Default for VirtualNetworkSpec {
    fn default() -> Self {
        Self {
            address_space: vec!["10.0.0.0/16".to_string()],
            subnets: vec![Subnet::new("default", "10.0.0.0/24")],
            dns_servers: Vec::new(),
            resource_group: "default-group".to_string(),
            location: "East US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VirtualNetwork;

impl Domain for VirtualNetwork {
    type Spec = VirtualNetworkSpec;
    type Status = VirtualNetworkStatus;

    const KIND: DomainKind = DomainKind::VirtualNetwork;
    const ID_PREFIX: &'static str = "vnet";
    const TRANSIENT: VirtualNetworkStatus = VirtualNetworkStatus::Creating;
    const TERMINAL: VirtualNetworkStatus = VirtualNetworkStatus::Available;
    const PROVISION_DELAY: Duration = Duration::from_millis(3000);

    fn can_transition(from: VirtualNetworkStatus, to: VirtualNetworkStatus) -> bool {
        use VirtualNetworkStatus::*;
        matches!(
            (from, to),
            (Creating, Available | Failed) | (Available, Updating | Failed) | (Updating, Available | Failed)
        )
    }
}

impl ResourceStore<VirtualNetwork> {
    /// Append a subnet, replacing one with the same name
    pub fn add_subnet(&self, id: &str, subnet: Subnet) {
        self.update(id, |spec| {
            spec.subnets.retain(|s| s.name != subnet.name);
            spec.subnets.push(subnet);
        });
    }

    pub fn remove_subnet(&self, id: &str, name: &str) {
        self.update(id, |spec| spec.subnets.retain(|s| s.name != name));
    }
}
