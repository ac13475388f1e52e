//! Public IP addresses
//!
//! The address itself only exists once provisioning completes.

use crate::store::ResourceStore;
use crate::types::{Domain, DomainKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicIpStatus {
    Creating,
    Unassociated,
    Associated,
    Failed,
}

impl std::fmt::Display for PublicIpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublicIpStatus::Creating => write!(f, "Creating"),
            PublicIpStatus::Unassociated => write!(f, "Unassociated"),
            PublicIpStatus::Associated => write!(f, "Associated"),
            PublicIpStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Allocation {
    Static,
    Dynamic,
}

/// Public IP payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpSpec {
    pub sku: String,
    pub allocation: Allocation,
    pub ip_version: String,
    pub dns_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Name of the resource using the address
    pub associated_to: Option<String>,
    pub resource_group: String,
    pub location: String,
}

impl Default for PublicIpSpec {
    fn default() -> Self {
        Self {
            sku: "Standard".to_string(),
            allocation: Allocation::Static,
            ip_version: "IPv4".to_string(),
            dns_label: None,
            ip_address: None,
            associated_to: None,
            resource_group: "default-group".to_string(),
            location: "East US".to_string(),
        }
    }
}

/// Random unicast address: first octet in 1..=223, last in 1..=254
pub fn random_public_address() -> Ipv4Addr {
    let mut rng = rand::thread_rng();
    Ipv4Addr::new(
        rng.gen_range(1..=223),
        rng.gen(),
        rng.gen(),
        rng.gen_range(1..=254),
    )
}

#[derive(Debug, Clone, Copy)]
pub struct PublicIp;

impl Domain for PublicIp {
    type Spec = PublicIpSpec;
    type Status = PublicIpStatus;

    const KIND: DomainKind = DomainKind::PublicIp;
    const ID_PREFIX: &'static str = "pip";
    const TRANSIENT: PublicIpStatus = PublicIpStatus::Creating;
    const TERMINAL: PublicIpStatus = PublicIpStatus::Unassociated;
    const PROVISION_DELAY: Duration = Duration::from_millis(2000);

    fn provisioned(spec: &mut PublicIpSpec) {
        if spec.ip_address.is_none() {
            spec.ip_address = Some(random_public_address().to_string());
        }
    }

    fn can_transition(from: PublicIpStatus, to: PublicIpStatus) -> bool {
        use PublicIpStatus::*;
        matches!(
            (from, to),
            (Creating, Unassociated | Failed) | (Unassociated, Associated) | (Associated, Unassociated)
        )
    }
}

impl ResourceStore<PublicIp> {
    pub fn associate(&self, id: &str, target: &str) {
        if !self.contains(id) {
            return;
        }
        self.update(id, |spec| spec.associated_to = Some(target.to_string()));
        self.update_status(id, PublicIpStatus::Associated);
    }

    pub fn dissociate(&self, id: &str) {
        if !self.contains(id) {
            return;
        }
        self.update(id, |spec| spec.associated_to = None);
        self.update_status(id, PublicIpStatus::Unassociated);
    }
}
