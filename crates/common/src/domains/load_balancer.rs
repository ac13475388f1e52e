//! Load balancers

use crate::store::ResourceStore;
use crate::types::{Domain, DomainKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadBalancerStatus {
    Creating,
    Active,
    Updating,
    Failed,
}

impl std::fmt::Display for LoadBalancerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadBalancerStatus::Creating => write!(f, "Creating"),
            LoadBalancerStatus::Active => write!(f, "Active"),
            LoadBalancerStatus::Updating => write!(f, "Updating"),
            LoadBalancerStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadBalancerKind {
    Public,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancingRule {
    pub name: String,
    pub protocol: String,
    pub frontend_port: u16,
    pub backend_port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthProbe {
    pub protocol: String,
    pub port: u16,
    pub path: Option<String>,
    pub interval_secs: u32,
}

/// Load balancer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerSpec {
    pub sku: String,
    pub kind: LoadBalancerKind,
    /// Public IP name or private address of the frontend
    pub frontend_ip: Option<String>,
    /// Backend member names
    pub backend_pool: Vec<String>,
    pub rules: Vec<LoadBalancingRule>,
    pub health_probe: Option<HealthProbe>,
    pub resource_group: String,
    pub location: String,
}

impl Default for LoadBalancerSpec {
    fn default() -> Self {
        Self {
            sku: "Standard".to_string(),
            kind: LoadBalancerKind::Public,
            frontend_ip: None,
            backend_pool: Vec::new(),
            rules: vec![LoadBalancingRule {
                name: "http".to_string(),
                protocol: "TCP".to_string(),
                frontend_port: 80,
                backend_port: 80,
            }],
            health_probe: Some(HealthProbe {
                protocol: "HTTP".to_string(),
                port: 80,
                path: Some("/".to_string()),
                interval_secs: 15,
            }),
            resource_group: "default-group".to_string(),
            location: "East US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LoadBalancer;

impl Domain for LoadBalancer {
    type Spec = LoadBalancerSpec;
    type Status = LoadBalancerStatus;

    const KIND: DomainKind = DomainKind::LoadBalancer;
    const ID_PREFIX: &'static str = "lb";
    const TRANSIENT: LoadBalancerStatus = LoadBalancerStatus::Creating;
    const TERMINAL: LoadBalancerStatus = LoadBalancerStatus::Active;
    const PROVISION_DELAY: Duration = Duration::from_millis(3000);

    fn can_transition(from: LoadBalancerStatus, to: LoadBalancerStatus) -> bool {
        use LoadBalancerStatus::*;
        matches!(
            (from, to),
            (Creating, Active | Failed) | (Active, Updating | Failed) | (Updating, Active | Failed)
        )
    }
}

impl ResourceStore<LoadBalancer> {
    pub fn add_backend(&self, id: &str, member: &str) {
        self.update(id, |spec| {
            if !spec.backend_pool.iter().any(|m| m == member) {
                spec.backend_pool.push(member.to_string());
            }
        });
    }

    pub fn remove_backend(&self, id: &str, member: &str) {
        self.update(id, |spec| spec.backend_pool.retain(|m| m != member));
    }
}
