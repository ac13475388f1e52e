//! Storage accounts

use crate::types::{Domain, DomainKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageAccountStatus {
    Creating,
    Available,
    Updating,
    Failed,
}

impl std::fmt::Display for StorageAccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageAccountStatus::Creating => write!(f, "Creating"),
            StorageAccountStatus::Available => write!(f, "Available"),
            StorageAccountStatus::Updating => write!(f, "Updating"),
            StorageAccountStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Storage account payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountSpec {
    pub kind: String,
    pub performance: String,
    pub replication: String,
    pub access_tier: String,
    pub resource_group: String,
    pub location: String,
    pub primary_endpoint: Option<String>,
}

impl Default for StorageAccountSpec {
    fn default() -> Self {
        Self {
            kind: "StorageV2".to_string(),
            performance: "Standard".to_string(),
            replication: "LRS".to_string(),
            access_tier: "Hot".to_string(),
            resource_group: "default-group".to_string(),
            location: "East US".to_string(),
            primary_endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StorageAccount;

impl Domain for StorageAccount {
    type Spec = StorageAccountSpec;
    type Status = StorageAccountStatus;

    const KIND: DomainKind = DomainKind::StorageAccount;
    const ID_PREFIX: &'static str = "sa";
    const TRANSIENT: StorageAccountStatus = StorageAccountStatus::Creating;
    const TERMINAL: StorageAccountStatus = StorageAccountStatus::Available;
    const PROVISION_DELAY: Duration = Duration::from_millis(3000);

    fn prepare(name: &str, spec: &mut StorageAccountSpec) {
        spec.primary_endpoint = Some(format!("https://{}.blob.core.windows.net/", name));
    }

    fn can_transition(from: StorageAccountStatus, to: StorageAccountStatus) -> bool {
        use StorageAccountStatus::*;
        matches!(
            (from, to),
            (Creating, Available | Failed) | (Available, Updating | Failed) | (Updating, Available | Failed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_endpoint() {
        let mut spec = StorageAccountSpec::default();
        StorageAccount::prepare("assets01", &mut spec);
        assert_eq!(
            spec.primary_endpoint.as_deref(),
            Some("https://assets01.blob.core.windows.net/")
        );
    }
}
