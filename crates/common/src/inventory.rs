//! Inventory: one store per domain for a simulated account

use crate::config::SimulatorConfig;
use crate::domains::*;
use crate::store::ResourceStore;
use crate::types::{Domain, DomainKind, ResourceEvent};
use crate::{seed, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// All resource stores of one simulated account.
///
/// Built once per application and handed to consumers by clone; clones share
/// the same stores.
#[derive(Clone)]
pub struct Inventory {
    config: Arc<SimulatorConfig>,
    pub vms: ResourceStore<VirtualMachine>,
    pub databases: ResourceStore<Database>,
    pub storage_accounts: ResourceStore<StorageAccount>,
    pub disks: ResourceStore<Disk>,
    pub virtual_networks: ResourceStore<VirtualNetwork>,
    pub network_security_groups: ResourceStore<NetworkSecurityGroup>,
    pub load_balancers: ResourceStore<LoadBalancer>,
    pub public_ips: ResourceStore<PublicIp>,
}

/// Per-domain counts
#[derive(Debug, Clone, Serialize)]
pub struct DomainSummary {
    pub kind: DomainKind,
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
}

fn store<D: Domain>(config: &SimulatorConfig, ids: &Arc<dyn crate::ids::IdGenerator>) -> Result<ResourceStore<D>> {
    ResourceStore::with_options(config.store_options::<D>(Arc::clone(ids)))
}

fn summarize<D: Domain>(store: &ResourceStore<D>) -> DomainSummary {
    let mut by_status = BTreeMap::new();
    let records = store.list();
    for record in &records {
        *by_status.entry(record.status.to_string()).or_insert(0) += 1;
    }
    DomainSummary {
        kind: D::KIND,
        total: records.len(),
        by_status,
    }
}

impl Inventory {
    /// Build the stores and, when configured, load the mock inventory.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        let ids = config.id_generator();

        let inventory = Self {
            vms: store(&config, &ids)?,
            databases: store(&config, &ids)?,
            storage_accounts: store(&config, &ids)?,
            disks: store(&config, &ids)?,
            virtual_networks: store(&config, &ids)?,
            network_security_groups: store(&config, &ids)?,
            load_balancers: store(&config, &ids)?,
            public_ips: store(&config, &ids)?,
            config: Arc::new(config),
        };

        if inventory.config.seed {
            seed::load(&inventory);
            info!("Loaded mock inventory ({} resources)", inventory.total());
        }

        Ok(inventory)
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Restart a VM using the configured restart delay
    pub fn restart_vm(&self, id: &str) {
        self.vms.restart_after(id, self.config.restart_delay());
    }

    pub fn total(&self) -> usize {
        self.summary().iter().map(|s| s.total).sum()
    }

    pub fn summary(&self) -> Vec<DomainSummary> {
        DomainKind::ALL.iter().map(|kind| self.summarize(*kind)).collect()
    }

    pub fn summarize(&self, kind: DomainKind) -> DomainSummary {
        match kind {
            DomainKind::VirtualMachine => summarize(&self.vms),
            DomainKind::Database => summarize(&self.databases),
            DomainKind::StorageAccount => summarize(&self.storage_accounts),
            DomainKind::Disk => summarize(&self.disks),
            DomainKind::VirtualNetwork => summarize(&self.virtual_networks),
            DomainKind::NetworkSecurityGroup => summarize(&self.network_security_groups),
            DomainKind::LoadBalancer => summarize(&self.load_balancers),
            DomainKind::PublicIp => summarize(&self.public_ips),
        }
    }

    pub fn subscribe(&self, kind: DomainKind) -> broadcast::Receiver<ResourceEvent> {
        match kind {
            DomainKind::VirtualMachine => self.vms.subscribe(),
            DomainKind::Database => self.databases.subscribe(),
            DomainKind::StorageAccount => self.storage_accounts.subscribe(),
            DomainKind::Disk => self.disks.subscribe(),
            DomainKind::VirtualNetwork => self.virtual_networks.subscribe(),
            DomainKind::NetworkSecurityGroup => self.network_security_groups.subscribe(),
            DomainKind::LoadBalancer => self.load_balancers.subscribe(),
            DomainKind::PublicIp => self.public_ips.subscribe(),
        }
    }

    /// Delete by kind and id. Unknown ids are ignored.
    pub fn delete(&self, kind: DomainKind, id: &str) {
        match kind {
            DomainKind::VirtualMachine => self.vms.delete(id),
            DomainKind::Database => self.databases.delete(id),
            DomainKind::StorageAccount => self.storage_accounts.delete(id),
            DomainKind::Disk => self.disks.delete(id),
            DomainKind::VirtualNetwork => self.virtual_networks.delete(id),
            DomainKind::NetworkSecurityGroup => self.network_security_groups.delete(id),
            DomainKind::LoadBalancer => self.load_balancers.delete(id),
            DomainKind::PublicIp => self.public_ips.delete(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unseeded() -> SimulatorConfig {
        SimulatorConfig {
            seed: false,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_inventory() {
        let inventory = Inventory::new(SimulatorConfig::default()).unwrap();
        assert_eq!(inventory.vms.len(), 3);
        assert_eq!(inventory.public_ips.len(), 2);

        let vms = inventory.summarize(DomainKind::VirtualMachine);
        assert_eq!(vms.by_status.get("Running"), Some(&2));
        assert_eq!(vms.by_status.get("Stopped"), Some(&1));
        assert_eq!(inventory.total(), inventory.summary().iter().map(|s| s.total).sum::<usize>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unseeded_inventory_is_empty() {
        let inventory = Inventory::new(unseeded()).unwrap();
        assert_eq!(inventory.total(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_delay_applies() {
        let mut config = unseeded();
        config.lifecycle.speedup = 5.0;
        let inventory = Inventory::new(config).unwrap();

        let db = inventory.databases.create("orders", DatabaseSpec::default());
        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(inventory.databases.get(&db.id).unwrap().status, DatabaseStatus::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_vm_uses_configured_delay() {
        let mut config = unseeded();
        config.lifecycle.restart_delay_ms = 500;
        let inventory = Inventory::new(config).unwrap();

        let vm = inventory.vms.create("web", VmSpec::default());
        tokio::time::sleep(Duration::from_millis(3001)).await;

        inventory.restart_vm(&vm.id);
        tokio::time::sleep(Duration::from_millis(501)).await;
        assert_eq!(inventory.vms.get(&vm.id).unwrap().status, VmStatus::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_vm_during_provisioning_still_provisions() {
        let inventory = Inventory::new(unseeded()).unwrap();
        let vm = inventory.vms.create("web", VmSpec::default());

        inventory.restart_vm(&vm.id);
        tokio::time::sleep(Duration::from_secs(10)).await;

        let vm = inventory.vms.get(&vm.id).unwrap();
        assert_eq!(vm.status, VmStatus::Running);
        assert!(vm.spec.private_ip.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_by_kind() {
        let inventory = Inventory::new(SimulatorConfig::default()).unwrap();
        inventory.delete(DomainKind::Disk, "disk-3");
        inventory.delete(DomainKind::Disk, "disk-3");
        assert_eq!(inventory.disks.len(), 2);
        assert_eq!(inventory.vms.len(), 3);
    }

    #[test]
    fn test_invalid_config_rejected_before_runtime_check() {
        let mut config = unseeded();
        config.lifecycle.speedup = -1.0;
        assert!(matches!(Inventory::new(config), Err(crate::Error::InvalidConfig(_))));
    }
}
