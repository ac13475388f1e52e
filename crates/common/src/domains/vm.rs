//! Virtual machines

use crate::store::ResourceStore;
use crate::types::{Domain, DomainKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Delay between `restart` and the VM reporting `Running` again
pub const RESTART_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VmStatus {
    Creating,
    Running,
    Stopped,
    Restarting,
    Deallocated,
    Failed,
    Deleting,
}

impl std::fmt::Display for VmStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VmStatus::Creating => write!(f, "Creating"),
            VmStatus::Running => write!(f, "Running"),
            VmStatus::Stopped => write!(f, "Stopped"),
            VmStatus::Restarting => write!(f, "Restarting"),
            VmStatus::Deallocated => write!(f, "Deallocated"),
            VmStatus::Failed => write!(f, "Failed"),
            VmStatus::Deleting => write!(f, "Deleting"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsType {
    Linux,
    Windows,
}

impl Default for OsType {
    fn default() -> Self {
        Self::Linux
    }
}

/// VM payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmSpec {
    pub size: String,
    pub image: String,
    pub os_type: OsType,
    pub resource_group: String,
    pub location: String,
    pub admin_username: String,
    pub virtual_network: String,
    pub subnet: String,
    /// Name of the public IP resource, if any
    pub public_ip: Option<String>,
    /// Assigned once provisioning completes
    pub private_ip: Option<String>,
    pub disk_size_gb: u32,
}

impl Default for VmSpec {
    fn default() -> Self {
        Self {
            size: "Standard_B2s".to_string(),
            image: "Ubuntu Server 22.04 LTS".to_string(),
            os_type: OsType::Linux,
            resource_group: "default-group".to_string(),
            location: "East US".to_string(),
            admin_username: "azureuser".to_string(),
            virtual_network: "default-vnet".to_string(),
            subnet: "default".to_string(),
            public_ip: None,
            private_ip: None,
            disk_size_gb: 30,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VirtualMachine;

impl Domain for VirtualMachine {
    type Spec = VmSpec;
    type Status = VmStatus;

    const KIND: DomainKind = DomainKind::VirtualMachine;
    const ID_PREFIX: &'static str = "vm";
    const TRANSIENT: VmStatus = VmStatus::Creating;
    const TERMINAL: VmStatus = VmStatus::Running;
    const PROVISION_DELAY: Duration = Duration::from_millis(3000);

    fn provisioned(spec: &mut VmSpec) {
        if spec.private_ip.is_none() {
            // Azure reserves .0-.3 in every subnet.
            let host: u8 = rand::thread_rng().gen_range(4..=254);
            spec.private_ip = Some(format!("10.0.0.{}", host));
        }
    }

    fn can_transition(from: VmStatus, to: VmStatus) -> bool {
        use VmStatus::*;
        matches!(
            (from, to),
            (Creating, Running | Failed)
                | (Running, Stopped | Restarting | Deallocated | Deleting | Failed)
                | (Stopped, Running | Deallocated | Deleting)
                | (Restarting, Running | Failed)
                | (Deallocated, Running | Deleting)
                | (Failed, Deleting)
        )
    }
}

impl ResourceStore<VirtualMachine> {
    pub fn start(&self, id: &str) {
        self.update_status(id, VmStatus::Running);
    }

    pub fn stop(&self, id: &str) {
        self.update_status(id, VmStatus::Stopped);
    }

    pub fn deallocate(&self, id: &str) {
        self.update_status(id, VmStatus::Deallocated);
    }

    /// `Restarting` now, `Running` after [`RESTART_DELAY`]
    pub fn restart(&self, id: &str) {
        self.restart_after(id, RESTART_DELAY);
    }

    /// Ignored for unknown ids and for VMs still provisioning, whose pending
    /// settle timer must keep its slot.
    pub fn restart_after(&self, id: &str, delay: Duration) {
        let Some(vm) = self.get(id) else {
            return;
        };
        if vm.status == VirtualMachine::TRANSIENT && self.is_settling(id) {
            debug!("Ignoring restart of {}: still provisioning", id);
            return;
        }
        self.update_status(id, VmStatus::Restarting);
        self.schedule(id, VmStatus::Running, delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_vm_provisioning_assigns_private_ip() {
        let store = ResourceStore::<VirtualMachine>::new().unwrap();
        let vm = store.create("web-01", VmSpec::default());
        assert_eq!(vm.status, VmStatus::Creating);
        assert!(vm.spec.private_ip.is_none());

        tokio::time::sleep(VirtualMachine::PROVISION_DELAY + Duration::from_millis(1)).await;
        let vm = store.get(&vm.id).unwrap();
        assert_eq!(vm.status, VmStatus::Running);

        let ip = vm.spec.private_ip.unwrap();
        let host: u8 = ip.strip_prefix("10.0.0.").unwrap().parse().unwrap();
        assert!((4..=254).contains(&host));
    }

    #[tokio::test(start_paused = true)]
    async fn test_power_actions() {
        let store = ResourceStore::<VirtualMachine>::new().unwrap();
        let vm = store.create("web-01", VmSpec::default());
        tokio::time::sleep(Duration::from_millis(3001)).await;

        store.stop(&vm.id);
        assert_eq!(store.get(&vm.id).unwrap().status, VmStatus::Stopped);

        store.start(&vm.id);
        store.restart(&vm.id);
        assert_eq!(store.get(&vm.id).unwrap().status, VmStatus::Restarting);

        tokio::time::sleep(RESTART_DELAY + Duration::from_millis(1)).await;
        assert_eq!(store.get(&vm.id).unwrap().status, VmStatus::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_while_creating_keeps_provisioning() {
        let store = ResourceStore::<VirtualMachine>::new().unwrap();
        let vm = store.create("web-01", VmSpec::default());

        store.restart(&vm.id);
        assert_eq!(store.get(&vm.id).unwrap().status, VmStatus::Creating);

        tokio::time::sleep(Duration::from_secs(10)).await;
        let vm = store.get(&vm.id).unwrap();
        assert_eq!(vm.status, VmStatus::Running);
        assert!(vm.spec.private_ip.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_unknown_vm_is_noop() {
        let store = ResourceStore::<VirtualMachine>::new().unwrap();
        store.restart("vm-404");
        assert!(!store.is_settling("vm-404"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_transition_table() {
        use VmStatus::*;
        assert!(VirtualMachine::can_transition(Creating, Running));
        assert!(VirtualMachine::can_transition(Running, Stopped));
        assert!(!VirtualMachine::can_transition(Creating, Stopped));
        assert!(!VirtualMachine::can_transition(Deallocated, Restarting));
        assert!(!VirtualMachine::can_transition(Running, Creating));
    }
}
