//! Managed disks

use crate::store::ResourceStore;
use crate::types::{Domain, DomainKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiskStatus {
    Creating,
    Unattached,
    Attached,
    Reserved,
    Failed,
}

impl std::fmt::Display for DiskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiskStatus::Creating => write!(f, "Creating"),
            DiskStatus::Unattached => write!(f, "Unattached"),
            DiskStatus::Attached => write!(f, "Attached"),
            DiskStatus::Reserved => write!(f, "Reserved"),
            DiskStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiskSku {
    #[serde(rename = "Standard HDD")]
    StandardHdd,
    #[serde(rename = "Standard SSD")]
    StandardSsd,
    #[serde(rename = "Premium SSD")]
    PremiumSsd,
    #[serde(rename = "Ultra SSD")]
    UltraSsd,
}

impl Default for DiskSku {
    fn default() -> Self {
        Self::StandardSsd
    }
}

impl std::fmt::Display for DiskSku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiskSku::StandardHdd => write!(f, "Standard HDD"),
            DiskSku::StandardSsd => write!(f, "Standard SSD"),
            DiskSku::PremiumSsd => write!(f, "Premium SSD"),
            DiskSku::UltraSsd => write!(f, "Ultra SSD"),
        }
    }
}

impl DiskSku {
    /// Provisioned (IOPS, MB/s) for a disk of `size_gb`
    pub fn performance(&self, size_gb: u32) -> (u32, u32) {
        match self {
            DiskSku::StandardHdd | DiskSku::StandardSsd => (500, 60),
            DiskSku::PremiumSsd => match size_gb {
                0..=128 => (500, 100),
                129..=256 => (1100, 125),
                257..=512 => (2300, 150),
                513..=1024 => (5000, 200),
                _ => (7500, 250),
            },
            DiskSku::UltraSsd => {
                let iops = size_gb.saturating_mul(300).min(160_000);
                (iops, (iops / 16).min(4000))
            }
        }
    }
}

/// Disk payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskSpec {
    pub size_gb: u32,
    pub sku: DiskSku,
    /// 0 means "derive from sku and size"
    pub iops: u32,
    pub throughput_mbps: u32,
    pub resource_group: String,
    pub location: String,
    /// Name of the VM the disk is attached to
    pub attached_to: Option<String>,
}

impl Default for DiskSpec {
    fn default() -> Self {
        Self {
            size_gb: 128,
            sku: DiskSku::StandardSsd,
            iops: 0,
            throughput_mbps: 0,
            resource_group: "default-group".to_string(),
            location: "East US".to_string(),
            attached_to: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Disk;

impl Domain for Disk {
    type Spec = DiskSpec;
    type Status = DiskStatus;

    const KIND: DomainKind = DomainKind::Disk;
    const ID_PREFIX: &'static str = "disk";
    const TRANSIENT: DiskStatus = DiskStatus::Creating;
    const TERMINAL: DiskStatus = DiskStatus::Unattached;
    const PROVISION_DELAY: Duration = Duration::from_millis(2000);

    fn prepare(_name: &str, spec: &mut DiskSpec) {
        let (iops, throughput) = spec.sku.performance(spec.size_gb);
        if spec.iops == 0 {
            spec.iops = iops;
        }
        if spec.throughput_mbps == 0 {
            spec.throughput_mbps = throughput;
        }
    }

    fn can_transition(from: DiskStatus, to: DiskStatus) -> bool {
        use DiskStatus::*;
        matches!(
            (from, to),
            (Creating, Unattached | Failed)
                | (Unattached, Attached | Reserved)
                | (Attached, Unattached)
                | (Reserved, Attached | Unattached)
        )
    }
}

impl ResourceStore<Disk> {
    pub fn attach(&self, id: &str, vm_name: &str) {
        if !self.contains(id) {
            return;
        }
        self.update(id, |spec| spec.attached_to = Some(vm_name.to_string()));
        self.update_status(id, DiskStatus::Attached);
    }

    pub fn detach(&self, id: &str) {
        if !self.contains(id) {
            return;
        }
        self.update(id, |spec| spec.attached_to = None);
        self.update_status(id, DiskStatus::Unattached);
    }
}
