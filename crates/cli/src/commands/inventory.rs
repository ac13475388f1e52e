//! Inventory Commands

use anyhow::Result;
use cloudsim_common::{Domain, DomainKind, Inventory, ResourceStore};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::details::SpecDetails;
use crate::output::{print_info, print_list, OutputFormat};

/// One row of a mixed-domain listing
#[derive(Debug, Clone, Serialize)]
pub struct InventoryRow {
    pub kind: DomainKind,
    pub id: String,
    pub name: String,
    pub status: String,
}

impl crate::output::TableDisplay for InventoryRow {
    fn headers() -> Vec<&'static str> {
        vec!["Kind", "ID", "Name", "Status"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.kind.to_string(),
            self.id.clone(),
            self.name.clone(),
            crate::output::status_label(&self.status),
        ]
    }
}

fn row_of<D: Domain>(store: &ResourceStore<D>, id: &str) -> Option<InventoryRow> {
    store.get(id).map(|r| InventoryRow {
        kind: r.kind(),
        id: r.id,
        name: r.name,
        status: r.status.to_string(),
    })
}

/// Current state of `id` in the store for `kind`
pub fn row(inventory: &Inventory, kind: DomainKind, id: &str) -> Option<InventoryRow> {
    match kind {
        DomainKind::VirtualMachine => row_of(&inventory.vms, id),
        DomainKind::Database => row_of(&inventory.databases, id),
        DomainKind::StorageAccount => row_of(&inventory.storage_accounts, id),
        DomainKind::Disk => row_of(&inventory.disks, id),
        DomainKind::VirtualNetwork => row_of(&inventory.virtual_networks, id),
        DomainKind::NetworkSecurityGroup => row_of(&inventory.network_security_groups, id),
        DomainKind::LoadBalancer => row_of(&inventory.load_balancers, id),
        DomainKind::PublicIp => row_of(&inventory.public_ips, id),
    }
}

fn print_store<D>(store: &ResourceStore<D>, format: OutputFormat)
where
    D: Domain,
    D::Spec: SpecDetails,
{
    print_info(&format!("{} ({})", D::KIND, store.len()));
    print_list(&store.list(), format);
}

fn to_json<D: Domain>(store: &ResourceStore<D>) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(store.list())?)
}

fn kind_json(inventory: &Inventory, kind: DomainKind) -> Result<serde_json::Value> {
    match kind {
        DomainKind::VirtualMachine => to_json(&inventory.vms),
        DomainKind::Database => to_json(&inventory.databases),
        DomainKind::StorageAccount => to_json(&inventory.storage_accounts),
        DomainKind::Disk => to_json(&inventory.disks),
        DomainKind::VirtualNetwork => to_json(&inventory.virtual_networks),
        DomainKind::NetworkSecurityGroup => to_json(&inventory.network_security_groups),
        DomainKind::LoadBalancer => to_json(&inventory.load_balancers),
        DomainKind::PublicIp => to_json(&inventory.public_ips),
    }
}

/// Records of `kinds` keyed by domain name
pub fn snapshot(inventory: &Inventory, kinds: &[DomainKind]) -> Result<BTreeMap<String, serde_json::Value>> {
    kinds
        .iter()
        .map(|kind| Ok((kind.to_string(), kind_json(inventory, *kind)?)))
        .collect()
}

/// List every domain, or only `domain`
pub fn execute(inventory: &Inventory, domain: Option<DomainKind>, format: OutputFormat) -> Result<()> {
    let kinds: Vec<DomainKind> = match domain {
        Some(kind) => vec![kind],
        None => DomainKind::ALL.to_vec(),
    };

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&snapshot(inventory, &kinds)?)?);
        return Ok(());
    }

    for kind in kinds {
        match kind {
            DomainKind::VirtualMachine => print_store(&inventory.vms, format),
            DomainKind::Database => print_store(&inventory.databases, format),
            DomainKind::StorageAccount => print_store(&inventory.storage_accounts, format),
            DomainKind::Disk => print_store(&inventory.disks, format),
            DomainKind::VirtualNetwork => print_store(&inventory.virtual_networks, format),
            DomainKind::NetworkSecurityGroup => print_store(&inventory.network_security_groups, format),
            DomainKind::LoadBalancer => print_store(&inventory.load_balancers, format),
            DomainKind::PublicIp => print_store(&inventory.public_ips, format),
        }
    }
    Ok(())
}
