//! Demo Command
//!
//! Provisions one resource per domain and walks them through their lifecycle.

use anyhow::Result;
use cloudsim_common::{Domain, DomainKind, Inventory, ResourceEvent, ResourceStore};
use colored::Colorize;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;

use crate::commands::inventory::{row, InventoryRow};
use crate::commands::resource::wait_for_change;
use crate::commands::summary;
use crate::output::{print_info, print_list, print_success, OutputFormat};

/// A resource created by the demo, still subscribed to its store
struct Started {
    kind: DomainKind,
    id: String,
    events: broadcast::Receiver<ResourceEvent>,
    timeout: Duration,
}

fn start<D: Domain>(store: &ResourceStore<D>, name: &str) -> Started {
    let events = store.subscribe();
    let resource = store.create(name, D::Spec::default());
    debug!("demo: created {} {}", D::KIND, resource.id);
    Started {
        kind: D::KIND,
        id: resource.id,
        events,
        timeout: store.options().provision_delay + Duration::from_secs(1),
    }
}

fn rows(inventory: &Inventory, started: &[Started]) -> Vec<InventoryRow> {
    started
        .iter()
        .filter_map(|s| row(inventory, s.kind, &s.id))
        .collect()
}

fn heading(text: &str) {
    println!("\n{}", text.bold());
}

pub async fn execute(inventory: &Inventory, format: OutputFormat) -> Result<()> {
    heading("Provisioning one resource per domain");
    let mut started = vec![
        start(&inventory.vms, "demo-vm"),
        start(&inventory.databases, "demo-db"),
        start(&inventory.storage_accounts, "demostorage"),
        start(&inventory.disks, "demo-disk"),
        start(&inventory.virtual_networks, "demo-vnet"),
        start(&inventory.network_security_groups, "demo-nsg"),
        start(&inventory.load_balancers, "demo-lb"),
        start(&inventory.public_ips, "demo-pip"),
    ];
    print_list(&rows(inventory, &started), format);

    heading("Waiting for provisioning");
    for s in started.iter_mut() {
        wait_for_change(&mut s.events, &s.id, None, s.timeout).await?;
    }
    print_list(&rows(inventory, &started), format);

    heading("Deleting the public IP");
    if let Some(pip) = started.iter().find(|s| s.kind == DomainKind::PublicIp) {
        inventory.public_ips.delete(&pip.id);
        print_success(&format!("Deleted {}", pip.id));
    }

    heading("Restarting the VM");
    if let Some(vm) = started.iter_mut().find(|s| s.kind == DomainKind::VirtualMachine) {
        inventory.restart_vm(&vm.id);
        print_info(&format!("{} is restarting", vm.id));
        let timeout = inventory.config().restart_delay() + Duration::from_secs(1);
        wait_for_change(&mut vm.events, &vm.id, Some("Running"), timeout).await?;
        print_success(&format!("{} is running again", vm.id));
    }

    heading("Summary");
    summary::execute(inventory, format)
}
