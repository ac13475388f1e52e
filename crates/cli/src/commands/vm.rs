//! VM Commands

use anyhow::{bail, Result};
use clap::Subcommand;
use cloudsim_common::domains::VmStatus;
use cloudsim_common::{DomainKind, Error, Inventory};
use std::time::Duration;

use crate::commands::resource::{self, wait_for_change, ResourceCommands};
use crate::output::{print_item, print_success, OutputFormat};

#[derive(Subcommand)]
pub enum VmCommands {
    #[command(flatten)]
    Resource(ResourceCommands),

    /// Start a VM
    Start {
        /// VM ID
        id: String,
    },

    /// Stop a VM
    Stop {
        /// VM ID
        id: String,
    },

    /// Stop a VM and release its compute
    Deallocate {
        /// VM ID
        id: String,
    },

    /// Restart a VM
    Restart {
        /// VM ID
        id: String,

        /// Return while the VM is still restarting
        #[arg(long)]
        no_wait: bool,
    },
}

fn require(inventory: &Inventory, id: &str) -> Result<()> {
    if inventory.vms.contains(id) {
        Ok(())
    } else {
        Err(Error::NotFound {
            kind: DomainKind::VirtualMachine.to_string(),
            id: id.to_string(),
        }
        .into())
    }
}

/// Execute VM command
pub async fn execute(cmd: VmCommands, inventory: &Inventory, format: OutputFormat) -> Result<()> {
    let vms = &inventory.vms;

    let id = match cmd {
        VmCommands::Resource(cmd) => return resource::execute(cmd, vms, format).await,

        VmCommands::Start { id } => {
            require(inventory, &id)?;
            vms.start(&id);
            print_success(&format!("Started VM {}", id));
            id
        }

        VmCommands::Stop { id } => {
            require(inventory, &id)?;
            vms.stop(&id);
            print_success(&format!("Stopped VM {}", id));
            id
        }

        VmCommands::Deallocate { id } => {
            require(inventory, &id)?;
            vms.deallocate(&id);
            print_success(&format!("Deallocated VM {}", id));
            id
        }

        VmCommands::Restart { id, no_wait } => {
            require(inventory, &id)?;
            if vms.get(&id).map(|vm| vm.status) == Some(VmStatus::Creating) {
                bail!("VM {} is still provisioning", id);
            }
            let mut events = vms.subscribe();
            inventory.restart_vm(&id);
            print_success(&format!("Restarting VM {}", id));

            if !no_wait {
                let timeout = inventory.config().restart_delay() + Duration::from_secs(1);
                wait_for_change(&mut events, &id, Some("Running"), timeout).await?;
            }
            id
        }
    };

    if let Some(vm) = vms.get(&id) {
        print_item(&vm, format);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudsim_common::domains::{VmSpec, VmStatus};
    use cloudsim_common::SimulatorConfig;

    fn inventory() -> Inventory {
        Inventory::new(SimulatorConfig {
            seed: false,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_waits_for_running() {
        let inventory = inventory();
        let vm = inventory.vms.create("web", VmSpec::default());
        tokio::time::sleep(Duration::from_millis(3001)).await;

        let cmd = VmCommands::Restart {
            id: vm.id.clone(),
            no_wait: false,
        };
        execute(cmd, &inventory, OutputFormat::Json).await.unwrap();
        assert_eq!(inventory.vms.get(&vm.id).unwrap().status, VmStatus::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_rejected_while_provisioning() {
        let inventory = inventory();
        let vm = inventory.vms.create("web", VmSpec::default());

        let cmd = VmCommands::Restart {
            id: vm.id.clone(),
            no_wait: true,
        };
        assert!(execute(cmd, &inventory, OutputFormat::Plain).await.is_err());

        tokio::time::sleep(Duration::from_millis(3001)).await;
        assert!(inventory.vms.get(&vm.id).unwrap().spec.private_ip.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_unknown_vm_fails() {
        let inventory = inventory();
        let cmd = VmCommands::Stop { id: "vm-missing".to_string() };
        assert!(execute(cmd, &inventory, OutputFormat::Plain).await.is_err());
    }
}
