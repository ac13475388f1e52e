//! Resource Commands shared by every domain

use anyhow::{anyhow, bail, Result};
use clap::Subcommand;
use cloudsim_common::{Change, Domain, Error, ResourceEvent, ResourceStore};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::details::SpecDetails;
use crate::output::{print_info, print_item, print_list, print_success, OutputFormat};

#[derive(Subcommand)]
pub enum ResourceCommands {
    /// List all resources
    List,

    /// Get resource details
    Get {
        /// Resource ID
        id: String,
    },

    /// Create a resource with default settings
    Create {
        /// Resource name
        name: String,

        /// Return immediately instead of waiting for provisioning
        #[arg(long)]
        no_wait: bool,
    },

    /// Delete a resource
    Delete {
        /// Resource ID
        id: String,
    },

    /// Overwrite a resource's status
    SetStatus {
        /// Resource ID
        id: String,

        /// New status (e.g. Running, Stopped)
        status: String,

        /// Reject transitions the domain does not allow
        #[arg(long)]
        strict: bool,
    },
}

/// Parse a status by its serialized name
pub fn parse_status<D: Domain>(value: &str) -> Result<D::Status> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| anyhow!("'{}' is not a {} status", value, D::KIND))
}

fn require<D: Domain>(store: &ResourceStore<D>, id: &str) -> Result<()> {
    if store.contains(id) {
        Ok(())
    } else {
        Err(Error::NotFound {
            kind: D::KIND.to_string(),
            id: id.to_string(),
        }
        .into())
    }
}

/// Wait until the resource with `id` changes status, to `target` when given
pub async fn wait_for_change(
    events: &mut broadcast::Receiver<ResourceEvent>,
    id: &str,
    target: Option<&str>,
    timeout: Duration,
) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.set_message(format!("Waiting for {}...", id));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let wait = async {
        loop {
            match events.recv().await {
                Ok(ResourceEvent {
                    id: ref event_id,
                    change: Change::StatusChanged { ref to, .. },
                    ..
                }) if event_id == id && target.map_or(true, |t| t == to) => return Ok(()),
                Ok(ResourceEvent {
                    id: ref event_id,
                    change: Change::Deleted,
                    ..
                }) if event_id == id => bail!("{} was deleted while waiting", id),
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => bail!("store closed while waiting for {}", id),
            }
        }
    };

    let result = tokio::time::timeout(timeout, wait)
        .await
        .map_err(|_| anyhow!("timed out waiting for {}", id))
        .and_then(|r| r);
    spinner.finish_and_clear();
    result
}

/// Execute a command against one domain's store
pub async fn execute<D>(cmd: ResourceCommands, store: &ResourceStore<D>, format: OutputFormat) -> Result<()>
where
    D: Domain,
    D::Spec: SpecDetails,
{
    match cmd {
        ResourceCommands::List => {
            print_list(&store.list(), format);
        }

        ResourceCommands::Get { id } => {
            let resource = store.get(&id).ok_or_else(|| Error::NotFound {
                kind: D::KIND.to_string(),
                id: id.clone(),
            })?;
            print_item(&resource, format);
        }

        ResourceCommands::Create { name, no_wait } => {
            let mut events = store.subscribe();
            let resource = store.create(name, D::Spec::default());
            print_success(&format!("Created {} {} ({})", D::KIND, resource.name, resource.id));

            if no_wait {
                print_item(&resource, format);
                return Ok(());
            }

            let timeout = store.options().provision_delay + Duration::from_secs(1);
            wait_for_change(&mut events, &resource.id, None, timeout).await?;
            if let Some(settled) = store.get(&resource.id) {
                print_item(&settled, format);
            }
        }

        ResourceCommands::Delete { id } => {
            require(store, &id)?;
            store.delete(&id);
            print_success(&format!("Deleted {} {}", D::KIND, id));
        }

        ResourceCommands::SetStatus { id, status, strict } => {
            require(store, &id)?;
            let status = parse_status::<D>(&status)?;
            if strict {
                store.transition(&id, status)?;
            } else {
                store.update_status(&id, status);
            }
            print_info(&format!("{} is now {}", id, status));
        }
    }

    Ok(())
}
