//! Per-domain table columns

use chrono::SecondsFormat;
use cloudsim_common::domains::*;
use cloudsim_common::{Domain, Resource};

use crate::output::{status_label, TableDisplay};

/// Short description of a resource payload for table output
pub trait SpecDetails {
    fn location(&self) -> &str;
    fn details(&self) -> String;
}

impl SpecDetails for VmSpec {
    fn location(&self) -> &str {
        &self.location
    }

    fn details(&self) -> String {
        format!(
            "{} {:?}, {}",
            self.size,
            self.os_type,
            self.private_ip.as_deref().unwrap_or("no private IP")
        )
    }
}

impl SpecDetails for DatabaseSpec {
    fn location(&self) -> &str {
        &self.location
    }

    fn details(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{} {} @ {}:{}", self.engine, self.version, endpoint, self.port),
            None => format!("{} {}", self.engine, self.version),
        }
    }
}

impl SpecDetails for StorageAccountSpec {
    fn location(&self) -> &str {
        &self.location
    }

    fn details(&self) -> String {
        format!("{} {} {}", self.kind, self.performance, self.replication)
    }
}

impl SpecDetails for DiskSpec {
    fn location(&self) -> &str {
        &self.location
    }

    fn details(&self) -> String {
        let mut out = format!("{} GiB {} ({} IOPS)", self.size_gb, self.sku, self.iops);
        if let Some(vm) = &self.attached_to {
            out.push_str(&format!(" -> {}", vm));
        }
        out
    }
}

impl SpecDetails for VirtualNetworkSpec {
    fn location(&self) -> &str {
        &self.location
    }

    fn details(&self) -> String {
        format!("{}, {} subnet(s)", self.address_space.join(" "), self.subnets.len())
    }
}

impl SpecDetails for NsgSpec {
    fn location(&self) -> &str {
        &self.location
    }

    fn details(&self) -> String {
        format!("{} rule(s)", self.rules.len())
    }
}

impl SpecDetails for LoadBalancerSpec {
    fn location(&self) -> &str {
        &self.location
    }

    fn details(&self) -> String {
        format!(
            "{} {:?}, {} backend(s), {} rule(s)",
            self.sku,
            self.kind,
            self.backend_pool.len(),
            self.rules.len()
        )
    }
}

impl SpecDetails for PublicIpSpec {
    fn location(&self) -> &str {
        &self.location
    }

    fn details(&self) -> String {
        let address = self.ip_address.as_deref().unwrap_or("(pending)");
        match &self.associated_to {
            Some(target) => format!("{} -> {}", address, target),
            None => address.to_string(),
        }
    }
}

impl<D> TableDisplay for Resource<D>
where
    D: Domain,
    D::Spec: SpecDetails,
{
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Status", "Location", "Created", "Details"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            status_label(&self.status.to_string()),
            self.spec.location().to_string(),
            self.created.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.spec.details(),
        ]
    }
}
