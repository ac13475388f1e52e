//! Summary Command

use anyhow::Result;
use cloudsim_common::{DomainSummary, Inventory};

use crate::output::{print_list, OutputFormat, TableDisplay};

impl TableDisplay for DomainSummary {
    fn headers() -> Vec<&'static str> {
        vec!["Domain", "Total", "By Status"]
    }

    fn row(&self) -> Vec<String> {
        let statuses: Vec<String> = self
            .by_status
            .iter()
            .map(|(status, count)| format!("{}: {}", status, count))
            .collect();
        vec![self.kind.to_string(), self.total.to_string(), statuses.join(", ")]
    }
}

pub fn execute(inventory: &Inventory, format: OutputFormat) -> Result<()> {
    print_list(&inventory.summary(), format);
    Ok(())
}
