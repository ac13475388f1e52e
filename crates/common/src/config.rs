//! Simulator configuration

use crate::ids::{EpochMillisIds, IdGenerator, UuidIds};
use crate::store::StoreOptions;
use crate::types::{Domain, DomainKind};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Load the mock inventory at startup
    pub seed: bool,

    /// How resource ids are generated
    pub id_strategy: IdStrategy,

    /// Lifecycle timing
    pub lifecycle: LifecycleConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: true,
            id_strategy: IdStrategy::EpochMillis,
            lifecycle: LifecycleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdStrategy {
    EpochMillis,
    Uuid,
}

/// Lifecycle timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Divides every delay; 10.0 runs the simulation ten times faster
    pub speedup: f64,

    /// Time a restarting VM takes to report `Running` again
    pub restart_delay_ms: u64,

    /// Per-domain provisioning delay overrides, keyed by domain name
    pub delays_ms: BTreeMap<String, u64>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            speedup: 1.0,
            restart_delay_ms: crate::domains::vm::RESTART_DELAY.as_millis() as u64,
            delays_ms: BTreeMap::new(),
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let speedup = self.lifecycle.speedup;
        if !speedup.is_finite() || speedup <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "lifecycle.speedup must be a positive number, got {}",
                speedup
            )));
        }

        for key in self.lifecycle.delays_ms.keys() {
            key.parse::<DomainKind>()
                .map_err(|_| Error::InvalidConfig(format!("unknown domain in lifecycle.delays_ms: {}", key)))?;
        }

        let restart = Duration::from_millis(self.lifecycle.restart_delay_ms);
        let delays = DomainKind::ALL
            .iter()
            .map(|kind| self.configured_delay(*kind, default_delay(*kind)))
            .chain(std::iter::once(restart));
        for delay in delays {
            if self.try_scaled(delay).is_none() {
                return Err(Error::InvalidConfig(format!(
                    "lifecycle.speedup {} stretches a {} ms delay beyond the representable range",
                    speedup,
                    delay.as_millis()
                )));
            }
        }

        Ok(())
    }

    fn try_scaled(&self, delay: Duration) -> Option<Duration> {
        Duration::try_from_secs_f64(delay.as_secs_f64() / self.lifecycle.speedup).ok()
    }

    // Saturates on configs that skipped `validate`.
    fn scaled(&self, delay: Duration) -> Duration {
        self.try_scaled(delay).unwrap_or(Duration::MAX)
    }

    fn configured_delay(&self, kind: DomainKind, default: Duration) -> Duration {
        self.lifecycle
            .delays_ms
            .iter()
            .find(|(key, _)| key.parse::<DomainKind>().ok() == Some(kind))
            .map(|(_, ms)| Duration::from_millis(*ms))
            .unwrap_or(default)
    }

    /// Provisioning delay for `kind`, after overrides and speedup
    pub fn provision_delay(&self, kind: DomainKind, default: Duration) -> Duration {
        self.scaled(self.configured_delay(kind, default))
    }

    pub fn restart_delay(&self) -> Duration {
        self.scaled(Duration::from_millis(self.lifecycle.restart_delay_ms))
    }

    pub fn id_generator(&self) -> Arc<dyn IdGenerator> {
        match self.id_strategy {
            IdStrategy::EpochMillis => Arc::new(EpochMillisIds::new()),
            IdStrategy::Uuid => Arc::new(UuidIds),
        }
    }

    /// Options for a store of domain `D` sharing `ids`
    pub fn store_options<D: Domain>(&self, ids: Arc<dyn IdGenerator>) -> StoreOptions {
        StoreOptions::for_domain::<D>()
            .with_delay(self.provision_delay(D::KIND, D::PROVISION_DELAY))
            .with_ids(ids)
    }
}

fn default_delay(kind: DomainKind) -> Duration {
    use crate::domains::*;
    match kind {
        DomainKind::VirtualMachine => VirtualMachine::PROVISION_DELAY,
        DomainKind::Database => Database::PROVISION_DELAY,
        DomainKind::StorageAccount => StorageAccount::PROVISION_DELAY,
        DomainKind::Disk => Disk::PROVISION_DELAY,
        DomainKind::VirtualNetwork => VirtualNetwork::PROVISION_DELAY,
        DomainKind::NetworkSecurityGroup => NetworkSecurityGroup::PROVISION_DELAY,
        DomainKind::LoadBalancer => LoadBalancer::PROVISION_DELAY,
        DomainKind::PublicIp => PublicIp::PROVISION_DELAY,
    }
}
