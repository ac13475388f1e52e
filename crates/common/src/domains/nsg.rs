//! Network security groups

use crate::store::ResourceStore;
use crate::types::{Domain, DomainKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NsgStatus {
    Creating,
    Active,
    Updating,
    Failed,
}

impl std::fmt::Display for NsgStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NsgStatus::Creating => write!(f, "Creating"),
            NsgStatus::Active => write!(f, "Active"),
            NsgStatus::Updating => write!(f, "Updating"),
            NsgStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "UDP")]
    Udp,
    #[serde(rename = "ICMP")]
    Icmp,
    #[serde(rename = "*")]
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRule {
    pub name: String,
    pub priority: u16,
    pub direction: Direction,
    pub access: Access,
    pub protocol: Protocol,
    pub source: String,
    pub source_port_range: String,
    pub destination: String,
    pub destination_port_range: String,
}

impl SecurityRule {
    /// Inbound TCP allow rule from anywhere to `port`
    pub fn allow_inbound_tcp(name: impl Into<String>, priority: u16, port: u16) -> Self {
        Self {
            name: name.into(),
            priority,
            direction: Direction::Inbound,
            access: Access::Allow,
            protocol: Protocol::Tcp,
            source: "*".to_string(),
            source_port_range: "*".to_string(),
            destination: "*".to_string(),
            destination_port_range: port.to_string(),
        }
    }

    fn platform(name: &str, priority: u16, direction: Direction, access: Access, source: &str, destination: &str) -> Self {
        Self {
            name: name.to_string(),
            priority,
            direction,
            access,
            protocol: Protocol::Any,
            source: source.to_string(),
            source_port_range: "*".to_string(),
            destination: destination.to_string(),
            destination_port_range: "*".to_string(),
        }
    }
}

/// Rules every NSG starts with when none are supplied
pub fn default_rules() -> Vec<SecurityRule> {
    use Access::*;
    use Direction::*;
    vec![
        SecurityRule::platform("AllowVnetInBound", 65000, Inbound, Allow, "VirtualNetwork", "VirtualNetwork"),
        SecurityRule::platform("AllowAzureLoadBalancerInBound", 65001, Inbound, Allow, "AzureLoadBalancer", "*"),
        SecurityRule::platform("DenyAllInBound", 65500, Inbound, Deny, "*", "*"),
        SecurityRule::platform("AllowVnetOutBound", 65000, Outbound, Allow, "VirtualNetwork", "VirtualNetwork"),
        SecurityRule::platform("AllowInternetOutBound", 65001, Outbound, Allow, "*", "Internet"),
        SecurityRule::platform("DenyAllOutBound", 65500, Outbound, Deny, "*", "*"),
    ]
}

/// NSG payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NsgSpec {
    pub rules: Vec<SecurityRule>,
    pub resource_group: String,
    pub location: String,
}

impl Default for NsgSpec {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            resource_group: "default-group".to_string(),
            location: "East US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NetworkSecurityGroup;

impl Domain for NetworkSecurityGroup {
    type Spec = NsgSpec;
    type Status = NsgStatus;

    const KIND: DomainKind = DomainKind::NetworkSecurityGroup;
    const ID_PREFIX: &'static str = "nsg";
    const TRANSIENT: NsgStatus = NsgStatus::Creating;
    const TERMINAL: NsgStatus = NsgStatus::Active;
    const PROVISION_DELAY: Duration = Duration::from_millis(2000);

    fn prepare(_name: &str, spec: &mut NsgSpec) {
        if spec.rules.is_empty() {
            spec.rules = default_rules();
        }
        sort_rules(&mut spec.rules);
    }

    fn can_transition(from: NsgStatus, to: NsgStatus) -> bool {
        use NsgStatus::*;
        matches!(
            (from, to),
            (Creating, Active | Failed) | (Active, Updating | Failed) | (Updating, Active | Failed)
        )
    }
}

fn sort_rules(rules: &mut [SecurityRule]) {
    rules.sort_by_key(|r| (r.direction == Direction::Outbound, r.priority));
}

impl ResourceStore<NetworkSecurityGroup> {
    /// Insert a rule, replacing one with the same name, keeping priority order
    pub fn add_rule(&self, id: &str, rule: SecurityRule) {
        self.update(id, |spec| {
            spec.rules.retain(|r| r.name != rule.name);
            spec.rules.push(rule);
            sort_rules(&mut spec.rules);
        });
    }

    pub fn remove_rule(&self, id: &str, name: &str) {
        self.update(id, |spec| spec.rules.retain(|r| r.name != name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_installed_when_empty() {
        let mut spec = NsgSpec::default();
        NetworkSecurityGroup::prepare("web-nsg", &mut spec);
        assert_eq!(spec.rules.len(), 6);
        assert_eq!(spec.rules[0].name, "AllowVnetInBound");
        assert_eq!(spec.rules[2].name, "DenyAllInBound");
        assert_eq!(spec.rules[3].direction, Direction::Outbound);
    }

    #[test]
    fn test_custom_rules_kept() {
        let mut spec = NsgSpec {
            rules: vec![SecurityRule::allow_inbound_tcp("ssh", 300, 22)],
            ..Default::default()
        };
        NetworkSecurityGroup::prepare("ssh-nsg", &mut spec);
        assert_eq!(spec.rules.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rules_stay_ordered_by_priority() {
        let store = ResourceStore::<NetworkSecurityGroup>::new().unwrap();
        let nsg = store.create("web-nsg", NsgSpec::default());

        store.add_rule(&nsg.id, SecurityRule::allow_inbound_tcp("https", 110, 443));
        store.add_rule(&nsg.id, SecurityRule::allow_inbound_tcp("http", 100, 80));

        let rules = store.get(&nsg.id).unwrap().spec.rules;
        let inbound: Vec<&str> = rules
            .iter()
            .filter(|r| r.direction == Direction::Inbound)
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(
            inbound,
            vec!["http", "https", "AllowVnetInBound", "AllowAzureLoadBalancerInBound", "DenyAllInBound"]
        );

        store.remove_rule(&nsg.id, "http");
        assert_eq!(store.get(&nsg.id).unwrap().spec.rules.len(), 7);
    }
}
