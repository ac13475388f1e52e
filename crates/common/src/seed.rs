//! Mock inventory loaded at startup

use crate::domains::database::Engine;
use crate::domains::disk::DiskSku;
use crate::domains::load_balancer::{LoadBalancerKind, LoadBalancingRule};
use crate::domains::nsg::SecurityRule;
use crate::domains::public_ip::Allocation;
use crate::domains::vm::OsType;
use crate::domains::*;
use crate::inventory::Inventory;
use crate::types::{Domain, Resource};
use chrono::{DateTime, Utc};

fn at(epoch_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(epoch_secs, 0).unwrap_or_default()
}

fn record<D: Domain>(id: &str, name: &str, status: D::Status, created: i64, mut spec: D::Spec) -> Resource<D> {
    D::prepare(name, &mut spec);
    Resource {
        id: id.to_string(),
        name: name.to_string(),
        status,
        created: at(created),
        spec,
    }
}

/// Populate every store of `inventory` with the mock records
pub fn load(inventory: &Inventory) {
    inventory.vms.seed(virtual_machines());
    inventory.databases.seed(databases());
    inventory.storage_accounts.seed(storage_accounts());
    inventory.disks.seed(disks());
    inventory.virtual_networks.seed(virtual_networks());
    inventory.network_security_groups.seed(network_security_groups());
    inventory.load_balancers.seed(load_balancers());
    inventory.public_ips.seed(public_ips());
}

pub fn virtual_machines() -> Vec<Resource<VirtualMachine>> {
    vec![
        record::<VirtualMachine>("vm-1", "web-server-01", VmStatus::Running, 1_705_312_200, VmSpec {
            size: "Standard_D2s_v3".to_string(),
            resource_group: "production-group".to_string(),
            location: "East US".to_string(),
            virtual_network: "production-vnet".to_string(),
            subnet: "web-subnet".to_string(),
            public_ip: Some("web-pip".to_string()),
            private_ip: Some("10.0.1.4".to_string()),
            ..Default::default()
        }),
        record::<VirtualMachine>("vm-2", "db-server-01", VmStatus::Running, 1_705_398_600, VmSpec {
            size: "Standard_E4s_v3".to_string(),
            resource_group: "production-group".to_string(),
            location: "East US".to_string(),
            virtual_network: "production-vnet".to_string(),
            subnet: "data-subnet".to_string(),
            private_ip: Some("10.0.2.4".to_string()),
            disk_size_gb: 128,
            ..Default::default()
        }),
        record::<VirtualMachine>("vm-3", "dev-box", VmStatus::Stopped, 1_706_005_800, VmSpec {
            size: "Standard_B2ms".to_string(),
            image: "Windows Server 2022 Datacenter".to_string(),
            os_type: OsType::Windows,
            resource_group: "development-group".to_string(),
            location: "West Europe".to_string(),
            virtual_network: "dev-vnet".to_string(),
            private_ip: Some("10.1.0.5".to_string()),
            disk_size_gb: 127,
            ..Default::default()
        }),
    ]
}

pub fn databases() -> Vec<Resource<Database>> {
    vec![
        record::<Database>("db-1", "prod-mysql", DatabaseStatus::Running, 1_705_315_800, DatabaseSpec {
            engine: Engine::MySql,
            version: "8.0".to_string(),
            tier: "General Purpose".to_string(),
            resource_group: "production-group".to_string(),
            location: "East US".to_string(),
            subscription: "Enterprise Production".to_string(),
            port: 3306,
            storage: 256,
            compute_size: "Standard_D4ds_v4".to_string(),
            ..Default::default()
        }),
        record::<Database>("db-2", "analytics-pg", DatabaseStatus::Running, 1_705_917_000, DatabaseSpec {
            engine: Engine::PostgreSql,
            version: "15".to_string(),
            tier: "Memory Optimized".to_string(),
            resource_group: "analytics-group".to_string(),
            location: "West Europe".to_string(),
            subscription: "Enterprise Production".to_string(),
            port: 5432,
            storage: 512,
            compute_size: "Standard_E4ds_v4".to_string(),
            ..Default::default()
        }),
        record::<Database>("db-3", "legacy-sql", DatabaseStatus::Stopped, 1_704_101_400, DatabaseSpec {
            engine: Engine::SqlServer,
            version: "2019".to_string(),
            tier: "Standard".to_string(),
            resource_group: "development-group".to_string(),
            location: "East US".to_string(),
            subscription: "Enterprise Dev/Test".to_string(),
            port: 1433,
            storage: 100,
            compute_size: "S2".to_string(),
            ..Default::default()
        }),
    ]
}

pub fn storage_accounts() -> Vec<Resource<StorageAccount>> {
    vec![
        record::<StorageAccount>("sa-1", "prodassets001", StorageAccountStatus::Available, 1_705_312_800, StorageAccountSpec {
            replication: "GRS".to_string(),
            resource_group: "production-group".to_string(),
            ..Default::default()
        }),
        record::<StorageAccount>("sa-2", "devlogs001", StorageAccountStatus::Available, 1_706_006_400, StorageAccountSpec {
            access_tier: "Cool".to_string(),
            resource_group: "development-group".to_string(),
            location: "West Europe".to_string(),
            ..Default::default()
        }),
    ]
}

pub fn disks() -> Vec<Resource<Disk>> {
    vec![
        record::<Disk>("disk-1", "web-server-01-os", DiskStatus::Attached, 1_705_312_200, DiskSpec {
            size_gb: 30,
            sku: DiskSku::PremiumSsd,
            resource_group: "production-group".to_string(),
            attached_to: Some("web-server-01".to_string()),
            ..Default::default()
        }),
        record::<Disk>("disk-2", "db-server-01-data", DiskStatus::Attached, 1_705_398_600, DiskSpec {
            size_gb: 1024,
            sku: DiskSku::PremiumSsd,
            resource_group: "production-group".to_string(),
            attached_to: Some("db-server-01".to_string()),
            ..Default::default()
        }),
        record::<Disk>("disk-3", "backup-disk", DiskStatus::Unattached, 1_706_092_200, DiskSpec {
            size_gb: 512,
            sku: DiskSku::StandardHdd,
            resource_group: "production-group".to_string(),
            ..Default::default()
        }),
    ]
}

pub fn virtual_networks() -> Vec<Resource<VirtualNetwork>> {
    vec![
        record::<VirtualNetwork>("vnet-1", "production-vnet", VirtualNetworkStatus::Available, 1_705_311_000, VirtualNetworkSpec {
            address_space: vec!["10.0.0.0/16".to_string()],
            subnets: vec![
                Subnet::new("web-subnet", "10.0.1.0/24").with_nsg("web-nsg"),
                Subnet::new("data-subnet", "10.0.2.0/24").with_nsg("data-nsg"),
            ],
            resource_group: "production-group".to_string(),
            ..Default::default()
        }),
        record::<VirtualNetwork>("vnet-2", "dev-vnet", VirtualNetworkStatus::Available, 1_706_005_200, VirtualNetworkSpec {
            address_space: vec!["10.1.0.0/16".to_string()],
            subnets: vec![Subnet::new("default", "10.1.0.0/24")],
            resource_group: "development-group".to_string(),
            location: "West Europe".to_string(),
            ..Default::default()
        }),
    ]
}

pub fn network_security_groups() -> Vec<Resource<NetworkSecurityGroup>> {
    let mut web_rules = nsg::default_rules();
    web_rules.push(SecurityRule::allow_inbound_tcp("AllowHTTP", 100, 80));
    web_rules.push(SecurityRule::allow_inbound_tcp("AllowHTTPS", 110, 443));

    let mut data_rules = nsg::default_rules();
    data_rules.push(SecurityRule {
        source: "10.0.1.0/24".to_string(),
        ..SecurityRule::allow_inbound_tcp("AllowMySQLFromWeb", 100, 3306)
    });

    vec![
        record::<NetworkSecurityGroup>("nsg-1", "web-nsg", NsgStatus::Active, 1_705_311_600, NsgSpec {
            rules: web_rules,
            resource_group: "production-group".to_string(),
            ..Default::default()
        }),
        record::<NetworkSecurityGroup>("nsg-2", "data-nsg", NsgStatus::Active, 1_705_311_600, NsgSpec {
            rules: data_rules,
            resource_group: "production-group".to_string(),
            ..Default::default()
        }),
    ]
}

pub fn load_balancers() -> Vec<Resource<LoadBalancer>> {
    vec![record::<LoadBalancer>("lb-1", "web-lb", LoadBalancerStatus::Active, 1_705_399_200, LoadBalancerSpec {
        kind: LoadBalancerKind::Public,
        frontend_ip: Some("web-pip".to_string()),
        backend_pool: vec!["web-server-01".to_string()],
        rules: vec![
            LoadBalancingRule {
                name: "http".to_string(),
                protocol: "TCP".to_string(),
                frontend_port: 80,
                backend_port: 80,
            },
            LoadBalancingRule {
                name: "https".to_string(),
                protocol: "TCP".to_string(),
                frontend_port: 443,
                backend_port: 443,
            },
        ],
        resource_group: "production-group".to_string(),
        ..Default::default()
    })]
}

pub fn public_ips() -> Vec<Resource<PublicIp>> {
    vec![
        record::<PublicIp>("pip-1", "web-pip", PublicIpStatus::Associated, 1_705_311_900, PublicIpSpec {
            ip_address: Some("20.185.42.17".to_string()),
            dns_label: Some("contoso-web".to_string()),
            associated_to: Some("web-lb".to_string()),
            resource_group: "production-group".to_string(),
            ..Default::default()
        }),
        record::<PublicIp>("pip-2", "spare-pip", PublicIpStatus::Unassociated, 1_706_178_600, PublicIpSpec {
            allocation: Allocation::Dynamic,
            sku: "Basic".to_string(),
            ip_address: Some("52.168.9.201".to_string()),
            resource_group: "development-group".to_string(),
            ..Default::default()
        }),
    ]
}
