use cloudsim_common::domains::{
    Database, DatabaseSpec, DatabaseStatus, Engine, PublicIp, PublicIpSpec, PublicIpStatus,
    Subnet, VirtualNetwork, VirtualNetworkSpec,
};
use cloudsim_common::{Inventory, ResourceStore, SimulatorConfig};
use std::net::Ipv4Addr;
use std::time::Duration;

fn empty_inventory() -> Inventory {
    Inventory::new(SimulatorConfig {
        seed: false,
        ..Default::default()
    })
    .expect("inventory")
}

/// Database provisioning
///
/// A MySQL server is `Creating` with its endpoint and connection string
/// already derived, then reads `Running` once the 5s provisioning delay passes.
#[tokio::test(start_paused = true)]
async fn database_provisioning_settles_to_running() {
    let store = ResourceStore::<Database>::new().expect("store");

    let db = store.create(
        "db-1",
        DatabaseSpec {
            engine: Engine::MySql,
            version: "8.0".to_string(),
            tier: "Standard".to_string(),
            resource_group: "production-group".to_string(),
            location: "West Europe".to_string(),
            subscription: "Enterprise Dev/Test".to_string(),
            port: 3306,
            storage: 100,
            compute_size: "Standard_B2s".to_string(),
            ..Default::default()
        },
    );

    assert_eq!(db.status, DatabaseStatus::Creating);
    assert!(db.id.starts_with("db-"));
    assert_eq!(db.spec.endpoint.as_deref(), Some("db-1.mysql.database.azure.com"));
    assert!(db
        .spec
        .connection_string
        .as_deref()
        .expect("connection string")
        .contains("Server=db-1.mysql.database.azure.com"));

    tokio::time::sleep(Duration::from_millis(4999)).await;
    assert_eq!(store.get(&db.id).expect("record").status, DatabaseStatus::Creating);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(store.get(&db.id).expect("record").status, DatabaseStatus::Running);

    let json = serde_json::to_value(store.get(&db.id).expect("record")).expect("json");
    assert_eq!(json["status"], "Running");
    assert_eq!(json["engine"], "MySQL");
    assert_eq!(json["endpoint"], "db-1.mysql.database.azure.com");
}

/// Public IP provisioning
///
/// No address while `Creating`; a routable dotted quad once `Unassociated`.
#[tokio::test(start_paused = true)]
async fn public_ip_gets_address_when_provisioned() {
    let store = ResourceStore::<PublicIp>::new().expect("store");

    let pip = store.create("pip-1", PublicIpSpec::default());
    assert_eq!(pip.status, PublicIpStatus::Creating);
    assert!(pip.spec.ip_address.is_none());

    let json = serde_json::to_value(&pip).expect("json");
    assert!(json.get("ipAddress").is_none());

    tokio::time::sleep(Duration::from_millis(2001)).await;

    let settled = store.get(&pip.id).expect("record");
    assert_eq!(settled.status, PublicIpStatus::Unassociated);

    let addr: Ipv4Addr = settled
        .spec
        .ip_address
        .as_deref()
        .expect("address")
        .parse()
        .expect("dotted quad");
    let octets = addr.octets();
    assert!((1..=223).contains(&octets[0]), "first octet {}", octets[0]);
    assert!((1..=254).contains(&octets[3]), "last octet {}", octets[3]);
}

/// Deleting before the delay elapses leaves nothing behind
#[tokio::test(start_paused = true)]
async fn delete_during_provisioning_cancels_transition() {
    let store = ResourceStore::<PublicIp>::new().expect("store");
    let mut events = store.subscribe();

    let pip = store.create("short-lived", PublicIpSpec::default());
    store.delete(&pip.id);
    assert!(!store.is_settling(&pip.id));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(store.list().is_empty());

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event.change);
    }
    assert_eq!(seen.len(), 2, "created + deleted only, got {:?}", seen);
}

/// Stores of different domains never observe each other's mutations
#[tokio::test(start_paused = true)]
async fn domains_are_independent() {
    let inventory = empty_inventory();

    let vnet = inventory.virtual_networks.create(
        "prod-vnet",
        VirtualNetworkSpec {
            subnets: vec![Subnet::new("data", "10.0.2.0/24").with_nsg("data-nsg")],
            ..Default::default()
        },
    );
    let before = serde_json::to_value(inventory.virtual_networks.list()).expect("json");

    let db = inventory.databases.create("orders", DatabaseSpec::default());
    inventory.databases.update_status(&db.id, DatabaseStatus::Stopped);
    inventory.databases.delete(&db.id);
    inventory.databases.update_status(&vnet.id, DatabaseStatus::Failed);
    inventory.databases.delete(&vnet.id);

    assert_eq!(serde_json::to_value(inventory.virtual_networks.list()).expect("json"), before);
    assert!(inventory.virtual_networks.is_settling(&vnet.id));

    tokio::time::sleep(Duration::from_millis(3001)).await;
    assert_eq!(inventory.virtual_networks.len(), 1);
    assert!(inventory.databases.is_empty());
}

/// Ids stay unique under a burst of creations in the same instant
#[tokio::test(start_paused = true)]
async fn burst_creation_yields_unique_ids() {
    let store = ResourceStore::<VirtualNetwork>::new().expect("store");
    for i in 0..200 {
        store.create(format!("vnet-{}", i), VirtualNetworkSpec::default());
    }

    let mut ids: Vec<String> = store.list().into_iter().map(|r| r.id).collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
}
