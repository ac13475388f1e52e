//! Resource domains
//!
//! Each module defines a `Domain` marker, its payload and status enum, and
//! any helpers that only make sense on that domain's store.

pub mod database;
pub mod disk;
pub mod load_balancer;
pub mod nsg;
pub mod public_ip;
pub mod storage;
pub mod virtual_network;
pub mod vm;

pub use database::{Database, DatabaseSpec, DatabaseStatus, Engine};
pub use disk::{Disk, DiskSku, DiskSpec, DiskStatus};
pub use load_balancer::{LoadBalancer, LoadBalancerSpec, LoadBalancerStatus};
pub use nsg::{NetworkSecurityGroup, NsgSpec, NsgStatus, SecurityRule};
pub use public_ip::{PublicIp, PublicIpSpec, PublicIpStatus};
pub use storage::{StorageAccount, StorageAccountSpec, StorageAccountStatus};
pub use virtual_network::{Subnet, VirtualNetwork, VirtualNetworkSpec, VirtualNetworkStatus};
pub use vm::{VirtualMachine, VmSpec, VmStatus};
