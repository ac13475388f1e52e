//! Managed databases
//!
//! Endpoint and connection string are derived from the server name, engine
//! and port when the database is created, so they are available while the
//! server is still `Creating`.

use crate::types::{Domain, DomainKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseStatus {
    Creating,
    Running,
    Stopped,
    Updating,
    Failed,
    Deleting,
}

impl std::fmt::Display for DatabaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseStatus::Creating => write!(f, "Creating"),
            DatabaseStatus::Running => write!(f, "Running"),
            DatabaseStatus::Stopped => write!(f, "Stopped"),
            DatabaseStatus::Updating => write!(f, "Updating"),
            DatabaseStatus::Failed => write!(f, "Failed"),
            DatabaseStatus::Deleting => write!(f, "Deleting"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Engine {
    #[serde(rename = "MySQL")]
    MySql,
    #[serde(rename = "PostgreSQL")]
    PostgreSql,
    #[serde(rename = "SQL Server")]
    SqlServer,
    #[serde(rename = "MariaDB")]
    MariaDb,
}

impl Default for Engine {
    fn default() -> Self {
        Self::MySql
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::MySql => write!(f, "MySQL"),
            Engine::PostgreSql => write!(f, "PostgreSQL"),
            Engine::SqlServer => write!(f, "SQL Server"),
            Engine::MariaDb => write!(f, "MariaDB"),
        }
    }
}

impl Engine {
    pub fn default_port(&self) -> u16 {
        match self {
            Engine::MySql | Engine::MariaDb => 3306,
            Engine::PostgreSql => 5432,
            Engine::SqlServer => 1433,
        }
    }

    /// Fully qualified server host for a server called `name`
    pub fn endpoint(&self, name: &str) -> String {
        match self {
            Engine::MySql => format!("{}.mysql.database.azure.com", name),
            Engine::PostgreSql => format!("{}.postgres.database.azure.com", name),
            Engine::SqlServer => format!("{}.database.windows.net", name),
            Engine::MariaDb => format!("{}.mariadb.database.azure.com", name),
        }
    }

    /// ADO.NET style connection string with a password placeholder
    pub fn connection_string(&self, name: &str, port: u16) -> String {
        let host = self.endpoint(name);
        match self {
            Engine::MySql | Engine::MariaDb => format!(
                "Server={};Port={};Database={};Uid=adminuser@{};Pwd={{your_password}};SslMode=Required;",
                host, port, name, name
            ),
            Engine::PostgreSql => format!(
                "Host={};Port={};Database={};Username=adminuser@{};Password={{your_password}};Ssl Mode=Require;",
                host, port, name, name
            ),
            Engine::SqlServer => format!(
                "Server=tcp:{},{};Initial Catalog={};User ID=adminuser;Password={{your_password}};Encrypt=True;",
                host, port, name
            ),
        }
    }
}

/// Database payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSpec {
    pub engine: Engine,
    pub version: String,
    pub tier: String,
    pub resource_group: String,
    pub location: String,
    pub subscription: String,
    pub port: u16,
    /// Allocated storage in GB
    pub storage: u32,
    pub compute_size: String,
    pub endpoint: Option<String>,
    pub connection_string: Option<String>,
}

impl Default for DatabaseSpec {
    fn default() -> Self {
        Self {
            engine: Engine::MySql,
            version: "8.0".to_string(),
            tier: "Standard".to_string(),
            resource_group: "default-group".to_string(),
            location: "East US".to_string(),
            subscription: "Pay-As-You-Go".to_string(),
            port: Engine::MySql.default_port(),
            storage: 100,
            compute_size: "Standard_B2s".to_string(),
            endpoint: None,
            connection_string: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Database;

impl Domain for Database {
    type Spec = DatabaseSpec;
    type Status = DatabaseStatus;

    const KIND: DomainKind = DomainKind::Database;
    const ID_PREFIX: &'static str = "db";
    const TRANSIENT: DatabaseStatus = DatabaseStatus::Creating;
    const TERMINAL: DatabaseStatus = DatabaseStatus::Running;
    const PROVISION_DELAY: Duration = Duration::from_millis(5000);

    fn prepare(name: &str, spec: &mut DatabaseSpec) {
        spec.endpoint = Some(spec.engine.endpoint(name));
        spec.connection_string = Some(spec.engine.connection_string(name, spec.port));
    }

    fn can_transition(from: DatabaseStatus, to: DatabaseStatus) -> bool {
        use DatabaseStatus::*;
        matches!(
            (from, to),
            (Creating, Running | Failed)
                | (Running, Stopped | Updating | Deleting | Failed)
                | (Stopped, Running | Deleting)
                | (Updating, Running | Failed)
                | (Failed, Deleting)
        )
    }
}
