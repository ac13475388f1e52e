//! CloudSim CLI
//!
//! Command-line front end for browsing and provisioning simulated cloud
//! resources.

pub mod commands;
pub mod details;
pub mod output;
