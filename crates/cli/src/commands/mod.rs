//! CLI Commands

pub mod demo;
pub mod inventory;
pub mod resource;
pub mod summary;
pub mod vm;
