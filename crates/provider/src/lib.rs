//! VMware Aria Automation Terraform Provider
//!
//! This crate implements a Terraform provider for vRA using the Terraform
//! Plugin Protocol v6.

pub mod config;
pub mod data_sources;
pub mod health;
pub mod plan;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod server;
pub mod state;
pub mod tfplugin6;
pub mod timeouts;
pub mod validators;

pub use provider::VraProvider;
