//! vRA Client Library
//!
//! Typed async client for the parts of the VMware Aria Automation (vRA) REST
//! API used by the Terraform provider: authentication, IaaS objects,
//! blueprints and deployments, plus helpers that wait on asynchronous
//! requests.

mod api;
mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod tracker;

pub use client::{id_from_link, VraClient, IAAS_API_VERSION};
pub use config::{ClientConfig, Credentials};
pub use error::{Error, Result};
pub use tracker::{poll_until, Poll};
