//! Request and response bodies of the vRA REST API

pub mod blueprint;
pub mod cloud_account;
pub mod common;
pub mod compute;
pub mod deployment;
pub mod fabric;
pub mod profiles;
pub mod project;
pub mod zone;

pub use blueprint::*;
pub use cloud_account::*;
pub use common::*;
pub use compute::*;
pub use deployment::*;
pub use fabric::*;
pub use profiles::*;
pub use project::*;
pub use zone::*;
