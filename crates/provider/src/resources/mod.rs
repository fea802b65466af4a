//! Resource Implementations
//!
//! Implements the CRUD operations for each resource type. Values handed to a
//! resource are already shaped by its schema; values it returns may omit
//! attributes it cannot read back, which are then carried over from the plan
//! or the prior state.

pub mod block_device;
pub mod blueprint;
pub mod blueprint_version;
pub mod cloud_account_aws;
pub mod common;
pub mod deployment;
pub mod flavor_profile;
pub mod image_profile;
pub mod load_balancer;
pub mod machine;
pub mod network;
pub mod network_profile;
pub mod project;
pub mod storage_profile;
pub mod zone;

use std::sync::Arc;

use anyhow::Result;
use vra_client::VraClient;

use crate::schema::{Block, Violation};
use crate::state::DynamicValue;

/// Trait for resource operations
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    /// Resource type name
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Block;

    /// Checks beyond the per-attribute validators
    fn validate(&self, _config: &DynamicValue) -> Vec<Violation> {
        Vec::new()
    }

    /// Create a new resource
    async fn create(&self, client: &VraClient, planned: &DynamicValue) -> Result<DynamicValue>;

    /// Read an existing resource
    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue>;

    /// Update an existing resource
    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue>;

    /// Delete a resource
    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()>;
}

/// Every resource type the provider serves
pub fn all() -> Vec<Arc<dyn Resource>> {
    vec![
        Arc::new(project::ProjectResource),
        Arc::new(cloud_account_aws::CloudAccountAwsResource),
        Arc::new(zone::ZoneResource),
        Arc::new(flavor_profile::FlavorProfileResource),
        Arc::new(image_profile::ImageProfileResource),
        Arc::new(storage_profile::StorageProfileResource),
        Arc::new(network_profile::NetworkProfileResource),
        Arc::new(network::NetworkResource),
        Arc::new(block_device::BlockDeviceResource),
        Arc::new(machine::MachineResource),
        Arc::new(load_balancer::LoadBalancerResource),
        Arc::new(blueprint::BlueprintResource),
        Arc::new(blueprint_version::BlueprintVersionResource),
        Arc::new(deployment::DeploymentResource),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_type_names_are_unique_and_prefixed() {
        let names: Vec<_> = all().iter().map(|r| r.type_name()).collect();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert!(names.iter().all(|n| n.starts_with("vra_")));
    }

    #[test]
    fn test_every_schema_has_computed_id() {
        for resource in all() {
            let schema = resource.schema();
            let id = schema
                .find_attribute("id")
                .unwrap_or_else(|| panic!("{} has no id", resource.type_name()));
            assert!(id.computed, "{} id is not computed", resource.type_name());
        }
    }
}
