//! vra_block_device

use anyhow::{Context, Result};
use tracing::info;
use vra_client::models::{BlockDevice, BlockDeviceSpecification};
use vra_client::VraClient;

use super::common::{
    changed, constraints_block, constraints_from_config, custom_properties_attribute,
    id_attribute, require_id, tags_block, tags_from_config, tags_to_state,
};
use super::Resource;
use crate::schema::{Attribute, Block};
use crate::state::{
    bool_value, get_bool_attr, get_int_attr, get_optional_bool_attr, get_optional_string_attr,
    get_string_attr, get_string_map_attr, int_value, make_state, opt_bool_value,
    opt_string_value, string_map_value, string_value, DynamicValue,
};
use crate::timeouts::{timeouts_block, Timeouts};
use crate::validators::Validator;

pub struct BlockDeviceResource;

fn spec_from_config(config: &DynamicValue) -> BlockDeviceSpecification {
    BlockDeviceSpecification {
        name: get_string_attr(config, "name"),
        capacity_in_gb: get_int_attr(config, "capacity_in_gb", 1),
        project_id: get_string_attr(config, "project_id"),
        description: get_optional_string_attr(config, "description"),
        deployment_id: get_optional_string_attr(config, "deployment_id"),
        encrypted: get_optional_bool_attr(config, "encrypted"),
        persistent: get_optional_bool_attr(config, "persistent"),
        source_reference: get_optional_string_attr(config, "source_reference"),
        disk_content_base64: get_optional_string_attr(config, "disk_content_base64"),
        constraints: constraints_from_config(config, "constraints"),
        tags: tags_from_config(config, "tags"),
        custom_properties: get_string_map_attr(config, "custom_properties"),
    }
}

/// Input-only settings (`purge`, `encrypted`, sources, constraints) are
/// left out and kept from the plan
pub(crate) fn block_device_to_state(disk: &BlockDevice) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&disk.id)),
        ("name", string_value(&disk.name)),
        ("capacity_in_gb", int_value(disk.capacity_in_gb)),
        ("description", opt_string_value(disk.description.clone())),
        ("project_id", opt_string_value(disk.project_id.clone())),
        ("deployment_id", opt_string_value(disk.deployment_id.clone())),
        ("persistent", opt_bool_value(disk.persistent)),
        ("status", opt_string_value(disk.status.clone())),
        ("tags", tags_to_state(&disk.tags)),
        ("custom_properties", string_map_value(&disk.custom_properties)),
        ("external_id", opt_string_value(disk.external_id.clone())),
        ("external_region_id", opt_string_value(disk.external_region_id.clone())),
        ("external_zone_id", opt_string_value(disk.external_zone_id.clone())),
        ("org_id", opt_string_value(disk.org_id.clone())),
        ("owner", opt_string_value(disk.owner.clone())),
        ("updated_at", opt_string_value(disk.updated_at.clone())),
    ])
}

#[async_trait::async_trait]
impl Resource for BlockDeviceResource {
    fn type_name(&self) -> &'static str {
        "vra_block_device"
    }

    fn schema(&self) -> Block {
        let replace = |attr: Attribute| attr.force_new();
        Block::new()
            .describe("Block device (disk); capacity can grow in place")
            .attribute(id_attribute())
            .attribute(replace(Attribute::string("name").required()))
            .attribute(
                Attribute::number("capacity_in_gb")
                    .required()
                    .validate(Validator::AtLeast(1)),
            )
            .attribute(replace(Attribute::string("project_id").required()))
            .attribute(replace(Attribute::string("description").optional().computed()))
            .attribute(replace(Attribute::string("deployment_id").optional().computed()))
            .attribute(replace(Attribute::bool("encrypted").optional()))
            .attribute(replace(Attribute::bool("persistent").optional().computed()))
            .attribute(replace(Attribute::string("source_reference").optional()))
            .attribute(replace(Attribute::string("disk_content_base64").optional()))
            .attribute(replace(custom_properties_attribute()))
            .attribute(
                Attribute::bool("purge")
                    .default(bool_value(false))
                    .describe("Remove a persistent disk for good on destroy"),
            )
            .attribute(Attribute::string("status").computed().volatile())
            .attribute(Attribute::string("external_id").computed())
            .attribute(Attribute::string("external_region_id").computed())
            .attribute(Attribute::string("external_zone_id").computed())
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("owner").computed())
            .attribute(Attribute::string("updated_at").computed().volatile())
            .block(constraints_block("constraints").force_new())
            .block(tags_block().force_new())
            .block(timeouts_block())
    }

    async fn create(&self, client: &VraClient, planned: &DynamicValue) -> Result<DynamicValue> {
        let timeouts = Timeouts::from_state(planned)?;
        let spec = spec_from_config(planned);
        let tracker = client
            .create_block_device(&spec)
            .await
            .with_context(|| format!("creating block device {}", spec.name))?;
        let id = client.wait_for_resource_id(tracker, timeouts.create).await?;
        info!("Created block device {} ({}, {} GB)", spec.name, id, spec.capacity_in_gb);

        let disk = client.get_block_device(&id).await?;
        Ok(block_device_to_state(&disk))
    }

    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue> {
        let id = require_id(state)?;
        let disk = client.get_block_device(&id).await?;
        Ok(block_device_to_state(&disk))
    }

    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = require_id(prior)?;
        if changed(prior, planned, "capacity_in_gb") {
            let timeouts = Timeouts::from_state(planned)?;
            let capacity = get_int_attr(planned, "capacity_in_gb", 1);
            info!("Resizing block device {} to {} GB", id, capacity);
            client
                .resize_block_device(&id, capacity, timeouts.update)
                .await
                .with_context(|| format!("resizing block device {}", id))?;
        }
        self.read(client, prior).await
    }

    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()> {
        let id = require_id(state)?;
        let timeouts = Timeouts::from_state(state)?;
        let purge = get_bool_attr(state, "purge", false);
        client.delete_block_device(&id, purge, timeouts.delete).await?;
        Ok(())
    }
}
