//! vra_storage_profile

use anyhow::{Context, Result};
use vra_client::models::{StorageProfile, StorageProfileSpecification};
use vra_client::VraClient;

use super::common::{id_attribute, require_id, tags_block, tags_from_config, tags_to_state};
use super::Resource;
use crate::schema::{Attribute, Block};
use crate::state::{
    bool_value, get_bool_attr, get_optional_bool_attr, get_optional_string_attr,
    get_string_attr, get_string_map_attr, make_state, opt_bool_value, opt_string_value,
    string_map_value, string_value, DynamicValue,
};

pub struct StorageProfileResource;

fn spec_from_config(config: &DynamicValue) -> StorageProfileSpecification {
    StorageProfileSpecification {
        name: get_string_attr(config, "name"),
        description: get_optional_string_attr(config, "description"),
        region_id: get_string_attr(config, "region_id"),
        default_item: get_bool_attr(config, "default_item", false),
        supports_encryption: get_optional_bool_attr(config, "supports_encryption"),
        disk_properties: get_string_map_attr(config, "disk_properties"),
        disk_target_properties: get_string_map_attr(config, "disk_target_properties"),
        tags: tags_from_config(config, "tags"),
    }
}

fn storage_profile_to_state(profile: &StorageProfile) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&profile.id)),
        ("name", string_value(&profile.name)),
        ("description", opt_string_value(profile.description.clone())),
        ("default_item", bool_value(profile.default_item)),
        ("supports_encryption", opt_bool_value(profile.supports_encryption)),
        ("disk_properties", string_map_value(&profile.disk_properties)),
        (
            "disk_target_properties",
            string_map_value(&profile.disk_target_properties),
        ),
        ("tags", tags_to_state(&profile.tags)),
        ("external_region_id", opt_string_value(profile.external_region_id.clone())),
        ("cloud_account_id", opt_string_value(profile.cloud_account_id.clone())),
        ("org_id", opt_string_value(profile.org_id.clone())),
        ("owner", opt_string_value(profile.owner.clone())),
        ("updated_at", opt_string_value(profile.updated_at.clone())),
    ])
}

#[async_trait::async_trait]
impl Resource for StorageProfileResource {
    fn type_name(&self) -> &'static str {
        "vra_storage_profile"
    }

    fn schema(&self) -> Block {
        Block::new()
            .describe("Disk placement and properties for one region")
            .attribute(id_attribute())
            .attribute(Attribute::string("name").required())
            .attribute(Attribute::string("description").optional().computed())
            .attribute(Attribute::string("region_id").required().force_new())
            .attribute(
                Attribute::bool("default_item")
                    .required()
                    .describe("Use this profile when a request names none"),
            )
            .attribute(Attribute::bool("supports_encryption").optional().computed())
            .attribute(Attribute::string_map("disk_properties").optional().computed())
            .attribute(
                Attribute::string_map("disk_target_properties")
                    .optional()
                    .computed(),
            )
            .attribute(Attribute::string("external_region_id").computed())
            .attribute(Attribute::string("cloud_account_id").computed())
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("owner").computed())
            .attribute(Attribute::string("updated_at").computed().volatile())
            .block(tags_block())
    }

    async fn create(&self, client: &VraClient, planned: &DynamicValue) -> Result<DynamicValue> {
        let spec = spec_from_config(planned);
        let profile = client
            .create_storage_profile(&spec)
            .await
            .with_context(|| format!("creating storage profile {}", spec.name))?;
        Ok(storage_profile_to_state(&profile))
    }

    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue> {
        let id = require_id(state)?;
        let profile = client.get_storage_profile(&id).await?;
        Ok(storage_profile_to_state(&profile))
    }

    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = require_id(prior)?;
        let profile = client
            .update_storage_profile(&id, &spec_from_config(planned))
            .await
            .with_context(|| format!("updating storage profile {}", id))?;
        Ok(storage_profile_to_state(&profile))
    }

    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()> {
        let id = require_id(state)?;
        client.delete_storage_profile(&id).await?;
        Ok(())
    }
}
