//! vra_zone

use anyhow::{Context, Result};
use vra_client::models::{Zone, ZoneSpecification};
use vra_client::VraClient;

use super::common::{
    custom_properties_attribute, id_attribute, require_id, tag_set_block, tags_block,
    tags_from_config, tags_to_state,
};
use super::Resource;
use crate::schema::{Attribute, Block};
use crate::state::{
    get_optional_string_attr, get_string_attr, get_string_list_attr, get_string_map_attr,
    make_state, opt_string_value, string_map_value, string_value, DynamicValue,
};
use crate::validators::{Validator, ZONE_PLACEMENT_POLICIES};

pub struct ZoneResource;

fn spec_from_config(config: &DynamicValue) -> ZoneSpecification {
    ZoneSpecification {
        name: get_string_attr(config, "name"),
        description: get_optional_string_attr(config, "description"),
        region_id: get_string_attr(config, "region_id"),
        placement_policy: get_optional_string_attr(config, "placement_policy"),
        folder: get_optional_string_attr(config, "folder"),
        tags: tags_from_config(config, "tags"),
        tags_to_match: tags_from_config(config, "tags_to_match"),
        custom_properties: get_string_map_attr(config, "custom_properties"),
        compute_ids: get_string_list_attr(config, "compute_ids"),
    }
}

/// `compute_ids` is input only and left out
pub(crate) fn zone_to_state(zone: &Zone) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&zone.id)),
        ("name", string_value(&zone.name)),
        ("description", opt_string_value(zone.description.clone())),
        ("region_id", opt_string_value(zone.region_id.clone())),
        ("placement_policy", opt_string_value(zone.placement_policy.clone())),
        ("folder", opt_string_value(zone.folder.clone())),
        ("tags", tags_to_state(&zone.tags)),
        ("tags_to_match", tags_to_state(&zone.tags_to_match)),
        ("custom_properties", string_map_value(&zone.custom_properties)),
        ("external_region_id", opt_string_value(zone.external_region_id.clone())),
        ("cloud_account_id", opt_string_value(zone.cloud_account_id.clone())),
        ("org_id", opt_string_value(zone.org_id.clone())),
        ("owner", opt_string_value(zone.owner.clone())),
        ("created_at", opt_string_value(zone.created_at.clone())),
        ("updated_at", opt_string_value(zone.updated_at.clone())),
    ])
}

#[async_trait::async_trait]
impl Resource for ZoneResource {
    fn type_name(&self) -> &'static str {
        "vra_zone"
    }

    fn schema(&self) -> Block {
        Block::new()
            .describe("Cloud zone: a region of a cloud account projects can deploy into")
            .attribute(id_attribute())
            .attribute(Attribute::string("name").required())
            .attribute(Attribute::string("description").optional().computed())
            .attribute(Attribute::string("region_id").required().force_new())
            .attribute(
                Attribute::string("placement_policy")
                    .default(string_value("DEFAULT"))
                    .validate(Validator::OneOf(ZONE_PLACEMENT_POLICIES)),
            )
            .attribute(Attribute::string("folder").optional())
            .attribute(custom_properties_attribute())
            .attribute(
                Attribute::string_set("compute_ids")
                    .optional()
                    .describe("Compute resources to include explicitly"),
            )
            .attribute(Attribute::string("external_region_id").computed())
            .attribute(Attribute::string("cloud_account_id").computed())
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("owner").computed())
            .attribute(Attribute::string("created_at").computed())
            .attribute(Attribute::string("updated_at").computed().volatile())
            .block(tags_block())
            .block(tag_set_block("tags_to_match"))
    }

    async fn create(&self, client: &VraClient, planned: &DynamicValue) -> Result<DynamicValue> {
        let spec = spec_from_config(planned);
        let zone = client
            .create_zone(&spec)
            .await
            .with_context(|| format!("creating zone {}", spec.name))?;
        Ok(zone_to_state(&zone))
    }

    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue> {
        let id = require_id(state)?;
        let zone = client.get_zone(&id).await?;
        Ok(zone_to_state(&zone))
    }

    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = require_id(prior)?;
        let zone = client
            .update_zone(&id, &spec_from_config(planned))
            .await
            .with_context(|| format!("updating zone {}", id))?;
        Ok(zone_to_state(&zone))
    }

    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()> {
        let id = require_id(state)?;
        client.delete_zone(&id).await?;
        Ok(())
    }
}
