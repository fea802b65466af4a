//! vra_image_profile

use std::collections::HashMap;

use anyhow::{Context, Result};
use vra_client::models::{ImageMappingSpecification, ImageProfile, ImageProfileSpecification};
use vra_client::VraClient;

use super::common::{
    constraints_block, constraints_from_config, constraints_to_state, echo_configured,
    id_attribute, prior_item, require_id,
};
use super::Resource;
use crate::schema::{Attribute, Block, NestedBlock, Violation};
use crate::state::{
    get_blocks, get_optional_string_attr, get_string_attr, make_state, opt_string_value,
    string_value, DynamicValue,
};

pub struct ImageProfileResource;

fn spec_from_config(config: &DynamicValue) -> ImageProfileSpecification {
    let image_mapping: HashMap<String, ImageMappingSpecification> =
        get_blocks(config, "image_mapping")
            .into_iter()
            .map(|m| {
                (
                    get_string_attr(m, "name"),
                    ImageMappingSpecification {
                        id: get_optional_string_attr(m, "image_id"),
                        name: get_optional_string_attr(m, "image_name"),
                        cloud_config: get_optional_string_attr(m, "cloud_config"),
                        constraints: constraints_from_config(m, "constraints"),
                    },
                )
            })
            .collect();

    ImageProfileSpecification {
        name: get_string_attr(config, "name"),
        description: get_optional_string_attr(config, "description"),
        region_id: get_string_attr(config, "region_id"),
        image_mapping,
    }
}

fn image_profile_to_state(profile: &ImageProfile, prior: &DynamicValue) -> DynamicValue {
    let mut names: Vec<&String> = profile.image_mappings.mapping.keys().collect();
    names.sort();
    let mappings = names
        .into_iter()
        .map(|name| {
            let image = &profile.image_mappings.mapping[name];
            let item = prior_item(prior, "image_mapping", "name", name);
            make_state(vec![
                ("name", string_value(name)),
                (
                    "image_id",
                    echo_configured(item, "image_id", opt_string_value(image.id.clone())),
                ),
                (
                    "image_name",
                    echo_configured(item, "image_name", opt_string_value(image.name.clone())),
                ),
                ("cloud_config", opt_string_value(image.cloud_config.clone())),
                ("constraints", constraints_to_state(&image.constraints)),
            ])
        })
        .collect();

    make_state(vec![
        ("id", string_value(&profile.id)),
        ("name", string_value(&profile.name)),
        ("description", opt_string_value(profile.description.clone())),
        ("image_mapping", DynamicValue::List(mappings)),
        ("external_region_id", opt_string_value(profile.external_region_id.clone())),
        ("cloud_account_id", opt_string_value(profile.cloud_account_id.clone())),
        ("org_id", opt_string_value(profile.org_id.clone())),
        ("owner", opt_string_value(profile.owner.clone())),
        ("updated_at", opt_string_value(profile.updated_at.clone())),
    ])
}

#[async_trait::async_trait]
impl Resource for ImageProfileResource {
    fn type_name(&self) -> &'static str {
        "vra_image_profile"
    }

    fn schema(&self) -> Block {
        let mapping = Block::new()
            .attribute(Attribute::string("name").required().describe("Image name, e.g. \"ubuntu\""))
            .attribute(Attribute::string("image_id").optional().describe("Fabric image id"))
            .attribute(Attribute::string("image_name").optional().describe("Fabric image name"))
            .attribute(Attribute::string("cloud_config").optional())
            .block(constraints_block("constraints"));

        Block::new()
            .describe("Named images for one region")
            .attribute(id_attribute())
            .attribute(Attribute::string("name").required())
            .attribute(Attribute::string("description").optional().computed())
            .attribute(Attribute::string("region_id").required().force_new())
            .attribute(Attribute::string("external_region_id").computed())
            .attribute(Attribute::string("cloud_account_id").computed())
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("owner").computed())
            .attribute(Attribute::string("updated_at").computed().volatile())
            .block(NestedBlock::set("image_mapping", mapping).min_items(1))
    }

    fn validate(&self, config: &DynamicValue) -> Vec<Violation> {
        get_blocks(config, "image_mapping")
            .into_iter()
            .filter(|m| {
                let id = m.attr("image_id");
                let name = m.attr("image_name");
                !id.is_unknown() && !name.is_unknown() && id.is_null() == name.is_null()
            })
            .map(|m| {
                Violation::at(
                    "image_mapping",
                    format!(
                        "image mapping {:?} needs exactly one of image_id or image_name",
                        get_string_attr(m, "name")
                    ),
                )
            })
            .collect()
    }

    async fn create(&self, client: &VraClient, planned: &DynamicValue) -> Result<DynamicValue> {
        let spec = spec_from_config(planned);
        let profile = client
            .create_image_profile(&spec)
            .await
            .with_context(|| format!("creating image profile {}", spec.name))?;
        Ok(image_profile_to_state(&profile, planned))
    }

    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue> {
        let id = require_id(state)?;
        let profile = client.get_image_profile(&id).await?;
        Ok(image_profile_to_state(&profile, state))
    }

    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = require_id(prior)?;
        let profile = client
            .update_image_profile(&id, &spec_from_config(planned))
            .await
            .with_context(|| format!("updating image profile {}", id))?;
        Ok(image_profile_to_state(&profile, planned))
    }

    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()> {
        let id = require_id(state)?;
        client.delete_image_profile(&id).await?;
        Ok(())
    }
}
