//! vra_image data source (fabric images)

use anyhow::Result;
use vra_client::models::FabricImage;
use vra_client::VraClient;

use super::{exactly_one_of, single_match, DataSource};
use crate::schema::{Attribute, Block, Violation};
use crate::state::{
    get_optional_string_attr, make_state, opt_bool_value, opt_string_value, string_map_value,
    string_value, DynamicValue,
};

pub struct ImageDataSource;

fn image_to_state(image: &FabricImage, filter: Option<String>) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&image.id)),
        ("filter", opt_string_value(filter)),
        ("name", string_value(&image.name)),
        ("description", opt_string_value(image.description.clone())),
        ("os_family", opt_string_value(image.os_family.clone())),
        ("private", opt_bool_value(image.is_private)),
        ("external_id", opt_string_value(image.external_id.clone())),
        ("region", opt_string_value(image.external_region_id.clone())),
        ("custom_properties", string_map_value(&image.custom_properties)),
        ("org_id", opt_string_value(image.org_id.clone())),
        ("owner", opt_string_value(image.owner.clone())),
        ("updated_at", opt_string_value(image.updated_at.clone())),
    ])
}

#[async_trait::async_trait]
impl DataSource for ImageDataSource {
    fn type_name(&self) -> &'static str {
        "vra_image"
    }

    fn schema(&self) -> Block {
        Block::new()
            .describe("Image discovered on a cloud account")
            .attribute(Attribute::string("id").optional().computed())
            .attribute(Attribute::string("filter").optional().describe("OData filter"))
            .attribute(Attribute::string("name").computed())
            .attribute(Attribute::string("description").computed())
            .attribute(Attribute::string("os_family").computed())
            .attribute(Attribute::bool("private").computed())
            .attribute(Attribute::string("external_id").computed())
            .attribute(Attribute::string("region").computed())
            .attribute(Attribute::string_map("custom_properties").computed())
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("owner").computed())
            .attribute(Attribute::string("updated_at").computed())
    }

    fn validate(&self, config: &DynamicValue) -> Vec<Violation> {
        exactly_one_of(config, &["id", "filter"])
    }

    async fn read(&self, client: &VraClient, config: &DynamicValue) -> Result<DynamicValue> {
        if let Some(id) = get_optional_string_attr(config, "id") {
            let image = client.get_fabric_image(&id).await?;
            return Ok(image_to_state(&image, None));
        }
        let filter = get_optional_string_attr(config, "filter").unwrap_or_default();
        let found = client.list_fabric_images(Some(filter.as_str())).await?;
        let image = single_match(found, "image", &format!("filter {:?}", filter))?;
        Ok(image_to_state(&image, Some(filter)))
    }
}
