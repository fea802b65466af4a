//! vra_security_group data source

use anyhow::Result;
use vra_client::models::SecurityGroup;
use vra_client::VraClient;

use super::{single_match, DataSource};
use crate::resources::common::{computed_tags_attribute, tags_to_state};
use crate::schema::{Attribute, Block};
use crate::state::{
    get_string_attr, make_state, opt_string_value, string_map_value, string_value, DynamicValue,
};

pub struct SecurityGroupDataSource;

fn security_group_to_state(group: &SecurityGroup, filter: &str) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&group.id)),
        ("filter", string_value(filter)),
        ("name", string_value(&group.name)),
        ("description", opt_string_value(group.description.clone())),
        ("external_id", opt_string_value(group.external_id.clone())),
        ("external_region_id", opt_string_value(group.external_region_id.clone())),
        ("external_zone_id", opt_string_value(group.external_zone_id.clone())),
        ("project_id", opt_string_value(group.project_id.clone())),
        ("tags", tags_to_state(&group.tags)),
        ("custom_properties", string_map_value(&group.custom_properties)),
        ("org_id", opt_string_value(group.org_id.clone())),
        ("owner", opt_string_value(group.owner.clone())),
        ("updated_at", opt_string_value(group.updated_at.clone())),
    ])
}

#[async_trait::async_trait]
impl DataSource for SecurityGroupDataSource {
    fn type_name(&self) -> &'static str {
        "vra_security_group"
    }

    fn schema(&self) -> Block {
        Block::new()
            .describe("Security group known to vRA")
            .attribute(Attribute::string("id").computed())
            .attribute(Attribute::string("filter").required().describe("OData filter"))
            .attribute(Attribute::string("name").computed())
            .attribute(Attribute::string("description").computed())
            .attribute(Attribute::string("external_id").computed())
            .attribute(Attribute::string("external_region_id").computed())
            .attribute(Attribute::string("external_zone_id").computed())
            .attribute(Attribute::string("project_id").computed())
            .attribute(computed_tags_attribute())
            .attribute(Attribute::string_map("custom_properties").computed())
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("owner").computed())
            .attribute(Attribute::string("updated_at").computed())
    }

    async fn read(&self, client: &VraClient, config: &DynamicValue) -> Result<DynamicValue> {
        let filter = get_string_attr(config, "filter");
        let found = client.list_security_groups(Some(filter.as_str())).await?;
        let group = single_match(found, "security group", &format!("filter {:?}", filter))?;
        Ok(security_group_to_state(&group, &filter))
    }
}
