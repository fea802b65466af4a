//! vra_fabric_network data source

use anyhow::Result;
use vra_client::models::FabricNetwork;
use vra_client::VraClient;

use super::{single_match, DataSource};
use crate::resources::common::{computed_tags_attribute, tags_to_state};
use crate::schema::{Attribute, Block};
use crate::state::{
    get_string_attr, make_state, opt_bool_value, opt_string_value, string_list_value,
    string_map_value, string_value, DynamicValue,
};

pub struct FabricNetworkDataSource;

fn fabric_network_to_state(network: &FabricNetwork, filter: &str) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&network.id)),
        ("filter", string_value(filter)),
        ("name", string_value(&network.name)),
        ("description", opt_string_value(network.description.clone())),
        ("cidr", opt_string_value(network.cidr.clone())),
        ("is_public", opt_bool_value(network.is_public)),
        ("is_default", opt_bool_value(network.is_default)),
        ("external_id", opt_string_value(network.external_id.clone())),
        ("external_region_id", opt_string_value(network.external_region_id.clone())),
        (
            "cloud_account_ids",
            string_list_value(network.cloud_account_ids.iter().cloned()),
        ),
        ("tags", tags_to_state(&network.tags)),
        ("custom_properties", string_map_value(&network.custom_properties)),
        ("org_id", opt_string_value(network.org_id.clone())),
        ("owner", opt_string_value(network.owner.clone())),
        ("updated_at", opt_string_value(network.updated_at.clone())),
    ])
}

#[async_trait::async_trait]
impl DataSource for FabricNetworkDataSource {
    fn type_name(&self) -> &'static str {
        "vra_fabric_network"
    }

    fn schema(&self) -> Block {
        Block::new()
            .describe("Network discovered on a cloud account")
            .attribute(Attribute::string("id").computed())
            .attribute(
                Attribute::string("filter")
                    .required()
                    .describe("OData filter, e.g. \"name eq 'public'\""),
            )
            .attribute(Attribute::string("name").computed())
            .attribute(Attribute::string("description").computed())
            .attribute(Attribute::string("cidr").computed())
            .attribute(Attribute::bool("is_public").computed())
            .attribute(Attribute::bool("is_default").computed())
            .attribute(Attribute::string("external_id").computed())
            .attribute(Attribute::string("external_region_id").computed())
            .attribute(Attribute::string_set("cloud_account_ids").computed())
            .attribute(computed_tags_attribute())
            .attribute(Attribute::string_map("custom_properties").computed())
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("owner").computed())
            .attribute(Attribute::string("updated_at").computed())
    }

    async fn read(&self, client: &VraClient, config: &DynamicValue) -> Result<DynamicValue> {
        let filter = get_string_attr(config, "filter");
        let found = client.list_fabric_networks(Some(filter.as_str())).await?;
        let network = single_match(found, "fabric network", &format!("filter {:?}", filter))?;
        Ok(fabric_network_to_state(&network, &filter))
    }
}
