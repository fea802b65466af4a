//! vra_network

use anyhow::{Context, Result};
use tracing::info;
use vra_client::models::{Network, NetworkSpecification};
use vra_client::VraClient;

use super::common::{
    constraints_block, constraints_from_config, custom_properties_attribute,
    id_attribute, require_id, tags_block, tags_from_config, tags_to_state,
};
use super::Resource;
use crate::schema::{Attribute, Block};
use crate::state::{
    get_optional_bool_attr, get_optional_string_attr, get_string_attr, get_string_map_attr,
    make_state, opt_bool_value, opt_string_value, string_map_value, string_value, DynamicValue,
};
use crate::timeouts::{timeouts_block, Timeouts};

pub struct NetworkResource;

fn spec_from_config(config: &DynamicValue) -> NetworkSpecification {
    NetworkSpecification {
        name: get_string_attr(config, "name"),
        project_id: get_string_attr(config, "project_id"),
        description: get_optional_string_attr(config, "description"),
        deployment_id: get_optional_string_attr(config, "deployment_id"),
        outbound_access: get_optional_bool_attr(config, "outbound_access"),
        constraints: constraints_from_config(config, "constraints"),
        tags: tags_from_config(config, "tags"),
        custom_properties: get_string_map_attr(config, "custom_properties"),
    }
}

/// Constraints only steer placement and are not returned
pub(crate) fn network_to_state(network: &Network) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&network.id)),
        ("name", string_value(&network.name)),
        ("description", opt_string_value(network.description.clone())),
        ("project_id", opt_string_value(network.project_id.clone())),
        ("deployment_id", opt_string_value(network.deployment_id.clone())),
        ("outbound_access", opt_bool_value(network.outbound_access)),
        ("cidr", opt_string_value(network.cidr.clone())),
        ("tags", tags_to_state(&network.tags)),
        ("custom_properties", string_map_value(&network.custom_properties)),
        ("external_id", opt_string_value(network.external_id.clone())),
        ("external_region_id", opt_string_value(network.external_region_id.clone())),
        ("external_zone_id", opt_string_value(network.external_zone_id.clone())),
        ("org_id", opt_string_value(network.org_id.clone())),
        ("owner", opt_string_value(network.owner.clone())),
        ("updated_at", opt_string_value(network.updated_at.clone())),
    ])
}

#[async_trait::async_trait]
impl Resource for NetworkResource {
    fn type_name(&self) -> &'static str {
        "vra_network"
    }

    fn schema(&self) -> Block {
        let replace = |attr: Attribute| attr.force_new();
        Block::new()
            .describe("Network provisioned through a network profile; changes replace it")
            .attribute(id_attribute())
            .attribute(replace(Attribute::string("name").required()))
            .attribute(replace(Attribute::string("project_id").required()))
            .attribute(replace(Attribute::string("description").optional().computed()))
            .attribute(replace(Attribute::string("deployment_id").optional().computed()))
            .attribute(replace(Attribute::bool("outbound_access").optional().computed()))
            .attribute(replace(custom_properties_attribute()))
            .attribute(Attribute::string("cidr").computed())
            .attribute(Attribute::string("external_id").computed())
            .attribute(Attribute::string("external_region_id").computed())
            .attribute(Attribute::string("external_zone_id").computed())
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("owner").computed())
            .attribute(Attribute::string("updated_at").computed())
            .block(constraints_block("constraints").force_new())
            .block(tags_block().force_new())
            .block(timeouts_block())
    }

    async fn create(&self, client: &VraClient, planned: &DynamicValue) -> Result<DynamicValue> {
        let timeouts = Timeouts::from_state(planned)?;
        let spec = spec_from_config(planned);
        let tracker = client
            .create_network(&spec)
            .await
            .with_context(|| format!("creating network {}", spec.name))?;
        let id = client.wait_for_resource_id(tracker, timeouts.create).await?;
        info!("Created network {} ({})", spec.name, id);

        let network = client.get_network(&id).await?;
        Ok(network_to_state(&network))
    }

    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue> {
        let id = require_id(state)?;
        let network = client.get_network(&id).await?;
        Ok(network_to_state(&network))
    }

    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        _planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        // Every configurable attribute forces replacement; only timeouts change
        self.read(client, prior).await
    }

    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()> {
        let id = require_id(state)?;
        let timeouts = Timeouts::from_state(state)?;
        client.delete_network(&id, timeouts.delete).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::bool_value;

    #[test]
    fn test_spec_from_config() {
        let config = make_state(vec![
            ("name", string_value("app-net")),
            ("project_id", string_value("p-1")),
            ("outbound_access", bool_value(true)),
            (
                "constraints",
                DynamicValue::List(vec![make_state(vec![
                    ("mandatory", bool_value(true)),
                    ("expression", string_value("pci")),
                ])]),
            ),
        ]);
        let spec = spec_from_config(&config);
        assert_eq!(spec.outbound_access, Some(true));
        assert_eq!(spec.constraints.len(), 1);
        assert_eq!(spec.deployment_id, None);
    }

    #[test]
    fn test_state_leaves_out_constraints() {
        let network = Network {
            id: "n-1".into(),
            name: "app-net".into(),
            cidr: Some("10.0.0.0/24".into()),
            ..Default::default()
        };
        let state = network_to_state(&network);
        assert!(state.get("constraints").is_none());
        assert_eq!(get_string_attr(&state, "cidr"), "10.0.0.0/24");
    }
}
