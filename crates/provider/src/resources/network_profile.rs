//! vra_network_profile

use anyhow::{Context, Result};
use vra_client::models::{linked_ids, NetworkProfile, NetworkProfileSpecification};
use vra_client::VraClient;

use super::common::{
    custom_properties_attribute, id_attribute, require_id, tags_block, tags_from_config,
    tags_to_state,
};
use super::Resource;
use crate::schema::{Attribute, Block};
use crate::state::{
    get_optional_int_attr, get_optional_string_attr, get_string_attr, get_string_list_attr,
    get_string_map_attr, make_state, opt_int_value, opt_string_value, string_list_value,
    string_map_value, string_value, DynamicValue,
};
use crate::validators::{Validator, ISOLATION_TYPES};

pub struct NetworkProfileResource;

fn spec_from_config(config: &DynamicValue) -> NetworkProfileSpecification {
    NetworkProfileSpecification {
        name: get_string_attr(config, "name"),
        description: get_optional_string_attr(config, "description"),
        region_id: get_string_attr(config, "region_id"),
        fabric_network_ids: get_string_list_attr(config, "fabric_network_ids"),
        security_group_ids: get_string_list_attr(config, "security_group_ids"),
        isolation_type: get_optional_string_attr(config, "isolation_type"),
        isolation_network_domain_id: get_optional_string_attr(
            config,
            "isolation_network_domain_id",
        ),
        isolation_network_domain_cidr: get_optional_string_attr(
            config,
            "isolation_network_domain_cidr",
        ),
        isolation_external_fabric_network_id: get_optional_string_attr(
            config,
            "isolation_external_fabric_network_id",
        ),
        isolated_network_cidr_prefix: get_optional_int_attr(
            config,
            "isolated_network_cidr_prefix",
        ),
        custom_properties: get_string_map_attr(config, "custom_properties"),
        tags: tags_from_config(config, "tags"),
    }
}

/// Network and security group ids come back as links; the isolation domain
/// ids are input only and left out
fn network_profile_to_state(profile: &NetworkProfile) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&profile.id)),
        ("name", string_value(&profile.name)),
        ("description", opt_string_value(profile.description.clone())),
        (
            "fabric_network_ids",
            string_list_value(linked_ids(&profile.links, "fabric-networks")),
        ),
        (
            "security_group_ids",
            string_list_value(linked_ids(&profile.links, "security-groups")),
        ),
        ("isolation_type", opt_string_value(profile.isolation_type.clone())),
        (
            "isolation_network_domain_cidr",
            opt_string_value(profile.isolation_network_domain_cidr.clone()),
        ),
        (
            "isolated_network_cidr_prefix",
            opt_int_value(profile.isolated_network_cidr_prefix),
        ),
        ("custom_properties", string_map_value(&profile.custom_properties)),
        ("tags", tags_to_state(&profile.tags)),
        ("external_region_id", opt_string_value(profile.external_region_id.clone())),
        ("cloud_account_id", opt_string_value(profile.cloud_account_id.clone())),
        ("org_id", opt_string_value(profile.org_id.clone())),
        ("owner", opt_string_value(profile.owner.clone())),
        ("updated_at", opt_string_value(profile.updated_at.clone())),
    ])
}

#[async_trait::async_trait]
impl Resource for NetworkProfileResource {
    fn type_name(&self) -> &'static str {
        "vra_network_profile"
    }

    fn schema(&self) -> Block {
        Block::new()
            .describe("Networks, security groups and isolation settings for one region")
            .attribute(id_attribute())
            .attribute(Attribute::string("name").required())
            .attribute(Attribute::string("description").optional().computed())
            .attribute(Attribute::string("region_id").required().force_new())
            .attribute(Attribute::string_set("fabric_network_ids").optional().computed())
            .attribute(Attribute::string_set("security_group_ids").optional().computed())
            .attribute(
                Attribute::string("isolation_type")
                    .default(string_value("NONE"))
                    .validate(Validator::OneOf(ISOLATION_TYPES)),
            )
            .attribute(Attribute::string("isolation_network_domain_id").optional())
            .attribute(
                Attribute::string("isolation_network_domain_cidr")
                    .optional()
                    .computed(),
            )
            .attribute(Attribute::string("isolation_external_fabric_network_id").optional())
            .attribute(
                Attribute::number("isolated_network_cidr_prefix")
                    .optional()
                    .computed()
                    .validate(Validator::AtLeast(0)),
            )
            .attribute(custom_properties_attribute())
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
            .create_network_profile(&spec)
            .await
            .with_context(|| format!("creating network profile {}", spec.name))?;
        Ok(network_profile_to_state(&profile))
    }

    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue> {
        let id = require_id(state)?;
        let profile = client.get_network_profile(&id).await?;
        Ok(network_profile_to_state(&profile))
    }

    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = require_id(prior)?;
        let profile = client
            .update_network_profile(&id, &spec_from_config(planned))
            .await
            .with_context(|| format!("updating network profile {}", id))?;
        Ok(network_profile_to_state(&profile))
    }

    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()> {
        let id = require_id(state)?;
        client.delete_network_profile(&id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vra_client::models::{Link, Links};

    #[test]
    fn test_state_reads_ids_from_links() {
        let mut links = Links::new();
        links.insert(
            "fabric-networks".to_string(),
            Link {
                href: None,
                hrefs: vec!["/iaas/api/fabric-networks/fn-1".into()],
            },
        );
        let profile = NetworkProfile {
            id: "np-1".into(),
            name: "net".into(),
            isolation_type: Some("NONE".into()),
            links,
            ..Default::default()
        };
        let state = network_profile_to_state(&profile);
        assert_eq!(get_string_list_attr(&state, "fabric_network_ids"), vec!["fn-1"]);
        assert!(get_string_list_attr(&state, "security_group_ids").is_empty());
        assert!(state.get("isolation_network_domain_id").is_none());
    }

    #[test]
    fn test_isolation_type_is_validated() {
        let config = make_state(vec![
            ("name", string_value("net")),
            ("isolation_type", string_value("VLAN")),
        ]);
        assert_eq!(NetworkProfileResource.schema().validate(&config).len(), 1);
    }
}
