//! vra_flavor_profile

use std::collections::HashMap;

use anyhow::{Context, Result};
use vra_client::models::{FlavorMapping, FlavorProfile, FlavorProfileSpecification};
use vra_client::VraClient;

use super::common::{echo_configured, id_attribute, prior_item, require_id};
use super::Resource;
use crate::schema::{Attribute, Block, NestedBlock};
use crate::state::{
    get_blocks, get_optional_int_attr, get_optional_string_attr, get_string_attr, make_state,
    opt_int_value, opt_string_value, string_value, DynamicValue,
};
use crate::validators::Validator;

pub struct FlavorProfileResource;

fn spec_from_config(config: &DynamicValue) -> FlavorProfileSpecification {
    let flavor_mapping: HashMap<String, FlavorMapping> = get_blocks(config, "flavor_mapping")
        .into_iter()
        .map(|m| {
            (
                get_string_attr(m, "name"),
                FlavorMapping {
                    name: get_optional_string_attr(m, "instance_type"),
                    cpu_count: get_optional_int_attr(m, "cpu_count"),
                    memory_in_mb: get_optional_int_attr(m, "memory"),
                },
            )
        })
        .collect();

    FlavorProfileSpecification {
        name: get_string_attr(config, "name"),
        description: get_optional_string_attr(config, "description"),
        region_id: get_string_attr(config, "region_id"),
        flavor_mapping,
    }
}

/// vRA reports instance type, CPU and memory for every flavor; only the
/// fields the prior state used are kept
fn flavor_profile_to_state(profile: &FlavorProfile, prior: &DynamicValue) -> DynamicValue {
    let mut names: Vec<&String> = profile.flavor_mappings.mapping.keys().collect();
    names.sort();
    let mappings = names
        .into_iter()
        .map(|name| {
            let flavor = &profile.flavor_mappings.mapping[name];
            let item = prior_item(prior, "flavor_mapping", "name", name);
            make_state(vec![
                ("name", string_value(name)),
                (
                    "instance_type",
                    echo_configured(item, "instance_type", opt_string_value(flavor.name.clone())),
                ),
                (
                    "cpu_count",
                    echo_configured(item, "cpu_count", opt_int_value(flavor.cpu_count)),
                ),
                (
                    "memory",
                    echo_configured(item, "memory", opt_int_value(flavor.memory_in_mb)),
                ),
            ])
        })
        .collect();

    make_state(vec![
        ("id", string_value(&profile.id)),
        ("name", string_value(&profile.name)),
        ("description", opt_string_value(profile.description.clone())),
        ("flavor_mapping", DynamicValue::List(mappings)),
        ("external_region_id", opt_string_value(profile.external_region_id.clone())),
        ("cloud_account_id", opt_string_value(profile.cloud_account_id.clone())),
        ("org_id", opt_string_value(profile.org_id.clone())),
        ("owner", opt_string_value(profile.owner.clone())),
        ("updated_at", opt_string_value(profile.updated_at.clone())),
    ])
}

#[async_trait::async_trait]
impl Resource for FlavorProfileResource {
    fn type_name(&self) -> &'static str {
        "vra_flavor_profile"
    }

    fn schema(&self) -> Block {
        let mapping = Block::new()
            .attribute(Attribute::string("name").required().describe("Flavor name, e.g. \"small\""))
            .attribute(
                Attribute::string("instance_type")
                    .optional()
                    .describe("Cloud instance type; used by public clouds"),
            )
            .attribute(
                Attribute::number("cpu_count")
                    .optional()
                    .validate(Validator::AtLeast(1)),
            )
            .attribute(
                Attribute::number("memory")
                    .optional()
                    .describe("Memory in MB")
                    .validate(Validator::AtLeast(1)),
            );

        Block::new()
            .describe("Named machine sizes for one region")
            .attribute(id_attribute())
            .attribute(Attribute::string("name").required())
            .attribute(Attribute::string("description").optional().computed())
            .attribute(Attribute::string("region_id").required().force_new())
            .attribute(Attribute::string("external_region_id").computed())
            .attribute(Attribute::string("cloud_account_id").computed())
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("owner").computed())
            .attribute(Attribute::string("updated_at").computed().volatile())
            .block(NestedBlock::set("flavor_mapping", mapping).min_items(1))
    }

    async fn create(&self, client: &VraClient, planned: &DynamicValue) -> Result<DynamicValue> {
        let spec = spec_from_config(planned);
        let profile = client
            .create_flavor_profile(&spec)
            .await
            .with_context(|| format!("creating flavor profile {}", spec.name))?;
        Ok(flavor_profile_to_state(&profile, planned))
    }

    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue> {
        let id = require_id(state)?;
        let profile = client.get_flavor_profile(&id).await?;
        Ok(flavor_profile_to_state(&profile, state))
    }

    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = require_id(prior)?;
        let profile = client
            .update_flavor_profile(&id, &spec_from_config(planned))
            .await
            .with_context(|| format!("updating flavor profile {}", id))?;
        Ok(flavor_profile_to_state(&profile, planned))
    }

    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()> {
        let id = require_id(state)?;
        client.delete_flavor_profile(&id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{get_int_attr, int_value};
    use vra_client::models::FlavorMappings;

    fn small(cpu: bool) -> DynamicValue {
        make_state(vec![(
            "flavor_mapping",
            DynamicValue::List(vec![make_state(vec![
                ("name", string_value("small")),
                ("instance_type", string_value("t2.small")),
                ("cpu_count", if cpu { int_value(1) } else { DynamicValue::Null }),
                ("memory", DynamicValue::Null),
            ])]),
        )])
    }

    #[test]
    fn test_spec_from_config() {
        let spec = spec_from_config(&small(false));
        let mapping = &spec.flavor_mapping["small"];
        assert_eq!(mapping.name.as_deref(), Some("t2.small"));
        assert_eq!(mapping.cpu_count, None);
    }

    #[test]
    fn test_state_keeps_configured_fields_only() {
        let mut mapping = HashMap::new();
        mapping.insert(
            "small".to_string(),
            FlavorMapping {
                name: Some("t2.small".into()),
                cpu_count: Some(1),
                memory_in_mb: Some(2048),
            },
        );
        let profile = FlavorProfile {
            id: "fp-1".into(),
            name: "aws".into(),
            flavor_mappings: FlavorMappings { mapping },
            ..Default::default()
        };

        let state = flavor_profile_to_state(&profile, &small(true));
        let items = get_blocks(&state, "flavor_mapping");
        assert_eq!(get_string_attr(items[0], "instance_type"), "t2.small");
        assert_eq!(get_int_attr(items[0], "cpu_count", 0), 1);
        assert_eq!(items[0].get("memory"), Some(&DynamicValue::Null));

        let imported = flavor_profile_to_state(&profile, &DynamicValue::Null);
        let items = get_blocks(&imported, "flavor_mapping");
        assert_eq!(get_int_attr(items[0], "memory", 0), 2048);
    }
}
