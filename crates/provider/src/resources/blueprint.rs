//! vra_blueprint

use anyhow::{Context, Result};
use vra_client::models::{Blueprint, BlueprintSpecification};
use vra_client::VraClient;

use super::common::{id_attribute, require_id};
use super::Resource;
use crate::schema::{Attribute, Block};
use crate::state::{
    bool_value, get_bool_attr, get_optional_string_attr, get_string_attr, make_state,
    opt_bool_value, opt_int_value, opt_string_value, string_value, DynamicValue,
};

pub struct BlueprintResource;

fn spec_from_config(config: &DynamicValue) -> BlueprintSpecification {
    BlueprintSpecification {
        name: get_string_attr(config, "name"),
        description: get_optional_string_attr(config, "description"),
        project_id: get_string_attr(config, "project_id"),
        content: get_string_attr(config, "content"),
        request_scope_org: get_bool_attr(config, "request_scope_org", false),
    }
}

pub(crate) fn blueprint_to_state(blueprint: &Blueprint) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&blueprint.id)),
        ("name", string_value(&blueprint.name)),
        ("description", opt_string_value(blueprint.description.clone())),
        ("project_id", opt_string_value(blueprint.project_id.clone())),
        ("project_name", opt_string_value(blueprint.project_name.clone())),
        ("content", opt_string_value(blueprint.content.clone())),
        ("request_scope_org", opt_bool_value(blueprint.request_scope_org)),
        ("status", opt_string_value(blueprint.status.clone())),
        ("valid", opt_bool_value(blueprint.valid)),
        ("total_versions", opt_int_value(blueprint.total_versions)),
        (
            "total_released_versions",
            opt_int_value(blueprint.total_released_versions),
        ),
        ("org_id", opt_string_value(blueprint.org_id.clone())),
        ("created_at", opt_string_value(blueprint.created_at.clone())),
        ("created_by", opt_string_value(blueprint.created_by.clone())),
        ("updated_at", opt_string_value(blueprint.updated_at.clone())),
        ("updated_by", opt_string_value(blueprint.updated_by.clone())),
    ])
}

#[async_trait::async_trait]
impl Resource for BlueprintResource {
    fn type_name(&self) -> &'static str {
        "vra_blueprint"
    }

    fn schema(&self) -> Block {
        Block::new()
            .describe("Cloud template (blueprint)")
            .attribute(id_attribute())
            .attribute(Attribute::string("name").required())
            .attribute(Attribute::string("description").optional().computed())
            .attribute(Attribute::string("project_id").required())
            .attribute(Attribute::string("content").required().describe("Blueprint YAML"))
            .attribute(
                Attribute::bool("request_scope_org")
                    .default(bool_value(false))
                    .describe("Share the blueprint with every project of the organization"),
            )
            .attribute(Attribute::string("project_name").computed())
            .attribute(Attribute::string("status").computed().volatile())
            .attribute(Attribute::bool("valid").computed().volatile())
            .attribute(Attribute::number("total_versions").computed())
            .attribute(Attribute::number("total_released_versions").computed())
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("created_at").computed())
            .attribute(Attribute::string("created_by").computed())
            .attribute(Attribute::string("updated_at").computed().volatile())
            .attribute(Attribute::string("updated_by").computed().volatile())
    }

    async fn create(&self, client: &VraClient, planned: &DynamicValue) -> Result<DynamicValue> {
        let spec = spec_from_config(planned);
        let blueprint = client
            .create_blueprint(&spec)
            .await
            .with_context(|| format!("creating blueprint {}", spec.name))?;
        Ok(blueprint_to_state(&blueprint))
    }

    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue> {
        let id = require_id(state)?;
        let blueprint = client.get_blueprint(&id).await?;
        Ok(blueprint_to_state(&blueprint))
    }

    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = require_id(prior)?;
        let blueprint = client
            .update_blueprint(&id, &spec_from_config(planned))
            .await
            .with_context(|| format!("updating blueprint {}", id))?;
        Ok(blueprint_to_state(&blueprint))
    }

    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()> {
        let id = require_id(state)?;
        client.delete_blueprint(&id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_from_config() {
        let config = make_state(vec![
            ("name", string_value("web")),
            ("project_id", string_value("p-1")),
            ("content", string_value("formatVersion: 1\n")),
        ]);
        let spec = spec_from_config(&config);
        assert_eq!(spec.content, "formatVersion: 1\n");
        assert!(!spec.request_scope_org);
        assert_eq!(spec.description, None);
    }

    #[test]
    fn test_blueprint_to_state() {
        let blueprint = Blueprint {
            id: "bp-1".into(),
            name: "web".into(),
            valid: Some(true),
            total_versions: Some(2),
            ..Default::default()
        };
        let state = blueprint_to_state(&blueprint);
        assert_eq!(state.get("valid"), Some(&bool_value(true)));
        assert_eq!(state.get("content"), Some(&DynamicValue::Null));
    }
}
