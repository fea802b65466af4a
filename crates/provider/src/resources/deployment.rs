//! vra_deployment
//!
//! Created by requesting a blueprint; vRA names the resulting deployment
//! after the request. Inputs are strings in configuration and sent as JSON
//! where they parse as such.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use tracing::info;
use vra_client::models::{BlueprintRequestSpecification, Deployment, DeploymentUpdate};
use vra_client::VraClient;

use super::common::{changed, id_attribute, require_id};
use super::Resource;
use crate::schema::{Attribute, Block};
use crate::state::{
    get_optional_string_attr, get_string_attr, get_string_map_attr, make_state,
    opt_string_value, string_list_value, string_map_value, string_value, DynamicValue,
};
use crate::timeouts::{timeouts_block, Timeouts};

pub struct DeploymentResource;

/// `"3"` becomes a number and `"true"` a bool; anything that is not JSON
/// stays a string
fn inputs_to_json(inputs: HashMap<String, String>) -> Map<String, Value> {
    inputs
        .into_iter()
        .map(|(key, raw)| {
            let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            (key, value)
        })
        .collect()
}

fn input_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Inputs as reported, limited to the keys the prior state set so that
/// blueprint defaults do not show up as drift
fn inputs_to_state(inputs: &Map<String, Value>, prior: &DynamicValue) -> DynamicValue {
    let known = prior.attr("inputs").as_map();
    let reported: HashMap<String, String> = inputs
        .iter()
        .filter(|(key, _)| known.map_or(true, |k| k.contains_key(*key)))
        .map(|(key, value)| (key.clone(), input_to_string(value)))
        .collect();
    string_map_value(&reported)
}

pub(crate) fn deployment_to_state(deployment: &Deployment, prior: &DynamicValue) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&deployment.id)),
        ("name", string_value(&deployment.name)),
        ("description", opt_string_value(deployment.description.clone())),
        ("project_id", opt_string_value(deployment.project_id.clone())),
        ("blueprint_id", opt_string_value(deployment.blueprint_id.clone())),
        (
            "blueprint_version",
            opt_string_value(deployment.blueprint_version.clone()),
        ),
        ("inputs", inputs_to_state(&deployment.inputs, prior)),
        ("catalog_item_id", opt_string_value(deployment.catalog_item_id.clone())),
        ("status", opt_string_value(deployment.status.clone())),
        ("owner", opt_string_value(deployment.owned_by.clone())),
        ("org_id", opt_string_value(deployment.org_id.clone())),
        ("created_at", opt_string_value(deployment.created_at.clone())),
        ("created_by", opt_string_value(deployment.created_by.clone())),
        ("last_updated_at", opt_string_value(deployment.last_updated_at.clone())),
        ("last_updated_by", opt_string_value(deployment.last_updated_by.clone())),
        ("lease_expire_at", opt_string_value(deployment.lease_expire_at.clone())),
        (
            "resource_ids",
            string_list_value(deployment.resources.iter().map(|r| r.id.clone())),
        ),
    ])
}

#[async_trait::async_trait]
impl Resource for DeploymentResource {
    fn type_name(&self) -> &'static str {
        "vra_deployment"
    }

    fn schema(&self) -> Block {
        Block::new()
            .describe("Deployment of a blueprint")
            .attribute(id_attribute())
            .attribute(Attribute::string("name").required())
            .attribute(Attribute::string("description").optional().computed())
            .attribute(Attribute::string("project_id").required().force_new())
            .attribute(Attribute::string("blueprint_id").required().force_new())
            .attribute(
                Attribute::string("blueprint_version")
                    .optional()
                    .computed()
                    .force_new(),
            )
            .attribute(
                Attribute::string_map("inputs")
                    .optional()
                    .computed()
                    .force_new()
                    .describe("Blueprint inputs; values are parsed as JSON where possible"),
            )
            .attribute(Attribute::string("reason").optional().describe("Reason for the request"))
            .attribute(Attribute::string("catalog_item_id").computed())
            .attribute(Attribute::string("status").computed().volatile())
            .attribute(Attribute::string("owner").computed())
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("created_at").computed())
            .attribute(Attribute::string("created_by").computed())
            .attribute(Attribute::string("last_updated_at").computed().volatile())
            .attribute(Attribute::string("last_updated_by").computed().volatile())
            .attribute(Attribute::string("lease_expire_at").computed())
            .attribute(Attribute::string_list("resource_ids").computed())
            .block(timeouts_block())
    }

    async fn create(&self, client: &VraClient, planned: &DynamicValue) -> Result<DynamicValue> {
        let timeouts = Timeouts::from_state(planned)?;
        let spec = BlueprintRequestSpecification {
            blueprint_id: get_string_attr(planned, "blueprint_id"),
            blueprint_version: get_optional_string_attr(planned, "blueprint_version"),
            deployment_name: get_string_attr(planned, "name"),
            description: get_optional_string_attr(planned, "description"),
            project_id: get_string_attr(planned, "project_id"),
            inputs: inputs_to_json(get_string_map_attr(planned, "inputs")),
            reason: get_optional_string_attr(planned, "reason"),
        };
        let request = client
            .create_blueprint_request(&spec)
            .await
            .with_context(|| format!("requesting deployment {}", spec.deployment_name))?;
        let done = client
            .wait_for_blueprint_request(&request.id, timeouts.create)
            .await?;
        let id = done.deployment_id.ok_or_else(|| {
            anyhow!("blueprint request {} finished without a deployment", done.id)
        })?;
        info!("Created deployment {} ({})", spec.deployment_name, id);

        let deployment = client.get_deployment(&id).await?;
        Ok(deployment_to_state(&deployment, planned))
    }

    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue> {
        let id = require_id(state)?;
        let deployment = client.get_deployment(&id).await?;
        Ok(deployment_to_state(&deployment, state))
    }

    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = require_id(prior)?;
        if changed(prior, planned, "name") || changed(prior, planned, "description") {
            let update = DeploymentUpdate {
                name: get_string_attr(planned, "name"),
                description: get_optional_string_attr(planned, "description"),
            };
            client
                .update_deployment(&id, &update)
                .await
                .with_context(|| format!("updating deployment {}", id))?;
        }
        let deployment = client.get_deployment(&id).await?;
        Ok(deployment_to_state(&deployment, planned))
    }

    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()> {
        let id = require_id(state)?;
        let timeouts = Timeouts::from_state(state)?;
        client.delete_deployment(&id, timeouts.delete).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inputs_to_json() {
        let mut inputs = HashMap::new();
        inputs.insert("count".to_string(), "3".to_string());
        inputs.insert("flavor".to_string(), "small".to_string());
        inputs.insert("tags".to_string(), r#"["a","b"]"#.to_string());
        let json = inputs_to_json(inputs);
        assert_eq!(json["count"], json!(3));
        assert_eq!(json["flavor"], json!("small"));
        assert_eq!(json["tags"], json!(["a", "b"]));
    }

    #[test]
    fn test_inputs_limited_to_prior_keys() {
        let reported: Map<String, Value> = serde_json::from_value(json!({
            "count": 3,
            "flavor": "small",
            "image": "ubuntu"
        }))
        .unwrap();

        let mut prior_inputs = HashMap::new();
        prior_inputs.insert("count".to_string(), "3".to_string());
        let prior = make_state(vec![("inputs", string_map_value(&prior_inputs))]);
        let state = make_state(vec![("inputs", inputs_to_state(&reported, &prior))]);
        let inputs = get_string_map_attr(&state, "inputs");
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs["count"], "3");

        let imported = make_state(vec![(
            "inputs",
            inputs_to_state(&reported, &DynamicValue::Null),
        )]);
        assert_eq!(get_string_map_attr(&imported, "inputs").len(), 3);
    }
}
