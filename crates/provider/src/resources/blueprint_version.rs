//! vra_blueprint_version
//!
//! Versions cannot be deleted through the API. Destroying one unreleases it
//! when released and forgets it.

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use vra_client::models::{BlueprintVersion, BlueprintVersionRequest};
use vra_client::VraClient;

use super::common::{changed, id_attribute, require_id};
use super::Resource;
use crate::schema::{Attribute, Block};
use crate::state::{
    bool_value, get_bool_attr, get_optional_string_attr, get_string_attr, make_state,
    opt_bool_value, opt_string_value, string_value, DynamicValue,
};
use crate::validators::Validator;

pub struct BlueprintVersionResource;

/// Blueprint id and version of a state. Imported states only carry an id of
/// the form `<blueprint_id>/<version>`.
fn locate(state: &DynamicValue) -> Result<(String, String)> {
    let blueprint_id = get_string_attr(state, "blueprint_id");
    let version = get_string_attr(state, "version");
    if !blueprint_id.is_empty() && !version.is_empty() {
        return Ok((blueprint_id, version));
    }
    let id = require_id(state)?;
    match id.split_once('/') {
        Some((blueprint_id, version)) if !blueprint_id.is_empty() && !version.is_empty() => {
            Ok((blueprint_id.to_string(), version.to_string()))
        }
        _ => bail!(
            "blueprint version {:?} must be imported as <blueprint_id>/<version>",
            id
        ),
    }
}

fn version_to_state(version: &BlueprintVersion, blueprint_id: &str) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&version.id)),
        (
            "blueprint_id",
            string_value(version.blueprint_id.as_deref().unwrap_or(blueprint_id)),
        ),
        ("version", string_value(&version.version)),
        ("description", opt_string_value(version.version_description.clone())),
        ("change_log", opt_string_value(version.version_change_log.clone())),
        ("release", bool_value(version.is_released())),
        ("name", opt_string_value(version.name.clone())),
        ("content", opt_string_value(version.content.clone())),
        ("status", opt_string_value(version.status.clone())),
        ("valid", opt_bool_value(version.valid)),
        ("project_id", opt_string_value(version.project_id.clone())),
        ("project_name", opt_string_value(version.project_name.clone())),
        ("created_at", opt_string_value(version.created_at.clone())),
        ("created_by", opt_string_value(version.created_by.clone())),
    ])
}

#[async_trait::async_trait]
impl Resource for BlueprintVersionResource {
    fn type_name(&self) -> &'static str {
        "vra_blueprint_version"
    }

    fn schema(&self) -> Block {
        Block::new()
            .describe("Snapshot of a blueprint's content, optionally released to the catalog")
            .attribute(id_attribute())
            .attribute(Attribute::string("blueprint_id").required().force_new())
            .attribute(
                Attribute::string("version")
                    .required()
                    .force_new()
                    .validate(Validator::NotEmpty),
            )
            .attribute(Attribute::string("description").optional().force_new())
            .attribute(Attribute::string("change_log").optional().force_new())
            .attribute(Attribute::bool("release").default(bool_value(false)))
            .attribute(Attribute::string("name").computed())
            .attribute(Attribute::string("content").computed())
            .attribute(Attribute::string("status").computed().volatile())
            .attribute(Attribute::bool("valid").computed())
            .attribute(Attribute::string("project_id").computed())
            .attribute(Attribute::string("project_name").computed())
            .attribute(Attribute::string("created_at").computed())
            .attribute(Attribute::string("created_by").computed())
    }

    async fn create(&self, client: &VraClient, planned: &DynamicValue) -> Result<DynamicValue> {
        let blueprint_id = get_string_attr(planned, "blueprint_id");
        let request = BlueprintVersionRequest {
            version: get_string_attr(planned, "version"),
            description: get_optional_string_attr(planned, "description"),
            change_log: get_optional_string_attr(planned, "change_log"),
            release: get_bool_attr(planned, "release", false),
        };
        let version = client
            .create_blueprint_version(&blueprint_id, &request)
            .await
            .with_context(|| {
                format!("creating version {} of blueprint {}", request.version, blueprint_id)
            })?;
        info!("Created blueprint {} version {}", blueprint_id, version.version);
        Ok(version_to_state(&version, &blueprint_id))
    }

    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue> {
        let (blueprint_id, version) = locate(state)?;
        let version = client.get_blueprint_version(&blueprint_id, &version).await?;
        Ok(version_to_state(&version, &blueprint_id))
    }

    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let (blueprint_id, version) = locate(prior)?;
        if !changed(prior, planned, "release") {
            return self.read(client, prior).await;
        }

        let updated = if get_bool_attr(planned, "release", false) {
            client.release_blueprint_version(&blueprint_id, &version).await
        } else {
            client.unrelease_blueprint_version(&blueprint_id, &version).await
        }
        .with_context(|| format!("changing release of blueprint {} version {}", blueprint_id, version))?;
        Ok(version_to_state(&updated, &blueprint_id))
    }

    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()> {
        let (blueprint_id, version) = locate(state)?;
        let current = client.get_blueprint_version(&blueprint_id, &version).await?;
        if current.is_released() {
            client
                .unrelease_blueprint_version(&blueprint_id, &version)
                .await
                .with_context(|| {
                    format!("unreleasing blueprint {} version {}", blueprint_id, version)
                })?;
        }
        warn!(
            "Blueprint {} version {} cannot be deleted; removed from state only",
            blueprint_id, version
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_prefers_attributes() {
        let state = make_state(vec![
            ("id", string_value("v-1")),
            ("blueprint_id", string_value("bp-1")),
            ("version", string_value("1.0")),
        ]);
        assert_eq!(locate(&state).unwrap(), ("bp-1".to_string(), "1.0".to_string()));
    }

    #[test]
    fn test_locate_imported_id() {
        let state = make_state(vec![("id", string_value("bp-1/2.1"))]);
        assert_eq!(locate(&state).unwrap(), ("bp-1".to_string(), "2.1".to_string()));
        assert!(locate(&make_state(vec![("id", string_value("v-1"))])).is_err());
    }

    #[test]
    fn test_version_to_state() {
        let version = BlueprintVersion {
            id: "v-1".into(),
            version: "1.0".into(),
            status: Some("RELEASED".into()),
            version_description: Some("first".into()),
            ..Default::default()
        };
        let state = version_to_state(&version, "bp-1");
        assert_eq!(get_string_attr(&state, "blueprint_id"), "bp-1");
        assert_eq!(state.get("release"), Some(&bool_value(true)));
        assert_eq!(get_string_attr(&state, "description"), "first");
    }

    #[test]
    fn test_empty_version_rejected() {
        let config = make_state(vec![("version", string_value(""))]);
        assert_eq!(BlueprintVersionResource.schema().validate(&config).len(), 1);
    }
}
