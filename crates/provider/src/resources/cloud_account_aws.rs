//! vra_cloud_account_aws

use anyhow::{Context, Result};
use tracing::info;
use vra_client::models::{CloudAccountAws, CloudAccountAwsSpecification, RegionSpecification};
use vra_client::VraClient;

use super::common::{id_attribute, require_id, tags_block, tags_from_config, tags_to_state};
use super::Resource;
use crate::schema::{Attribute, Block};
use crate::state::{
    bool_value, get_bool_attr, get_optional_string_attr, get_string_attr, get_string_list_attr,
    make_state, opt_string_value, string_list_value, string_value, DynamicValue,
};
use crate::timeouts::{timeouts_block, Timeouts};
use crate::validators::Validator;

pub struct CloudAccountAwsResource;

fn spec_from_config(config: &DynamicValue) -> CloudAccountAwsSpecification {
    CloudAccountAwsSpecification {
        name: get_string_attr(config, "name"),
        description: get_optional_string_attr(config, "description"),
        access_key_id: get_string_attr(config, "access_key"),
        secret_access_key: get_string_attr(config, "secret_key"),
        regions: get_string_list_attr(config, "regions")
            .into_iter()
            .map(|id| RegionSpecification {
                name: id.clone(),
                external_region_id: id,
            })
            .collect(),
        create_default_zones: get_bool_attr(config, "create_default_zones", false),
        tags: tags_from_config(config, "tags"),
    }
}

/// State of an account; the secret key is never returned by vRA
pub(crate) fn cloud_account_to_state(account: &CloudAccountAws) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&account.id)),
        ("name", string_value(&account.name)),
        ("description", opt_string_value(account.description.clone())),
        ("access_key", opt_string_value(account.access_key_id.clone())),
        (
            "regions",
            string_list_value(
                account
                    .enabled_regions
                    .iter()
                    .map(|r| r.external_region_id.clone()),
            ),
        ),
        ("tags", tags_to_state(&account.tags)),
        ("org_id", opt_string_value(account.org_id.clone())),
        ("owner", opt_string_value(account.owner.clone())),
        ("created_at", opt_string_value(account.created_at.clone())),
        ("updated_at", opt_string_value(account.updated_at.clone())),
    ])
}

/// vRA returns enabled regions in its own order; keep the configured order
/// when both hold the same regions
fn keep_region_order(mut state: DynamicValue, configured: &DynamicValue) -> DynamicValue {
    let wanted = get_string_list_attr(configured, "regions");
    let mut expected = wanted.clone();
    let mut actual = get_string_list_attr(&state, "regions");
    expected.sort();
    actual.sort();
    if !wanted.is_empty() && expected == actual {
        state.insert("regions", string_list_value(wanted));
    }
    state
}

#[async_trait::async_trait]
impl Resource for CloudAccountAwsResource {
    fn type_name(&self) -> &'static str {
        "vra_cloud_account_aws"
    }

    fn schema(&self) -> Block {
        Block::new()
            .describe("AWS cloud account")
            .attribute(id_attribute())
            .attribute(Attribute::string("name").required())
            .attribute(Attribute::string("description").optional().computed())
            .attribute(Attribute::string("access_key").required())
            .attribute(Attribute::string("secret_key").required().sensitive())
            .attribute(
                Attribute::string_list("regions")
                    .required()
                    .describe("External region ids to enable, e.g. \"us-east-1\"; each at most once")
                    .validate(Validator::Unique),
            )
            .attribute(
                Attribute::bool("create_default_zones")
                    .default(bool_value(false))
                    .force_new(),
            )
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("owner").computed())
            .attribute(Attribute::string("created_at").computed())
            .attribute(Attribute::string("updated_at").computed().volatile())
            .block(tags_block())
            .block(timeouts_block())
    }

    async fn create(&self, client: &VraClient, planned: &DynamicValue) -> Result<DynamicValue> {
        let timeouts = Timeouts::from_state(planned)?;
        let spec = spec_from_config(planned);
        let tracker = client
            .create_cloud_account_aws(&spec)
            .await
            .with_context(|| format!("creating cloud account {}", spec.name))?;
        let id = client.wait_for_resource_id(tracker, timeouts.create).await?;
        info!("Created AWS cloud account {} ({})", spec.name, id);

        let account = client.get_cloud_account_aws(&id).await?;
        Ok(keep_region_order(cloud_account_to_state(&account), planned))
    }

    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue> {
        let id = require_id(state)?;
        let account = client.get_cloud_account_aws(&id).await?;
        Ok(keep_region_order(cloud_account_to_state(&account), state))
    }

    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = require_id(prior)?;
        let timeouts = Timeouts::from_state(planned)?;
        let tracker = client
            .update_cloud_account_aws(&id, &spec_from_config(planned))
            .await
            .with_context(|| format!("updating cloud account {}", id))?;
        client.wait_for_tracker(tracker, timeouts.update).await?;

        let account = client.get_cloud_account_aws(&id).await?;
        Ok(keep_region_order(cloud_account_to_state(&account), planned))
    }

    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()> {
        let id = require_id(state)?;
        let timeouts = Timeouts::from_state(state)?;
        client.delete_cloud_account_aws(&id, timeouts.delete).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttrType;

    #[test]
    fn test_spec_uses_region_ids() {
        let config = make_state(vec![
            ("name", string_value("aws")),
            ("access_key", string_value("AKIA")),
            ("secret_key", string_value("s3cr3t")),
            ("regions", string_list_value(["us-east-1", "eu-west-1"])),
        ]);
        let spec = spec_from_config(&config);
        assert_eq!(spec.secret_access_key, "s3cr3t");
        assert_eq!(spec.regions.len(), 2);
        assert_eq!(spec.regions[1].external_region_id, "eu-west-1");
        assert!(!spec.create_default_zones);
    }

    #[test]
    fn test_state_omits_secret() {
        let account = CloudAccountAws {
            id: "ca-1".into(),
            name: "aws".into(),
            access_key_id: Some("AKIA".into()),
            enabled_regions: vec![RegionSpecification {
                external_region_id: "us-east-1".into(),
                name: "us-east-1".into(),
            }],
            ..Default::default()
        };
        let state = cloud_account_to_state(&account);
        assert!(state.get("secret_key").is_none());
        assert_eq!(get_string_list_attr(&state, "regions"), vec!["us-east-1"]);
    }

    #[test]
    fn test_duplicate_regions_rejected() {
        let config = make_state(vec![
            ("name", string_value("aws")),
            ("regions", string_list_value(["us-east-1", "us-east-1"])),
        ]);
        let violations = CloudAccountAwsResource.schema().validate(&config);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.starts_with("regions:"));
    }

    #[test]
    fn test_regions_are_a_list() {
        // sets would collapse duplicates before validation
        let schema = CloudAccountAwsResource.schema();
        let regions = schema.find_attribute("regions").unwrap();
        assert_eq!(regions.ty, AttrType::list_of(AttrType::String));
    }

    #[test]
    fn test_read_keeps_configured_region_order() {
        let account = CloudAccountAws {
            id: "ca-1".into(),
            name: "aws".into(),
            enabled_regions: ["us-east-1", "eu-west-1"]
                .iter()
                .map(|r| RegionSpecification {
                    external_region_id: r.to_string(),
                    name: r.to_string(),
                })
                .collect(),
            ..Default::default()
        };
        let configured = make_state(vec![("regions", string_list_value(["eu-west-1", "us-east-1"]))]);
        let state = keep_region_order(cloud_account_to_state(&account), &configured);
        assert_eq!(get_string_list_attr(&state, "regions"), vec!["eu-west-1", "us-east-1"]);

        // a region added outside Terraform shows as drift
        let configured = make_state(vec![("regions", string_list_value(["eu-west-1"]))]);
        let state = keep_region_order(cloud_account_to_state(&account), &configured);
        assert_eq!(get_string_list_attr(&state, "regions"), vec!["us-east-1", "eu-west-1"]);
    }
}
