//! vra_region data source

use anyhow::Result;
use vra_client::models::Region;
use vra_client::VraClient;

use super::{odata_string, single_match, DataSource};
use crate::schema::{Attribute, Block, Violation};
use crate::state::{get_optional_string_attr, make_state, opt_string_value, string_value, DynamicValue};

pub struct RegionDataSource;

fn region_to_state(region: &Region, filter: Option<String>) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&region.id)),
        ("name", opt_string_value(region.name.clone())),
        ("region", string_value(&region.external_region_id)),
        ("cloud_account_id", opt_string_value(region.cloud_account_id.clone())),
        ("filter", opt_string_value(filter)),
        ("org_id", opt_string_value(region.org_id.clone())),
        ("owner", opt_string_value(region.owner.clone())),
        ("created_at", opt_string_value(region.created_at.clone())),
        ("updated_at", opt_string_value(region.updated_at.clone())),
    ])
}

/// OData filter for a region of a cloud account
fn account_region_filter(cloud_account_id: &str, region: &str) -> String {
    format!(
        "cloudAccountId eq {} and externalRegionId eq {}",
        odata_string(cloud_account_id),
        odata_string(region)
    )
}

#[async_trait::async_trait]
impl DataSource for RegionDataSource {
    fn type_name(&self) -> &'static str {
        "vra_region"
    }

    fn schema(&self) -> Block {
        Block::new()
            .describe("Region of a cloud account")
            .attribute(Attribute::string("id").optional().computed())
            .attribute(
                Attribute::string("cloud_account_id")
                    .optional()
                    .computed()
                    .describe("Used together with region"),
            )
            .attribute(
                Attribute::string("region")
                    .optional()
                    .computed()
                    .describe("External region id, e.g. \"us-east-1\""),
            )
            .attribute(Attribute::string("filter").optional().describe("OData filter"))
            .attribute(Attribute::string("name").computed())
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("owner").computed())
            .attribute(Attribute::string("created_at").computed())
            .attribute(Attribute::string("updated_at").computed())
    }

    fn validate(&self, config: &DynamicValue) -> Vec<Violation> {
        let set = |key: &str| !config.attr(key).is_null();
        let by_account = set("cloud_account_id") || set("region");
        let forms = [set("id"), set("filter"), by_account]
            .iter()
            .filter(|s| **s)
            .count();
        if forms != 1 {
            return vec![Violation::new(
                Vec::new(),
                "set exactly one of id, filter, or cloud_account_id with region",
            )];
        }
        if by_account && !(set("cloud_account_id") && set("region")) {
            return vec![Violation::new(
                Vec::new(),
                "cloud_account_id and region must be set together",
            )];
        }
        Vec::new()
    }

    async fn read(&self, client: &VraClient, config: &DynamicValue) -> Result<DynamicValue> {
        if let Some(id) = get_optional_string_attr(config, "id") {
            let region = client.get_region(&id).await?;
            return Ok(region_to_state(&region, None));
        }

        let user_filter = get_optional_string_attr(config, "filter");
        let filter = match &user_filter {
            Some(filter) => filter.clone(),
            None => account_region_filter(
                &get_optional_string_attr(config, "cloud_account_id").unwrap_or_default(),
                &get_optional_string_attr(config, "region").unwrap_or_default(),
            ),
        };
        let found = client.list_regions(Some(filter.as_str())).await?;
        let region = single_match(found, "region", &format!("filter {:?}", filter))?;
        Ok(region_to_state(&region, user_filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_forms() {
        let config = |pairs: Vec<(&str, &str)>| {
            make_state(pairs.into_iter().map(|(k, v)| (k, string_value(v))).collect())
        };
        assert!(RegionDataSource.validate(&config(vec![("id", "r-1")])).is_empty());
        assert!(RegionDataSource
            .validate(&config(vec![("cloud_account_id", "ca-1"), ("region", "us-east-1")]))
            .is_empty());
        assert_eq!(
            RegionDataSource
                .validate(&config(vec![("region", "us-east-1")]))
                .len(),
            1
        );
        assert_eq!(
            RegionDataSource
                .validate(&config(vec![("id", "r-1"), ("filter", "name eq 'x'")]))
                .len(),
            1
        );
        assert_eq!(RegionDataSource.validate(&config(vec![])).len(), 1);
    }

    #[test]
    fn test_account_region_filter() {
        assert_eq!(
            account_region_filter("ca-1", "us-east-1"),
            "cloudAccountId eq 'ca-1' and externalRegionId eq 'us-east-1'"
        );
    }
}
