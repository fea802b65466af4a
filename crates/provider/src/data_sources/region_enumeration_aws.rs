//! vra_region_enumeration_aws data source

use anyhow::{Context, Result};
use vra_client::models::AwsRegionEnumerationSpecification;
use vra_client::VraClient;

use super::DataSource;
use crate::schema::{Attribute, Block};
use crate::state::{get_string_attr, make_state, string_list_value, string_value, DynamicValue};
use crate::timeouts::DEFAULT_TIMEOUT;

pub struct RegionEnumerationAwsDataSource;

#[async_trait::async_trait]
impl DataSource for RegionEnumerationAwsDataSource {
    fn type_name(&self) -> &'static str {
        "vra_region_enumeration_aws"
    }

    fn schema(&self) -> Block {
        Block::new()
            .describe("Regions visible to a pair of AWS keys")
            .attribute(Attribute::string("id").computed())
            .attribute(Attribute::string("access_key").required())
            .attribute(Attribute::string("secret_key").required().sensitive())
            .attribute(Attribute::string_list("regions").computed())
    }

    async fn read(&self, client: &VraClient, config: &DynamicValue) -> Result<DynamicValue> {
        let access_key = get_string_attr(config, "access_key");
        let spec = AwsRegionEnumerationSpecification {
            access_key_id: access_key.clone(),
            secret_access_key: get_string_attr(config, "secret_key"),
        };
        let mut regions = client
            .enumerate_aws_regions(&spec, DEFAULT_TIMEOUT)
            .await
            .context("enumerating AWS regions")?;
        regions.sort();

        Ok(make_state(vec![
            ("id", string_value(&access_key)),
            ("access_key", string_value(&access_key)),
            ("secret_key", string_value(spec.secret_access_key)),
            ("regions", string_list_value(regions)),
        ]))
    }
}
