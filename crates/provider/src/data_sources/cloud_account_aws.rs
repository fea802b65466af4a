//! vra_cloud_account_aws data source

use anyhow::Result;
use vra_client::VraClient;

use super::{derived_schema, exactly_one_of, odata_string, single_match, DataSource};
use crate::resources::cloud_account_aws::{cloud_account_to_state, CloudAccountAwsResource};
use crate::resources::Resource;
use crate::schema::{Block, Violation};
use crate::state::{get_optional_string_attr, DynamicValue};

pub struct CloudAccountAwsDataSource;

#[async_trait::async_trait]
impl DataSource for CloudAccountAwsDataSource {
    fn type_name(&self) -> &'static str {
        "vra_cloud_account_aws"
    }

    fn schema(&self) -> Block {
        derived_schema(
            CloudAccountAwsResource.schema(),
            &["id", "name"],
            &["secret_key", "create_default_zones"],
        )
    }

    fn validate(&self, config: &DynamicValue) -> Vec<Violation> {
        exactly_one_of(config, &["id", "name"])
    }

    async fn read(&self, client: &VraClient, config: &DynamicValue) -> Result<DynamicValue> {
        let account = match get_optional_string_attr(config, "id") {
            Some(id) => client.get_cloud_account_aws(&id).await?,
            None => {
                let name = get_optional_string_attr(config, "name").unwrap_or_default();
                let filter = format!("name eq {}", odata_string(&name));
                let found = client.list_cloud_accounts_aws(Some(filter.as_str())).await?;
                single_match(found, "AWS cloud account", &format!("name {:?}", name))?
            }
        };
        Ok(cloud_account_to_state(&account))
    }
}
