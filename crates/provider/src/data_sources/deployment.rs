//! vra_deployment data source

use anyhow::Result;
use vra_client::VraClient;

use super::{derived_schema, exactly_one_of, single_match, DataSource};
use crate::resources::deployment::{deployment_to_state, DeploymentResource};
use crate::resources::Resource;
use crate::schema::{Block, Violation};
use crate::state::{get_optional_string_attr, DynamicValue};

pub struct DeploymentDataSource;

#[async_trait::async_trait]
impl DataSource for DeploymentDataSource {
    fn type_name(&self) -> &'static str {
        "vra_deployment"
    }

    fn schema(&self) -> Block {
        derived_schema(DeploymentResource.schema(), &["id", "name"], &["reason"])
    }

    fn validate(&self, config: &DynamicValue) -> Vec<Violation> {
        exactly_one_of(config, &["id", "name"])
    }

    async fn read(&self, client: &VraClient, config: &DynamicValue) -> Result<DynamicValue> {
        let id = match get_optional_string_attr(config, "id") {
            Some(id) => id,
            None => {
                let name = get_optional_string_attr(config, "name").unwrap_or_default();
                let found: Vec<_> = client
                    .list_deployments(Some(name.as_str()))
                    .await?
                    .into_iter()
                    .filter(|d| d.name == name)
                    .collect();
                single_match(found, "deployment", &format!("name {:?}", name))?.id
            }
        };
        // Fetched by id for the expanded resources
        let deployment = client.get_deployment(&id).await?;
        Ok(deployment_to_state(&deployment, &DynamicValue::Null))
    }
}
