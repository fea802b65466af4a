//! vra_blueprint data source

use anyhow::Result;
use vra_client::VraClient;

use super::{derived_schema, exactly_one_of, single_match, DataSource};
use crate::resources::blueprint::{blueprint_to_state, BlueprintResource};
use crate::resources::Resource;
use crate::schema::{Block, Violation};
use crate::state::{get_optional_string_attr, DynamicValue};

pub struct BlueprintDataSource;

#[async_trait::async_trait]
impl DataSource for BlueprintDataSource {
    fn type_name(&self) -> &'static str {
        "vra_blueprint"
    }

    fn schema(&self) -> Block {
        derived_schema(BlueprintResource.schema(), &["id", "name", "project_id"], &[])
    }

    fn validate(&self, config: &DynamicValue) -> Vec<Violation> {
        exactly_one_of(config, &["id", "name"])
    }

    async fn read(&self, client: &VraClient, config: &DynamicValue) -> Result<DynamicValue> {
        if let Some(id) = get_optional_string_attr(config, "id") {
            let blueprint = client.get_blueprint(&id).await?;
            return Ok(blueprint_to_state(&blueprint));
        }

        let name = get_optional_string_attr(config, "name").unwrap_or_default();
        let project_id = get_optional_string_attr(config, "project_id");
        // The name parameter matches substrings
        let found: Vec<_> = client
            .list_blueprints(Some(name.as_str()), project_id.as_deref())
            .await?
            .into_iter()
            .filter(|b| b.name == name)
            .collect();
        let criteria = match &project_id {
            Some(project_id) => format!("name {:?} in project {}", name, project_id),
            None => format!("name {:?}", name),
        };
        let summary = single_match(found, "blueprint", &criteria)?;

        // Listings leave out the content
        let blueprint = client.get_blueprint(&summary.id).await?;
        Ok(blueprint_to_state(&blueprint))
    }
}
