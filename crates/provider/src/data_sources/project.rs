//! vra_project data source

use anyhow::Result;
use vra_client::VraClient;

use super::{derived_schema, exactly_one_of, odata_string, single_match, DataSource};
use crate::resources::project::{project_to_state, ProjectResource};
use crate::resources::Resource;
use crate::schema::{Block, Violation};
use crate::state::{get_optional_string_attr, DynamicValue};

pub struct ProjectDataSource;

#[async_trait::async_trait]
impl DataSource for ProjectDataSource {
    fn type_name(&self) -> &'static str {
        "vra_project"
    }

    fn schema(&self) -> Block {
        derived_schema(ProjectResource.schema(), &["id", "name"], &[])
    }

    fn validate(&self, config: &DynamicValue) -> Vec<Violation> {
        exactly_one_of(config, &["id", "name"])
    }

    async fn read(&self, client: &VraClient, config: &DynamicValue) -> Result<DynamicValue> {
        let project = match get_optional_string_attr(config, "id") {
            Some(id) => client.get_project(&id).await?,
            None => {
                let name = get_optional_string_attr(config, "name").unwrap_or_default();
                let filter = format!("name eq {}", odata_string(&name));
                let found = client.list_projects(Some(filter.as_str())).await?;
                single_match(found, "project", &format!("name {:?}", name))?
            }
        };
        Ok(project_to_state(&project))
    }
}
