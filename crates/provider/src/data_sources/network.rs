//! vra_network data source

use anyhow::Result;
use vra_client::VraClient;

use super::{derived_schema, exactly_one_of, odata_string, single_match, DataSource};
use crate::resources::network::{network_to_state, NetworkResource};
use crate::resources::Resource;
use crate::schema::{Block, Violation};
use crate::state::{get_optional_string_attr, DynamicValue};

pub struct NetworkDataSource;

#[async_trait::async_trait]
impl DataSource for NetworkDataSource {
    fn type_name(&self) -> &'static str {
        "vra_network"
    }

    fn schema(&self) -> Block {
        derived_schema(NetworkResource.schema(), &["id", "name"], &["constraints"])
    }

    fn validate(&self, config: &DynamicValue) -> Vec<Violation> {
        exactly_one_of(config, &["id", "name"])
    }

    async fn read(&self, client: &VraClient, config: &DynamicValue) -> Result<DynamicValue> {
        let network = match get_optional_string_attr(config, "id") {
            Some(id) => client.get_network(&id).await?,
            None => {
                let name = get_optional_string_attr(config, "name").unwrap_or_default();
                let filter = format!("name eq {}", odata_string(&name));
                let found = client.list_networks(Some(filter.as_str())).await?;
                single_match(found, "network", &format!("name {:?}", name))?
            }
        };
        Ok(network_to_state(&network))
    }
}
