//! vra_zone data source

use anyhow::Result;
use vra_client::VraClient;

use super::{derived_schema, exactly_one_of, odata_string, single_match, DataSource};
use crate::resources::zone::{zone_to_state, ZoneResource};
use crate::resources::Resource;
use crate::schema::{Block, Violation};
use crate::state::{get_optional_string_attr, DynamicValue};

pub struct ZoneDataSource;

#[async_trait::async_trait]
impl DataSource for ZoneDataSource {
    fn type_name(&self) -> &'static str {
        "vra_zone"
    }

    fn schema(&self) -> Block {
        derived_schema(ZoneResource.schema(), &["id", "name"], &["compute_ids"])
    }

    fn validate(&self, config: &DynamicValue) -> Vec<Violation> {
        exactly_one_of(config, &["id", "name"])
    }

    async fn read(&self, client: &VraClient, config: &DynamicValue) -> Result<DynamicValue> {
        let zone = match get_optional_string_attr(config, "id") {
            Some(id) => client.get_zone(&id).await?,
            None => {
                let name = get_optional_string_attr(config, "name").unwrap_or_default();
                let filter = format!("name eq {}", odata_string(&name));
                let found = client.list_zones(Some(filter.as_str())).await?;
                single_match(found, "zone", &format!("name {:?}", name))?
            }
        };
        Ok(zone_to_state(&zone))
    }
}
