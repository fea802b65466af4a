//! Data Source Implementations
//!
//! Read-only lookups. Each data source resolves its configuration to exactly
//! one API object; zero or several matches is an error.

pub mod blueprint;
pub mod cloud_account_aws;
pub mod deployment;
pub mod fabric_network;
pub mod image;
pub mod network;
pub mod project;
pub mod region;
pub mod region_enumeration_aws;
pub mod security_group;
pub mod zone;

use std::sync::Arc;

use anyhow::{bail, Result};
use vra_client::VraClient;

use crate::schema::{AttrType, Attribute, Block, Nesting, NestedBlock, Violation};
use crate::state::DynamicValue;

/// Trait for data source reads
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Block;

    fn validate(&self, _config: &DynamicValue) -> Vec<Violation> {
        Vec::new()
    }

    /// Look up the object described by `config`
    async fn read(&self, client: &VraClient, config: &DynamicValue) -> Result<DynamicValue>;
}

/// Every data source type the provider serves
pub fn all() -> Vec<Arc<dyn DataSource>> {
    vec![
        Arc::new(project::ProjectDataSource),
        Arc::new(zone::ZoneDataSource),
        Arc::new(region::RegionDataSource),
        Arc::new(cloud_account_aws::CloudAccountAwsDataSource),
        Arc::new(region_enumeration_aws::RegionEnumerationAwsDataSource),
        Arc::new(fabric_network::FabricNetworkDataSource),
        Arc::new(network::NetworkDataSource),
        Arc::new(image::ImageDataSource),
        Arc::new(security_group::SecurityGroupDataSource),
        Arc::new(blueprint::BlueprintDataSource),
        Arc::new(deployment::DeploymentDataSource),
    ]
}

/// Exactly one of `keys` must be set. Unknown values count as set.
pub(crate) fn exactly_one_of(config: &DynamicValue, keys: &[&str]) -> Vec<Violation> {
    let set = keys.iter().filter(|k| !config.attr(k).is_null()).count();
    if set == 1 {
        return Vec::new();
    }
    vec![Violation::new(
        Vec::new(),
        format!("exactly one of {} must be set", keys.join(", ")),
    )]
}

/// The single object of a lookup
pub(crate) fn single_match<T>(mut found: Vec<T>, what: &str, criteria: &str) -> Result<T> {
    match found.len() {
        0 => bail!("no {} found matching {}", what, criteria),
        1 => Ok(found.remove(0)),
        n => bail!("{} {}s match {}; narrow the criteria", n, what, criteria),
    }
}

/// Read-only schema of a resource: every attribute computed, `lookup`
/// attributes also optional, nested blocks turned into computed object
/// attributes. `skip` names attributes that make no sense to read back.
pub(crate) fn derived_schema(resource: Block, lookup: &[&str], skip: &[&str]) -> Block {
    let mut block = Block::new().describe(resource.description);
    for attr in resource.attributes {
        if skip.contains(&attr.name.as_str()) {
            continue;
        }
        let lookup_key = lookup.contains(&attr.name.as_str());
        let mut derived = Attribute::new(attr.name, attr.ty).describe(attr.description);
        derived = if lookup_key {
            derived.optional().computed()
        } else {
            derived.computed()
        };
        if attr.sensitive {
            derived = derived.sensitive();
        }
        block = block.attribute(derived);
    }
    for nested in resource.blocks {
        if nested.name == "timeouts" || skip.contains(&nested.name.as_str()) {
            continue;
        }
        let ty = nested_type(&nested);
        block = block.attribute(Attribute::new(nested.name, ty).computed());
    }
    block
}

fn block_type(block: &Block) -> AttrType {
    let mut fields: Vec<(String, AttrType)> = block
        .attributes
        .iter()
        .map(|a| (a.name.clone(), a.ty.clone()))
        .collect();
    fields.extend(block.blocks.iter().map(|b| (b.name.clone(), nested_type(b))));
    AttrType::Object(fields)
}

fn nested_type(nested: &NestedBlock) -> AttrType {
    let object = block_type(&nested.block);
    match nested.nesting {
        Nesting::Single => object,
        Nesting::List => AttrType::list_of(object),
        Nesting::Set => AttrType::set_of(object),
    }
}

/// OData string literal with quotes escaped
pub(crate) fn odata_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{make_state, string_value};
    use std::collections::HashSet;

    #[test]
    fn test_type_names_are_unique() {
        let names: Vec<_> = all().iter().map(|d| d.type_name()).collect();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_exactly_one_of() {
        let keys = ["id", "name"];
        assert_eq!(exactly_one_of(&make_state(vec![]), &keys).len(), 1);
        assert!(exactly_one_of(&make_state(vec![("id", string_value("x"))]), &keys).is_empty());
        let both = make_state(vec![("id", string_value("x")), ("name", string_value("y"))]);
        assert_eq!(exactly_one_of(&both, &keys).len(), 1);
        let unknown = make_state(vec![("id", DynamicValue::Unknown)]);
        assert!(exactly_one_of(&unknown, &keys).is_empty());
    }

    #[test]
    fn test_single_match() {
        assert_eq!(single_match(vec![1], "project", "name 'a'").unwrap(), 1);
        let none = single_match(Vec::<i32>::new(), "project", "name 'a'").unwrap_err();
        assert_eq!(none.to_string(), "no project found matching name 'a'");
        let many = single_match(vec![1, 2], "project", "name 'a'").unwrap_err();
        assert!(many.to_string().starts_with("2 projects match"));
    }

    #[test]
    fn test_derived_schema() {
        use crate::resources::{block_device::BlockDeviceResource, Resource};

        let schema = derived_schema(BlockDeviceResource.schema(), &["id", "name"], &["purge"]);
        let id = schema.find_attribute("id").unwrap();
        assert!(id.optional && id.computed);
        let capacity = schema.find_attribute("capacity_in_gb").unwrap();
        assert!(capacity.computed && !capacity.required && capacity.validators.is_empty());
        assert!(schema.find_attribute("purge").is_none());
        assert!(schema.find_attribute("timeouts").is_none());
        assert!(schema.blocks.is_empty());
        let tags = schema.find_attribute("tags").unwrap();
        assert_eq!(
            tags.ty.to_json(),
            serde_json::json!(["set", ["object", {"key": "string", "value": "string"}]])
        );
    }

    #[test]
    fn test_odata_string() {
        assert_eq!(odata_string("dev"), "'dev'");
        assert_eq!(odata_string("o'brien"), "'o''brien'");
    }
}
