//! Flavor, image, storage and network profiles

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::common::{Constraint, Links, Tag};

/// One named flavor within a flavor profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlavorMapping {
    /// Cloud specific instance type, e.g. `t2.small`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_count: Option<i64>,
    #[serde(rename = "memoryInMB", default, skip_serializing_if = "Option::is_none")]
    pub memory_in_mb: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlavorMappings {
    #[serde(default)]
    pub mapping: HashMap<String, FlavorMapping>,
}

/// Flavor profile as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlavorProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub flavor_mappings: FlavorMappings,
    #[serde(default)]
    pub external_region_id: Option<String>,
    #[serde(default)]
    pub cloud_account_id: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Body of flavor profile create and update calls
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlavorProfileSpecification {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub region_id: String,
    pub flavor_mapping: HashMap<String, FlavorMapping>,
}

/// One named image within an image profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_config: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_region_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageMappings {
    #[serde(default)]
    pub mapping: HashMap<String, ImageMapping>,
}

/// Image profile as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_mappings: ImageMappings,
    #[serde(default)]
    pub external_region_id: Option<String>,
    #[serde(default)]
    pub cloud_account_id: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Image reference sent when creating an image profile
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMappingSpecification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_config: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

/// Body of image profile create and update calls
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProfileSpecification {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub region_id: String,
    pub image_mapping: HashMap<String, ImageMappingSpecification>,
}

/// Storage profile as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_item: bool,
    #[serde(default)]
    pub supports_encryption: Option<bool>,
    #[serde(default)]
    pub disk_properties: HashMap<String, String>,
    #[serde(default)]
    pub disk_target_properties: HashMap<String, String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub external_region_id: Option<String>,
    #[serde(default)]
    pub cloud_account_id: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Body of storage profile create and update calls
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageProfileSpecification {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub region_id: String,
    pub default_item: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_encryption: Option<bool>,
    pub disk_properties: HashMap<String, String>,
    pub disk_target_properties: HashMap<String, String>,
    pub tags: Vec<Tag>,
}

/// Network profile as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub isolation_type: Option<String>,
    #[serde(rename = "isolationNetworkDomainCIDR", default)]
    pub isolation_network_domain_cidr: Option<String>,
    #[serde(rename = "isolatedNetworkCIDRPrefix", default)]
    pub isolated_network_cidr_prefix: Option<i64>,
    #[serde(default)]
    pub custom_properties: HashMap<String, String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub external_region_id: Option<String>,
    #[serde(default)]
    pub cloud_account_id: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Body of network profile create and update calls
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfileSpecification {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub region_id: String,
    pub fabric_network_ids: Vec<String>,
    pub security_group_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isolation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isolation_network_domain_id: Option<String>,
    #[serde(
        rename = "isolationNetworkDomainCIDR",
        skip_serializing_if = "Option::is_none"
    )]
    pub isolation_network_domain_cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isolation_external_fabric_network_id: Option<String>,
    #[serde(
        rename = "isolatedNetworkCIDRPrefix",
        skip_serializing_if = "Option::is_none"
    )]
    pub isolated_network_cidr_prefix: Option<i64>,
    pub custom_properties: HashMap<String, String>,
    pub tags: Vec<Tag>,
}
