//! vra_load_balancer

use anyhow::{Context, Result};
use tracing::info;
use vra_client::models::{
    HealthCheckConfiguration, LoadBalancer, LoadBalancerSpecification, RouteConfiguration,
};
use vra_client::VraClient;

use super::common::{
    custom_properties_attribute, id_attribute, require_id, tags_block, tags_from_config,
    tags_to_state,
};
use super::machine::{nic_block, nics_from_config};
use super::Resource;
use crate::schema::{Attribute, Block, NestedBlock};
use crate::state::{
    get_block, get_blocks, get_optional_bool_attr, get_optional_int_attr,
    get_optional_string_attr, get_string_attr, get_string_list_attr, get_string_map_attr,
    make_state, opt_int_value, opt_string_value, string_map_value, string_value, DynamicValue,
};
use crate::timeouts::{timeouts_block, Timeouts};
use crate::validators::{Validator, LOAD_BALANCER_PROTOCOLS};

pub struct LoadBalancerResource;

fn routes_from_config(config: &DynamicValue) -> Vec<RouteConfiguration> {
    get_blocks(config, "routes")
        .into_iter()
        .map(|r| RouteConfiguration {
            protocol: get_string_attr(r, "protocol"),
            port: get_string_attr(r, "port"),
            member_protocol: get_string_attr(r, "member_protocol"),
            member_port: get_string_attr(r, "member_port"),
            health_check_configuration: get_block(r, "health_check_configuration").map(|h| {
                HealthCheckConfiguration {
                    protocol: get_string_attr(h, "protocol"),
                    port: get_string_attr(h, "port"),
                    url_path: get_optional_string_attr(h, "url_path"),
                    interval_seconds: get_optional_int_attr(h, "interval_seconds"),
                    timeout_seconds: get_optional_int_attr(h, "timeout_seconds"),
                    unhealthy_threshold: get_optional_int_attr(h, "unhealthy_threshold"),
                    healthy_threshold: get_optional_int_attr(h, "healthy_threshold"),
                }
            }),
        })
        .collect()
}

fn routes_to_state(routes: &[RouteConfiguration]) -> DynamicValue {
    DynamicValue::List(
        routes
            .iter()
            .map(|r| {
                let health = match &r.health_check_configuration {
                    Some(h) => DynamicValue::List(vec![make_state(vec![
                        ("protocol", string_value(&h.protocol)),
                        ("port", string_value(&h.port)),
                        ("url_path", opt_string_value(h.url_path.clone())),
                        ("interval_seconds", opt_int_value(h.interval_seconds)),
                        ("timeout_seconds", opt_int_value(h.timeout_seconds)),
                        ("unhealthy_threshold", opt_int_value(h.unhealthy_threshold)),
                        ("healthy_threshold", opt_int_value(h.healthy_threshold)),
                    ])]),
                    None => DynamicValue::List(vec![]),
                };
                make_state(vec![
                    ("protocol", string_value(&r.protocol)),
                    ("port", string_value(&r.port)),
                    ("member_protocol", string_value(&r.member_protocol)),
                    ("member_port", string_value(&r.member_port)),
                    ("health_check_configuration", health),
                ])
            })
            .collect(),
    )
}

fn spec_from_config(config: &DynamicValue) -> LoadBalancerSpecification {
    LoadBalancerSpecification {
        name: get_string_attr(config, "name"),
        project_id: get_string_attr(config, "project_id"),
        description: get_optional_string_attr(config, "description"),
        deployment_id: get_optional_string_attr(config, "deployment_id"),
        internet_facing: get_optional_bool_attr(config, "internet_facing"),
        nics: nics_from_config(config),
        routes: routes_from_config(config),
        target_links: get_string_list_attr(config, "target_links"),
        tags: tags_from_config(config, "tags"),
        custom_properties: get_string_map_attr(config, "custom_properties"),
    }
}

/// NICs, targets and `internet_facing` are input only and left out
fn load_balancer_to_state(lb: &LoadBalancer) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&lb.id)),
        ("name", string_value(&lb.name)),
        ("description", opt_string_value(lb.description.clone())),
        ("project_id", opt_string_value(lb.project_id.clone())),
        ("deployment_id", opt_string_value(lb.deployment_id.clone())),
        ("address", opt_string_value(lb.address.clone())),
        ("routes", routes_to_state(&lb.routes)),
        ("tags", tags_to_state(&lb.tags)),
        ("custom_properties", string_map_value(&lb.custom_properties)),
        ("external_id", opt_string_value(lb.external_id.clone())),
        ("external_region_id", opt_string_value(lb.external_region_id.clone())),
        ("external_zone_id", opt_string_value(lb.external_zone_id.clone())),
        ("org_id", opt_string_value(lb.org_id.clone())),
        ("owner", opt_string_value(lb.owner.clone())),
        ("updated_at", opt_string_value(lb.updated_at.clone())),
    ])
}

#[async_trait::async_trait]
impl Resource for LoadBalancerResource {
    fn type_name(&self) -> &'static str {
        "vra_load_balancer"
    }

    fn schema(&self) -> Block {
        let replace = |attr: Attribute| attr.force_new();
        let protocol = |name: &str| {
            Attribute::string(name)
                .required()
                .validate(Validator::OneOf(LOAD_BALANCER_PROTOCOLS))
        };
        let health_check = Block::new()
            .attribute(protocol("protocol"))
            .attribute(Attribute::string("port").required())
            .attribute(Attribute::string("url_path").optional())
            .attribute(Attribute::number("interval_seconds").optional())
            .attribute(Attribute::number("timeout_seconds").optional())
            .attribute(Attribute::number("unhealthy_threshold").optional())
            .attribute(Attribute::number("healthy_threshold").optional());
        let route = Block::new()
            .attribute(protocol("protocol"))
            .attribute(Attribute::string("port").required())
            .attribute(protocol("member_protocol"))
            .attribute(Attribute::string("member_port").required())
            .block(NestedBlock::list("health_check_configuration", health_check).max_items(1));

        Block::new()
            .describe("Load balancer in front of machines; changes replace it")
            .attribute(id_attribute())
            .attribute(replace(Attribute::string("name").required()))
            .attribute(replace(Attribute::string("project_id").required()))
            .attribute(replace(Attribute::string("description").optional().computed()))
            .attribute(replace(Attribute::string("deployment_id").optional().computed()))
            .attribute(replace(Attribute::bool("internet_facing").optional()))
            .attribute(replace(
                Attribute::string_set("target_links")
                    .optional()
                    .describe("Links of the machines to balance across"),
            ))
            .attribute(replace(custom_properties_attribute()))
            .attribute(Attribute::string("address").computed())
            .attribute(Attribute::string("external_id").computed())
            .attribute(Attribute::string("external_region_id").computed())
            .attribute(Attribute::string("external_zone_id").computed())
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("owner").computed())
            .attribute(Attribute::string("updated_at").computed())
            .block(NestedBlock::list("nics", nic_block()).min_items(1).force_new())
            .block(NestedBlock::list("routes", route).min_items(1).force_new())
            .block(tags_block().force_new())
            .block(timeouts_block())
    }

    async fn create(&self, client: &VraClient, planned: &DynamicValue) -> Result<DynamicValue> {
        let timeouts = Timeouts::from_state(planned)?;
        let spec = spec_from_config(planned);
        let tracker = client
            .create_load_balancer(&spec)
            .await
            .with_context(|| format!("creating load balancer {}", spec.name))?;
        let id = client.wait_for_resource_id(tracker, timeouts.create).await?;
        info!("Created load balancer {} ({})", spec.name, id);

        let lb = client.get_load_balancer(&id).await?;
        Ok(load_balancer_to_state(&lb))
    }

    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue> {
        let id = require_id(state)?;
        let lb = client.get_load_balancer(&id).await?;
        Ok(load_balancer_to_state(&lb))
    }

    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        _planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        // Every configurable attribute forces replacement; only timeouts change
        self.read(client, prior).await
    }

    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()> {
        let id = require_id(state)?;
        let timeouts = Timeouts::from_state(state)?;
        client.delete_load_balancer(&id, timeouts.delete).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::int_value;

    fn route(protocol: &str) -> DynamicValue {
        make_state(vec![
            ("protocol", string_value(protocol)),
            ("port", string_value("80")),
            ("member_protocol", string_value("HTTP")),
            ("member_port", string_value("8080")),
            (
                "health_check_configuration",
                DynamicValue::List(vec![make_state(vec![
                    ("protocol", string_value("HTTP")),
                    ("port", string_value("8080")),
                    ("url_path", string_value("/health")),
                    ("interval_seconds", int_value(30)),
                ])]),
            ),
        ])
    }

    #[test]
    fn test_routes_from_config() {
        let config = make_state(vec![("routes", DynamicValue::List(vec![route("HTTP")]))]);
        let routes = routes_from_config(&config);
        assert_eq!(routes[0].member_port, "8080");
        let health = routes[0].health_check_configuration.as_ref().unwrap();
        assert_eq!(health.url_path.as_deref(), Some("/health"));
        assert_eq!(health.interval_seconds, Some(30));
        assert_eq!(health.timeout_seconds, None);
    }

    #[test]
    fn test_route_protocol_is_validated() {
        let config = make_state(vec![("routes", DynamicValue::List(vec![route("SCTP")]))]);
        let violations = LoadBalancerResource.schema().validate(&config);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("protocol"));
    }

    #[test]
    fn test_routes_to_state() {
        let routes = routes_to_state(&[RouteConfiguration {
            protocol: "TCP".into(),
            port: "443".into(),
            member_protocol: "TCP".into(),
            member_port: "443".into(),
            health_check_configuration: None,
        }]);
        let items = routes.as_list().unwrap();
        assert_eq!(get_string_attr(&items[0], "port"), "443");
        assert_eq!(
            items[0].get("health_check_configuration"),
            Some(&DynamicValue::List(vec![]))
        );
    }
}
