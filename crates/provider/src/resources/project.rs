//! vra_project

use std::collections::HashMap;

use anyhow::{Context, Result};
use vra_client::models::{Constraint, Project, ProjectSpecification, ZoneAssignment};
use vra_client::VraClient;

use super::common::{
    constraints_block, constraints_from_config, constraints_to_state, custom_properties_attribute,
    id_attribute, require_id, user_emails, users_from_emails,
};
use super::Resource;
use crate::schema::{Attribute, Block, NestedBlock};
use crate::state::{
    bool_value, get_block, get_blocks, get_bool_attr, get_int_attr, get_optional_int_attr,
    get_optional_string_attr, get_string_attr, get_string_list_attr, get_string_map_attr,
    int_value, make_state, opt_bool_value, opt_int_value, opt_string_value, string_map_value,
    string_value, DynamicValue,
};
use crate::validators::{Validator, PROJECT_PLACEMENT_POLICIES};

const CONSTRAINT_KINDS: [&str; 3] = ["extensibility", "network", "storage"];

pub struct ProjectResource;

pub(crate) fn zone_assignment_block() -> Block {
    Block::new()
        .attribute(Attribute::string("zone_id").required())
        .attribute(
            Attribute::number("priority")
                .default(int_value(0))
                .validate(Validator::AtLeast(0)),
        )
        .attribute(
            Attribute::number("max_instances")
                .default(int_value(0))
                .validate(Validator::AtLeast(0)),
        )
        .attribute(
            Attribute::number("cpu_limit")
                .default(int_value(0))
                .validate(Validator::AtLeast(0)),
        )
        .attribute(
            Attribute::number("memory_limit_mb")
                .default(int_value(0))
                .validate(Validator::AtLeast(0)),
        )
        .attribute(
            Attribute::number("storage_limit_gb")
                .default(int_value(0))
                .validate(Validator::AtLeast(0)),
        )
}

pub(crate) fn project_attributes(block: Block, input: bool) -> Block {
    let users = |name: &str| {
        let attr = Attribute::string_set(name).describe("E-mail addresses");
        if input {
            attr.optional().computed()
        } else {
            attr.computed()
        }
    };
    block
        .attribute(users("administrators"))
        .attribute(users("members"))
        .attribute(users("viewers"))
        .attribute(users("supervisors"))
}

fn spec_from_config(config: &DynamicValue) -> ProjectSpecification {
    let zones = get_blocks(config, "zone_assignments")
        .into_iter()
        .map(|z| ZoneAssignment {
            zone_id: get_string_attr(z, "zone_id"),
            priority: get_int_attr(z, "priority", 0),
            max_number_instances: get_int_attr(z, "max_instances", 0),
            cpu_limit: get_int_attr(z, "cpu_limit", 0),
            memory_limit_mb: get_int_attr(z, "memory_limit_mb", 0),
            storage_limit_gb: get_int_attr(z, "storage_limit_gb", 0),
        })
        .collect();

    let mut constraints: HashMap<String, Vec<Constraint>> = HashMap::new();
    if let Some(block) = get_block(config, "constraints") {
        for kind in CONSTRAINT_KINDS {
            let items = constraints_from_config(block, kind);
            if !items.is_empty() {
                constraints.insert(kind.to_string(), items);
            }
        }
    }

    ProjectSpecification {
        name: get_string_attr(config, "name"),
        description: get_optional_string_attr(config, "description"),
        administrators: users_from_emails(get_string_list_attr(config, "administrators")),
        members: users_from_emails(get_string_list_attr(config, "members")),
        viewers: users_from_emails(get_string_list_attr(config, "viewers")),
        supervisors: users_from_emails(get_string_list_attr(config, "supervisors")),
        zone_assignment_configurations: zones,
        constraints,
        custom_properties: get_string_map_attr(config, "custom_properties"),
        machine_naming_template: get_optional_string_attr(config, "machine_naming_template"),
        operation_timeout: get_optional_int_attr(config, "operation_timeout"),
        placement_policy: get_optional_string_attr(config, "placement_policy"),
        shared_resources: Some(get_bool_attr(config, "shared_resources", true)),
    }
}

pub(crate) fn project_to_state(project: &Project) -> DynamicValue {
    let zones = project
        .zones
        .iter()
        .map(|z| {
            make_state(vec![
                ("zone_id", string_value(&z.zone_id)),
                ("priority", int_value(z.priority)),
                ("max_instances", int_value(z.max_number_instances)),
                ("cpu_limit", int_value(z.cpu_limit)),
                ("memory_limit_mb", int_value(z.memory_limit_mb)),
                ("storage_limit_gb", int_value(z.storage_limit_gb)),
            ])
        })
        .collect();

    let constraints = if project.constraints.values().all(Vec::is_empty) {
        DynamicValue::List(vec![])
    } else {
        let kinds = CONSTRAINT_KINDS
            .iter()
            .map(|kind| {
                let items = project.constraints.get(*kind).cloned().unwrap_or_default();
                (*kind, constraints_to_state(&items))
            })
            .collect();
        DynamicValue::List(vec![make_state(kinds)])
    };

    make_state(vec![
        ("id", string_value(&project.id)),
        ("name", string_value(&project.name)),
        ("description", opt_string_value(project.description.clone())),
        ("administrators", user_emails(&project.administrators)),
        ("members", user_emails(&project.members)),
        ("viewers", user_emails(&project.viewers)),
        ("supervisors", user_emails(&project.supervisors)),
        ("zone_assignments", DynamicValue::List(zones)),
        ("constraints", constraints),
        ("custom_properties", string_map_value(&project.custom_properties)),
        (
            "machine_naming_template",
            opt_string_value(project.machine_naming_template.clone()),
        ),
        ("operation_timeout", opt_int_value(project.operation_timeout)),
        ("placement_policy", opt_string_value(project.placement_policy.clone())),
        ("shared_resources", opt_bool_value(project.shared_resources)),
        ("org_id", opt_string_value(project.org_id.clone())),
    ])
}

#[async_trait::async_trait]
impl Resource for ProjectResource {
    fn type_name(&self) -> &'static str {
        "vra_project"
    }

    fn schema(&self) -> Block {
        let constraints = Block::new()
            .block(constraints_block("extensibility"))
            .block(constraints_block("network"))
            .block(constraints_block("storage"));

        project_attributes(
            Block::new()
                .describe("A project groups users and the cloud zones they may provision to")
                .attribute(id_attribute())
                .attribute(Attribute::string("name").required())
                .attribute(Attribute::string("description").optional().computed()),
            true,
        )
        .attribute(custom_properties_attribute())
        .attribute(
            Attribute::string("machine_naming_template")
                .optional()
                .computed(),
        )
        .attribute(
            Attribute::number("operation_timeout")
                .optional()
                .computed()
                .validate(Validator::AtLeast(0))
                .describe("Request timeout in seconds; 0 means the vRA default"),
        )
        .attribute(
            Attribute::string("placement_policy")
                .default(string_value("DEFAULT"))
                .validate(Validator::OneOf(PROJECT_PLACEMENT_POLICIES)),
        )
        .attribute(Attribute::bool("shared_resources").default(bool_value(true)))
        .attribute(Attribute::string("org_id").computed())
        .block(NestedBlock::set("zone_assignments", zone_assignment_block()))
        .block(NestedBlock::list("constraints", constraints).max_items(1))
    }

    async fn create(&self, client: &VraClient, planned: &DynamicValue) -> Result<DynamicValue> {
        let spec = spec_from_config(planned);
        let project = client
            .create_project(&spec)
            .await
            .with_context(|| format!("creating project {}", spec.name))?;
        Ok(project_to_state(&project))
    }

    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue> {
        let id = require_id(state)?;
        let project = client.get_project(&id).await?;
        Ok(project_to_state(&project))
    }

    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = require_id(prior)?;
        let project = client
            .update_project(&id, &spec_from_config(planned))
            .await
            .with_context(|| format!("updating project {}", id))?;
        Ok(project_to_state(&project))
    }

    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()> {
        let id = require_id(state)?;
        // vRA refuses to delete a project that still has zones assigned.
        let mut spec = spec_from_config(state);
        if !spec.zone_assignment_configurations.is_empty() {
            spec.zone_assignment_configurations.clear();
            client
                .update_project(&id, &spec)
                .await
                .with_context(|| format!("removing zone assignments of project {}", id))?;
        }
        client.delete_project(&id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::string_list_value;
    use vra_client::models::User;

    #[test]
    fn test_spec_from_config() {
        let config = make_state(vec![
            ("name", string_value("apps")),
            ("administrators", string_list_value(["admin@example.com"])),
            (
                "zone_assignments",
                DynamicValue::List(vec![make_state(vec![
                    ("zone_id", string_value("z-1")),
                    ("priority", int_value(2)),
                    ("max_instances", int_value(10)),
                ])]),
            ),
            (
                "constraints",
                DynamicValue::List(vec![make_state(vec![(
                    "network",
                    DynamicValue::List(vec![make_state(vec![
                        ("mandatory", bool_value(true)),
                        ("expression", string_value("net:private")),
                    ])]),
                )])]),
            ),
            ("placement_policy", string_value("SPREAD")),
        ]);
        let spec = spec_from_config(&config);
        assert_eq!(spec.name, "apps");
        assert_eq!(spec.administrators[0].email, "admin@example.com");
        assert_eq!(spec.zone_assignment_configurations[0].max_number_instances, 10);
        assert_eq!(spec.constraints["network"][0].expression, "net:private");
        assert!(!spec.constraints.contains_key("storage"));
        assert_eq!(spec.placement_policy.as_deref(), Some("SPREAD"));
        assert_eq!(spec.shared_resources, Some(true));
    }

    #[test]
    fn test_project_to_state() {
        let project = Project {
            id: "p-1".into(),
            name: "apps".into(),
            description: Some(String::new()),
            members: vec![User {
                email: "dev@example.com".into(),
                kind: Some("user".into()),
            }],
            zones: vec![ZoneAssignment {
                zone_id: "z-1".into(),
                priority: 1,
                ..Default::default()
            }],
            placement_policy: Some("DEFAULT".into()),
            ..Default::default()
        };
        let state = project_to_state(&project);
        assert_eq!(get_string_attr(&state, "id"), "p-1");
        assert_eq!(state.get("description"), Some(&DynamicValue::Null));
        assert_eq!(get_string_list_attr(&state, "members"), vec!["dev@example.com"]);
        assert_eq!(state.get("constraints"), Some(&DynamicValue::List(vec![])));
        let zones = get_blocks(&state, "zone_assignments");
        assert_eq!(get_int_attr(zones[0], "priority", -1), 1);
    }

    #[test]
    fn test_placement_policy_is_validated() {
        let config = ProjectResource.schema().normalize(
            &make_state(vec![
                ("name", string_value("apps")),
                ("placement_policy", string_value("BINPACK")),
            ]),
            true,
        );
        let violations = ProjectResource.schema().validate(&config);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("placement_policy"));
    }
}
