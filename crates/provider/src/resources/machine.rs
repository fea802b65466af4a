//! vra_machine

use std::collections::HashSet;

use anyhow::{Context, Result};
use tracing::info;
use vra_client::models::{
    BlockDevice, BootConfig, DiskAttachmentSpecification, Machine, MachineSpecification,
    NetworkInterfaceSpecification, UpdateMachineSpecification,
};
use vra_client::VraClient;

use super::common::{
    changed, constraints_block, constraints_from_config, custom_properties_attribute,
    id_attribute, prior_item, require_id, tags_block, tags_from_config, tags_to_state,
};
use super::Resource;
use crate::schema::{Attribute, Block, NestedBlock, Violation};
use crate::state::{
    get_block, get_blocks, get_optional_int_attr, get_optional_string_attr, get_string_attr,
    get_string_list_attr, get_string_map_attr, make_state, opt_string_value, string_map_value,
    string_value, DynamicValue,
};
use crate::timeouts::{timeouts_block, Timeouts};
use crate::validators::Validator;

pub struct MachineResource;

pub(crate) fn nics_from_config(config: &DynamicValue) -> Vec<NetworkInterfaceSpecification> {
    get_blocks(config, "nics")
        .into_iter()
        .map(|n| NetworkInterfaceSpecification {
            network_id: get_string_attr(n, "network_id"),
            name: get_optional_string_attr(n, "name"),
            description: get_optional_string_attr(n, "description"),
            device_index: get_optional_int_attr(n, "device_index"),
            addresses: get_string_list_attr(n, "addresses"),
            security_group_ids: get_string_list_attr(n, "security_group_ids"),
            custom_properties: get_string_map_attr(n, "custom_properties"),
        })
        .collect()
}

pub(crate) fn nic_block() -> Block {
    Block::new()
        .attribute(Attribute::string("network_id").required())
        .attribute(Attribute::string("name").optional())
        .attribute(Attribute::string("description").optional())
        .attribute(
            Attribute::number("device_index")
                .optional()
                .validate(Validator::AtLeast(0)),
        )
        .attribute(Attribute::string_list("addresses").optional())
        .attribute(Attribute::string_set("security_group_ids").optional())
        .attribute(Attribute::string_map("custom_properties").optional())
}

fn disks_from_config(config: &DynamicValue) -> Vec<DiskAttachmentSpecification> {
    get_blocks(config, "disks")
        .into_iter()
        .map(|d| DiskAttachmentSpecification {
            block_device_id: get_string_attr(d, "block_device_id"),
            name: get_optional_string_attr(d, "name"),
            description: get_optional_string_attr(d, "description"),
        })
        .collect()
}

fn spec_from_config(config: &DynamicValue) -> MachineSpecification {
    MachineSpecification {
        name: get_string_attr(config, "name"),
        project_id: get_string_attr(config, "project_id"),
        flavor: get_string_attr(config, "flavor"),
        image: get_optional_string_attr(config, "image"),
        image_ref: get_optional_string_attr(config, "image_ref"),
        description: get_optional_string_attr(config, "description"),
        deployment_id: get_optional_string_attr(config, "deployment_id"),
        boot_config: get_block(config, "boot_config").map(|b| BootConfig {
            content: get_string_attr(b, "content"),
        }),
        constraints: constraints_from_config(config, "constraints"),
        image_disk_constraints: constraints_from_config(config, "image_disk_constraints"),
        tags: tags_from_config(config, "tags"),
        custom_properties: get_string_map_attr(config, "custom_properties"),
        nics: nics_from_config(config),
        disks: disks_from_config(config),
    }
}

/// Attached disks other than the boot disk. Attachment names and
/// descriptions are not returned and come from the prior state.
fn disks_to_state(disks: &[BlockDevice], prior: &DynamicValue) -> DynamicValue {
    DynamicValue::List(
        disks
            .iter()
            .filter(|d| !d.is_boot_disk())
            .map(|d| {
                let item = prior_item(prior, "disks", "block_device_id", &d.id);
                let kept = |key: &str| item.map(|i| i.attr(key).clone()).unwrap_or_default();
                make_state(vec![
                    ("block_device_id", string_value(&d.id)),
                    ("name", kept("name")),
                    ("description", kept("description")),
                ])
            })
            .collect(),
    )
}

/// Flavor, image and the create-only blocks are not part of the machine
/// object and are kept from the plan
fn machine_to_state(machine: &Machine, disks: &[BlockDevice], prior: &DynamicValue) -> DynamicValue {
    make_state(vec![
        ("id", string_value(&machine.id)),
        ("name", string_value(&machine.name)),
        ("description", opt_string_value(machine.description.clone())),
        ("project_id", opt_string_value(machine.project_id.clone())),
        ("deployment_id", opt_string_value(machine.deployment_id.clone())),
        ("address", opt_string_value(machine.address.clone())),
        ("power_state", opt_string_value(machine.power_state.clone())),
        ("tags", tags_to_state(&machine.tags)),
        ("custom_properties", string_map_value(&machine.custom_properties)),
        ("disks", disks_to_state(disks, prior)),
        ("external_id", opt_string_value(machine.external_id.clone())),
        ("external_region_id", opt_string_value(machine.external_region_id.clone())),
        ("external_zone_id", opt_string_value(machine.external_zone_id.clone())),
        ("org_id", opt_string_value(machine.org_id.clone())),
        ("owner", opt_string_value(machine.owner.clone())),
        ("created_at", opt_string_value(machine.created_at.clone())),
        ("updated_at", opt_string_value(machine.updated_at.clone())),
    ])
}

fn disk_ids(state: &DynamicValue) -> HashSet<String> {
    get_blocks(state, "disks")
        .into_iter()
        .map(|d| get_string_attr(d, "block_device_id"))
        .collect()
}

impl MachineResource {
    async fn fetch(&self, client: &VraClient, id: &str, prior: &DynamicValue) -> Result<DynamicValue> {
        let machine = client.get_machine(id).await?;
        let disks = client.list_machine_disks(id).await?;
        Ok(machine_to_state(&machine, &disks, prior))
    }
}

#[async_trait::async_trait]
impl Resource for MachineResource {
    fn type_name(&self) -> &'static str {
        "vra_machine"
    }

    fn schema(&self) -> Block {
        let replace = |attr: Attribute| attr.force_new();
        let disk = Block::new()
            .attribute(Attribute::string("block_device_id").required())
            .attribute(Attribute::string("name").optional())
            .attribute(Attribute::string("description").optional());

        Block::new()
            .describe("Virtual machine")
            .attribute(id_attribute())
            .attribute(replace(Attribute::string("name").required()))
            .attribute(replace(Attribute::string("project_id").required()))
            .attribute(
                Attribute::string("flavor")
                    .required()
                    .describe("Flavor name from a flavor profile; changes resize the machine"),
            )
            .attribute(replace(Attribute::string("image").optional()))
            .attribute(replace(
                Attribute::string("image_ref")
                    .optional()
                    .describe("Direct image reference, instead of an image profile name"),
            ))
            .attribute(Attribute::string("description").optional().computed())
            .attribute(replace(Attribute::string("deployment_id").optional().computed()))
            .attribute(custom_properties_attribute())
            .attribute(Attribute::string("address").computed().volatile())
            .attribute(Attribute::string("power_state").computed().volatile())
            .attribute(Attribute::string("external_id").computed())
            .attribute(Attribute::string("external_region_id").computed())
            .attribute(Attribute::string("external_zone_id").computed())
            .attribute(Attribute::string("org_id").computed())
            .attribute(Attribute::string("owner").computed())
            .attribute(Attribute::string("created_at").computed())
            .attribute(Attribute::string("updated_at").computed().volatile())
            .block(
                NestedBlock::single(
                    "boot_config",
                    Block::new().attribute(Attribute::string("content").optional()),
                )
                .force_new(),
            )
            .block(constraints_block("constraints").force_new())
            .block(constraints_block("image_disk_constraints").force_new())
            .block(NestedBlock::list("nics", nic_block()).force_new())
            .block(NestedBlock::set("disks", disk))
            .block(tags_block())
            .block(timeouts_block())
    }

    fn validate(&self, config: &DynamicValue) -> Vec<Violation> {
        let image = config.attr("image");
        let image_ref = config.attr("image_ref");
        if image.is_unknown() || image_ref.is_unknown() || image.is_null() != image_ref.is_null() {
            return Vec::new();
        }
        vec![Violation::at("image", "exactly one of image or image_ref must be set")]
    }

    async fn create(&self, client: &VraClient, planned: &DynamicValue) -> Result<DynamicValue> {
        let timeouts = Timeouts::from_state(planned)?;
        let spec = spec_from_config(planned);
        let tracker = client
            .create_machine(&spec)
            .await
            .with_context(|| format!("creating machine {}", spec.name))?;
        let id = client.wait_for_resource_id(tracker, timeouts.create).await?;
        info!("Created machine {} ({})", spec.name, id);

        self.fetch(client, &id, planned).await
    }

    async fn read(&self, client: &VraClient, state: &DynamicValue) -> Result<DynamicValue> {
        let id = require_id(state)?;
        self.fetch(client, &id, state).await
    }

    async fn update(
        &self,
        client: &VraClient,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let id = require_id(prior)?;
        let timeouts = Timeouts::from_state(planned)?;

        if ["description", "tags", "custom_properties"]
            .iter()
            .any(|key| changed(prior, planned, key))
        {
            let update = UpdateMachineSpecification {
                description: get_optional_string_attr(planned, "description"),
                tags: tags_from_config(planned, "tags"),
                custom_properties: get_string_map_attr(planned, "custom_properties"),
            };
            client
                .update_machine(&id, &update)
                .await
                .with_context(|| format!("updating machine {}", id))?;
        }

        if changed(prior, planned, "flavor") {
            let flavor = get_string_attr(planned, "flavor");
            info!("Resizing machine {} to {}", id, flavor);
            client
                .resize_machine(&id, &flavor, timeouts.update)
                .await
                .with_context(|| format!("resizing machine {}", id))?;
        }

        let before = disk_ids(prior);
        let after = disk_ids(planned);
        for disk_id in before.difference(&after) {
            info!("Detaching disk {} from machine {}", disk_id, id);
            client
                .detach_machine_disk(&id, disk_id, timeouts.update)
                .await
                .with_context(|| format!("detaching disk {} from machine {}", disk_id, id))?;
        }
        for disk in disks_from_config(planned) {
            if before.contains(&disk.block_device_id) {
                continue;
            }
            info!("Attaching disk {} to machine {}", disk.block_device_id, id);
            client
                .attach_machine_disk(&id, &disk, timeouts.update)
                .await
                .with_context(|| {
                    format!("attaching disk {} to machine {}", disk.block_device_id, id)
                })?;
        }

        self.fetch(client, &id, planned).await
    }

    async fn delete(&self, client: &VraClient, state: &DynamicValue) -> Result<()> {
        let id = require_id(state)?;
        let timeouts = Timeouts::from_state(state)?;
        client.delete_machine(&id, timeouts.delete).await?;
        Ok(())
    }
}
