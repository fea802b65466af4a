//! Planning and apply reconciliation
//!
//! Terraform proposes a new state by merging configuration over the prior
//! state. The provider turns that into a plan: defaults are filled in,
//! computed values that cannot be known yet are marked unknown, and changes
//! that cannot be made in place are reported as requiring replacement.

use std::collections::HashMap;

use crate::schema::{Block, PathStep};
use crate::state::DynamicValue;

/// Result of planning one resource instance
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChange {
    pub planned: DynamicValue,
    pub requires_replace: Vec<Vec<PathStep>>,
}

/// Plan the change from `prior` to `proposed`
pub fn plan_change(block: &Block, prior: &DynamicValue, proposed: &DynamicValue) -> PlannedChange {
    if proposed.is_null() {
        return PlannedChange {
            planned: DynamicValue::Null,
            requires_replace: Vec::new(),
        };
    }

    let creating = prior.is_null();
    let mut planned = block.normalize(proposed, true);
    fill_defaults(block, &mut planned, creating);

    let mut requires_replace = Vec::new();
    if !creating {
        let prior = block.normalize(prior, true);
        if !block.equal(&prior, &planned) {
            mark_volatile(block, &mut planned);
            requires_replace = replacements(block, &prior, &planned);
        }
    }

    PlannedChange {
        planned,
        requires_replace,
    }
}

/// Fill defaults into null attributes; on create, computed attributes left
/// null become unknown
fn fill_defaults(block: &Block, value: &mut DynamicValue, creating: bool) {
    let DynamicValue::Map(map) = value else {
        return;
    };

    for attr in &block.attributes {
        let slot = map.entry(attr.name.clone()).or_insert(DynamicValue::Null);
        if !slot.is_null() {
            continue;
        }
        if let Some(default) = &attr.default {
            *slot = default.clone();
        } else if creating && attr.computed {
            *slot = DynamicValue::Unknown;
        }
    }

    for nested in &block.blocks {
        match map.get_mut(&nested.name) {
            Some(DynamicValue::List(items)) => {
                for item in items {
                    fill_defaults(&nested.block, item, creating);
                }
            }
            Some(single @ DynamicValue::Map(_)) => fill_defaults(&nested.block, single, creating),
            _ => {}
        }
    }
}

fn mark_volatile(block: &Block, value: &mut DynamicValue) {
    for attr in block.attributes.iter().filter(|a| a.volatile) {
        value.insert(attr.name.clone(), DynamicValue::Unknown);
    }
}

fn replacements(block: &Block, prior: &DynamicValue, planned: &DynamicValue) -> Vec<Vec<PathStep>> {
    let mut paths = Vec::new();
    for attr in block.attributes.iter().filter(|a| a.force_new) {
        if !attr.ty.equal(prior.attr(&attr.name), planned.attr(&attr.name)) {
            paths.push(vec![PathStep::Attribute(attr.name.clone())]);
        }
    }
    for nested in block.blocks.iter().filter(|b| b.force_new) {
        if !nested.equal(prior.attr(&nested.name), planned.attr(&nested.name)) {
            paths.push(vec![PathStep::Attribute(nested.name.clone())]);
        }
    }
    paths
}

/// New state after apply: known planned values stand, unknown ones are
/// taken from what the API returned
pub fn reconcile_apply(block: &Block, planned: &DynamicValue, applied: &DynamicValue) -> DynamicValue {
    block.normalize(&merge_known(planned, applied), false)
}

fn merge_known(planned: &DynamicValue, applied: &DynamicValue) -> DynamicValue {
    match (planned, applied) {
        (DynamicValue::Unknown, _) => applied.clone(),
        (DynamicValue::Map(p), DynamicValue::Map(a)) => {
            let mut out: HashMap<String, DynamicValue> = a.clone();
            for (key, value) in p {
                let merged = match a.get(key) {
                    Some(echo) => merge_known(value, echo),
                    None => value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            DynamicValue::Map(out)
        }
        (DynamicValue::List(p), DynamicValue::List(a))
            if !planned.is_wholly_known() && p.len() == a.len() =>
        {
            DynamicValue::List(p.iter().zip(a).map(|(x, y)| merge_known(x, y)).collect())
        }
        _ if !planned.is_wholly_known() => applied.clone(),
        _ => planned.clone(),
    }
}

/// New state after a refresh. Attributes the read did not report (write-only
/// secrets, input-only settings, `timeouts`) keep their prior values.
pub fn carry_forward(block: &Block, prior: &DynamicValue, read: &DynamicValue) -> DynamicValue {
    let merged = match (prior, read) {
        (DynamicValue::Map(p), DynamicValue::Map(r)) => {
            let mut out = r.clone();
            for (key, value) in p {
                out.entry(key.clone()).or_insert_with(|| value.clone());
            }
            DynamicValue::Map(out)
        }
        _ => read.clone(),
    };
    block.normalize(&merged, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, NestedBlock};
    use crate::state::{int_value, make_state, string_list_value, string_value};

    fn block() -> Block {
        Block::new()
            .attribute(Attribute::string("id").computed())
            .attribute(Attribute::string("name").required())
            .attribute(Attribute::string("region_id").required().force_new())
            .attribute(Attribute::string("policy").default(string_value("DEFAULT")))
            .attribute(Attribute::string("updated_at").computed().volatile())
            .attribute(Attribute::string_set("zones").optional().force_new())
            .attribute(Attribute::string("secret").optional().sensitive())
            .block(NestedBlock::list(
                "mapping",
                Block::new()
                    .attribute(Attribute::string("name").required())
                    .attribute(Attribute::number("cpu").optional().computed()),
            ))
    }

    fn prior() -> DynamicValue {
        block().normalize(
            &make_state(vec![
                ("id", string_value("z-1")),
                ("name", string_value("zone")),
                ("region_id", string_value("r-1")),
                ("policy", string_value("DEFAULT")),
                ("updated_at", string_value("2024-01-01")),
                ("zones", string_list_value(["a", "b"])),
            ]),
            false,
        )
    }

    #[test]
    fn test_create_marks_computed_unknown_and_fills_defaults() {
        let proposed = make_state(vec![
            ("name", string_value("zone")),
            ("region_id", string_value("r-1")),
            (
                "mapping",
                DynamicValue::List(vec![make_state(vec![("name", string_value("small"))])]),
            ),
        ]);
        let plan = plan_change(&block(), &DynamicValue::Null, &proposed);
        let planned = plan.planned;
        assert_eq!(planned.get("id"), Some(&DynamicValue::Unknown));
        assert_eq!(planned.get("updated_at"), Some(&DynamicValue::Unknown));
        assert_eq!(planned.get("policy"), Some(&string_value("DEFAULT")));
        assert_eq!(planned.get("secret"), Some(&DynamicValue::Null));
        let mapping = planned.get("mapping").and_then(|m| m.as_list()).unwrap();
        assert_eq!(mapping[0].get("cpu"), Some(&DynamicValue::Unknown));
        assert!(plan.requires_replace.is_empty());
    }

    #[test]
    fn test_unchanged_update_keeps_computed_values() {
        let plan = plan_change(&block(), &prior(), &prior());
        assert_eq!(plan.planned, prior());
        assert!(plan.requires_replace.is_empty());
    }

    #[test]
    fn test_update_marks_volatile_unknown() {
        let mut proposed = prior();
        proposed.insert("name", string_value("renamed"));
        let plan = plan_change(&block(), &prior(), &proposed);
        assert_eq!(plan.planned.get("id"), Some(&string_value("z-1")));
        assert_eq!(plan.planned.get("updated_at"), Some(&DynamicValue::Unknown));
        assert!(plan.requires_replace.is_empty());
    }

    #[test]
    fn test_force_new_change_requires_replace() {
        let mut proposed = prior();
        proposed.insert("region_id", string_value("r-2"));
        let plan = plan_change(&block(), &prior(), &proposed);
        assert_eq!(
            plan.requires_replace,
            vec![vec![PathStep::Attribute("region_id".into())]]
        );
    }

    #[test]
    fn test_reordered_set_is_not_a_change() {
        let mut proposed = prior();
        proposed.insert("zones", string_list_value(["b", "a"]));
        let plan = plan_change(&block(), &prior(), &proposed);
        assert!(plan.requires_replace.is_empty());
        assert_eq!(plan.planned.get("updated_at"), Some(&string_value("2024-01-01")));
    }

    #[test]
    fn test_destroy_passes_through() {
        let plan = plan_change(&block(), &prior(), &DynamicValue::Null);
        assert_eq!(plan.planned, DynamicValue::Null);
        assert!(plan.requires_replace.is_empty());
    }

    #[test]
    fn test_reconcile_fills_unknowns_from_api() {
        let planned = make_state(vec![
            ("id", DynamicValue::Unknown),
            ("name", string_value("zone")),
            ("secret", string_value("hunter2")),
            (
                "mapping",
                DynamicValue::List(vec![make_state(vec![
                    ("name", string_value("small")),
                    ("cpu", DynamicValue::Unknown),
                ])]),
            ),
        ]);
        let applied = make_state(vec![
            ("id", string_value("z-9")),
            ("name", string_value("ZONE")),
            (
                "mapping",
                DynamicValue::List(vec![make_state(vec![
                    ("name", string_value("small")),
                    ("cpu", int_value(2)),
                ])]),
            ),
        ]);
        let state = reconcile_apply(&block(), &planned, &applied);
        assert_eq!(state.get("id"), Some(&string_value("z-9")));
        assert_eq!(state.get("name"), Some(&string_value("zone")));
        assert_eq!(state.get("secret"), Some(&string_value("hunter2")));
        let mapping = state.get("mapping").and_then(|m| m.as_list()).unwrap();
        assert_eq!(mapping[0].get("cpu"), Some(&int_value(2)));
    }

    #[test]
    fn test_carry_forward_keeps_unreported_keys() {
        let mut prior = prior();
        prior.insert("secret", string_value("hunter2"));
        let read = make_state(vec![
            ("id", string_value("z-1")),
            ("name", string_value("changed outside terraform")),
        ]);
        let state = carry_forward(&block(), &prior, &read);
        assert_eq!(state.get("secret"), Some(&string_value("hunter2")));
        assert_eq!(
            state.get("name"),
            Some(&string_value("changed outside terraform"))
        );
    }
}
