//! Schema fragments and conversions shared by resources and data sources

use anyhow::{bail, Result};
use vra_client::models::{Constraint, Tag, User};

use crate::schema::{AttrType, Attribute, Block, NestedBlock};
use crate::state::{
    bool_value, get_blocks, get_bool_attr, get_string_attr, make_state, string_value,
    DynamicValue,
};

pub fn id_attribute() -> Attribute {
    Attribute::string("id").computed().describe("Identifier assigned by vRA")
}

/// Set of `{key, value}` tags
pub fn tags_block() -> NestedBlock {
    tag_set_block("tags")
}

/// Read-only tags of looked-up objects
pub fn computed_tags_attribute() -> Attribute {
    Attribute::object_list("tags", &[("key", AttrType::String), ("value", AttrType::String)])
        .computed()
}

/// Set of `{key, value}` pairs under `name`
pub fn tag_set_block(name: &str) -> NestedBlock {
    NestedBlock::set(
        name,
        Block::new()
            .attribute(Attribute::string("key").required())
            .attribute(Attribute::string("value").required()),
    )
}

/// Set of tag constraints under `name`
pub fn constraints_block(name: &str) -> NestedBlock {
    NestedBlock::set(
        name,
        Block::new()
            .attribute(Attribute::bool("mandatory").required())
            .attribute(
                Attribute::string("expression")
                    .required()
                    .describe("Tag expression such as \"env:dev\""),
            ),
    )
}

pub fn custom_properties_attribute() -> Attribute {
    Attribute::string_map("custom_properties").optional().computed()
}

pub fn tags_from_config(value: &DynamicValue, key: &str) -> Vec<Tag> {
    get_blocks(value, key)
        .into_iter()
        .map(|t| Tag {
            key: get_string_attr(t, "key"),
            value: get_string_attr(t, "value"),
        })
        .collect()
}

pub fn tags_to_state(tags: &[Tag]) -> DynamicValue {
    DynamicValue::List(
        tags.iter()
            .map(|t| {
                make_state(vec![
                    ("key", string_value(&t.key)),
                    ("value", string_value(&t.value)),
                ])
            })
            .collect(),
    )
}

pub fn constraints_from_config(value: &DynamicValue, key: &str) -> Vec<Constraint> {
    get_blocks(value, key)
        .into_iter()
        .map(|c| Constraint {
            mandatory: get_bool_attr(c, "mandatory", false),
            expression: get_string_attr(c, "expression"),
        })
        .collect()
}

pub fn constraints_to_state(constraints: &[Constraint]) -> DynamicValue {
    DynamicValue::List(
        constraints
            .iter()
            .map(|c| {
                make_state(vec![
                    ("mandatory", bool_value(c.mandatory)),
                    ("expression", string_value(&c.expression)),
                ])
            })
            .collect(),
    )
}

/// Users from a set of e-mail addresses
pub fn users_from_emails(emails: Vec<String>) -> Vec<User> {
    emails
        .into_iter()
        .map(|email| User {
            email,
            kind: Some("user".to_string()),
        })
        .collect()
}

pub fn user_emails(users: &[User]) -> DynamicValue {
    DynamicValue::List(users.iter().map(|u| string_value(&u.email)).collect())
}

/// The `id` of a prior state; every API object is addressed by it
pub fn require_id(state: &DynamicValue) -> Result<String> {
    let id = get_string_attr(state, "id");
    if id.is_empty() {
        bail!("resource has no id in state");
    }
    Ok(id)
}

/// Value of a mapping field as read back, limited to the fields the prior
/// item had set. Without a prior item (import) every field is reported.
pub fn echo_configured(prior: Option<&DynamicValue>, key: &str, value: DynamicValue) -> DynamicValue {
    match prior {
        Some(item) if item.attr(key).is_null() => DynamicValue::Null,
        _ => value,
    }
}

/// Item of a prior set block whose `key` attribute equals `name`
pub fn prior_item<'a>(
    prior: &'a DynamicValue,
    block: &str,
    key: &str,
    name: &str,
) -> Option<&'a DynamicValue> {
    get_blocks(prior, block)
        .into_iter()
        .find(|item| item.attr(key).as_string() == Some(name))
}

/// Whether `key` differs between two states
pub fn changed(prior: &DynamicValue, planned: &DynamicValue, key: &str) -> bool {
    prior.attr(key) != planned.attr(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip_through_state() {
        let tags = vec![
            Tag {
                key: "env".into(),
                value: "dev".into(),
            },
            Tag {
                key: "team".into(),
                value: "infra".into(),
            },
        ];
        let state = make_state(vec![("tags", tags_to_state(&tags))]);
        assert_eq!(tags_from_config(&state, "tags"), tags);
    }

    #[test]
    fn test_constraints_from_config() {
        let state = make_state(vec![(
            "constraints",
            DynamicValue::List(vec![make_state(vec![
                ("mandatory", bool_value(true)),
                ("expression", string_value("env:prod")),
            ])]),
        )]);
        let constraints = constraints_from_config(&state, "constraints");
        assert_eq!(constraints.len(), 1);
        assert!(constraints[0].mandatory);
        assert_eq!(constraints[0].expression, "env:prod");
    }

    #[test]
    fn test_echo_configured() {
        let prior = make_state(vec![(
            "mapping",
            DynamicValue::List(vec![make_state(vec![
                ("name", string_value("small")),
                ("cpu_count", DynamicValue::Null),
            ])]),
        )]);
        let item = prior_item(&prior, "mapping", "name", "small");
        assert!(item.is_some());
        assert_eq!(
            echo_configured(item, "cpu_count", string_value("2")),
            DynamicValue::Null
        );
        assert_eq!(
            echo_configured(None, "cpu_count", string_value("2")),
            string_value("2")
        );
        assert!(prior_item(&prior, "mapping", "name", "large").is_none());
    }

    #[test]
    fn test_require_id() {
        assert!(require_id(&make_state(vec![("id", string_value(""))])).is_err());
        assert_eq!(
            require_id(&make_state(vec![("id", string_value("abc"))])).unwrap(),
            "abc"
        );
    }
}
