//! Validation predicates attached to schema attributes

use std::collections::HashSet;

use crate::state::DynamicValue;

pub const PROJECT_PLACEMENT_POLICIES: &[&str] = &["DEFAULT", "SPREAD", "SPREAD_MEMORY"];
pub const ZONE_PLACEMENT_POLICIES: &[&str] = &["DEFAULT", "BINPACK", "SPREAD", "SPREAD_MEMORY"];
pub const ISOLATION_TYPES: &[&str] = &["NONE", "SUBNET", "SECURITY_GROUP"];
pub const LOAD_BALANCER_PROTOCOLS: &[&str] = &["TCP", "UDP", "HTTP", "HTTPS"];

/// A check run against a known, non-null attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    /// String must be one of the listed values
    OneOf(&'static [&'static str]),
    /// Number must be at least this
    AtLeast(i64),
    /// String must not be empty or blank
    NotEmpty,
    /// List elements must be distinct
    Unique,
    /// String must be a Go style duration
    Duration,
}

impl Validator {
    pub fn check(&self, value: &DynamicValue) -> Result<(), String> {
        match self {
            Validator::OneOf(allowed) => match value.as_string() {
                Some(s) => one_of(s, allowed),
                None => Err("expected a string".to_string()),
            },
            Validator::AtLeast(min) => match value.as_i64() {
                Some(n) => at_least(n, *min),
                None => Err("expected a whole number".to_string()),
            },
            Validator::NotEmpty => match value.as_string() {
                Some(s) => not_empty(s),
                None => Err("expected a string".to_string()),
            },
            Validator::Unique => match value.as_list() {
                Some(items) => unique(items),
                None => Err("expected a list".to_string()),
            },
            Validator::Duration => match value.as_string() {
                Some(s) => duration(s),
                None => Err("expected a duration string".to_string()),
            },
        }
    }
}

pub fn one_of(value: &str, allowed: &[&str]) -> Result<(), String> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "expected one of [{}], got {:?}",
            allowed.join(", "),
            value
        ))
    }
}

pub fn at_least(value: i64, min: i64) -> Result<(), String> {
    if value >= min {
        Ok(())
    } else {
        Err(format!("expected a value of at least {}, got {}", min, value))
    }
}

pub fn not_empty(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err("must not be empty".to_string())
    } else {
        Ok(())
    }
}

/// Known elements must be distinct; unknown elements are ignored
pub fn unique(items: &[DynamicValue]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for item in items.iter().filter(|i| !i.is_unknown()) {
        let key = item.to_json().to_string();
        if !seen.insert(key.clone()) {
            return Err(format!("duplicate element {}", key));
        }
    }
    Ok(())
}

pub fn duration(value: &str) -> Result<(), String> {
    vra_client::config::parse_duration(value)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{int_value, string_list_value, string_value};

    #[test]
    fn test_one_of() {
        assert!(one_of("SPREAD", PROJECT_PLACEMENT_POLICIES).is_ok());
        assert!(one_of("BINPACK", PROJECT_PLACEMENT_POLICIES).is_err());
        assert!(one_of("BINPACK", ZONE_PLACEMENT_POLICIES).is_ok());
        let err = one_of("tcp", LOAD_BALANCER_PROTOCOLS).unwrap_err();
        assert!(err.contains("TCP, UDP, HTTP, HTTPS"));
    }

    #[test]
    fn test_unique_regions() {
        assert!(Validator::Unique
            .check(&string_list_value(["us-east-1", "us-west-2"]))
            .is_ok());
        let err = Validator::Unique
            .check(&string_list_value(["us-east-1", "us-east-1"]))
            .unwrap_err();
        assert!(err.contains("us-east-1"));
    }

    #[test]
    fn test_unique_ignores_unknowns() {
        let items = DynamicValue::List(vec![DynamicValue::Unknown, DynamicValue::Unknown]);
        assert!(Validator::Unique.check(&items).is_ok());
    }

    #[test]
    fn test_ranges() {
        assert!(Validator::AtLeast(1).check(&int_value(1)).is_ok());
        assert!(Validator::AtLeast(1).check(&int_value(0)).is_err());
        assert!(Validator::AtLeast(0).check(&string_value("x")).is_err());
    }

    #[test]
    fn test_duration_syntax() {
        assert!(Validator::Duration.check(&string_value("30m")).is_ok());
        assert!(Validator::Duration.check(&string_value("1h30m")).is_ok());
        assert!(Validator::Duration.check(&string_value("thirty")).is_err());
        assert!(Validator::Duration.check(&string_value("10")).is_err());
        assert!(Validator::Duration
            .check(&string_value("99999999999999999999999h"))
            .is_err());
    }

    #[test]
    fn test_not_empty() {
        assert!(Validator::NotEmpty.check(&string_value("1.0")).is_ok());
        assert!(Validator::NotEmpty.check(&string_value("  ")).is_err());
    }
}
