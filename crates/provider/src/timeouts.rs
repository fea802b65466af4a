//! `timeouts` block of resources with asynchronous provisioning

use std::time::Duration;

use anyhow::{Context, Result};
use vra_client::config::parse_duration;

use crate::schema::{Attribute, Block, NestedBlock};
use crate::state::{get_block, get_optional_string_attr, DynamicValue};
use crate::validators::Validator;

/// Applies to create, update and delete alike
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

pub fn timeouts_block() -> NestedBlock {
    let duration = |name: &str, what: &str| {
        Attribute::string(name)
            .optional()
            .describe(format!("How long to wait for {}, e.g. \"30m\"", what))
            .validate(Validator::Duration)
    };
    NestedBlock::single(
        "timeouts",
        Block::new()
            .attribute(duration("create", "creation"))
            .attribute(duration("update", "updates"))
            .attribute(duration("delete", "deletion")),
    )
}

/// Effective timeouts of one resource instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_TIMEOUT,
            update: DEFAULT_TIMEOUT,
            delete: DEFAULT_TIMEOUT,
        }
    }
}

impl Timeouts {
    /// Read the `timeouts` block of a planned or prior state
    pub fn from_state(state: &DynamicValue) -> Result<Self> {
        let mut timeouts = Self::default();
        let Some(block) = get_block(state, "timeouts") else {
            return Ok(timeouts);
        };

        let parse = |key: &str, fallback: Duration| -> Result<Duration> {
            match get_optional_string_attr(block, key) {
                Some(value) => parse_duration(&value)
                    .with_context(|| format!("invalid {} timeout {:?}", key, value)),
                None => Ok(fallback),
            }
        };
        timeouts.create = parse("create", timeouts.create)?;
        timeouts.update = parse("update", timeouts.update)?;
        timeouts.delete = parse("delete", timeouts.delete)?;
        Ok(timeouts)
    }
}
