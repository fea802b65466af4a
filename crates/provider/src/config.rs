//! Provider configuration
//!
//! Every provider argument falls back to a `VRA_*` environment variable when
//! it is left out of the configuration.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use vra_client::config::{
    parse_bool, parse_duration, ENV_ACCESS_TOKEN, ENV_API_TIMEOUT, ENV_INSECURE,
    ENV_REAUTHORIZE_TIMEOUT, ENV_REFRESH_TOKEN, ENV_URL,
};
use vra_client::{ClientConfig, Credentials};

use crate::schema::{Attribute, Block, Violation};
use crate::state::{get_optional_bool_attr, get_optional_int_attr, get_optional_string_attr, DynamicValue};
use crate::validators::Validator;

pub fn provider_schema() -> Block {
    Block::new()
        .describe("VMware Aria Automation (vRA)")
        .attribute(
            Attribute::string("url")
                .optional()
                .describe("Base URL of the vRA instance. Falls back to VRA_URL."),
        )
        .attribute(
            Attribute::string("access_token")
                .optional()
                .sensitive()
                .describe("API access token. Falls back to VRA_ACCESS_TOKEN."),
        )
        .attribute(
            Attribute::string("refresh_token")
                .optional()
                .sensitive()
                .describe("Refresh token exchanged for access tokens. Falls back to VRA_REFRESH_TOKEN."),
        )
        .attribute(
            Attribute::bool("insecure")
                .optional()
                .describe("Skip TLS certificate verification. Falls back to VRA_INSECURE."),
        )
        .attribute(
            Attribute::string("reauthorize_timeout")
                .optional()
                .validate(Validator::Duration)
                .describe("How long an access token obtained from the refresh token is reused. Defaults to 15m."),
        )
        .attribute(
            Attribute::number("api_timeout")
                .optional()
                .validate(Validator::AtLeast(1))
                .describe("Timeout in seconds of each API call. Defaults to 30."),
        )
}

/// Static checks on the provider block
pub fn validate(config: &DynamicValue) -> Vec<Violation> {
    let mut violations = provider_schema().validate(config);
    let set = |key: &str| get_optional_string_attr(config, key).is_some();
    if set("access_token") && set("refresh_token") {
        violations.push(Violation::at(
            "refresh_token",
            "only one of access_token and refresh_token may be set",
        ));
    }
    violations
}

/// Build the client configuration from the provider block and the process
/// environment
pub fn resolve(config: &DynamicValue) -> Result<ClientConfig> {
    resolve_with(config, |key| std::env::var(key).ok())
}

pub fn resolve_with<F>(config: &DynamicValue, env: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |attr: &str, var: &str| {
        get_optional_string_attr(config, attr).or_else(|| env(var).filter(|v| !v.is_empty()))
    };

    let url = match lookup("url", ENV_URL) {
        Some(url) => url,
        None => bail!("url must be set in the provider block or via {}", ENV_URL),
    };

    let credentials = match (
        lookup("access_token", ENV_ACCESS_TOKEN),
        lookup("refresh_token", ENV_REFRESH_TOKEN),
    ) {
        (Some(_), Some(_)) => bail!("only one of access_token and refresh_token may be set"),
        (Some(token), None) => Credentials::AccessToken(token),
        (None, Some(token)) => Credentials::RefreshToken(token),
        (None, None) => bail!(
            "one of access_token or refresh_token must be set (or {} / {})",
            ENV_ACCESS_TOKEN,
            ENV_REFRESH_TOKEN
        ),
    };

    let insecure = match get_optional_bool_attr(config, "insecure") {
        Some(b) => b,
        None => match env(ENV_INSECURE) {
            Some(v) => parse_bool(&v).with_context(|| format!("invalid {}", ENV_INSECURE))?,
            None => false,
        },
    };

    let mut client = ClientConfig::new(url, credentials).with_insecure(insecure);

    if let Some(value) = lookup("reauthorize_timeout", ENV_REAUTHORIZE_TIMEOUT) {
        client.reauthorize_timeout =
            parse_duration(&value).context("invalid reauthorize_timeout")?;
    }

    let api_timeout = match get_optional_int_attr(config, "api_timeout") {
        Some(secs) => Some(secs),
        None => match env(ENV_API_TIMEOUT) {
            Some(v) => Some(
                v.trim()
                    .parse::<i64>()
                    .with_context(|| format!("{} must be a number of seconds", ENV_API_TIMEOUT))?,
            ),
            None => None,
        },
    };
    if let Some(secs) = api_timeout {
        if secs < 1 {
            bail!("api_timeout must be at least 1 second");
        }
        client.api_timeout = Duration::from_secs(secs as u64);
    }

    client.validate()?;
    Ok(client)
}
