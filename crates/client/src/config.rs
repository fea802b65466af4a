//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable holding the vRA base URL
pub const ENV_URL: &str = "VRA_URL";
/// Environment variable holding an API access token
pub const ENV_ACCESS_TOKEN: &str = "VRA_ACCESS_TOKEN";
/// Environment variable holding an API refresh token
pub const ENV_REFRESH_TOKEN: &str = "VRA_REFRESH_TOKEN";
/// Environment variable disabling TLS verification
pub const ENV_INSECURE: &str = "VRA_INSECURE";
/// Environment variable holding the re-login interval
pub const ENV_REAUTHORIZE_TIMEOUT: &str = "VRA_REAUTHORIZE_TIMEOUT";
/// Environment variable holding the per-call HTTP timeout in seconds
pub const ENV_API_TIMEOUT: &str = "VRA_API_TIMEOUT";

/// How the client authenticates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Credentials {
    /// A ready-to-use bearer token
    AccessToken(String),
    /// A refresh token exchanged for bearer tokens on demand
    RefreshToken(String),
}

/// vRA client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the vRA instance, e.g. `https://vra.example.com`
    pub url: String,

    /// Authentication material
    pub credentials: Credentials,

    /// Accept invalid TLS certificates
    pub insecure: bool,

    /// Bearer tokens obtained from a refresh token are renewed after this long
    pub reauthorize_timeout: Duration,

    /// Timeout applied to every HTTP call
    pub api_timeout: Duration,

    /// Delay between polls of asynchronous requests
    pub poll_interval: Duration,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            url: url.into(),
            credentials,
            insecure: false,
            reauthorize_timeout: Duration::from_secs(15 * 60),
            api_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(5),
        }
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Check the configuration for obvious mistakes
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.url)?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(Error::InvalidConfig(format!(
                "url scheme must be http or https, got {}",
                parsed.scheme()
            )));
        }
        let token = match &self.credentials {
            Credentials::AccessToken(t) | Credentials::RefreshToken(t) => t,
        };
        if token.is_empty() {
            return Err(Error::InvalidConfig("token must not be empty".to_string()));
        }
        Ok(())
    }

    /// Whether the URL points at the hosted vRA Cloud service
    pub fn is_cloud(&self) -> bool {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.ends_with("mgmt.cloud.vmware.com")))
            .unwrap_or(false)
    }
}

/// Parse a boolean the way Go's strconv.ParseBool does
pub fn parse_bool(value: &str) -> Result<bool> {
    match value.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(Error::InvalidConfig(format!("invalid boolean: {:?}", other))),
    }
}

/// Parse a Go-style duration string such as `15m`, `1h30m` or `45s`
pub fn parse_duration(value: &str) -> Result<Duration> {
    let input = value.trim();
    if input.is_empty() {
        return Err(Error::InvalidConfig("empty duration".to_string()));
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let invalid = || Error::InvalidConfig(format!("invalid duration: {:?}", value));
    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        if digits == 0 {
            return Err(invalid());
        }
        let amount: f64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "ms" => 0.001,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];
        let overflow = || Error::InvalidConfig(format!("invalid duration {:?}: out of range", value));
        let part = Duration::try_from_secs_f64(amount * scale).map_err(|_| overflow())?;
        total = total.checked_add(part).ok_or_else(overflow)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("15").is_err());
        assert!(parse_duration("m15").is_err());
        assert!(parse_duration("10d").is_err());
    }

    #[test]
    fn test_parse_duration_out_of_range_is_an_error() {
        assert!(matches!(
            parse_duration("99999999999999999999999h"),
            Err(Error::InvalidConfig(_))
        ));
        // each part fits, the sum does not
        assert!(matches!(
            parse_duration("10000000000000000000s10000000000000000000s"),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("1").unwrap());
        assert!(!parse_bool("False").unwrap());
        assert!(parse_bool("yes").is_err());
    }

    #[test]
    fn test_validate() {
        let ok = ClientConfig::new("https://vra.local", Credentials::RefreshToken("t".into()));
        assert!(ok.validate().is_ok());

        let bad_scheme = ClientConfig::new("ftp://vra.local", Credentials::AccessToken("t".into()));
        assert!(bad_scheme.validate().is_err());

        let empty = ClientConfig::new("https://vra.local", Credentials::AccessToken(String::new()));
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_is_cloud() {
        let cloud = ClientConfig::new(
            "https://api.mgmt.cloud.vmware.com",
            Credentials::RefreshToken("t".into()),
        );
        assert!(cloud.is_cloud());
        let onprem = ClientConfig::new("https://vra.corp", Credentials::RefreshToken("t".into()));
        assert!(!onprem.is_cloud());
    }
}
