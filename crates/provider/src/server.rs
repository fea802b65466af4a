//! Plugin server
//!
//! Terraform starts the provider as a child process and talks to it over
//! gRPC. The process checks the magic cookie, listens on a loopback port,
//! prints the go-plugin handshake line on stdout and then serves until it is
//! killed.

use std::io::Write;
use std::net::SocketAddr;
use std::ops::RangeInclusive;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Certificate, Identity, Server, ServerTlsConfig};
use tracing::{debug, info};

use crate::health::health_server::HealthServer;
use crate::health::PluginHealth;
use crate::provider::VraProvider;
use crate::tfplugin6::provider_server::ProviderServer;

pub const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";
pub const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";

/// go-plugin core protocol version
const CORE_PROTOCOL_VERSION: u32 = 1;
/// Terraform plugin protocol major version
const APP_PROTOCOL_VERSION: u32 = 6;

const DEFAULT_PORT_RANGE: RangeInclusive<u16> = 10000..=25000;

/// Refuse to run unless started by Terraform
pub fn check_magic_cookie<F>(env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    match env(MAGIC_COOKIE_KEY) {
        Some(value) if value == MAGIC_COOKIE_VALUE => Ok(()),
        _ => bail!(
            "This binary is a plugin. These are not meant to be executed directly.\n\
             Please execute the program that consumes these plugins, which will\n\
             load any plugins automatically"
        ),
    }
}

/// Ports the listener may use, from PLUGIN_MIN_PORT and PLUGIN_MAX_PORT
pub fn port_range<F>(env: F) -> Result<RangeInclusive<u16>>
where
    F: Fn(&str) -> Option<String>,
{
    let bound = |key: &str, default: u16| -> Result<u16> {
        match env(key).filter(|v| !v.is_empty()) {
            Some(v) => v.parse().with_context(|| format!("invalid {}: {}", key, v)),
            None => Ok(default),
        }
    };
    let min = bound("PLUGIN_MIN_PORT", *DEFAULT_PORT_RANGE.start())?;
    let max = bound("PLUGIN_MAX_PORT", *DEFAULT_PORT_RANGE.end())?;
    if min > max {
        bail!("PLUGIN_MIN_PORT {} is greater than PLUGIN_MAX_PORT {}", min, max);
    }
    Ok(min..=max)
}

/// The line go-plugin reads from stdout
///
/// `cert` is the DER encoded server certificate when AutoMTLS is in use.
pub fn handshake_line(addr: SocketAddr, cert: Option<&[u8]>) -> String {
    let mut line = format!(
        "{}|{}|tcp|{}|grpc",
        CORE_PROTOCOL_VERSION, APP_PROTOCOL_VERSION, addr
    );
    if let Some(der) = cert {
        line.push('|');
        line.push_str(&STANDARD_NO_PAD.encode(der));
    }
    line
}

async fn bind(ports: RangeInclusive<u16>) -> Result<TcpListener> {
    for port in ports.clone() {
        match TcpListener::bind(("127.0.0.1", port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) => debug!("Port {} unavailable: {}", port, e),
        }
    }
    bail!(
        "no free port between {} and {}",
        ports.start(),
        ports.end()
    )
}

/// Server certificate for AutoMTLS, trusting only Terraform's client cert
struct AutoMtls {
    tls: ServerTlsConfig,
    der: Vec<u8>,
}

fn auto_mtls(client_cert_pem: &str) -> Result<AutoMtls> {
    let generated = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
        .context("failed to generate server certificate")?;
    let identity = Identity::from_pem(generated.cert.pem(), generated.key_pair.serialize_pem());
    let tls = ServerTlsConfig::new()
        .identity(identity)
        .client_ca_root(Certificate::from_pem(client_cert_pem));
    Ok(AutoMtls {
        tls,
        der: generated.cert.der().to_vec(),
    })
}

/// Keep serving through Ctrl-C
///
/// Terraform shares the terminal's process group, so the plugin sees the
/// user's SIGINT too. Terraform handles it by calling StopProvider and
/// waiting for in-flight applies; the plugin exits when Terraform kills it.
fn ignore_interrupts() -> Result<()> {
    let mut interrupts = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
        .context("failed to install the SIGINT handler")?;
    tokio::spawn(async move {
        while interrupts.recv().await.is_some() {
            debug!("Ignoring SIGINT, waiting for Terraform to stop the provider");
        }
    });
    Ok(())
}

/// Run the provider until the process is stopped
pub async fn serve() -> Result<()> {
    let env = |key: &str| std::env::var(key).ok();
    check_magic_cookie(env)?;

    let listener = bind(port_range(env)?).await?;
    let addr = listener.local_addr()?;
    info!("Provider listening on {}", addr);

    let mut builder = Server::builder();
    let mut cert = None;
    if let Some(client_cert) = env("PLUGIN_CLIENT_CERT").filter(|c| !c.is_empty()) {
        let mtls = auto_mtls(&client_cert)?;
        builder = builder
            .tls_config(mtls.tls)
            .context("failed to configure TLS")?;
        cert = Some(mtls.der);
        debug!("AutoMTLS enabled");
    }

    ignore_interrupts()?;

    let mut stdout = std::io::stdout();
    writeln!(stdout, "{}", handshake_line(addr, cert.as_deref()))?;
    stdout.flush()?;

    info!("Handshake sent, starting gRPC server");

    serve_on(builder, listener).await
}

async fn serve_on(mut builder: Server, listener: TcpListener) -> Result<()> {
    builder
        .add_service(HealthServer::new(PluginHealth))
        .add_service(ProviderServer::new(VraProvider::new()))
        .serve_with_incoming(TcpListenerStream::new(listener))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_magic_cookie() {
        assert!(check_magic_cookie(env_of(&[(MAGIC_COOKIE_KEY, MAGIC_COOKIE_VALUE)])).is_ok());
        assert!(check_magic_cookie(env_of(&[(MAGIC_COOKIE_KEY, "nope")])).is_err());
        assert!(check_magic_cookie(env_of(&[])).is_err());
    }

    #[test]
    fn test_port_range() {
        assert_eq!(port_range(env_of(&[])).unwrap(), DEFAULT_PORT_RANGE);
        assert_eq!(
            port_range(env_of(&[("PLUGIN_MIN_PORT", "30000"), ("PLUGIN_MAX_PORT", "30010")]))
                .unwrap(),
            30000..=30010
        );
        assert!(port_range(env_of(&[("PLUGIN_MIN_PORT", "9"), ("PLUGIN_MAX_PORT", "8")])).is_err());
        assert!(port_range(env_of(&[("PLUGIN_MIN_PORT", "high")])).is_err());
    }

    #[test]
    fn test_handshake_line() {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        assert_eq!(handshake_line(addr, None), "1|6|tcp|127.0.0.1:12345|grpc");
        // base64 without padding
        assert_eq!(
            handshake_line(addr, Some(&[0xde, 0xad])),
            "1|6|tcp|127.0.0.1:12345|grpc|3q0"
        );
    }

    #[test]
    fn test_auto_mtls_produces_der_certificate() {
        let client = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let mtls = auto_mtls(&client.cert.pem()).unwrap();
        // DER encoded certificates start with a SEQUENCE tag
        assert_eq!(mtls.der[0], 0x30);
    }

    #[tokio::test]
    async fn test_server_keeps_running_after_interrupt() {
        ignore_interrupts().unwrap();
        let listener = bind(0..=0).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_on(Server::builder(), listener));

        let status = std::process::Command::new("kill")
            .args(["-INT", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert!(!server.is_finished());
        assert!(tokio::net::TcpStream::connect(addr).await.is_ok());
        server.abort();
    }

    #[tokio::test]
    async fn test_bind_within_range() {
        let listener = bind(0..=0).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }
}
