//! RpcSign CLI - sign an RPC-style request and print its query string.
//!
//! Credentials are resolved through the default provider chain
//! (environment, credentials file), so the usual variables apply.
//!
//! # Usage
//!
//! ```text
//! RPC_ENDPOINT=ecs.example.com rpcsign GET Action=DescribeRegions RegionId=us-1
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RPC_ENDPOINT` | *(required)* | Host the request is sent to |
//! | `RPC_CLIENT_NAME` | *(unset)* | Client name to resolve |
//! | `RPC_SIGNATURE_METHOD` | `HMAC-SHA1` | `HMAC-SHA1` or `HMAC-SHA256` |
//! | `ALIBABA_CLOUD_PROFILE` | `default` | Default client name |
//! | `LOG_LEVEL` | `warn` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use http::Method;
use rpcsign_client::{ClientResolver, ParameterMap, RpcClient};
use rpcsign_core::{ClientRegistry, ResolverConfig, RpcClientConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to `LOG_LEVEL`. Logs go to
/// stderr so stdout carries only the signed query.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_string())
}

/// Parse `METHOD KEY=VALUE...` arguments.
fn parse_args(args: &[String]) -> Result<(Method, ParameterMap)> {
    let Some((method, pairs)) = args.split_first() else {
        bail!("usage: rpcsign METHOD KEY=VALUE...");
    };
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method: {method}"))?;

    let mut params = ParameterMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("expected KEY=VALUE, got {pair}"))?;
        if key.is_empty() {
            bail!("empty parameter name in {pair}");
        }
        params.insert(key.to_owned(), value.to_owned());
    }

    Ok((method, params))
}

fn main() -> Result<()> {
    init_tracing(&log_level())?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (method, params) = parse_args(&args)?;

    let resolver_config = ResolverConfig::from_env();
    let resolver = ClientResolver::new(Arc::new(ClientRegistry::new()), &resolver_config)
        .context("failed to build client resolver")?;
    let client = RpcClient::new(RpcClientConfig::from_env(), Arc::new(resolver))
        .context("failed to build RPC client")?;

    let signed = client
        .query(params, &method)
        .context("failed to sign request")?;

    info!(
        endpoint = client.endpoint("", ""),
        access_key_id = signed.get("AccessKeyId").map_or("", String::as_str),
        "Signed request"
    );

    println!(
        "https://{}/?{}",
        client.endpoint("", ""),
        RpcClient::to_query_string(&signed)
    );

    Ok(())
}
