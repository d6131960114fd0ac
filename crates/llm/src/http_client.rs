//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients with proxy support.

use crate::types::{LlmError, LlmResult};

/// Build a `reqwest::Client` for the given proxy URL.
///
/// - `Some(url)` -> route every request through the proxy (`http`, `https`
///   or `socks5` scheme, credentials may be embedded in the URL)
/// - `None` -> explicitly disable proxy (`no_proxy`), ignoring env vars
pub fn build_http_client(proxy_url: Option<&str>) -> LlmResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    match proxy_url {
        Some(raw) => {
            let parsed = url::Url::parse(raw).map_err(|e| LlmError::Configuration {
                message: format!("Invalid proxy URL '{}': {}", raw, e),
            })?;
            let proxy = reqwest::Proxy::all(parsed.as_str()).map_err(|e| {
                LlmError::Configuration {
                    message: format!("Invalid proxy URL '{}': {}", raw, e),
                }
            })?;
            builder = builder.proxy(proxy);
        }
        None => {
            builder = builder.no_proxy();
        }
    }
    builder.build().map_err(|e| LlmError::Network {
        message: format!("Failed to build HTTP client: {}", e),
    })
}
