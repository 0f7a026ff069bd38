//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients with proxy support.

use std::time::Duration;

use interview_assist_core::ProxyConfig;

use crate::types::{LlmError, LlmResult};

/// Upper bound for a single completion round trip
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// Build a `reqwest::Client` with the resolved proxy configuration.
///
/// - `Some(proxy)` -> configure proxy on the client
/// - `None` -> explicitly disable proxy (`no_proxy`), ignoring env vars
pub fn build_http_client(proxy: Option<&ProxyConfig>) -> LlmResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().timeout(REQUEST_TIMEOUT);
    match proxy {
        Some(cfg) => {
            cfg.validate().map_err(|e| LlmError::InvalidRequest {
                message: e.to_string(),
            })?;
            let mut p = reqwest::Proxy::all(cfg.url()).map_err(|e| LlmError::InvalidRequest {
                message: format!("invalid proxy URL: {}", e),
            })?;
            if let (Some(u), Some(pw)) = (&cfg.username, &cfg.password) {
                p = p.basic_auth(u, pw);
            }
            builder = builder.proxy(p);
        }
        None => {
            builder = builder.no_proxy();
        }
    }
    builder.build().map_err(|e| LlmError::ProviderUnavailable {
        message: format!("failed to build HTTP client: {}", e),
    })
}
