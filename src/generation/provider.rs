//! Provider URLs and reachability probing.
//!
//! A provider is only ever asked "does this URL answer?"; its real request
//! and response schema stays opaque.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;
use tracing::debug;

use crate::config::{PerformanceConfig, ServiceDescriptor};
use crate::error::{PlaceholderError, Result};
use crate::models::ResolvedConfig;

impl ServiceDescriptor {
    /// Fills the endpoint template and appends the style parameters.
    ///
    /// Recognized template fields: `{width}`, `{height}`, `{quality}`,
    /// `{prompt}` (percent-encoded enhanced prompt).
    pub fn build_url(&self, config: &ResolvedConfig) -> String {
        let mut url = self
            .endpoint_template
            .replace("{width}", &config.width.to_string())
            .replace("{height}", &config.height.to_string())
            .replace("{quality}", &config.quality.to_string())
            .replace("{prompt}", &encode(&config.enhanced_prompt));

        for (name, value) in &self.style_params {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&encode(name));
            url.push('=');
            url.push_str(&encode(value));
        }

        url
    }
}

fn encode(text: &str) -> String {
    utf8_percent_encode(text, NON_ALPHANUMERIC).to_string()
}

/// Checks whether a provider URL is reachable.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> Result<()>;
}

// == HTTP Prober ==
/// Probes with a HEAD request; any 2xx or 3xx answer counts as reachable.
///
/// Transport errors are retried up to `retries` times. Callers bound the
/// total time, so no per-request timeout is set here.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    retries: u32,
}

impl HttpProber {
    pub fn new(client: Client, retries: u32) -> Self {
        Self { client, retries }
    }

    pub fn from_config(performance: &PerformanceConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(performance.timeout_ms))
            .user_agent(concat!("cutout_placeholder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlaceholderError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::new(client, performance.retries))
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.client.head(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() || status.is_redirection() {
                        return Ok(());
                    }
                    return Err(PlaceholderError::ServiceUnavailable {
                        target: url.to_string(),
                        reason: format!("HTTP {}", status),
                    });
                }
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    debug!("Probe attempt {} for {} failed: {}", attempt, url, e);
                }
                Err(e) => {
                    return Err(PlaceholderError::ServiceUnavailable {
                        target: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}
