//! HTTP region lookup.
//!
//! This is the ONLY place for status code handling and provider-specific
//! response parsing. The resolver only sees `RegionLookupResult` or an error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use crate::config::{ConsentConfig, DEFAULT_LOCATION_ENDPOINT};
use crate::error::{ConsentError, ConsentResult};

use super::countries::requires_consent;
use super::{RegionLookup, RegionLookupResult};

const USER_AGENT_VALUE: &str = concat!("cookiedialog/", env!("CARGO_PKG_VERSION"));

/// Host of the default geolocation provider.
const IPAPI_HOST: &str = "ipapi.co";

/// Response dialect of the lookup endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupProvider {
    /// ipapi.co: `country_code` mapped through the consent-required set.
    IpApi,
    /// Any other endpoint: `inEU` / `in_eu` boolean read directly.
    Custom,
}

impl LookupProvider {
    /// Recognize the default provider by host.
    pub fn for_endpoint(endpoint: &str) -> Self {
        match url::Url::parse(endpoint) {
            Ok(url) if url.host_str() == Some(IPAPI_HOST) => Self::IpApi,
            _ => Self::Custom,
        }
    }

    pub fn detection_method(self) -> &'static str {
        match self {
            Self::IpApi => "ipapi",
            Self::Custom => "custom-endpoint",
        }
    }

    /// Map a JSON body to a lookup result.
    pub fn parse(self, body: &Value) -> ConsentResult<RegionLookupResult> {
        match self {
            Self::IpApi => parse_ipapi(body),
            Self::Custom => parse_custom(body),
        }
    }
}

fn parse_ipapi(body: &Value) -> ConsentResult<RegionLookupResult> {
    // ipapi reports rate limiting with a 200 and an error object.
    if body.get("error").and_then(Value::as_bool) == Some(true) {
        let reason = string_field(body, "reason").unwrap_or_else(|| "unknown".to_string());
        return Err(ConsentError::InvalidResponse {
            message: format!("provider error: {}", reason),
        });
    }

    let country = string_field(body, "country_code")
        .map(|c| c.to_ascii_uppercase())
        .ok_or_else(|| ConsentError::InvalidResponse {
            message: "missing country_code".to_string(),
        })?;

    Ok(RegionLookupResult {
        requires_consent: requires_consent(&country),
        country: Some(country),
        region: string_field(body, "continent_code"),
    })
}

fn parse_custom(body: &Value) -> ConsentResult<RegionLookupResult> {
    let in_eu = body
        .get("inEU")
        .and_then(Value::as_bool)
        .or_else(|| body.get("in_eu").and_then(Value::as_bool))
        .ok_or_else(|| ConsentError::InvalidResponse {
            message: "missing inEU / in_eu flag".to_string(),
        })?;

    Ok(RegionLookupResult {
        requires_consent: in_eu,
        country: string_field(body, "country"),
        region: string_field(body, "region"),
    })
}

fn string_field(body: &Value, name: &str) -> Option<String> {
    body.get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Region lookup over one HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpRegionLookup {
    client: reqwest::Client,
    endpoint: String,
    provider: LookupProvider,
}

impl HttpRegionLookup {
    /// Lookup against the configured (or default) endpoint.
    pub fn from_config(config: &ConsentConfig) -> ConsentResult<Self> {
        Self::new(
            config.effective_location_endpoint(),
            Duration::from_secs(config.location_timeout_secs),
        )
    }

    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> ConsentResult<Self> {
        let endpoint = endpoint.into();

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| ConsentError::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        let provider = LookupProvider::for_endpoint(&endpoint);

        Ok(Self {
            client,
            endpoint,
            provider,
        })
    }

    /// Default endpoint with default timeout.
    pub fn ipapi() -> ConsentResult<Self> {
        Self::new(DEFAULT_LOCATION_ENDPOINT, Duration::from_secs(5))
    }

    /// Force a response dialect regardless of host.
    pub fn with_provider(mut self, provider: LookupProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn provider(&self) -> LookupProvider {
        self.provider
    }
}

#[async_trait]
impl RegionLookup for HttpRegionLookup {
    async fn lookup(&self) -> ConsentResult<RegionLookupResult> {
        debug!(url = %self.endpoint, provider = ?self.provider, "looking up visitor region");

        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ConsentError::RegionLookup {
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let text = response.text().await.map_err(|e| ConsentError::RegionLookup {
            message: format!("failed to read response body: {}", e),
        })?;

        let body: Value = serde_json::from_str(&text).map_err(|e| ConsentError::InvalidResponse {
            message: format!("failed to parse region response: {}", e),
        })?;

        self.provider.parse(&body)
    }

    fn detection_method(&self) -> &str {
        self.provider.detection_method()
    }
}
