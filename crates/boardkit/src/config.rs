use std::time::Duration;

use crate::error::Error;

/// Minimum spacing between two dispatched requests (stays under 5 req/s)
pub const MIN_INTERVAL: Duration = Duration::from_millis(220);

/// Base delay between retries; 429 without `Retry-After` backs off linearly from it
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Attempts per request, the first one included
pub const MAX_RETRIES: u32 = 3;

/// Overall timeout of a single HTTP send
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tenant base URL, `{tenant}` is substituted
pub const BASE_URL_TEMPLATE: &str = "https://{tenant}.kaiten.ru/api/latest";

/// Tenant identifier and bearer token
#[derive(Clone)]
pub struct Credentials {
    tenant: String,
    token: String,
}

impl Credentials {
    pub fn new(tenant: impl Into<String>, token: impl Into<String>) -> Result<Self, Error> {
        let tenant = tenant.into().trim().to_string();
        let token = token.into().trim().to_string();

        if tenant.is_empty() {
            return Err(Error::Config("tenant must not be empty".to_string()));
        }
        if token.is_empty() {
            return Err(Error::Config("token must not be empty".to_string()));
        }

        Ok(Self { tenant, token })
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant", &self.tenant)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Rate limiting and retry timings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub min_interval: Duration,
    pub retry_delay: Duration,
    pub max_retries: u32,
    pub request_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            min_interval: MIN_INTERVAL,
            retry_delay: RETRY_DELAY,
            max_retries: MAX_RETRIES,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

/// Everything needed to construct a [`crate::api::BoardClient`]
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub base_url: String,
    pub timing: Timing,
}

impl Config {
    pub fn new(credentials: Credentials) -> Self {
        let base_url = BASE_URL_TEMPLATE.replace("{tenant}", credentials.tenant());
        Self {
            credentials,
            base_url,
            timing: Timing::default(),
        }
    }

    /// Point the client somewhere other than the tenant's default host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Build the configuration from the global CLI arguments (which are backed by
    /// `BOARDKIT_*` environment variables).
    pub fn from_global(global: &crate::Global) -> Result<Self, Error> {
        let tenant = global
            .tenant
            .clone()
            .ok_or_else(|| Error::Config("BOARDKIT_TENANT environment variable not set".to_string()))?;
        let token = global
            .token
            .clone()
            .ok_or_else(|| Error::Config("BOARDKIT_TOKEN environment variable not set".to_string()))?;

        let config = Self::new(Credentials::new(tenant, token)?);

        Ok(match &global.base_url {
            Some(url) if !url.trim().is_empty() => config.with_base_url(url.trim()),
            _ => config,
        })
    }
}
