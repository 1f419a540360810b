use std::env;

/// Remote store configuration.
///
/// Reads from the `COURSEPLAN_API_URL` / `COURSEPLAN_API_KEY`
/// environment variables, falling back to a local development server
/// when unset.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the course-plan store, without a trailing slash.
    pub base_url: String,
    /// Credential sent as the `x-api-key` header on every request.
    pub api_key: Option<String>,
}

impl RemoteConfig {
    /// The default store URL used when no environment variable is set.
    pub const DEFAULT_URL: &str = "http://localhost:8080";

    /// Build a config from the environment.
    ///
    /// Priority: `COURSEPLAN_API_URL` / `COURSEPLAN_API_KEY` env vars,
    /// then the compile-time default (no key).
    pub fn from_env() -> Self {
        let base_url =
            env::var("COURSEPLAN_API_URL").unwrap_or_else(|_| Self::DEFAULT_URL.to_owned());
        let api_key = env::var("COURSEPLAN_API_KEY").ok();
        Self { base_url, api_key }
    }

    /// Build a config from an explicit URL (useful for tests and CLI flags).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_trailing_slash(base_url.into()),
            api_key: None,
        }
    }

    /// Attach an api key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// External class catalog configuration.
///
/// The catalog is a read-only search API parameterized by roster term
/// and subject. Reads from `COURSEPLAN_CATALOG_URL` /
/// `COURSEPLAN_ROSTER`, falling back to the public Cornell endpoint
/// and the current roster.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog API, without a trailing slash.
    pub base_url: String,
    /// Roster term passed on every search (e.g. "SP25").
    pub roster: String,
}

impl CatalogConfig {
    /// The default catalog URL used when no environment variable is set.
    pub const DEFAULT_URL: &str = "https://classes.cornell.edu/api/2.0";
    /// The default roster term.
    pub const DEFAULT_ROSTER: &str = "SP25";

    /// Build a config from the environment.
    pub fn from_env() -> Self {
        let base_url =
            env::var("COURSEPLAN_CATALOG_URL").unwrap_or_else(|_| Self::DEFAULT_URL.to_owned());
        let roster =
            env::var("COURSEPLAN_ROSTER").unwrap_or_else(|_| Self::DEFAULT_ROSTER.to_owned());
        Self { base_url, roster }
    }

    /// Build a config from an explicit URL and roster.
    pub fn new(base_url: impl Into<String>, roster: impl Into<String>) -> Self {
        Self {
            base_url: trim_trailing_slash(base_url.into()),
            roster: roster.into(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
