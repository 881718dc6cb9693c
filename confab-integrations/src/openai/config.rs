use confab_core::settings::{ApiAuth, ApiType, ResolvedSettings};
use reqwest::header::{HeaderMap, AUTHORIZATION};
use secrecy::{ExposeSecret as _, SecretString};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Client configuration for OpenAI and OpenAI-compatible endpoints.
///
/// Credentials are attached per the configured auth mode: a bearer token by
/// default, an `api-key` header plus an optional `api-version` query parameter
/// for custom deployments, or nothing at all.
#[derive(Clone, Debug)]
pub struct ChatApiConfig {
    api_base: String,
    api_key: SecretString,
    api_type: ApiType,
    api_auth: ApiAuth,
    api_version: Option<String>,
}

impl Default for ChatApiConfig {
    fn default() -> Self {
        Self {
            api_base: OPENAI_API_BASE.to_string(),
            api_key: std::env::var("OPENAI_API_KEY")
                .unwrap_or_else(|_| String::new())
                .into(),
            api_type: ApiType::default(),
            api_auth: ApiAuth::default(),
            api_version: None,
        }
    }
}

impl ChatApiConfig {
    /// Builds a config from an API key and resolved settings. An empty base
    /// url means the provider's default endpoint.
    pub fn from_settings(api_key: impl Into<SecretString>, settings: &ResolvedSettings) -> Self {
        let api_base = if settings.api_base.is_empty() {
            OPENAI_API_BASE.to_string()
        } else {
            settings.api_base.clone()
        };

        Self {
            api_base,
            api_key: api_key.into(),
            api_type: settings.api_type,
            api_auth: settings.api_auth,
            api_version: settings.api_version.clone(),
        }
    }
}

impl async_openai::config::Config for ChatApiConfig {
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        match self.api_auth {
            ApiAuth::ApiKey if self.api_type.is_custom() => {
                headers.insert("api-key", self.api_key.expose_secret().parse().unwrap());
            }
            ApiAuth::None => {}
            _ => {
                headers.insert(
                    AUTHORIZATION,
                    format!("Bearer {}", self.api_key.expose_secret())
                        .as_str()
                        .parse()
                        .unwrap(),
                );
            }
        }

        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn api_base(&self) -> &str {
        &self.api_base
    }

    fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    fn query(&self) -> Vec<(&str, &str)> {
        match (&self.api_type, self.api_version.as_deref()) {
            (ApiType::Custom, Some(version)) => vec![("api-version", version)],
            _ => vec![],
        }
    }
}
