//! User-configurable connection settings and their resolution against the
//! static defaults in [`crate::config`].

use serde::{Deserialize, Serialize};

use crate::config;

/// Key under which the general connection settings are persisted.
pub const GENERAL_SETTINGS: &str = "general";

/// The kind of deployment the completion endpoint is.
///
/// `Custom` covers OpenAI-compatible proxies and Azure-style deployments that
/// take their credentials via an `api-key` header and an `api-version` query
/// parameter.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIs,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApiType {
    #[default]
    OpenAi,
    Custom,
}

/// How the API key is presented to the endpoint.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIs,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ApiAuth {
    None,
    #[default]
    BearerToken,
    ApiKey,
}

/// Persisted settings record. Every field is optional; unset fields fall back
/// to the static defaults at resolution time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model: Option<String>,
    pub api_type: Option<ApiType>,
    pub api_auth: Option<ApiAuth>,
    pub api_base: Option<String>,
    pub api_version: Option<String>,
}

/// Settings with every fallback applied, ready to build a client from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub model: String,
    pub api_type: ApiType,
    pub api_auth: ApiAuth,
    /// Empty means the provider's default endpoint.
    pub api_base: String,
    pub api_version: Option<String>,
}

impl Default for ResolvedSettings {
    fn default() -> Self {
        Self {
            model: config::DEFAULT_MODEL.to_string(),
            api_type: config::DEFAULT_API_TYPE,
            api_auth: config::DEFAULT_API_AUTH,
            api_base: config::DEFAULT_API_BASE.to_string(),
            api_version: None,
        }
    }
}

impl Settings {
    /// Applies the static defaults to every unset field. An empty version
    /// string counts as unset.
    pub fn resolve(&self) -> ResolvedSettings {
        let defaults = ResolvedSettings::default();

        ResolvedSettings {
            model: self.model.clone().unwrap_or(defaults.model),
            api_type: self.api_type.unwrap_or(defaults.api_type),
            api_auth: self.api_auth.unwrap_or(defaults.api_auth),
            api_base: self.api_base.clone().unwrap_or(defaults.api_base),
            api_version: self
                .api_version
                .clone()
                .filter(|version| !version.is_empty()),
        }
    }
}
