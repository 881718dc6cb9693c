//! Static fallback configuration for unset user settings.

use crate::settings::{ApiAuth, ApiType};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_API_TYPE: ApiType = ApiType::OpenAi;
pub const DEFAULT_API_AUTH: ApiAuth = ApiAuth::BearerToken;

/// An empty base means the provider's default endpoint.
pub const DEFAULT_API_BASE: &str = "";
