//! OpenAI client construction from an explicit credential.
//!
//! The API key is handed to each client directly and never placed in the
//! process environment, so two runs with different keys cannot observe each
//! other's credential.

use crate::error::{DigestError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::fmt;
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// An API key supplied by the caller for a single run.
#[derive(Clone)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Wrap a raw key. Surrounding whitespace is removed; an empty key is rejected.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(DigestError::InvalidInput("API key is empty".to_string()));
        }
        Ok(Self(key))
    }

    /// Read the key from `OPENAI_API_KEY`, if present and non-empty.
    pub fn from_env() -> Option<Self> {
        std::env::var("OPENAI_API_KEY").ok().and_then(|k| Self::new(k).ok())
    }

    /// The raw key.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Masked form for display (`sk-proj...abcd`).
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 12 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..7].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiCredential").field(&"<redacted>").finish()
    }
}

/// Create an OpenAI client for `credential` with the default timeout.
pub fn create_client(credential: &ApiCredential) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(credential, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client for `credential` with a custom timeout.
pub fn create_client_with_timeout(
    credential: &ApiCredential,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let config = OpenAIConfig::new().with_api_key(credential.expose());
    Ok(Client::with_config(config).with_http_client(http_client))
}
