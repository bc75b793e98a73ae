//! Environment configuration.
//!
//! Values come from the process environment, after loading a `.env` file
//! from the working directory when there is one.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::{ConfigError, Secrets};

pub const API_KEY_VAR: &str = "JOHN_DEERE_API_KEY";
pub const API_SECRET_VAR: &str = "JOHN_DEERE_API_SECRET";
pub const API_URL_VAR: &str = "JOHN_DEERE_API_URL";
pub const OAUTH_TOKEN_VAR: &str = "JOHN_DEERE_OAUTH_TOKEN";
pub const OAUTH_SECRET_VAR: &str = "JOHN_DEERE_OAUTH_SECRET";
pub const DEFINITION_ID_VAR: &str = "JOHN_DEERE_DEFINITION_ID";
pub const REQUEST_TIMEOUT_VAR: &str = "JOHN_DEERE_REQUEST_TIMEOUT_SECS";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Long-lived access token pair as stored by the operator.
#[derive(Debug)]
pub struct StoredToken {
    pub token: String,
    pub secret: SecretString,
}

#[derive(Debug)]
pub struct Config {
    pub consumer_key: String,
    pub consumer_secret: SecretString,
    /// API base url without the `/platform` suffix.
    pub api_url: String,
    pub access_token: Option<StoredToken>,
    /// Contribution definition linked to assets created by this client.
    pub definition_id: Option<String>,
    pub request_timeout: Duration,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Empty
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let consumer_key = require(API_KEY_VAR)?;
        let consumer_secret = SecretString::from(require(API_SECRET_VAR)?);
        let api_url = require(API_URL_VAR)?;
        if url::Url::parse(&api_url).is_err() {
            return Err(ConfigError::Invalid {
                name: API_URL_VAR,
                reason: format!("{} is not an absolute url", api_url),
            });
        }

        let access_token = match (get(OAUTH_TOKEN_VAR), get(OAUTH_SECRET_VAR)) {
            (Some(token), Some(secret)) => Some(StoredToken {
                token,
                secret: SecretString::from(secret),
            }),
            _ => None,
        };

        let request_timeout = match get(REQUEST_TIMEOUT_VAR) {
            Some(secs) => secs
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::Invalid {
                    name: REQUEST_TIMEOUT_VAR,
                    reason: e.to_string(),
                })?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Config {
            consumer_key,
            consumer_secret,
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token,
            definition_id: get(DEFINITION_ID_VAR),
            request_timeout,
        })
    }

    /// `{api_url}/platform`, the root all resource paths hang off.
    pub fn platform_root(&self) -> String {
        format!("{}/platform", self.api_url)
    }

    pub fn consumer(&self) -> Secrets<'_, ()> {
        Secrets::new(
            self.consumer_key.as_str(),
            self.consumer_secret.expose_secret(),
        )
    }

    /// Consumer credentials plus the stored access token, if one is set.
    pub fn access_secrets(&self) -> Option<Secrets<'_, std::borrow::Cow<'_, str>>> {
        self.access_token.as_ref().map(|stored| {
            self.consumer()
                .token(stored.token.as_str(), stored.secret.expose_secret())
        })
    }
}
