//! Root catalog discovery.
//!
//! The platform publishes its OAuth endpoints and the entry points of the
//! API as relation-tagged links on `{platform_root}/`, so nothing but the
//! base url is configured by hand.

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::{
    DiscoveryError, HandshakeError, Link, Links, OAuthClientProvider, Result, SecretsProvider,
};

pub const OAUTH_REQUEST_TOKEN_REL: &str = "oauthRequestToken";
pub const OAUTH_AUTHORIZE_REQUEST_TOKEN_REL: &str = "oauthAuthorizeRequestToken";
pub const OAUTH_ACCESS_TOKEN_REL: &str = "oauthAccessToken";
pub const FILES_REL: &str = "files";
pub const CURRENT_USER_REL: &str = "currentUser";

/// Query template the platform appends to the authorize link.
const AUTHORIZE_TOKEN_TEMPLATE: &str = "?oauth_token={token}";

/// The catalog relations this client knows about. Anything else the
/// platform lists is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub request_token_uri: Option<String>,
    pub authorize_request_token_uri: Option<String>,
    pub access_token_uri: Option<String>,
    pub files_uri: Option<String>,
    pub current_user_uri: Option<String>,
}

impl Catalog {
    pub fn from_links<'a, I>(links: I) -> Self
    where
        I: IntoIterator<Item = &'a Link>,
    {
        let mut catalog = Catalog::default();
        for link in links.into_iter().filter(|link| !link.uri.is_empty()) {
            let slot = match link.rel.as_str() {
                OAUTH_REQUEST_TOKEN_REL => &mut catalog.request_token_uri,
                OAUTH_AUTHORIZE_REQUEST_TOKEN_REL => &mut catalog.authorize_request_token_uri,
                OAUTH_ACCESS_TOKEN_REL => &mut catalog.access_token_uri,
                FILES_REL => &mut catalog.files_uri,
                CURRENT_USER_REL => &mut catalog.current_user_uri,
                _ => continue,
            };
            *slot = Some(link.uri.clone());
        }

        // the handshake appends its own oauth_token parameter
        if let Some(uri) = catalog.authorize_request_token_uri.as_mut() {
            if let Some(stripped) = uri.strip_suffix(AUTHORIZE_TOKEN_TEMPLATE) {
                *uri = stripped.to_string();
            }
        }
        catalog
    }

    /// Parses a catalog response body.
    pub fn from_slice(body: &[u8]) -> std::result::Result<Self, DiscoveryError> {
        #[derive(Deserialize)]
        struct CatalogDocument {
            links: Option<Links>,
        }

        let document: CatalogDocument =
            serde_json::from_slice(body).map_err(DiscoveryError::Unparseable)?;
        let links = document.links.ok_or(DiscoveryError::MissingLinks)?;
        Ok(Catalog::from_links(&links))
    }
}

/// Fetches and parses the root catalog.
///
/// The request is signed with whatever `secrets` carries: the consumer
/// credentials alone before the handshake, or with the access token once
/// one is stored.
pub async fn fetch_catalog<S>(
    http: &reqwest::Client,
    platform_root: &str,
    secrets: &S,
) -> Result<Catalog>
where
    S: SecretsProvider,
{
    let url = Url::parse(&format!("{}/", platform_root.trim_end_matches('/')))?;
    info!(%url, "fetching platform catalog");

    let response = http
        .clone()
        .oauth1(secrets)
        .get(url)
        .send()
        .await?;
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(DiscoveryError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        }
        .into());
    }

    let catalog = Catalog::from_slice(&body)?;
    debug!(?catalog, "catalog discovered");
    Ok(catalog)
}

/// The three OAuth endpoints, parsed and ready for the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub request_token: Url,
    pub authorize: Url,
    pub access_token: Url,
}

impl Endpoints {
    pub fn from_catalog(catalog: &Catalog) -> std::result::Result<Self, HandshakeError> {
        Ok(Endpoints {
            request_token: required(&catalog.request_token_uri, OAUTH_REQUEST_TOKEN_REL)?,
            authorize: required(
                &catalog.authorize_request_token_uri,
                OAUTH_AUTHORIZE_REQUEST_TOKEN_REL,
            )?,
            access_token: required(&catalog.access_token_uri, OAUTH_ACCESS_TOKEN_REL)?,
        })
    }
}

fn required(uri: &Option<String>, rel: &'static str) -> std::result::Result<Url, HandshakeError> {
    let uri = uri.as_deref().ok_or(HandshakeError::MissingEndpoint(rel))?;
    Url::parse(uri).map_err(|_| HandshakeError::InvalidEndpoint {
        rel,
        uri: uri.to_string(),
    })
}
