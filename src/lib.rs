/*!
axiom-oauth1: an OAuth1 client for the Deere axiom platform API.

# Overview

The platform authenticates every call with OAuth 1.0a (HMAC-SHA1). This crate
signs [reqwest](https://crates.io/crates/reqwest) requests through
[oauth1-request](https://crates.io/crates/oauth1-request), discovers the OAuth
endpoints from the platform catalog, runs the out-of-band three-legged
handshake once, and afterwards issues signed calls with the stored access
token.

# How to use

## Acquiring the access token & secret

```no_run
use axiom_oauth1::{App, Config, StdinVerifier};

# async fn run() -> axiom_oauth1::Result<()> {
let app = App::new(Config::from_env()?)?;

// prints the authorize url, waits for the code pasted on stdin and prints
// the two lines to store in the .env file
let token = app
    .authorize(&mut StdinVerifier, &mut std::io::stdout())
    .await?;
# Ok(())
# }
```

## Calling the platform

```no_run
use axiom_oauth1::{App, Config};
use futures_util::TryStreamExt;

# async fn run() -> axiom_oauth1::Result<()> {
let app = App::new(Config::from_env()?)?;
let gateway = app.gateway();

let user = gateway.user("herddogg").await?;
println!("{} {}", user.status, user.body);

// every page of the asset catalog, following nextPage links
let pages: Vec<_> = gateway.asset_types().try_collect().await?;
# Ok(())
# }
```
*/
mod api;
mod app;
pub mod catalog;
mod client;
pub mod config;
mod error;
mod gateway;
mod handshake;
mod links;
mod models;
pub mod pagination;
mod request;
mod secrets;
mod signer;
mod token_reader;

// exposed to external program
pub use api::CreatedAsset;
pub use app::{collect_printing, App, StdinVerifier};
pub use catalog::{
    fetch_catalog, Catalog, Endpoints, CURRENT_USER_REL, FILES_REL, OAUTH_ACCESS_TOKEN_REL,
    OAUTH_AUTHORIZE_REQUEST_TOKEN_REL, OAUTH_REQUEST_TOKEN_REL,
};
pub use client::{Client, OAuthClientProvider};
pub use config::{Config, StoredToken, OAUTH_SECRET_VAR, OAUTH_TOKEN_VAR};
pub use error::{ConfigError, DiscoveryError, Error, HandshakeError, HandshakeStage, Result};
pub use gateway::{ApiResponse, Gateway};
pub use handshake::{AccessToken, Handshake, RequestToken, VerifierSource, OUT_OF_BAND_CALLBACK};
pub use links::{platform_path, Document, Link, Links, NEXT_PAGE_REL};
pub use models::{AssetLocation, BasicMeasurement, NewAsset, TypedLink};
pub use request::RequestBuilder;
pub use secrets::{Secrets, SecretsProvider};
pub use signer::{OAuthParameters, Signer};
pub use token_reader::{TokenReader, TokenReaderFuture, TokenResponse};

/// Versioned media type sent as `Accept` and, for bodies, `Content-Type`.
pub const AXIOM_MEDIA_TYPE: &str = "application/vnd.deere.axiom.v3+json";

/// Represents `oauth_token`.
pub const OAUTH_TOKEN_KEY: &str = "oauth_token";
/// Represents `realm`.
pub const REALM_KEY: &str = "realm";

// crate-private constant variables
pub(crate) const OAUTH_KEY_PREFIX: &str = "oauth_";
