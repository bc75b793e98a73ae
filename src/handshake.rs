//! Three-legged OAuth1 handshake.
//!
//! ```text
//! NeedRequestToken -> AwaitingVerifier -> NeedAccessToken -> Done
//! ```
//!
//! Every failure ends the handshake. The request token is single use, so
//! a rejected verifier means starting over from a fresh request token.

use std::fmt;

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::{
    Endpoints, HandshakeError, HandshakeStage, OAuthClientProvider, OAuthParameters, Result,
    Secrets, TokenReaderFuture, OAUTH_TOKEN_KEY,
};

/// `oauth_callback` value of the out-of-band flow: no redirect, the user
/// copies the verifier by hand.
pub const OUT_OF_BAND_CALLBACK: &str = "oob";

/// Supplies the verifier code once the user has authorized the request
/// token in a browser. Implementations may block for as long as they like.
#[async_trait(?Send)]
pub trait VerifierSource {
    async fn verifier(&mut self, authorize_url: &Url) -> Result<String>;
}

/// Ephemeral token pair, only good for one access-token exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestToken {
    pub token: String,
    pub secret: String,
    pub authorize_url: Url,
}

/// Long-lived token pair to be stored by the operator.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub secret: String,
}

impl fmt::Debug for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestToken")
            .field("token", &self.token)
            .field("authorize_url", &self.authorize_url.as_str())
            .finish()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &self.token)
            .finish()
    }
}

enum State {
    NeedRequestToken,
    AwaitingVerifier(RequestToken),
    NeedAccessToken(RequestToken, String),
    Done(AccessToken),
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::NeedRequestToken => "need-request-token",
            State::AwaitingVerifier(_) => "awaiting-verifier",
            State::NeedAccessToken(..) => "need-access-token",
            State::Done(_) => "done",
        }
    }
}

pub struct Handshake<'a> {
    http: reqwest::Client,
    consumer: Secrets<'a, ()>,
    endpoints: Endpoints,
}

impl<'a> Handshake<'a> {
    pub fn new(http: reqwest::Client, consumer: Secrets<'a, ()>, endpoints: Endpoints) -> Self {
        Handshake {
            http,
            consumer,
            endpoints,
        }
    }

    /// Drives the handshake to completion and returns the access token.
    pub async fn run<V>(&self, verifier_source: &mut V) -> Result<AccessToken>
    where
        V: VerifierSource + ?Sized,
    {
        let mut state = State::NeedRequestToken;
        loop {
            state = match state {
                State::NeedRequestToken => State::AwaitingVerifier(self.request_token().await?),
                State::AwaitingVerifier(request_token) => {
                    let verifier = verifier_source
                        .verifier(&request_token.authorize_url)
                        .await?;
                    let verifier = verifier.trim();
                    if verifier.is_empty() {
                        return Err(HandshakeError::EmptyVerifier.into());
                    }
                    let verifier = verifier.to_string();
                    State::NeedAccessToken(request_token, verifier)
                }
                State::NeedAccessToken(request_token, verifier) => {
                    State::Done(self.access_token(&request_token, &verifier).await?)
                }
                State::Done(access_token) => return Ok(access_token),
            };
            debug!(state = state.name(), "handshake advanced");
        }
    }

    /// Obtains a request token for the out-of-band flow.
    pub async fn request_token(&self) -> Result<RequestToken> {
        info!(url = %self.endpoints.request_token, "requesting OAuth request token");
        let params = OAuthParameters::new().callback(OUT_OF_BAND_CALLBACK);
        let resp = self
            .http
            .clone()
            .oauth1_with_params(&self.consumer, params)
            .get(self.endpoints.request_token.clone())
            .send()
            .parse_oauth_token(HandshakeStage::RequestToken)
            .await?;

        let authorize_url = self.authorize_url(&resp.oauth_token);
        Ok(RequestToken {
            token: resp.oauth_token,
            secret: resp.oauth_token_secret,
            authorize_url,
        })
    }

    /// Exchanges an authorized request token and its verifier.
    pub async fn access_token(
        &self,
        request_token: &RequestToken,
        verifier: &str,
    ) -> Result<AccessToken> {
        info!(url = %self.endpoints.access_token, "exchanging verifier for access token");
        let secrets = self
            .consumer
            .clone()
            .token(request_token.token.as_str(), request_token.secret.as_str());
        let params = OAuthParameters::new().verifier(verifier);
        let resp = self
            .http
            .clone()
            .oauth1_with_params(&secrets, params)
            .get(self.endpoints.access_token.clone())
            .send()
            .parse_oauth_token(HandshakeStage::AccessToken)
            .await?;

        Ok(AccessToken {
            token: resp.oauth_token,
            secret: resp.oauth_token_secret,
        })
    }

    fn authorize_url(&self, token: &str) -> Url {
        let mut url = self.endpoints.authorize.clone();
        url.query_pairs_mut().append_pair(OAUTH_TOKEN_KEY, token);
        url
    }
}
