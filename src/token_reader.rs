use std::{collections::HashMap, future::Future};

use async_trait::async_trait;
use reqwest::Response;

use crate::{Error, HandshakeError, HandshakeStage, Result, OAUTH_TOKEN_KEY};

const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";

/// Represents response of token acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: String,
    /// Other contents, e.g. `oauth_callback_confirmed`
    pub remain: HashMap<String, String>,
}

/// Add parse_oauth_token feature to reqwest::Response.
// this trait is sealed
#[async_trait(?Send)]
pub trait TokenReader: private::Sealed {
    /// Reads a form-encoded token pair, failing on non-2xx responses.
    async fn parse_oauth_token(self, stage: HandshakeStage) -> Result<TokenResponse>;
}

#[async_trait(?Send)]
impl TokenReader for Response {
    async fn parse_oauth_token(self, stage: HandshakeStage) -> Result<TokenResponse> {
        let status = self.status();
        let text = self.text().await?;
        if !status.is_success() {
            return Err(HandshakeError::Rejected {
                stage,
                status: status.as_u16(),
                body: text,
            }
            .into());
        }
        Ok(read_oauth_token(text)?)
    }
}

/// Add parse_oauth_token feature to Future of reqwest::Response.
// this trait is also sealed
#[async_trait(?Send)]
pub trait TokenReaderFuture: private::SealedWrapper {
    async fn parse_oauth_token(self, stage: HandshakeStage) -> Result<TokenResponse>;
}

#[async_trait(?Send)]
impl<T, E> TokenReaderFuture for T
where
    T: Future<Output = std::result::Result<Response, E>>,
    E: Into<Error> + 'static,
{
    async fn parse_oauth_token(self, stage: HandshakeStage) -> Result<TokenResponse> {
        match self.await {
            Ok(resp) => resp.parse_oauth_token(stage).await,
            Err(err) => Err(err.into()),
        }
    }
}

fn read_oauth_token(text: String) -> std::result::Result<TokenResponse, HandshakeError> {
    let mut destructured: HashMap<String, String> =
        match serde_urlencoded::from_str(text.trim()) {
            Ok(pairs) => pairs,
            Err(_) => return Err(HandshakeError::TokenKeyNotFound(OAUTH_TOKEN_KEY, text)),
        };
    let oauth_token = destructured.remove(OAUTH_TOKEN_KEY);
    let oauth_token_secret = destructured.remove(OAUTH_TOKEN_SECRET_KEY);
    match (oauth_token, oauth_token_secret) {
        (Some(t), Some(s)) => Ok(TokenResponse {
            oauth_token: t,
            oauth_token_secret: s,
            remain: destructured,
        }),
        (None, _) => Err(HandshakeError::TokenKeyNotFound(OAUTH_TOKEN_KEY, text)),
        (_, _) => Err(HandshakeError::TokenKeyNotFound(
            OAUTH_TOKEN_SECRET_KEY,
            text,
        )),
    }
}

mod private {
    use std::future::Future;

    use reqwest::Response;

    use crate::Error;

    pub trait Sealed {}
    impl Sealed for Response {}
    pub trait SealedWrapper {}
    impl<T, E> SealedWrapper for T
    where
        T: Future<Output = Result<Response, E>>,
        E: Into<Error>,
    {
    }
}
