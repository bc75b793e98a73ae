use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error : {0}")]
    Config(#[from] ConfigError),
    #[error("catalog discovery failed : {0}")]
    Discovery(#[from] DiscoveryError),
    #[error("OAuth handshake failed : {0}")]
    Handshake(#[from] HandshakeError),
    #[error("catalog does not provide the {0} relation")]
    MissingRelation(&'static str),
    #[error("no access token configured, run the authorization handshake first")]
    NotAuthenticated,
    #[error("link {0} does not point into the platform root")]
    ForeignLink(String),
    #[error("request failed : {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid url : {0}")]
    Url(#[from] url::ParseError),
    #[error("malformed JSON document : {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O failed : {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Ensure that {0} is set in your .env file")]
    Missing(&'static str),
    #[error("{name} has an invalid value : {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("catalog request returned status {status} : {body}")]
    Status { status: u16, body: String },
    #[error("catalog body is not a JSON document : {0}")]
    Unparseable(#[source] serde_json::Error),
    #[error("catalog document has no link collection")]
    MissingLinks,
}

/// Step of the three-legged flow an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStage {
    RequestToken,
    Verifier,
    AccessToken,
}

impl fmt::Display for HandshakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HandshakeStage::RequestToken => "request token",
            HandshakeStage::Verifier => "verifier",
            HandshakeStage::AccessToken => "access token",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("catalog does not provide the {0} relation")]
    MissingEndpoint(&'static str),
    #[error("catalog relation {rel} is not a valid url : {uri}")]
    InvalidEndpoint { rel: &'static str, uri: String },
    #[error("{stage} request was rejected with status {status} : {body}")]
    Rejected {
        stage: HandshakeStage,
        status: u16,
        body: String,
    },
    #[error("response has malformed format: not found {0} in {1}")]
    TokenKeyNotFound(&'static str, String),
    #[error("no verifier code was entered")]
    EmptyVerifier,
}
