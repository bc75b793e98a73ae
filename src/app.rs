//! Wires the configuration into the discovery, handshake and gateway
//! components and owns everything printed for the operator.

use std::io::Write;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use url::Url;

use crate::{
    catalog, platform_path, AccessToken, ApiResponse, Catalog, Config, Document, Endpoints,
    Error, Gateway, Handshake, Result, VerifierSource, CURRENT_USER_REL, FILES_REL,
    OAUTH_SECRET_VAR, OAUTH_TOKEN_VAR,
};

/// Reads the verifier the user pastes on stdin.
#[derive(Debug, Default)]
pub struct StdinVerifier;

#[async_trait(?Send)]
impl VerifierSource for StdinVerifier {
    async fn verifier(&mut self, _authorize_url: &Url) -> Result<String> {
        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;
        Ok(line.trim().to_string())
    }
}

pub struct App {
    config: Config,
    http: reqwest::Client,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("axiom-oauth1/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(App { config, http })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn has_access_token(&self) -> bool {
        self.config.access_token.is_some()
    }

    /// Gateway signing with the stored access token, or an unauthenticated
    /// one whose calls all fail with [`Error::NotAuthenticated`].
    pub fn gateway(&self) -> Gateway {
        Gateway::new(
            self.http.clone(),
            self.config.platform_root(),
            self.config.access_secrets().map(|s| s.into_owned()),
        )
    }

    /// Catalog fetched with the stored access token when there is one,
    /// with the consumer credentials only otherwise.
    pub async fn catalog(&self) -> Result<Catalog> {
        let root = self.config.platform_root();
        match self.config.access_secrets() {
            Some(secrets) => catalog::fetch_catalog(&self.http, &root, &secrets).await,
            None => catalog::fetch_catalog(&self.http, &root, &self.config.consumer()).await,
        }
    }

    /// Runs the full three-legged handshake and prints the lines to paste
    /// into the `.env` file.
    pub async fn authorize<V, W>(&self, verifier: &mut V, out: &mut W) -> Result<AccessToken>
    where
        V: VerifierSource + ?Sized,
        W: Write,
    {
        let consumer = self.config.consumer();
        let catalog =
            catalog::fetch_catalog(&self.http, &self.config.platform_root(), &consumer).await?;
        let endpoints = Endpoints::from_catalog(&catalog)?;

        let access_token = Handshake::new(self.http.clone(), consumer, endpoints)
            .run(&mut Prompt {
                inner: verifier,
                out: &mut *out,
            })
            .await?;
        info!("access token acquired");

        writeln!(out)?;
        writeln!(out, "Paste this into your .env file:")?;
        writeln!(out, "{}={}", OAUTH_SECRET_VAR, access_token.secret)?;
        writeln!(out, "{}={}", OAUTH_TOKEN_VAR, access_token.token)?;
        Ok(access_token)
    }

    /// Follows the catalog's `currentUser` link.
    pub async fn current_user(&self) -> Result<ApiResponse> {
        let uri = self
            .catalog()
            .await?
            .current_user_uri
            .ok_or(Error::MissingRelation(CURRENT_USER_REL))?;
        let gateway = self.gateway();
        let path = platform_path(gateway.platform_root(), &uri)?;
        gateway.get(&path).await
    }

    /// Path of the collection behind the catalog's `files` link.
    pub async fn files_path(&self) -> Result<String> {
        let uri = self
            .catalog()
            .await?
            .files_uri
            .ok_or(Error::MissingRelation(FILES_REL))?;
        platform_path(&self.config.platform_root(), &uri)
    }
}

/// Shows the authorize url before handing over to the actual source.
struct Prompt<'a, V: ?Sized, W> {
    inner: &'a mut V,
    out: &'a mut W,
}

#[async_trait(?Send)]
impl<'a, V, W> VerifierSource for Prompt<'a, V, W>
where
    V: VerifierSource + ?Sized,
    W: Write,
{
    async fn verifier(&mut self, authorize_url: &Url) -> Result<String> {
        writeln!(
            self.out,
            "Visit this link in your browser and paste the 6 digit code here:"
        )?;
        writeln!(self.out, "{}", authorize_url)?;
        self.out.flush()?;
        self.inner.verifier(authorize_url).await
    }
}

/// Writes every page to `out` as it arrives and returns them all.
pub async fn collect_printing<S, W>(pages: S, out: &mut W) -> Result<Vec<Document>>
where
    S: Stream<Item = Result<Document>>,
    W: Write,
{
    futures_util::pin_mut!(pages);
    let mut collected = Vec::new();
    while let Some(page) = pages.next().await {
        let page = page?;
        writeln!(out, "{}", serde_json::to_string_pretty(&page)?)?;
        writeln!(out)?;
        collected.push(page);
    }
    Ok(collected)
}
