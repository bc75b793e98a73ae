//! Signed access to the platform once an access token is known.

use std::borrow::Cow;

use futures_util::Stream;
use http::header::LOCATION;
use reqwest::{header::HeaderMap, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{pagination, Document, Error, OAuthClientProvider, Result, Secrets};

/// Raw outcome of one round trip. Non-2xx statuses are data, not errors.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// `Location` header, e.g. the uri of a freshly created resource.
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn document(&self) -> Result<Document> {
        Document::from_slice(self.body.as_bytes())
    }
}

#[derive(Debug, Clone)]
pub struct Gateway {
    http: reqwest::Client,
    platform_root: String,
    secrets: Option<Secrets<'static, Cow<'static, str>>>,
}

impl Gateway {
    /// `platform_root` is the absolute url every call path is appended to,
    /// e.g. `https://sandboxapi.deere.com/platform`.
    pub fn new(
        http: reqwest::Client,
        platform_root: impl Into<String>,
        secrets: Option<Secrets<'static, Cow<'static, str>>>,
    ) -> Self {
        let platform_root = platform_root.into();
        Gateway {
            http,
            platform_root: platform_root.trim_end_matches('/').to_string(),
            secrets,
        }
    }

    pub fn platform_root(&self) -> &str {
        &self.platform_root
    }

    pub fn is_authenticated(&self) -> bool {
        self.secrets.is_some()
    }

    /// Issues one signed request against `{platform_root}{path}`.
    ///
    /// Fails with [`Error::NotAuthenticated`] before touching the network
    /// when no access token is configured.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let secrets = self.secrets.as_ref().ok_or(Error::NotAuthenticated)?;
        let url = self.url_for(path)?;
        debug!(%method, %url, "platform call");

        let mut request = self
            .http
            .clone()
            .oauth1(secrets)
            .request(method, url);
        if let Some(body) = body {
            request = request.platform_json(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "platform response");

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.call(Method::GET, path, None).await
    }

    pub async fn post<B>(&self, path: &str, body: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.call(Method::POST, path, Some(&body)).await
    }

    /// GETs `path` and parses the body as a [`Document`].
    pub async fn get_document(&self, path: &str) -> Result<Document> {
        self.get(path).await?.document()
    }

    /// Walks a paged collection starting at `first_path`.
    pub fn pages<'s>(&'s self, first_path: &str) -> impl Stream<Item = Result<Document>> + 's {
        pagination::walk(&self.platform_root, first_path, move |path: String| async move {
            self.get_document(&path).await
        })
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{}", self.platform_root, path))?)
    }
}
