// ----------------------------------------------------------------------------
// This source code contains derived artifacts from seanmonstar's `reqwest`.
// for further information(including license information),
// please visit their repository: https://github.com/seanmonstar/reqwest .
// ----------------------------------------------------------------------------
use http::header::ACCEPT;
use reqwest::{Client as ReqwestClient, Method, Url};

use crate::{OAuthParameters, SecretsProvider, Signer, AXIOM_MEDIA_TYPE};

use super::request::RequestBuilder;

/// Turns a `reqwest::Client` into one whose requests carry an OAuth1
/// `Authorization` header.
pub trait OAuthClientProvider {
    fn oauth1<'a, T>(self, secrets: &'a T) -> Client<Signer<'a, T>>
    where
        Self: Sized,
        T: SecretsProvider,
    {
        self.oauth1_with_params(secrets, OAuthParameters::new())
    }

    fn oauth1_with_params<'a, TSecrets>(
        self,
        secrets: &'a TSecrets,
        params: OAuthParameters<'a>,
    ) -> Client<Signer<'a, TSecrets>>
    where
        Self: Sized,
        TSecrets: SecretsProvider;
}

#[derive(Debug)]
pub struct Client<TSigner> {
    inner: ReqwestClient,
    signer: TSigner,
}

impl OAuthClientProvider for ReqwestClient {
    fn oauth1_with_params<'a, TSecrets>(
        self,
        secrets: &'a TSecrets,
        parameters: OAuthParameters<'a>,
    ) -> Client<Signer<'a, TSecrets>>
    where
        Self: Sized,
        TSecrets: SecretsProvider,
    {
        Client {
            inner: self,
            signer: Signer::new(secrets, parameters),
        }
    }
}

impl<T> Client<T>
where
    T: Clone,
{
    /// A signed `GET` for `url`.
    pub fn get(&self, url: Url) -> RequestBuilder<T> {
        self.request(Method::GET, url)
    }

    /// A signed `POST` for `url`.
    pub fn post(&self, url: Url) -> RequestBuilder<T> {
        self.request(Method::POST, url)
    }

    /// Starts a signed request that already accepts the versioned platform
    /// media type.
    ///
    /// The url is taken parsed so that a request never leaves unsigned
    /// because of a url the signer could not read.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder<T> {
        let inner = self
            .inner
            .request(method.clone(), url.clone())
            .header(ACCEPT, AXIOM_MEDIA_TYPE);
        RequestBuilder::new(inner, method, url, self.signer.clone())
    }
}
