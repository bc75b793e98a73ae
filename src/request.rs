// ----------------------------------------------------------------------------
// This source code contains derived artifacts from seanmonstar's `reqwest`.
// for further information(including license information),
// please visit their repository: https://github.com/seanmonstar/reqwest .
// ----------------------------------------------------------------------------
use std::{convert::TryFrom, future::Future};

use http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use reqwest::{
    header::HeaderName, header::HeaderValue, Body, Error, RequestBuilder as ReqwestRequestBuilder,
    Response, Url,
};

use crate::{SecretsProvider, Signer, AXIOM_MEDIA_TYPE};

pub struct RequestBuilder<TSigner>
where
    TSigner: Clone,
{
    method: Method,
    inner: ReqwestRequestBuilder,
    signer: TSigner,
    url: Url,
}

impl<'a, TSecretsProvider> RequestBuilder<Signer<'a, TSecretsProvider>>
where
    TSecretsProvider: SecretsProvider,
{
    /// Constructs the Request and sends it to the target URL, returning a
    /// future Response.
    ///
    /// # Errors
    ///
    /// This method fails if there was an error while sending request,
    /// redirect loop was detected or redirect limit was exhausted.
    pub fn send(self) -> impl Future<Output = Result<Response, Error>> {
        self.generate_signature().send()
    }

    /// Generate an OAuth signature and return the reqwest's `RequestBuilder`.
    pub fn generate_signature(self) -> ReqwestRequestBuilder {
        let signature = self.signer.generate_signature(&self.method, &self.url);
        self.inner.header(AUTHORIZATION, signature)
    }
}

impl<TSigner> RequestBuilder<TSigner>
where
    TSigner: Clone,
{
    pub(crate) fn new(
        builder: ReqwestRequestBuilder,
        method: Method,
        url: Url,
        signer: TSigner,
    ) -> Self {
        RequestBuilder {
            inner: builder,
            method,
            url,
            signer,
        }
    }

    fn pass_through<F>(self, f: F) -> Self
    where
        F: FnOnce(ReqwestRequestBuilder) -> ReqwestRequestBuilder,
    {
        RequestBuilder {
            inner: f(self.inner),
            ..self
        }
    }

    /// Add a `Header` to this Request.
    pub fn header<K, V>(self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.pass_through(|b| b.header(key, value))
    }

    /// Set the request body.
    ///
    /// The body is sent as is and does not take part in the signature.
    pub fn body<T: Into<Body>>(self, body: T) -> Self {
        self.pass_through(|b| b.body(body))
    }

    /// Set a JSON body labelled with the versioned platform media type.
    pub fn platform_json(self, body: Vec<u8>) -> Self {
        self.header(CONTENT_TYPE, AXIOM_MEDIA_TYPE).body(body)
    }
}
