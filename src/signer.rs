use std::borrow::Cow;

use http::Method;
use oauth1_request::signer::Signer as OAuthSigner;
use oauth1_request::{HmacSha1, Options};
use url::Url;

use crate::{SecretsProvider, OAUTH_KEY_PREFIX, REALM_KEY};

/// Produces the `Authorization` header value for one request.
#[derive(Debug)]
pub struct Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    secrets: &'a TSecretsProvider,
    parameters: OAuthParameters<'a>,
}

impl<TSecretsProvider> Clone for Signer<'_, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    fn clone(&self) -> Self {
        Signer {
            secrets: self.secrets,
            parameters: self.parameters.clone(),
        }
    }
}

impl<'a, TSecretsProvider> Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    pub fn new(secrets: &'a TSecretsProvider, parameters: OAuthParameters<'a>) -> Self {
        Signer {
            secrets,
            parameters,
        }
    }

    /// Signs `method url` with HMAC-SHA1.
    ///
    /// Query parameters of `url` take part in the base string; `oauth_*`
    /// keys found in the query are ignored since they come from the
    /// [`OAuthParameters`] instead. Request bodies are never signed, the
    /// platform only accepts JSON bodies.
    pub fn generate_signature(self, method: &Method, url: &Url) -> String {
        let (consumer_key, consumer_secret) = self.secrets.get_consumer_key_pair();
        let (token, token_secret) = self.secrets.get_token_option_pair();
        let options = self.parameters.build_options(token);

        let mut bare_url = url.clone();
        bare_url.set_query(None);
        bare_url.set_fragment(None);

        // the oauth_* block has to be spliced in at its sorted position
        let mut sorted_query: Vec<(Cow<str>, Cow<str>)> = url
            .query_pairs()
            .chain(std::iter::once((Cow::from(OAUTH_KEY_PREFIX), Cow::from(""))))
            .collect();
        sorted_query.sort();

        let mut divided = sorted_query.splitn(2, |(k, _)| k == &OAUTH_KEY_PREFIX);
        let query_before_oauth = divided.next().unwrap_or_default();
        let query_after_oauth = divided.next().unwrap_or_default();

        let mut signer = OAuthSigner::with_signature_method(
            HmacSha1,
            method.as_str(),
            bare_url,
            consumer_secret,
            token_secret,
        );
        for (key, value) in query_before_oauth {
            if !key.starts_with(OAUTH_KEY_PREFIX) {
                signer.parameter(key, value);
            }
        }
        let mut signer = signer.oauth_parameters(consumer_key, &options);
        for (key, value) in query_after_oauth {
            if !key.starts_with(OAUTH_KEY_PREFIX) {
                signer.parameter(key, value);
            }
        }

        let sign = signer.finish().authorization;

        match self.parameters.realm {
            // OAuth oauth_...,realm="realm"
            Some(realm) => format!("{},{}=\"{}\"", sign, REALM_KEY, realm.as_ref()),
            None => sign,
        }
    }
}

/// Per-request `oauth_*` values.
///
/// Unset nonce and timestamp are generated fresh for every signature, so
/// only tests pin them.
#[derive(Debug, Clone, Default)]
pub struct OAuthParameters<'a> {
    callback: Option<Cow<'a, str>>,
    nonce: Option<Cow<'a, str>>,
    realm: Option<Cow<'a, str>>,
    timestamp: Option<u64>,
    verifier: Option<Cow<'a, str>>,
}

impl<'a> OAuthParameters<'a> {
    pub fn new() -> Self {
        Default::default()
    }

    /// set the oauth_callback value, `oob` for the out-of-band flow
    pub fn callback<T>(self, callback: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            callback: Some(callback.into()),
            ..self
        }
    }

    /// set the oauth_nonce value
    pub fn nonce<T>(self, nonce: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// set the realm value, appended to the header but never signed
    pub fn realm<T>(self, realm: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            realm: Some(realm.into()),
            ..self
        }
    }

    /// set the oauth_timestamp value
    pub fn timestamp<T>(self, timestamp: T) -> Self
    where
        T: Into<u64>,
    {
        OAuthParameters {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    /// set the oauth_verifier value
    pub fn verifier<T>(self, verifier: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            verifier: Some(verifier.into()),
            ..self
        }
    }

    fn build_options(&'a self, token: Option<&'a str>) -> Options<'a> {
        let mut opt = Options::new();

        // NOTE: items must be added by alphabetical order
        if let Some(ref callback) = self.callback {
            opt.callback(callback.as_ref());
        }
        if let Some(ref nonce) = self.nonce {
            opt.nonce(nonce.as_ref());
        }
        if let Some(timestamp) = self.timestamp {
            opt.timestamp(timestamp);
        }
        if let Some(token) = token {
            opt.token(token);
        }
        if let Some(ref verifier) = self.verifier {
            opt.verifier(verifier.as_ref());
        }

        opt
    }
}
