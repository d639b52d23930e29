//! OAuth 1.0a (HMAC-SHA1) request signing for user-context Twitter calls.
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use rand::RngCore;
use reqwest::header::HeaderValue;
use reqwest::{Method, Url};
use sha1::Sha1;
use std::fmt;
use tweetie_common::Credentials;
use tweetie_http::{HttpError, RequestSigner, percent_encode};

type HmacSha1 = Hmac<Sha1>;

pub struct OAuth1Signer {
    consumer_key: String,
    consumer_secret: String,
    access_token: String,
    access_token_secret: String,
}

impl fmt::Debug for OAuth1Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Signer")
            .field("consumer_key", &self.consumer_key)
            .finish_non_exhaustive()
    }
}

impl OAuth1Signer {
    pub fn new(creds: &Credentials) -> Self {
        Self {
            consumer_key: creds.consumer_key.clone(),
            consumer_secret: creds.consumer_secret.clone(),
            access_token: creds.access_token.clone(),
            access_token_secret: creds.access_token_secret.clone(),
        }
    }

    /// Build the `OAuth ...` header value for a fixed nonce and timestamp.
    pub fn header_with(
        &self,
        method: &Method,
        url: &Url,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> Result<String, HttpError> {
        let mut oauth_params = vec![
            ("oauth_consumer_key", self.consumer_key.clone()),
            ("oauth_nonce", nonce.to_string()),
            ("oauth_signature_method", "HMAC-SHA1".to_string()),
            ("oauth_timestamp", timestamp.to_string()),
            ("oauth_token", self.access_token.clone()),
            ("oauth_version", "1.0".to_string()),
        ];

        let mut all: Vec<(&str, &str)> = oauth_params
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        all.extend_from_slice(params);
        let signature = self.signature(method, url, &all)?;

        oauth_params.push(("oauth_signature", signature));
        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {header}"))
    }

    /// Base64 HMAC-SHA1 over the signature base string.
    ///
    /// `params` must contain every `oauth_*` parameter except the signature itself,
    /// plus all query/body parameters of the request.
    pub fn signature(
        &self,
        method: &Method,
        url: &Url,
        params: &[(&str, &str)],
    ) -> Result<String, HttpError> {
        let mut encoded: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .collect();
        encoded.sort();

        let param_string = encoded
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut base_url = url.clone();
        base_url.set_query(None);
        base_url.set_fragment(None);

        let base_string = format!(
            "{}&{}&{}",
            method.as_str().to_ascii_uppercase(),
            percent_encode(base_url.as_str()),
            percent_encode(&param_string)
        );
        let signing_key = format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(&self.access_token_secret)
        );

        let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
            .map_err(|e| HttpError::Build(format!("oauth signing key: {e}")))?;
        mac.update(base_string.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

impl RequestSigner for OAuth1Signer {
    fn authorization(
        &self,
        method: &Method,
        url: &Url,
        params: &[(&str, &str)],
    ) -> Result<HeaderValue, HttpError> {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| HttpError::Build(format!("clock before unix epoch: {e}")))?
            .as_secs()
            .to_string();
        let header = self.header_with(method, url, params, &generate_nonce(), &timestamp)?;
        HeaderValue::from_str(&header)
            .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))
    }
}

/// 32 lowercase hex characters from 16 random bytes.
fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
