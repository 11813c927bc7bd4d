//! OAuth 1.0a request signing (HMAC-SHA1) for the Bynder API

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use config::Credentials;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use url::Url;

use crate::error::{BynderError, Result};

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const VERSION: &str = "1.0";

/// Signs requests with a consumer/token credential pair
#[derive(Clone, Debug)]
pub struct OAuthSigner {
    credentials: Credentials,
}

impl OAuthSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Build the `Authorization` header for a request.
    ///
    /// `form` holds url-encoded body parameters, which take part in the
    /// signature just like query parameters.
    pub fn authorization_header(&self, method: &str, url: &Url, form: &[(&str, &str)]) -> Result<String> {
        let nonce = hex::encode(rand::random::<[u8; 16]>());
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.sign(method, url, form, &nonce, &timestamp)
    }

    fn sign(
        &self,
        method: &str,
        url: &Url,
        form: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> Result<String> {
        let oauth_params: Vec<(&str, &str)> = vec![
            ("oauth_consumer_key", self.credentials.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.credentials.token.as_str()),
            ("oauth_version", VERSION),
        ];

        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (encode(&k), encode(&v)))
            .chain(form.iter().map(|(k, v)| (encode(k), encode(v))))
            .chain(oauth_params.iter().map(|(k, v)| (encode(k), encode(v))))
            .collect();
        params.sort();

        let normalized = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_ascii_uppercase(),
            encode(&base_url(url)),
            encode(&normalized)
        );
        let key = format!(
            "{}&{}",
            encode(&self.credentials.consumer_secret),
            encode(&self.credentials.token_secret)
        );

        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| BynderError::RemoteUnavailable(format!("Invalid signing key: {}", e)))?;
        mac.update(base_string.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        let header = oauth_params
            .iter()
            .map(|(k, v)| (*k, *v))
            .chain(std::iter::once(("oauth_signature", signature.as_str())))
            .map(|(k, v)| format!("{}=\"{}\"", k, encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {}", header))
    }
}

/// RFC 3986 percent encoding, as required by the signature base string
fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Scheme, host, non-default port, and path; no query or fragment
fn base_url(url: &Url) -> String {
    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);
    base.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twitter_signer() -> OAuthSigner {
        OAuthSigner::new(Credentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".to_string(),
            token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string(),
            token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".to_string(),
        })
    }

    #[test]
    fn test_known_signature() {
        let url = Url::parse("https://api.twitter.com/1.1/statuses/update.json?include_entities=true").unwrap();
        let header = twitter_signer()
            .sign(
                "POST",
                &url,
                &[("status", "Hello Ladies + Gentlemen, a signed OAuth request!")],
                "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
                "1318622958",
            )
            .unwrap();

        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
    }

    #[test]
    fn test_signature_is_deterministic_for_fixed_nonce() {
        let signer = twitter_signer();
        let url = Url::parse("https://example.getbynder.com/api/v4/media/abc/").unwrap();
        let a = signer.sign("GET", &url, &[], "nonce", "1").unwrap();
        let b = signer.sign("get", &url, &[], "nonce", "1").unwrap();
        let c = signer.sign("GET", &url, &[], "other", "1").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fresh_nonce_per_request() {
        let signer = twitter_signer();
        let url = Url::parse("https://example.getbynder.com/api/v4/currentUser/").unwrap();
        let a = signer.authorization_header("GET", &url, &[]).unwrap();
        let b = signer.authorization_header("GET", &url, &[]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_base_url_drops_query() {
        let url = Url::parse("https://example.getbynder.com/api/media/usage/?asset_id=1&uri=x").unwrap();
        assert_eq!(base_url(&url), "https://example.getbynder.com/api/media/usage/");
    }
}
