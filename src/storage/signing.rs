// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Temporary download links for locally stored blobs.
//!
//! A link carries its expiry and an HMAC-SHA256 over `"{key}\n{expires}"`:
//!
//! ```text
//! {base}/v1/media/images/cat.jpg?expires=1767225600&signature=Zm9v...
//! ```

use std::time::Duration;

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

use super::{StoreError, StoreResult};

type HmacSha256 = Hmac<Sha256>;

/// Route prefix the API serves signed media from.
pub const MEDIA_ROUTE: [&str; 2] = ["v1", "media"];

/// Issues and checks signed media links.
#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
    base_url: Url,
    ttl: Duration,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url.as_str())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl UrlSigner {
    pub fn new(secret: impl Into<Vec<u8>>, base_url: Url, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            base_url,
            ttl,
        }
    }

    fn mac(&self, key: &str, expires: i64) -> StoreResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| StoreError::InvalidSignature(format!("bad signing key: {e}")))?;
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }

    /// Build a link to `key` that stops working `ttl` after `now` (unix seconds).
    pub fn sign(&self, key: &str, now: i64) -> StoreResult<Url> {
        let expires = now.saturating_add(self.ttl.as_secs() as i64);
        let signature = Base64UrlUnpadded::encode_string(&self.mac(key, expires)?.finalize().into_bytes());

        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidPath("base URL cannot carry a path".to_string()))?;
            segments.pop_if_empty();
            segments.extend(MEDIA_ROUTE);
            segments.extend(key.split('/'));
        }
        url.query_pairs_mut()
            .append_pair("expires", &expires.to_string())
            .append_pair("signature", &signature);
        Ok(url)
    }

    /// Check a link's expiry and signature for `key` at `now` (unix seconds).
    pub fn verify(&self, key: &str, expires: i64, signature: &str, now: i64) -> StoreResult<()> {
        if now > expires {
            return Err(StoreError::InvalidSignature("link expired".to_string()));
        }
        let provided = Base64UrlUnpadded::decode_vec(signature)
            .map_err(|_| StoreError::InvalidSignature("malformed signature".to_string()))?;
        self.mac(key, expires)?
            .verify_slice(&provided)
            .map_err(|_| StoreError::InvalidSignature("signature mismatch".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_767_225_600;

    fn signer() -> UrlSigner {
        UrlSigner::new(
            b"test-secret".to_vec(),
            Url::parse("http://localhost:8080").unwrap(),
            Duration::from_secs(60),
        )
    }

    fn signature_of(url: &Url) -> String {
        url.query_pairs()
            .find(|(k, _)| k == "signature")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[test]
    fn signed_url_has_media_path_and_expiry() {
        let url = signer().sign("images/my cat.jpg", NOW).unwrap();
        assert_eq!(url.path(), "/v1/media/images/my%20cat.jpg");
        assert!(url
            .query_pairs()
            .any(|(k, v)| k == "expires" && v == (NOW + 60).to_string()));
    }

    #[test]
    fn valid_signature_verifies() {
        let signer = signer();
        let url = signer.sign("images/a.jpg", NOW).unwrap();
        signer
            .verify("images/a.jpg", NOW + 60, &signature_of(&url), NOW + 30)
            .unwrap();
    }

    #[test]
    fn expired_link_is_rejected() {
        let signer = signer();
        let url = signer.sign("images/a.jpg", NOW).unwrap();
        let result = signer.verify("images/a.jpg", NOW + 60, &signature_of(&url), NOW + 61);
        assert!(matches!(result, Err(StoreError::InvalidSignature(_))));
    }

    #[test]
    fn signature_is_bound_to_key_and_expiry() {
        let signer = signer();
        let sig = signature_of(&signer.sign("images/a.jpg", NOW).unwrap());
        assert!(signer.verify("images/b.jpg", NOW + 60, &sig, NOW).is_err());
        assert!(signer.verify("images/a.jpg", NOW + 600, &sig, NOW).is_err());
        assert!(signer.verify("images/a.jpg", NOW + 60, "not base64!", NOW).is_err());
    }

    #[test]
    fn base_url_path_is_preserved() {
        let signer = UrlSigner::new(
            b"k".to_vec(),
            Url::parse("https://furballs.example/api/").unwrap(),
            Duration::from_secs(5),
        );
        let url = signer.sign("images/a.jpg", NOW).unwrap();
        assert_eq!(url.path(), "/api/v1/media/images/a.jpg");
    }
}
