//! Provider request signing.
//!
//! Every request sent to the telephony provider carries an
//! `Authorization: {key}:{signature}` header. The signature is derived as:
//!
//! 1. Sort the parameters by raw key bytes.
//! 2. Form-encode them (`application/x-www-form-urlencoded`), empty map -> `""`.
//! 3. MD5 the encoded string, lowercase hex. This is a checksum the provider's
//!    verifier expects, not a security control. Computed even for `""`.
//! 4. Concatenate `METHOD + path + encoded + md5hex + key_id`.
//! 5. HMAC-SHA1 the result with the secret, standard base64 with padding.
//!
//! Earlier revisions of this client disagreed on the MD5 term, the parameter
//! ordering and the method casing. The variant above is pinned by the
//! `test_known_vector_balance` test; any change must be checked against the
//! provider documentation first.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;
use tracing::debug;
use url::form_urlencoded;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha1 = Hmac<Sha1>;

/// Caller-supplied request parameters. Insertion order carries no meaning.
pub type Params = HashMap<String, String>;

/// Provider API credentials.
///
/// The secret is only ever used as HMAC key material and is wiped from memory
/// when the value is dropped.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    key_id: String,
    secret: String,
}

impl Credentials {
    pub fn new(key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: secret.into(),
        }
    }

    /// The public key identifier sent in the `Authorization` header
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Key identifier safe for diagnostics: first four characters only
    pub fn masked_key_id(&self) -> String {
        let prefix: String = self.key_id.chars().take(4).collect();
        format!("{prefix}***")
    }

    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }

    fn secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key_id", &self.masked_key_id())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Sort parameters by raw key bytes.
///
/// `String`'s `Ord` is a plain byte comparison, so this is locale independent.
pub fn canonicalize(params: &Params) -> BTreeMap<String, String> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Form-encode an already canonical parameter map.
pub fn encode_canonical(params: &BTreeMap<String, String>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish()
}

/// Canonical form encoding of an unordered parameter map.
pub fn canonical_encoding(params: &Params) -> String {
    encode_canonical(&canonicalize(params))
}

fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

/// Build the exact string that gets HMAC'd.
pub(crate) fn signing_input(method: &str, path: &str, encoded: &str, key_id: &str) -> String {
    let digest = md5_hex(encoded);
    let mut input = String::with_capacity(
        method.len() + path.len() + encoded.len() + digest.len() + key_id.len(),
    );
    input.push_str(&method.to_ascii_uppercase());
    input.push_str(path);
    input.push_str(encoded);
    input.push_str(&digest);
    input.push_str(key_id);
    input
}

fn sign_encoded(method: &str, path: &str, encoded: &str, credentials: &Credentials) -> String {
    let input = signing_input(method, path, encoded, credentials.key_id());

    let mut mac =
        HmacSha1::new_from_slice(credentials.secret()).expect("HMAC accepts any key size");
    mac.update(input.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Compute the provider signature for a request.
///
/// Total over every input: there is no error path.
pub fn sign(method: &str, path: &str, params: &Params, credentials: &Credentials) -> String {
    let encoded = canonical_encoding(params);
    debug!(
        method = %method.to_ascii_uppercase(),
        path = %path,
        param_count = params.len(),
        "Signing provider request"
    );
    sign_encoded(method, path, &encoded, credentials)
}

/// A request that has been canonicalized and signed.
///
/// Built once per call attempt and never mutated afterwards.
#[derive(Clone)]
pub struct SignedRequest {
    method: String,
    path: String,
    params: BTreeMap<String, String>,
    encoded_params: String,
    signature: String,
    authorization: String,
}

impl SignedRequest {
    pub fn new(method: &str, path: &str, params: &Params, credentials: &Credentials) -> Self {
        let canonical = canonicalize(params);
        let encoded_params = encode_canonical(&canonical);
        let signature = sign_encoded(method, path, &encoded_params, credentials);
        let authorization = format!("{}:{}", credentials.key_id(), signature);

        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            params: canonical,
            encoded_params,
            signature,
            authorization,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn encoded_params(&self) -> &str {
        &self.encoded_params
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Value for the `Authorization` header: `key:signature`
    pub fn authorization(&self) -> &str {
        &self.authorization
    }
}

impl fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("params", &self.params.keys().collect::<Vec<_>>())
            .field("signature", &"[REDACTED]")
            .finish()
    }
}
