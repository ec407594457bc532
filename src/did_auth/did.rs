//! Decentralized Identifier parsing and key extraction.
//!
//! Supported methods are self-certifying: the method-specific id of
//! `did:<method>:<id>` is the hex-encoded 32-byte Ed25519 public key, so no
//! registry lookup is needed to authenticate the holder.

use std::fmt;
use std::str::FromStr;

use super::error::VerifyError;

/// Length of a raw Ed25519 public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// A syntactically valid `did:<method>:<id>` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Did {
    method: String,
    id: String,
}

impl Did {
    /// DID method tag (`prism` in `did:prism:...`).
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Method-specific identifier.
    pub fn method_specific_id(&self) -> &str {
        &self.id
    }

    /// Build the self-certifying DID for an Ed25519 public key.
    pub fn from_public_key(method: &str, public_key: &[u8; PUBLIC_KEY_LEN]) -> Self {
        Self {
            method: method.to_string(),
            id: hex::encode(public_key),
        }
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "did:{}:{}", self.method, self.id)
    }
}

impl FromStr for Did {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(VerifyError::MalformedDid(format!(
                "expected 3 segments, got {}",
                parts.len()
            )));
        }
        if parts[0] != "did" {
            return Err(VerifyError::MalformedDid("must start with 'did'".into()));
        }
        if parts[1].is_empty() || parts[2].is_empty() {
            return Err(VerifyError::MalformedDid(
                "method and identifier must be non-empty".into(),
            ));
        }

        Ok(Self {
            method: parts[1].to_string(),
            id: parts[2].to_string(),
        })
    }
}

/// Resolves a DID string to the Ed25519 public key that controls it.
///
/// Methods that need network resolution would implement this trait; the
/// verifier only ever sees the resulting key bytes.
pub trait KeyResolver: Send + Sync {
    fn resolve(&self, did: &str) -> Result<[u8; PUBLIC_KEY_LEN], VerifyError>;
}

/// Resolver for DID methods that embed the hex public key in the identifier.
#[derive(Debug, Clone)]
pub struct SelfCertifyingResolver {
    methods: Vec<String>,
}

impl SelfCertifyingResolver {
    /// Accept the given method tags.
    pub fn new<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: methods.into_iter().map(Into::into).collect(),
        }
    }

    /// Recognized method tags.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Split the DID and decode the hex key material of the third segment.
    pub fn extract_public_key(&self, did: &str) -> Result<[u8; PUBLIC_KEY_LEN], VerifyError> {
        let did: Did = did.parse()?;
        if !self.methods.iter().any(|m| m == did.method()) {
            return Err(VerifyError::MalformedDid(format!(
                "unrecognized DID method '{}'",
                did.method()
            )));
        }

        let key_hex = did.method_specific_id();
        if key_hex.len() != PUBLIC_KEY_LEN * 2 {
            return Err(VerifyError::InvalidKeyEncoding(format!(
                "expected {} hex chars, got {}",
                PUBLIC_KEY_LEN * 2,
                key_hex.len()
            )));
        }

        let mut key = [0u8; PUBLIC_KEY_LEN];
        hex::decode_to_slice(key_hex, &mut key)
            .map_err(|e| VerifyError::InvalidKeyEncoding(e.to_string()))?;
        Ok(key)
    }
}

impl Default for SelfCertifyingResolver {
    fn default() -> Self {
        Self::new(["prism"])
    }
}

impl KeyResolver for SelfCertifyingResolver {
    fn resolve(&self, did: &str) -> Result<[u8; PUBLIC_KEY_LEN], VerifyError> {
        self.extract_public_key(did)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    #[test]
    fn test_parse_valid_did() {
        let did: Did = format!("did:prism:{}", KEY_HEX).parse().unwrap();
        assert_eq!(did.method(), "prism");
        assert_eq!(did.method_specific_id(), KEY_HEX);
        assert_eq!(did.to_string(), format!("did:prism:{}", KEY_HEX));
    }

    #[test]
    fn test_parse_wrong_segment_count() {
        assert!(matches!(
            "did:prism".parse::<Did>(),
            Err(VerifyError::MalformedDid(_))
        ));
        assert!(matches!(
            "did:prism:abc:def".parse::<Did>(),
            Err(VerifyError::MalformedDid(_))
        ));
    }

    #[test]
    fn test_parse_wrong_scheme() {
        assert!(matches!(
            "dod:prism:abc".parse::<Did>(),
            Err(VerifyError::MalformedDid(_))
        ));
    }

    #[test]
    fn test_parse_empty_segments() {
        assert!("did::abc".parse::<Did>().is_err());
        assert!("did:prism:".parse::<Did>().is_err());
    }

    #[test]
    fn test_extract_public_key() {
        let resolver = SelfCertifyingResolver::default();
        let key = resolver
            .extract_public_key(&format!("did:prism:{}", KEY_HEX))
            .unwrap();
        assert_eq!(hex::encode(key), KEY_HEX);
    }

    #[test]
    fn test_extract_rejects_unknown_method() {
        let resolver = SelfCertifyingResolver::default();
        let err = resolver
            .extract_public_key(&format!("did:web:{}", KEY_HEX))
            .unwrap_err();
        assert!(matches!(err, VerifyError::MalformedDid(_)));
    }

    #[test]
    fn test_extract_rejects_short_key() {
        let resolver = SelfCertifyingResolver::default();
        let err = resolver.extract_public_key("did:prism:abcd").unwrap_err();
        assert!(matches!(err, VerifyError::InvalidKeyEncoding(_)));
    }

    #[test]
    fn test_extract_rejects_long_key() {
        let resolver = SelfCertifyingResolver::default();
        let did = format!("did:prism:{}00", KEY_HEX);
        assert!(matches!(
            resolver.extract_public_key(&did),
            Err(VerifyError::InvalidKeyEncoding(_))
        ));
    }

    #[test]
    fn test_extract_rejects_non_hex() {
        let resolver = SelfCertifyingResolver::default();
        let did = format!("did:prism:{}", "zz".repeat(32));
        assert!(matches!(
            resolver.extract_public_key(&did),
            Err(VerifyError::InvalidKeyEncoding(_))
        ));
    }

    #[test]
    fn test_extract_rejects_multibyte_segment() {
        // 64 bytes of UTF-8 but not 64 ASCII hex digits
        let resolver = SelfCertifyingResolver::default();
        let did = format!("did:prism:{}", "é".repeat(32));
        assert!(resolver.extract_public_key(&did).is_err());
    }

    #[test]
    fn test_from_public_key_round_trip() {
        let key = [7u8; PUBLIC_KEY_LEN];
        let did = Did::from_public_key("prism", &key);
        let resolver = SelfCertifyingResolver::default();
        assert_eq!(resolver.resolve(&did.to_string()).unwrap(), key);
    }
}
