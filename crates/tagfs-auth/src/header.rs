//! `Authorization: Signature ...` header parsing.

use crate::credential::ALGORITHM;
use crate::errors::{AuthError, Result};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use ed25519_dalek::Signature;
use std::collections::HashMap;
use std::str::FromStr;

const PREFIX: &str = "Signature ";

/// Label older clients put in `algorithm`; the key type decides the scheme.
const LEGACY_ALGORITHM: &str = "hs2019";

/// Signed pseudo-headers assumed when `headers` is omitted.
const DEFAULT_HEADERS: &str = "(created)";

/// Standard alphabet, accepting both padded and unpadded input.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Parsed header parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeader {
    /// Identity id from `keyId`
    pub key_id: u64,
    /// Value of `algorithm`, if present
    pub algorithm: Option<String>,
    /// Space-separated pseudo-headers the signature covers, in order
    pub headers: String,
    /// Base64 signature as sent
    pub signature: String,
    /// `created` unix seconds, if present
    pub created: Option<u64>,
    /// `expires` unix seconds, if present
    pub expires: Option<u64>,
}

impl AuthHeader {
    /// Rebuild the string the client signed, in the order `headers` lists.
    pub fn signing_string(&self) -> Result<String> {
        let mut lines = Vec::new();
        for name in self.headers.split_ascii_whitespace() {
            let value = match name {
                "(created)" => self
                    .created
                    .ok_or_else(|| AuthError::malformed_header("(created) argument is not set"))?,
                "(expires)" => self
                    .expires
                    .ok_or_else(|| AuthError::malformed_header("(expires) argument is not set"))?,
                "(key-id)" => self.key_id,
                other => {
                    return Err(AuthError::malformed_header(format!(
                        "unknown signature string argument '{other}'"
                    )))
                }
            };
            lines.push(format!("{name}: {value}"));
        }

        if lines.is_empty() {
            return Err(AuthError::malformed_header("headers can not be empty"));
        }
        Ok(lines.join("\n"))
    }

    /// True when `name` is among the signed pseudo-headers.
    pub fn signs(&self, name: &str) -> bool {
        self.headers.split_ascii_whitespace().any(|h| h == name)
    }

    /// Check the `algorithm` parameter names a scheme we verify.
    pub fn check_algorithm(&self) -> Result<()> {
        match self.algorithm.as_deref() {
            None | Some(ALGORITHM) | Some(LEGACY_ALGORITHM) => Ok(()),
            Some(other) => Err(AuthError::UnsupportedAlgorithm {
                algorithm: other.to_string(),
            }),
        }
    }

    /// Decode the signature parameter.
    pub fn decode_signature(&self) -> Result<Signature> {
        let bytes = LENIENT_BASE64.decode(self.signature.trim()).map_err(|e| {
            AuthError::malformed_header(format!(
                "invalid signature format expecting base64: {e}"
            ))
        })?;
        Signature::from_slice(&bytes)
            .map_err(|e| AuthError::invalid_signature(format!("invalid signature bytes: {e}")))
    }
}

/// Split `key="value",key="value"` into a map. Whitespace around keys and
/// separators is ignored; values are taken verbatim.
fn parse_params(input: &str) -> Result<HashMap<String, String>> {
    let mut params = HashMap::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        let (key, after_key) = rest
            .split_once('=')
            .ok_or_else(|| AuthError::malformed_header("expected key=\"value\""))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(AuthError::malformed_header("empty parameter name"));
        }

        let quoted = after_key
            .strip_prefix('"')
            .ok_or_else(|| AuthError::malformed_header("invalid value not starting with '\"'"))?;
        let (value, after_value) = quoted.split_once('"').ok_or_else(|| {
            AuthError::malformed_header(format!("unterminated value for '{key}'"))
        })?;

        if params.insert(key.to_string(), value.to_string()).is_some() {
            return Err(AuthError::malformed_header(format!(
                "duplicate parameter '{key}'"
            )));
        }

        let after_value = after_value.trim_start();
        rest = match after_value.strip_prefix(',') {
            Some(next) => next.trim_start(),
            None if after_value.is_empty() => after_value,
            None => {
                return Err(AuthError::malformed_header(format!(
                    "expected ',' after '{key}'"
                )))
            }
        };
    }

    Ok(params)
}

fn parse_seconds(field: &str, value: Option<String>) -> Result<Option<u64>> {
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| AuthError::malformed_header(format!("invalid {field} format")))
        })
        .transpose()
}

impl FromStr for AuthHeader {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        let params = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| AuthError::malformed_header("header is not starting with `Signature`"))?;
        let mut params = parse_params(params)?;

        let key_id = params
            .remove("keyId")
            .ok_or_else(|| AuthError::malformed_header("missing keyId value in Authorization"))?
            .trim()
            .parse()
            .map_err(|_| AuthError::malformed_header("invalid key-id format"))?;
        let signature = params
            .remove("signature")
            .ok_or_else(|| AuthError::malformed_header("missing signature value in Authorization"))?;

        let header = AuthHeader {
            key_id,
            algorithm: params.remove("algorithm"),
            headers: params
                .remove("headers")
                .unwrap_or_else(|| DEFAULT_HEADERS.to_string()),
            signature,
            created: parse_seconds("created", params.remove("created"))?,
            expires: parse_seconds("expires", params.remove("expires"))?,
        };

        if !params.is_empty() {
            let mut unknown: Vec<_> = params.into_keys().collect();
            unknown.sort();
            return Err(AuthError::malformed_header(format!(
                "authorization header has unknown arguments: {}",
                unknown.join(", ")
            )));
        }

        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_full_header() {
        let header: AuthHeader = r#"Signature keyId="10",algorithm="ed25519",created="100",expires="103",headers="(created) (expires) (key-id)",signature="c2ln""#
            .parse()
            .unwrap();

        assert_eq!(header.key_id, 10);
        assert_eq!(header.algorithm.as_deref(), Some("ed25519"));
        assert_eq!(header.created, Some(100));
        assert_eq!(header.expires, Some(103));
        assert_eq!(header.headers, "(created) (expires) (key-id)");
        assert_eq!(header.signature, "c2ln");
        assert_eq!(
            header.signing_string().unwrap(),
            "(created): 100\n(expires): 103\n(key-id): 10"
        );
    }

    #[test]
    fn test_parse_tolerates_whitespace_between_params() {
        let header: AuthHeader =
            "Signature keyId=\"10\",algorithm=\"hs2019\",\n        headers=\"(created)\", signature=\"abc\",created=\"5\""
                .parse()
                .unwrap();

        assert_eq!(header.key_id, 10);
        assert_eq!(header.signature, "abc");
        assert!(header.check_algorithm().is_ok());
        assert_eq!(header.signing_string().unwrap(), "(created): 5");
    }

    #[test]
    fn test_headers_default_to_created() {
        let header: AuthHeader = r#"Signature keyId="1",signature="x",created="7""#.parse().unwrap();
        assert_eq!(header.headers, "(created)");
        assert!(header.signs("(created)"));
        assert!(!header.signs("(expires)"));
    }

    #[test]
    fn test_parse_invalid_key_id() {
        let result: Result<AuthHeader> = r#"Signature keyId="bad",signature="x""#.parse();
        assert_matches!(result, Err(AuthError::MalformedHeader { .. }));
    }

    #[test]
    fn test_parse_missing_signature() {
        let result: Result<AuthHeader> = r#"Signature keyId="1",algorithm="ed25519""#.parse();
        assert_matches!(result, Err(AuthError::MalformedHeader { message }) if message.contains("missing signature"));
    }

    #[test]
    fn test_parse_rejects_unknown_and_duplicate_params() {
        let unknown: Result<AuthHeader> = r#"Signature keyId="1",signature="x",nonce="y""#.parse();
        assert_matches!(unknown, Err(AuthError::MalformedHeader { message }) if message.contains("nonce"));

        let duplicate: Result<AuthHeader> = r#"Signature keyId="1",keyId="2",signature="x""#.parse();
        assert_matches!(duplicate, Err(AuthError::MalformedHeader { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_prefix_and_quoting() {
        assert!(r#"Bearer keyId="1""#.parse::<AuthHeader>().is_err());
        assert!(r#"Signature keyId=1,signature="x""#.parse::<AuthHeader>().is_err());
        assert!(r#"Signature keyId="1,signature="x"#.parse::<AuthHeader>().is_err());
    }

    #[test]
    fn test_signing_string_rejects_unknown_pseudo_header() {
        let header: AuthHeader =
            r#"Signature keyId="1",headers="(created) host",signature="x",created="1""#
                .parse()
                .unwrap();
        assert_matches!(header.signing_string(), Err(AuthError::MalformedHeader { .. }));
    }

    #[test]
    fn test_signing_string_requires_values() {
        let header: AuthHeader =
            r#"Signature keyId="1",headers="(created) (expires)",signature="x",created="1""#
                .parse()
                .unwrap();
        assert_matches!(header.signing_string(), Err(AuthError::MalformedHeader { .. }));
    }

    #[test]
    fn test_unsupported_algorithm() {
        let header: AuthHeader = r#"Signature keyId="1",algorithm="rsa-sha256",signature="x""#
            .parse()
            .unwrap();
        assert_matches!(
            header.check_algorithm(),
            Err(AuthError::UnsupportedAlgorithm { algorithm }) if algorithm == "rsa-sha256"
        );
    }

    #[test]
    fn test_decode_signature_padding_modes() {
        let bytes = [7u8; 64];
        let padded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let unpadded = base64::engine::general_purpose::STANDARD_NO_PAD.encode(bytes);

        for encoded in [padded, unpadded] {
            let header = AuthHeader {
                key_id: 1,
                algorithm: None,
                headers: DEFAULT_HEADERS.to_string(),
                signature: encoded,
                created: Some(1),
                expires: None,
            };
            assert_eq!(header.decode_signature().unwrap().to_bytes(), bytes);
        }
    }

    #[test]
    fn test_decode_signature_wrong_length() {
        let header = AuthHeader {
            key_id: 1,
            algorithm: None,
            headers: DEFAULT_HEADERS.to_string(),
            signature: base64::engine::general_purpose::STANDARD.encode([1u8; 10]),
            created: None,
            expires: None,
        };
        assert_matches!(header.decode_signature(), Err(AuthError::InvalidSignature { .. }));
    }
}
