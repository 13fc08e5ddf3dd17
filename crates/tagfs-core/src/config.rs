//! Client configuration
//!
//! Loaded from a TOML file, optionally overlaid with `TAGFS_*` environment
//! variables, then validated. All fields have defaults so an empty file is a
//! valid configuration apart from the signing key, which comes from either a
//! hex `seed` or a BIP-39 `mnemonic`.
//!
//! ```toml
//! [auth]
//! key_id = 6
//! seed = "<64 hex chars>"          # or: mnemonic = "<24 words>"
//! window_secs = 3
//!
//! [resolver]
//! duplicate_policy = "first_match"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "TAGFS_";

/// Default credential validity window in seconds
pub const DEFAULT_WINDOW_SECS: u64 = 3;

/// Length in bytes of an Ed25519 seed, raw or as mnemonic entropy
pub const SEED_LENGTH: usize = 32;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// File that was read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("Invalid config: {message}")]
    Parse {
        /// Parser message
        message: String,
    },

    /// A value is out of range or malformed
    #[error("Invalid configuration: {field} - {reason}")]
    Invalid {
        /// Offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// How `resolve` behaves when more than one object matches a (dir, name) pair.
///
/// Duplicates arise when two writers race on first creation of the same path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Use the first object the store emits and ignore the rest
    #[default]
    FirstMatch,
    /// Fail with an ambiguity error when a second match exists
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "first_match" => Ok(Self::FirstMatch),
            "reject" => Ok(Self::Reject),
            other => Err(ConfigError::invalid(
                "duplicate_policy",
                format!("unknown policy '{other}', expected first_match or reject"),
            )),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstMatch => f.write_str("first_match"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Request signing settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Numeric identity the store knows the public key under
    pub key_id: u64,
    /// Hex-encoded 32-byte Ed25519 seed
    pub seed: Option<String>,
    /// BIP-39 English phrase whose entropy is the seed; alternative to `seed`
    pub mnemonic: Option<String>,
    /// Seconds between `created` and `expires` on each credential
    pub window_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            key_id: 0,
            seed: None,
            mnemonic: None,
            window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("key_id", &self.key_id)
            .field("seed", &self.seed.as_ref().map(|_| "<redacted>"))
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .field("window_secs", &self.window_secs)
            .finish()
    }
}

impl AuthConfig {
    /// Decode the hex seed, if one is configured.
    pub fn seed_bytes(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        self.seed
            .as_deref()
            .map(|s| {
                hex::decode(s.trim())
                    .map_err(|e| ConfigError::invalid("auth.seed", format!("not hex: {e}")))
            })
            .transpose()
    }
}

/// Path resolver settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Ambiguity handling for duplicate (dir, name) matches
    pub duplicate_policy: DuplicatePolicy,
}

/// Top-level client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Request signing
    pub auth: AuthConfig,
    /// Path resolution
    pub resolver: ResolverConfig,
}

impl ClientConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded client configuration");
        Ok(config)
    }

    /// Overlay `TAGFS_*` environment variables.
    pub fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Overlay settings from `(name, value)` pairs using the `TAGFS_` naming.
    ///
    /// Unrecognised names are ignored.
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref();
            match name {
                "KEY_ID" => {
                    self.auth.key_id = value.trim().parse().map_err(|e| {
                        ConfigError::invalid("TAGFS_KEY_ID", format!("not a number: {e}"))
                    })?;
                }
                "SEED" => self.auth.seed = Some(value.trim().to_string()),
                "MNEMONIC" => self.auth.mnemonic = Some(value.trim().to_string()),
                "WINDOW_SECS" => {
                    self.auth.window_secs = value.trim().parse().map_err(|e| {
                        ConfigError::invalid("TAGFS_WINDOW_SECS", format!("not a number: {e}"))
                    })?;
                }
                "DUPLICATE_POLICY" => self.resolver.duplicate_policy = value.parse()?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Check value ranges and formats.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.window_secs == 0 {
            return Err(ConfigError::invalid(
                "auth.window_secs",
                "must be at least one second",
            ));
        }
        if self.auth.seed.is_some() && self.auth.mnemonic.is_some() {
            return Err(ConfigError::invalid(
                "auth",
                "set either seed or mnemonic, not both",
            ));
        }
        if let Some(seed) = self.auth.seed_bytes()? {
            if seed.len() != SEED_LENGTH {
                return Err(ConfigError::invalid(
                    "auth.seed",
                    format!("expected {SEED_LENGTH} bytes, got {}", seed.len()),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    const SEED_HEX: &str = "0101010101010101010101010101010101010101010101010101010101010101";

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.auth.window_secs, 3);
        assert_eq!(config.resolver.duplicate_policy, DuplicatePolicy::FirstMatch);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = ClientConfig::from_toml_str(
            r#"
            [auth]
            key_id = 6

            [resolver]
            duplicate_policy = "reject"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.key_id, 6);
        assert_eq!(config.auth.window_secs, DEFAULT_WINDOW_SECS);
        assert_eq!(config.resolver.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_parse_rejects_unknown_policy() {
        let result = ClientConfig::from_toml_str("[resolver]\nduplicate_policy = \"newest\"\n");
        assert_matches!(result, Err(ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[auth]\nkey_id = 42\nseed = \"{SEED_HEX}\"\nwindow_secs = 10").unwrap();

        let config = ClientConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.auth.key_id, 42);
        assert_eq!(config.auth.window_secs, 10);
        assert_eq!(config.auth.seed_bytes().unwrap(), Some(vec![1u8; 32]));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let result = ClientConfig::load_from_file(Path::new("/nonexistent/tagfs.toml"));
        assert_matches!(result, Err(ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_overlay() {
        let mut config = ClientConfig::default();
        config
            .merge_with_vars([
                ("TAGFS_KEY_ID", "9"),
                ("TAGFS_WINDOW_SECS", "5"),
                ("TAGFS_DUPLICATE_POLICY", "reject"),
                ("TAGFS_SEED", SEED_HEX),
                ("HOME", "/root"),
            ])
            .unwrap();

        assert_eq!(config.auth.key_id, 9);
        assert_eq!(config.auth.window_secs, 5);
        assert_eq!(config.resolver.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(config.auth.seed.as_deref(), Some(SEED_HEX));
    }

    #[test]
    fn test_env_overlay_bad_number() {
        let mut config = ClientConfig::default();
        let result = config.merge_with_vars([("TAGFS_KEY_ID", "six")]);
        assert_matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "TAGFS_KEY_ID");
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = ClientConfig::default();
        config.auth.window_secs = 0;
        assert_matches!(config.validate(), Err(ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_validate_rejects_short_seed() {
        let mut config = ClientConfig::default();
        config.auth.seed = Some("0102".to_string());
        assert_matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "auth.seed");

        config.auth.seed = Some("zz".to_string());
        assert_matches!(config.validate(), Err(ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_env_overlay_mnemonic() {
        let mut config = ClientConfig::default();
        config
            .merge_with_vars([("TAGFS_MNEMONIC", "  abandon abandon art \n")])
            .unwrap();
        assert_eq!(config.auth.mnemonic.as_deref(), Some("abandon abandon art"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_seed_and_mnemonic() {
        let mut config = ClientConfig::default();
        config.auth.seed = Some(SEED_HEX.to_string());
        config.auth.mnemonic = Some("abandon art".to_string());
        assert_matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "auth");
    }

    #[test]
    fn test_debug_redacts_seed() {
        let mut config = AuthConfig::default();
        config.seed = Some(SEED_HEX.to_string());
        config.mnemonic = Some("zoo zoo wrong".to_string());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains(SEED_HEX));
        assert!(!rendered.contains("zoo"));
        assert!(rendered.contains("<redacted>"));
    }
}
