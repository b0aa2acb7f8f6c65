//! API credentials handed to request signers.
//!
//! Secrets are zeroed on drop and redacted in `Debug`/`Display`, so an
//! [`ExchangeConfig`](crate::base_exchange::ExchangeConfig) can be logged
//! without leaking keys.
//!
//! ```rust
//! use ccxt_base::credentials::{Credentials, SecretString};
//!
//! let creds = Credentials {
//!     api_key: Some(SecretString::new("my-api-key")),
//!     secret: Some(SecretString::new("my-secret")),
//!     ..Credentials::default()
//! };
//! assert!(creds.require(&["apiKey", "secret"]).is_ok());
//! assert_eq!(format!("{:?}", creds.api_key), "Some([REDACTED])");
//! ```

use crate::error::{Error, Result};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string that is zeroed when dropped and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Creates a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret value.
    ///
    /// Use the reference immediately; do not persist it.
    #[inline]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns true if the secret string is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The credential set an exchange signer may need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// API key.
    pub api_key: Option<SecretString>,
    /// API secret.
    pub secret: Option<SecretString>,
    /// Passphrase (OKX, KuCoin, ...).
    pub password: Option<SecretString>,
    /// Account or user id.
    pub uid: Option<SecretString>,
}

impl Credentials {
    /// Checks that every named credential is present and non-empty.
    ///
    /// Names are `apiKey`, `secret`, `password` and `uid`. Signers call this
    /// before touching private endpoints.
    pub fn require(&self, names: &[&str]) -> Result<()> {
        for name in names {
            let value = match *name {
                "apiKey" => &self.api_key,
                "secret" => &self.secret,
                "password" => &self.password,
                "uid" => &self.uid,
                other => {
                    return Err(Error::invalid_request(format!(
                        "Unknown credential '{other}'"
                    )));
                }
            };
            if value.as_ref().is_none_or(SecretString::is_empty) {
                return Err(Error::authentication(format!(
                    "requires \"{name}\" credential"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_secret_string_redacted() {
        let secret = SecretString::new("my-api-key");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(format!("{secret}"), "[REDACTED]");
        assert_eq!(secret.expose_secret(), "my-api-key");
    }

    #[test]
    fn test_require_missing_secret() {
        let creds = Credentials {
            api_key: Some("key".into()),
            ..Credentials::default()
        };
        let err = creds.require(&["apiKey", "secret"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(err.to_string().contains("secret"));
    }

    #[test]
    fn test_require_empty_counts_as_missing() {
        let creds = Credentials {
            api_key: Some("".into()),
            ..Credentials::default()
        };
        assert!(creds.require(&["apiKey"]).is_err());
        assert!(creds.require(&[]).is_ok());
    }
}
