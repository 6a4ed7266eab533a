//! Credential loading
//!
//! Accepts either an inline `user:password` string or a path to a file
//! containing one.

use crate::error::{PremiumizeError, Result};
use std::path::Path;

/// Login data sent with every API request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub customer_id: String,
    pub pin: String,
}

impl Credentials {
    /// Parse credentials from an inline `user:password` string or from a file
    /// with that content
    pub fn parse(auth: &str) -> Result<Self> {
        if auth.is_empty() {
            return Err(PremiumizeError::config_error(
                "no authentication given, use --auth 'user:password' or a path to a file",
            ));
        }

        let raw = if auth.contains(':') {
            auth.to_string()
        } else if Path::new(auth).exists() {
            std::fs::read_to_string(auth)?
        } else {
            return Err(PremiumizeError::config_error(format!(
                "authentication file \"{}\" not found",
                auth
            )));
        };

        match raw.trim().split_once(':') {
            Some((customer_id, pin)) if !customer_id.is_empty() && !pin.is_empty() => {
                Ok(Credentials {
                    customer_id: customer_id.to_string(),
                    pin: pin.to_string(),
                })
            }
            _ => Err(PremiumizeError::config_error(
                "no ':' found in authentication information, login not possible",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_inline_auth() {
        let creds = Credentials::parse("alice:s3cret").unwrap();
        assert_eq!(creds.customer_id, "alice");
        assert_eq!(creds.pin, "s3cret");
    }

    #[test]
    fn test_auth_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "bob:hunter2").unwrap();

        let creds = Credentials::parse(path.to_str().unwrap()).unwrap();
        assert_eq!(creds.customer_id, "bob");
        assert_eq!(creds.pin, "hunter2");
    }

    #[test]
    fn test_malformed_auth_is_rejected() {
        assert!(matches!(
            Credentials::parse("no-separator-here"),
            Err(PremiumizeError::Config { .. })
        ));
        assert!(matches!(
            Credentials::parse(""),
            Err(PremiumizeError::Config { .. })
        ));
        assert!(matches!(
            Credentials::parse(":empty-user"),
            Err(PremiumizeError::Config { .. })
        ));
    }
}
