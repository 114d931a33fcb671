//! Configuration for inspector-auth
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::path::PathBuf;

/// inspector-auth - link inspector documents to identity accounts
///
/// Creates an identity-provider account for an inspector document in
/// MongoDB and writes the account id into the document as `uid`. If an
/// account with the same email already exists, the existing account is
/// linked instead.
#[derive(Parser, Debug, Clone)]
#[command(name = "inspector-auth")]
#[command(about = "Provision identity accounts for inspector documents")]
#[command(version)]
pub struct Args {
    /// Inspector document id to reconcile
    #[arg(value_name = "INSPECTOR_ID")]
    pub inspector_id: Option<String>,

    /// Reconcile every inspector missing a uid, then exit
    #[arg(long, conflicts_with_all = ["inspector_id", "watch"])]
    pub all: bool,

    /// Watch the inspectors collection and reconcile documents as they appear
    #[arg(long, conflicts_with = "inspector_id")]
    pub watch: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "inspectorate")]
    pub mongodb_db: String,

    /// Base URL of the identity service
    #[arg(long, env = "IDENTITY_URL", default_value = "http://localhost:9099")]
    pub identity_url: String,

    /// Path to the identity service credentials file
    #[arg(long, env = "IDENTITY_CREDENTIALS", default_value = "serviceAccountKey.json")]
    pub credentials: PathBuf,

    /// Domain used for synthesized fallback emails
    #[arg(long, env = "EMAIL_DOMAIN", default_value = "gmail.com")]
    pub email_domain: String,

    /// Initial password assigned to newly created accounts
    #[arg(long, env = "DEFAULT_PASSWORD", default_value = "123123")]
    pub default_password: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.email_domain.trim().is_empty() {
            return Err("EMAIL_DOMAIN must not be empty".to_string());
        }
        if self.email_domain.contains('@') {
            return Err("EMAIL_DOMAIN must be a bare domain, without '@'".to_string());
        }
        if self.default_password.is_empty() {
            return Err("DEFAULT_PASSWORD must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_id_mode() {
        let args = Args::try_parse_from(["inspector-auth", "abc123"]).unwrap();
        assert_eq!(args.inspector_id.as_deref(), Some("abc123"));
        assert!(!args.all);
        assert!(!args.watch);
    }

    #[test]
    fn test_all_conflicts_with_watch() {
        assert!(Args::try_parse_from(["inspector-auth", "--all", "--watch"]).is_err());
    }

    #[test]
    fn test_all_conflicts_with_id() {
        assert!(Args::try_parse_from(["inspector-auth", "abc123", "--all"]).is_err());
    }

    #[test]
    fn test_validate_rejects_domain_with_at() {
        let mut args = Args::try_parse_from(["inspector-auth", "--all"]).unwrap();
        args.email_domain = "@gmail.com".to_string();
        assert!(args.validate().is_err());
    }
}
