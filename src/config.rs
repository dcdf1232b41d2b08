//! Command line and environment configuration for the server.

use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

use clap::Parser;

use crate::{Error, TokenVerifier};

/// The REST API server for fintrack.
///
/// Every option can also be set with the environment variable named in its
/// help text, or in a `.env` file in the working directory.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct ServerConfig {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH")]
    pub db_path: PathBuf,

    /// The address to serve the API from.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory containing an SSL certificate `cert.pem` and key `key.pem`.
    /// The server uses plain HTTP when this is not set.
    #[arg(long, env = "CERT_PATH")]
    pub cert_path: Option<PathBuf>,

    /// Shared secret for verifying HS256 identity tokens.
    #[arg(
        long,
        env = "IDENTITY_SECRET",
        hide_env_values = true,
        required_unless_present = "identity_public_key_path",
        conflicts_with = "identity_public_key_path"
    )]
    pub identity_secret: Option<String>,

    /// Path to an RSA public key (PEM) for verifying RS256 identity tokens.
    #[arg(long, env = "IDENTITY_PUBLIC_KEY_PATH")]
    pub identity_public_key_path: Option<PathBuf>,

    /// Reject tokens whose `iss` claim is not this value.
    #[arg(long, env = "IDENTITY_ISSUER")]
    pub identity_issuer: Option<String>,

    /// Reject tokens whose `aud` claim is not this value.
    #[arg(long, env = "IDENTITY_AUDIENCE")]
    pub identity_audience: Option<String>,

    /// File that debug level logs are appended to.
    #[arg(long, env = "LOG_PATH", default_value = "debug.log")]
    pub log_path: PathBuf,
}

impl ServerConfig {
    /// The address the server should listen on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Build the verifier for identity tokens from the configured key, issuer and audience.
    ///
    /// # Errors
    /// Returns an [Error::InvalidIdentityKey] if the public key file cannot be
    /// read or is not a valid RSA key, or if no key was configured.
    pub fn token_verifier(&self) -> Result<TokenVerifier, Error> {
        let verifier = match (&self.identity_secret, &self.identity_public_key_path) {
            (Some(secret), _) => TokenVerifier::hs256(secret),
            (None, Some(path)) => {
                let pem = fs::read(path).map_err(|error| {
                    Error::InvalidIdentityKey(format!("could not read {}: {error}", path.display()))
                })?;
                TokenVerifier::rs256(&pem)?
            }
            (None, None) => {
                return Err(Error::InvalidIdentityKey(
                    "either an identity secret or public key path must be set".to_owned(),
                ));
            }
        };

        let verifier = match &self.identity_issuer {
            Some(issuer) => verifier.with_issuer(issuer),
            None => verifier,
        };

        let verifier = match &self.identity_audience {
            Some(audience) => verifier.with_audience(audience),
            None => verifier,
        };

        Ok(verifier)
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use clap::Parser;
    use time::Duration;

    use crate::{Error, ServerConfig, UserId, issue_hs256_token};

    #[test]
    fn parses_required_options_with_defaults() {
        let config = ServerConfig::try_parse_from([
            "server",
            "--db-path",
            "app.db",
            "--identity-secret",
            "hunter2",
        ])
        .unwrap();

        assert_eq!(
            config.socket_addr(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000)
        );
        assert_eq!(config.cert_path, None);
        assert_eq!(config.log_path.to_str(), Some("debug.log"));
    }

    #[test]
    fn secret_and_public_key_conflict() {
        let result = ServerConfig::try_parse_from([
            "server",
            "--db-path",
            "app.db",
            "--identity-secret",
            "hunter2",
            "--identity-public-key-path",
            "key.pem",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn verifier_uses_configured_secret() {
        let config = ServerConfig::try_parse_from([
            "server",
            "--db-path",
            "app.db",
            "--identity-secret",
            "hunter2",
        ])
        .unwrap();
        let user_id = UserId::new("alice");
        let token = issue_hs256_token(&user_id, "hunter2", Duration::minutes(1)).unwrap();

        let verifier = config.token_verifier().unwrap();

        assert_eq!(verifier.verify(&token), Ok(user_id));
    }

    #[test]
    fn missing_public_key_file_is_an_error() {
        let config = ServerConfig::try_parse_from([
            "server",
            "--db-path",
            "app.db",
            "--identity-public-key-path",
            "/definitely/not/a/key.pem",
        ])
        .unwrap();

        let result = config.token_verifier();

        assert!(matches!(result, Err(Error::InvalidIdentityKey(_))));
    }
}
