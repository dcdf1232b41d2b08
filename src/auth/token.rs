//! Verifies the bearer tokens issued by the external identity provider.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, UserId, auth::AuthError};

/// The claims read from an identity token.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: String,
    /// The time the token was issued, in seconds since the Unix epoch.
    pub iat: i64,
    /// The expiry time of the token, in seconds since the Unix epoch.
    pub exp: i64,
    /// The party that issued the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Who the token is intended for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Checks identity tokens and extracts the user ID from them.
///
/// The verifier never issues tokens for the API, that is the job of the
/// identity provider. It supports providers that sign with a shared secret
/// (HS256) and providers that sign with an RSA key pair (RS256).
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Create a verifier for tokens signed with the shared `secret`.
    pub fn hs256(secret: &str) -> Self {
        Self::new(DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
    }

    /// Create a verifier for tokens signed with the private half of the RSA
    /// public key `pem`.
    ///
    /// # Errors
    /// Returns an [Error::InvalidIdentityKey] if `pem` is not a valid RSA public key.
    pub fn rs256(pem: &[u8]) -> Result<Self, Error> {
        let decoding_key = DecodingKey::from_rsa_pem(pem)
            .map_err(|error| Error::InvalidIdentityKey(error.to_string()))?;

        Ok(Self::new(decoding_key, Algorithm::RS256))
    }

    fn new(decoding_key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);
        // Without an audience configured there is nothing to compare the claim to.
        validation.validate_aud = false;

        Self {
            decoding_key,
            validation,
        }
    }

    /// Only accept tokens where the `iss` claim equals `issuer`.
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self.validation.required_spec_claims.insert("iss".to_owned());
        self
    }

    /// Only accept tokens where the `aud` claim equals `audience`.
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self.validation.required_spec_claims.insert("aud".to_owned());
        self
    }

    /// Verify the signature and claims of `token` and return the user it was issued to.
    ///
    /// # Errors
    /// Returns [AuthError::InvalidToken] if the token is malformed, expired,
    /// has a bad signature, or fails the issuer/audience checks.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|error| {
                tracing::debug!("Rejected bearer token: {error}");
                AuthError::InvalidToken
            })?;

        let subject = token_data.claims.sub.trim();

        if subject.is_empty() {
            tracing::debug!("Rejected bearer token with an empty subject");
            return Err(AuthError::InvalidToken);
        }

        Ok(UserId::new(subject))
    }
}

/// Issue an HS256 token for `user_id` that expires after `ttl`.
///
/// This is meant for development and tests, where there is no identity
/// provider to log in with.
///
/// # Errors
/// Returns an [Error::TokenCreation] if the expiry time overflows or the
/// token could not be encoded.
pub fn issue_hs256_token(user_id: &UserId, secret: &str, ttl: Duration) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let expires_at = now.checked_add(ttl).ok_or_else(|| {
        Error::TokenCreation(format!("a lifetime of {ttl} is out of range"))
    })?;
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.unix_timestamp(),
        exp: expires_at.unix_timestamp(),
        iss: None,
        aud: None,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|error| Error::TokenCreation(error.to_string()))
}
