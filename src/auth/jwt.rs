use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token validation failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid UUID in sub claim: {0}")]
    Subject(#[from] uuid::Error),

    #[error("No email in token claims")]
    MissingEmail,
}

/// JWT claims issued by the identity provider.
///
/// `sub` is the user's UUID; the application role is not trusted from the
/// token and is read from the `users` table instead.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    pub iat: Option<usize>,
    pub iss: Option<String>,
    pub email: Option<String>,
    pub user_metadata: Option<UserMetadata>,
}

/// Profile fields populated by the OAuth provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserMetadata {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Ok(Uuid::parse_str(&self.sub)?)
    }

    /// Best-effort display name from metadata.
    pub fn display_name(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.full_name.clone().or_else(|| m.name.clone()))
    }

    /// Prefer the top-level email, fall back to metadata.
    pub fn user_email(&self) -> Result<String, AuthError> {
        self.email
            .clone()
            .or_else(|| self.user_metadata.as_ref().and_then(|m| m.email.clone()))
            .ok_or(AuthError::MissingEmail)
    }
}

/// Validate an HS256-signed token against the shared secret and return its claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}
