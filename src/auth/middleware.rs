use actix_web::{Error, FromRequest, HttpRequest, dev::Payload, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::pin::Pin;

use crate::auth::identity::IdentityCache;
use crate::auth::jwt;
use crate::db::users::find_or_create_from_auth;
use crate::models::users::{self, CreateUserFromAuth};
use crate::review::Actor;

/// The user behind a valid bearer token, loaded (or created) from the database.
pub struct AuthenticatedUser(pub users::Model);

impl AuthenticatedUser {
    /// The identity handed to the review engine.
    pub fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Bearer token from the Authorization header.
            let bearer = BearerAuth::extract(&req).await.map_err(|_| {
                actix_web::error::ErrorUnauthorized("Authorization header must be: Bearer <token>")
            })?;

            // 2. Validate it against the shared secret.
            let secret = req.app_data::<web::Data<JwtSecret>>().ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("JWT secret not configured")
            })?;
            let claims = jwt::validate_token(bearer.token(), &secret.0)
                .map_err(|e| actix_web::error::ErrorUnauthorized(format!("Invalid token: {e}")))?;

            let user_id = claims
                .user_id()
                .map_err(actix_web::error::ErrorUnauthorized)?;

            // 3. Recently resolved users skip the database.
            let identities = req.app_data::<web::Data<IdentityCache>>();
            if let Some(cached) = match identities {
                Some(cache) => cache.get(&user_id).await,
                None => None,
            } {
                return Ok(AuthenticatedUser(cached));
            }

            let email = claims
                .user_email()
                .map_err(actix_web::error::ErrorUnauthorized)?;

            // 4. Find or create the user row, which carries the role.
            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or_else(|| {
                    actix_web::error::ErrorInternalServerError("Database not configured")
                })?;

            let user = find_or_create_from_auth(
                db.get_ref(),
                CreateUserFromAuth {
                    id: user_id,
                    email,
                    display_name: claims.display_name(),
                },
            )
            .await
            .map_err(|e| {
                actix_web::error::ErrorInternalServerError(format!("Database error: {e}"))
            })?;

            if let Some(cache) = identities {
                cache.insert(user.clone()).await;
            }

            Ok(AuthenticatedUser(user))
        })
    }
}

/// Wrapper type to store the JWT secret in Actix app data.
#[derive(Clone)]
pub struct JwtSecret(pub String);
