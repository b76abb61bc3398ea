use actix_web::{HttpResponse, Responder};

use crate::auth::middleware::AuthenticatedUser;

/// GET /api/auth/me: the authenticated user's profile, including their role.
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(user.0)
}
