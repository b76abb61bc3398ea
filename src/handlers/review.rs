use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ReviewError;
use crate::models::portfolio::RejectPortfolio;
use crate::review::ReviewGateway;

/// GET /api/review/advisor/queue: pending portfolios awaiting an advisor.
pub async fn advisor_queue(
    user: AuthenticatedUser,
    gateway: web::Data<ReviewGateway>,
) -> Result<HttpResponse, ReviewError> {
    let items = gateway.advisor().queue(&user.actor()).await?;
    Ok(HttpResponse::Ok().json(items))
}

/// PUT /api/review/advisor/{id}/approve: pending → in_process.
pub async fn advisor_approve(
    user: AuthenticatedUser,
    gateway: web::Data<ReviewGateway>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ReviewError> {
    let item = gateway
        .advisor()
        .approve(&user.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(item))
}

/// PUT /api/review/advisor/{id}/reject: pending → failed, with feedback.
pub async fn advisor_reject(
    user: AuthenticatedUser,
    gateway: web::Data<ReviewGateway>,
    path: web::Path<Uuid>,
    body: web::Json<RejectPortfolio>,
) -> Result<HttpResponse, ReviewError> {
    let item = gateway
        .advisor()
        .reject(&user.actor(), path.into_inner(), body.into_inner().feedback)
        .await?;
    Ok(HttpResponse::Ok().json(item))
}

/// GET /api/review/super/queue: in-process portfolios awaiting a super-admin.
pub async fn super_queue(
    user: AuthenticatedUser,
    gateway: web::Data<ReviewGateway>,
) -> Result<HttpResponse, ReviewError> {
    let items = gateway.super_admin().queue(&user.actor()).await?;
    Ok(HttpResponse::Ok().json(items))
}

/// PUT /api/review/super/{id}/approve: in_process → approved (private).
pub async fn super_approve(
    user: AuthenticatedUser,
    gateway: web::Data<ReviewGateway>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ReviewError> {
    let item = gateway
        .super_admin()
        .approve(&user.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(item))
}

/// PUT /api/review/super/{id}/reject: in_process → failed, with feedback.
pub async fn super_reject(
    user: AuthenticatedUser,
    gateway: web::Data<ReviewGateway>,
    path: web::Path<Uuid>,
    body: web::Json<RejectPortfolio>,
) -> Result<HttpResponse, ReviewError> {
    let item = gateway
        .super_admin()
        .reject(&user.actor(), path.into_inner(), body.into_inner().feedback)
        .await?;
    Ok(HttpResponse::Ok().json(item))
}
