use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{CacheData, invalidate_comments, invalidate_portfolio};
use crate::error::ReviewError;
use crate::models::comments::CreateComment;
use crate::models::portfolio::{NewPortfolio, PortfolioChanges, UpdateVisibility};
use crate::review::{Action, TransitionEngine};

/// GET /api/portfolios/mine: the caller's own portfolios in every state.
pub async fn get_my_portfolios(
    user: AuthenticatedUser,
    engine: web::Data<TransitionEngine>,
) -> Result<HttpResponse, ReviewError> {
    let items = engine.list_by_owner(&user.actor()).await?;
    Ok(HttpResponse::Ok().json(items))
}

/// POST /api/portfolios: upload a portfolio as a draft (`submit: false`)
/// or straight into review (`submit: true`).
pub async fn create_portfolio(
    user: AuthenticatedUser,
    engine: web::Data<TransitionEngine>,
    body: web::Json<NewPortfolio>,
) -> Result<HttpResponse, ReviewError> {
    let item = engine.create(&user.actor(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(item))
}

/// GET /api/portfolios/{id}: visible to the owner, to reviewers once
/// submitted, and to everyone once published.
pub async fn get_portfolio(
    user: AuthenticatedUser,
    engine: web::Data<TransitionEngine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ReviewError> {
    let item = engine.get_for(&user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

/// PUT /api/portfolios/{id}: edit a draft or failed portfolio.
pub async fn edit_portfolio(
    user: AuthenticatedUser,
    engine: web::Data<TransitionEngine>,
    path: web::Path<Uuid>,
    body: web::Json<PortfolioChanges>,
) -> Result<HttpResponse, ReviewError> {
    let item = engine
        .edit(&user.actor(), path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(item))
}

/// POST /api/portfolios/{id}/submit: send a draft to the advisor queue.
/// An optional body carries last-minute edits.
pub async fn submit_portfolio(
    user: AuthenticatedUser,
    engine: web::Data<TransitionEngine>,
    path: web::Path<Uuid>,
    body: Option<web::Json<PortfolioChanges>>,
) -> Result<HttpResponse, ReviewError> {
    let changes = body.map(|b| b.into_inner()).unwrap_or_default();
    let item = engine
        .apply(&user.actor(), path.into_inner(), Action::Submit(changes))
        .await?;
    Ok(HttpResponse::Ok().json(item))
}

/// POST /api/portfolios/{id}/resubmit: send a failed portfolio back for
/// review, usually with the corrected form.
pub async fn resubmit_portfolio(
    user: AuthenticatedUser,
    engine: web::Data<TransitionEngine>,
    path: web::Path<Uuid>,
    body: Option<web::Json<PortfolioChanges>>,
) -> Result<HttpResponse, ReviewError> {
    let changes = body.map(|b| b.into_inner()).unwrap_or_default();
    let item = engine
        .apply(&user.actor(), path.into_inner(), Action::Resubmit(changes))
        .await?;
    Ok(HttpResponse::Ok().json(item))
}

/// PUT /api/portfolios/{id}/visibility: publish or hide an approved portfolio.
pub async fn update_visibility(
    user: AuthenticatedUser,
    engine: web::Data<TransitionEngine>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateVisibility>,
) -> Result<HttpResponse, ReviewError> {
    let id = path.into_inner();
    let item = engine
        .apply(&user.actor(), id, Action::SetVisibility(body.visibility))
        .await?;

    invalidate_portfolio(&***cache, id).await;
    Ok(HttpResponse::Ok().json(item))
}

/// POST /api/portfolios/{id}/comments: comment on a published portfolio.
pub async fn add_comment(
    user: AuthenticatedUser,
    engine: web::Data<TransitionEngine>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
    body: web::Json<CreateComment>,
) -> Result<HttpResponse, ReviewError> {
    let id = path.into_inner();
    let comment = engine.add_comment(&user.actor(), id, &body.text).await?;

    invalidate_comments(&***cache, id).await;
    Ok(HttpResponse::Created().json(comment))
}
