use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::cache::{CacheConfig, CacheData, keys, read_through};
use crate::error::ReviewError;
use crate::models::PaginationQuery;
use crate::review::TransitionEngine;

/// GET /api/public/portfolios: published portfolios, newest first.
/// Query params: ?page=1&limit=20
pub async fn get_gallery(
    engine: web::Data<TransitionEngine>,
    cache: web::Data<CacheData>,
    ttl: web::Data<CacheConfig>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse, ReviewError> {
    let key = keys::gallery_page(query.page(), query.limit());
    let items = read_through(
        &***cache,
        &key,
        keys::gallery_generation(),
        ttl.gallery_ttl,
        || engine.public_gallery(&query),
    )
    .await?;
    Ok(HttpResponse::Ok().json(items))
}

/// GET /api/public/portfolios/{id}: a single published portfolio.
pub async fn get_public_portfolio(
    engine: web::Data<TransitionEngine>,
    cache: web::Data<CacheData>,
    ttl: web::Data<CacheConfig>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ReviewError> {
    let id = path.into_inner();
    let item = read_through(
        &***cache,
        &keys::public_portfolio(id),
        &keys::portfolio_generation(id),
        ttl.public_ttl,
        || engine.public_portfolio(id),
    )
    .await?;
    Ok(HttpResponse::Ok().json(item))
}

/// GET /api/public/portfolios/{id}/comments: comments on a published portfolio.
pub async fn get_comments(
    engine: web::Data<TransitionEngine>,
    cache: web::Data<CacheData>,
    ttl: web::Data<CacheConfig>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ReviewError> {
    let id = path.into_inner();
    let items = read_through(
        &***cache,
        &keys::comments(id),
        &keys::portfolio_generation(id),
        ttl.public_ttl,
        || engine.list_comments(id),
    )
    .await?;
    Ok(HttpResponse::Ok().json(items))
}
