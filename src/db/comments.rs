use sea_orm::*;
use uuid::Uuid;

use crate::models::comments;

/// Insert a comment.
pub async fn insert_comment(
    db: &DatabaseConnection,
    comment: comments::Model,
) -> Result<comments::Model, DbErr> {
    let new_comment = comments::ActiveModel {
        id: Set(comment.id),
        portfolio_id: Set(comment.portfolio_id),
        author_id: Set(comment.author_id),
        text: Set(comment.text),
        created_at: Set(comment.created_at),
    };

    new_comment.insert(db).await
}

/// Fetch all comments on a portfolio, oldest first.
pub async fn get_comments_by_portfolio(
    db: &DatabaseConnection,
    portfolio_id: Uuid,
) -> Result<Vec<comments::Model>, DbErr> {
    comments::Entity::find()
        .filter(comments::Column::PortfolioId.eq(portfolio_id))
        .order_by_asc(comments::Column::CreatedAt)
        .order_by_asc(comments::Column::Id)
        .all(db)
        .await
}
