use sea_orm::*;
use uuid::Uuid;

use crate::models::portfolio::{self, Status, Visibility};

fn to_active(item: portfolio::Model) -> portfolio::ActiveModel {
    portfolio::ActiveModel {
        id: Set(item.id),
        owner_id: Set(item.owner_id),
        title: Set(item.title),
        university: Set(item.university),
        year: Set(item.year),
        category: Set(item.category),
        description: Set(item.description),
        files: Set(item.files),
        status: Set(item.status),
        visibility: Set(item.visibility),
        feedback: Set(item.feedback),
        version: Set(item.version),
        created_at: Set(item.created_at),
        updated_at: Set(item.updated_at),
    }
}

/// Insert a portfolio that has never been saved. The stored row starts at version 1.
pub async fn insert_portfolio(
    db: &DatabaseConnection,
    mut item: portfolio::Model,
) -> Result<portfolio::Model, DbErr> {
    item.version = 1;
    to_active(item).insert(db).await
}

/// Overwrite a portfolio only if its stored version still equals `item.version`.
///
/// Returns `None` when no row matched (stale version or missing id).
pub async fn update_portfolio_if_version(
    db: &DatabaseConnection,
    mut item: portfolio::Model,
) -> Result<Option<portfolio::Model>, DbErr> {
    let expected = item.version;
    item.version = expected + 1;

    let result = portfolio::Entity::update_many()
        .set(to_active(item.clone()))
        .filter(portfolio::Column::Id.eq(item.id))
        .filter(portfolio::Column::Version.eq(expected))
        .exec(db)
        .await?;

    Ok((result.rows_affected > 0).then_some(item))
}

/// Fetch a single portfolio by ID.
pub async fn get_portfolio_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<portfolio::Model>, DbErr> {
    portfolio::Entity::find_by_id(id).one(db).await
}

/// Fetch all portfolios owned by a student.
pub async fn get_portfolios_by_owner(
    db: &DatabaseConnection,
    owner_id: Uuid,
) -> Result<Vec<portfolio::Model>, DbErr> {
    portfolio::Entity::find()
        .filter(portfolio::Column::OwnerId.eq(owner_id))
        .all(db)
        .await
}

/// Fetch all portfolios currently in `status`.
pub async fn get_portfolios_by_status(
    db: &DatabaseConnection,
    status: Status,
) -> Result<Vec<portfolio::Model>, DbErr> {
    portfolio::Entity::find()
        .filter(portfolio::Column::Status.eq(status))
        .all(db)
        .await
}

/// Fetch one page of approved, public portfolios, newest first.
pub async fn get_public_portfolios(
    db: &DatabaseConnection,
    offset: u64,
    limit: u64,
) -> Result<Vec<portfolio::Model>, DbErr> {
    portfolio::Entity::find()
        .filter(portfolio::Column::Status.eq(Status::Approved))
        .filter(portfolio::Column::Visibility.eq(Visibility::Public))
        .order_by_desc(portfolio::Column::UpdatedAt)
        .order_by_desc(portfolio::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await
}
