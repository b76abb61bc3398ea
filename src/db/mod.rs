pub mod comments;
pub mod portfolio;
pub mod users;

use async_trait::async_trait;
use sea_orm::{Database, DatabaseConnection, DbErr};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::comments as comment_model;
use crate::models::portfolio::{self as portfolio_model, Status};
use crate::review::store::{CommentStore, PortfolioStore};

/// Create a SeaORM database connection pool.
pub async fn create_pool(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Postgres-backed portfolio and comment store.
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PortfolioStore for SeaOrmStore {
    async fn get(&self, id: Uuid) -> Result<portfolio_model::Model, StoreError> {
        portfolio::get_portfolio_by_id(&self.db, id)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<portfolio_model::Model>, StoreError> {
        Ok(portfolio::get_portfolios_by_owner(&self.db, owner_id).await?)
    }

    async fn list_by_status(
        &self,
        status: Status,
    ) -> Result<Vec<portfolio_model::Model>, StoreError> {
        Ok(portfolio::get_portfolios_by_status(&self.db, status).await?)
    }

    async fn list_public(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<portfolio_model::Model>, StoreError> {
        Ok(portfolio::get_public_portfolios(&self.db, offset, limit).await?)
    }

    async fn save(
        &self,
        item: portfolio_model::Model,
    ) -> Result<portfolio_model::Model, StoreError> {
        if item.version == 0 {
            return Ok(portfolio::insert_portfolio(&self.db, item).await?);
        }

        let id = item.id;
        match portfolio::update_portfolio_if_version(&self.db, item).await? {
            Some(saved) => Ok(saved),
            None => match portfolio::get_portfolio_by_id(&self.db, id).await? {
                Some(_) => Err(StoreError::Conflict(id)),
                None => Err(StoreError::NotFound(id)),
            },
        }
    }
}

#[async_trait]
impl CommentStore for SeaOrmStore {
    async fn add_comment(
        &self,
        comment: comment_model::Model,
    ) -> Result<comment_model::Model, StoreError> {
        Ok(comments::insert_comment(&self.db, comment).await?)
    }

    async fn list_comments(
        &self,
        portfolio_id: Uuid,
    ) -> Result<Vec<comment_model::Model>, StoreError> {
        Ok(comments::get_comments_by_portfolio(&self.db, portfolio_id).await?)
    }
}
