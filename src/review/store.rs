//! Storage seams for the review engine.
//!
//! `PortfolioStore` is plain keyed persistence: it never validates a
//! transition. `save` is a compare-and-swap on `version` so that writers in
//! different processes cannot silently overwrite each other.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::comments;
use crate::models::portfolio::{self, Status};

#[async_trait]
pub trait PortfolioStore: Send + Sync {
    /// Fetch a portfolio, failing with `StoreError::NotFound` if absent.
    async fn get(&self, id: Uuid) -> Result<portfolio::Model, StoreError>;

    /// All portfolios owned by `owner_id`, in no particular order.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<portfolio::Model>, StoreError>;

    async fn list_by_status(&self, status: Status) -> Result<Vec<portfolio::Model>, StoreError>;

    /// Approved portfolios whose owner made them public, newest first.
    async fn list_public(&self, offset: u64, limit: u64)
    -> Result<Vec<portfolio::Model>, StoreError>;

    /// Persist the full record.
    ///
    /// `portfolio.version` must be the version that was read (0 for a record
    /// that has never been saved). The stored copy gets `version + 1` and is
    /// returned. A version mismatch fails with `StoreError::Conflict` and
    /// writes nothing.
    async fn save(&self, portfolio: portfolio::Model) -> Result<portfolio::Model, StoreError>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn add_comment(&self, comment: comments::Model) -> Result<comments::Model, StoreError>;

    /// Comments on a portfolio, oldest first.
    async fn list_comments(&self, portfolio_id: Uuid) -> Result<Vec<comments::Model>, StoreError>;
}

/// In-memory store backed by `HashMap`s behind `RwLock`s. State is lost on restart.
#[derive(Default)]
pub struct InMemoryStore {
    portfolios: RwLock<HashMap<Uuid, portfolio::Model>>,
    comments: RwLock<Vec<comments::Model>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PortfolioStore for InMemoryStore {
    async fn get(&self, id: Uuid) -> Result<portfolio::Model, StoreError> {
        let portfolios = self.portfolios.read().await;
        portfolios.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<portfolio::Model>, StoreError> {
        let portfolios = self.portfolios.read().await;
        Ok(portfolios
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_by_status(&self, status: Status) -> Result<Vec<portfolio::Model>, StoreError> {
        let portfolios = self.portfolios.read().await;
        Ok(portfolios
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect())
    }

    async fn list_public(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<portfolio::Model>, StoreError> {
        let portfolios = self.portfolios.read().await;
        let mut public: Vec<portfolio::Model> = portfolios
            .values()
            .filter(|p| p.is_published())
            .cloned()
            .collect();
        public.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(public
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn save(&self, mut portfolio: portfolio::Model) -> Result<portfolio::Model, StoreError> {
        let mut portfolios = self.portfolios.write().await;
        let stored_version = portfolios.get(&portfolio.id).map(|p| p.version).unwrap_or(0);
        if stored_version != portfolio.version {
            return Err(StoreError::Conflict(portfolio.id));
        }

        portfolio.version += 1;
        portfolios.insert(portfolio.id, portfolio.clone());
        Ok(portfolio)
    }
}

#[async_trait]
impl CommentStore for InMemoryStore {
    async fn add_comment(&self, comment: comments::Model) -> Result<comments::Model, StoreError> {
        let mut all = self.comments.write().await;
        all.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, portfolio_id: Uuid) -> Result<Vec<comments::Model>, StoreError> {
        let all = self.comments.read().await;
        let mut found: Vec<comments::Model> = all
            .iter()
            .filter(|c| c.portfolio_id == portfolio_id)
            .cloned()
            .collect();
        found.sort_by_key(|c| c.created_at);
        Ok(found)
    }
}
