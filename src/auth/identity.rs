use moka::future::Cache;
use std::time::Duration;
use uuid::Uuid;

use crate::models::users;

/// Short-lived cache of resolved users, keyed by token subject.
///
/// Role changes made in the database take effect once the entry expires.
#[derive(Clone)]
pub struct IdentityCache {
    users: Cache<Uuid, users::Model>,
}

impl IdentityCache {
    pub fn new(ttl: Duration) -> Self {
        let users = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(10_000)
            .build();
        Self { users }
    }

    pub async fn get(&self, id: &Uuid) -> Option<users::Model> {
        self.users.get(id).await
    }

    pub async fn insert(&self, user: users::Model) {
        self.users.insert(user.id, user).await;
    }
}
