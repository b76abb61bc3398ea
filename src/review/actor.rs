use serde::Serialize;
use uuid::Uuid;

use crate::models::users::{self, Roles};

/// The resolved identity behind a request. Every engine call takes one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Roles,
}

impl Actor {
    pub fn new(id: Uuid, role: Roles) -> Self {
        Self { id, role }
    }

    pub fn student(id: Uuid) -> Self {
        Self::new(id, Roles::Student)
    }

    pub fn advisor(id: Uuid) -> Self {
        Self::new(id, Roles::Advisor)
    }

    pub fn super_admin(id: Uuid) -> Self {
        Self::new(id, Roles::SuperAdmin)
    }
}

impl From<&users::Model> for Actor {
    fn from(user: &users::Model) -> Self {
        Self::new(user.id, user.role)
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.role, self.id)
    }
}
