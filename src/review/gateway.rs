//! Role-scoped facades over the Transition Engine.
//!
//! An `AdvisorDesk` can only issue advisor actions and a `SuperAdminDesk`
//! only super-admin actions. Neither validates anything itself: the resolved
//! actor is passed through and the engine decides.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::ReviewError;
use crate::models::portfolio::{self, Status};
use crate::review::actor::Actor;
use crate::review::engine::TransitionEngine;
use crate::review::rules::Action;

#[derive(Clone)]
pub struct ReviewGateway {
    engine: Arc<TransitionEngine>,
}

impl ReviewGateway {
    pub fn new(engine: Arc<TransitionEngine>) -> Self {
        Self { engine }
    }

    pub fn advisor(&self) -> AdvisorDesk<'_> {
        AdvisorDesk {
            engine: &self.engine,
        }
    }

    pub fn super_admin(&self) -> SuperAdminDesk<'_> {
        SuperAdminDesk {
            engine: &self.engine,
        }
    }
}

/// First-tier review: pending → in_process or failed.
pub struct AdvisorDesk<'a> {
    engine: &'a TransitionEngine,
}

impl AdvisorDesk<'_> {
    pub async fn queue(&self, actor: &Actor) -> Result<Vec<portfolio::Model>, ReviewError> {
        self.engine.review_queue(actor, Status::Pending).await
    }

    pub async fn approve(&self, actor: &Actor, id: Uuid) -> Result<portfolio::Model, ReviewError> {
        self.engine.apply(actor, id, Action::AdvisorApprove).await
    }

    pub async fn reject(
        &self,
        actor: &Actor,
        id: Uuid,
        feedback: String,
    ) -> Result<portfolio::Model, ReviewError> {
        self.engine
            .apply(actor, id, Action::AdvisorReject { feedback })
            .await
    }
}

/// Second-tier review: in_process → approved or failed.
pub struct SuperAdminDesk<'a> {
    engine: &'a TransitionEngine,
}

impl SuperAdminDesk<'_> {
    pub async fn queue(&self, actor: &Actor) -> Result<Vec<portfolio::Model>, ReviewError> {
        self.engine.review_queue(actor, Status::InProcess).await
    }

    pub async fn approve(&self, actor: &Actor, id: Uuid) -> Result<portfolio::Model, ReviewError> {
        self.engine.apply(actor, id, Action::SuperApprove).await
    }

    pub async fn reject(
        &self,
        actor: &Actor,
        id: Uuid,
        feedback: String,
    ) -> Result<portfolio::Model, ReviewError> {
        self.engine
            .apply(actor, id, Action::SuperReject { feedback })
            .await
    }
}
