//! The Transition Engine: the only code that changes a portfolio's status.
//!
//! Every transition is a read-check-write sequence run under a per-portfolio
//! lock, and the final write is a compare-and-swap on `version`, so two
//! concurrent approvals of the same portfolio can never both succeed.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ReviewSettings;
use crate::error::ReviewError;
use crate::models::PaginationQuery;
use crate::models::comments;
use crate::models::portfolio::{self, FileRefs, NewPortfolio, PortfolioChanges, Status, Visibility};
use crate::models::users::Roles;
use crate::review::actor::Actor;
use crate::review::rules::{self, Action, Gate, Transition};
use crate::review::store::{CommentStore, PortfolioStore};

/// Per-portfolio async locks. Entries are dropped once nobody holds or waits on them.
#[derive(Default)]
struct RecordLocks {
    inner: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl RecordLocks {
    fn table(&self) -> MutexGuard<'_, HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `work` while holding the lock for `id`.
    async fn run<F: Future>(&self, id: Uuid, work: F) -> F::Output {
        let lock = self.table().entry(id).or_default().clone();
        let entry = LockEntry {
            id,
            lock,
            locks: self,
        };
        let _held = entry.lock.lock().await;
        work.await
    }
}

/// A checked-out table entry. Dropping it, whether after the lock was held
/// or while still waiting, prunes the entry if it was the last user.
struct LockEntry<'a> {
    id: Uuid,
    lock: Arc<tokio::sync::Mutex<()>>,
    locks: &'a RecordLocks,
}

impl Drop for LockEntry<'_> {
    fn drop(&mut self) {
        let mut table = self.locks.table();
        // The table's reference plus this entry's own.
        if Arc::strong_count(&self.lock) == 2 {
            table.remove(&self.id);
        }
    }
}

pub struct TransitionEngine {
    portfolios: Arc<dyn PortfolioStore>,
    comments: Arc<dyn CommentStore>,
    settings: ReviewSettings,
    locks: RecordLocks,
}

impl TransitionEngine {
    pub fn new(
        portfolios: Arc<dyn PortfolioStore>,
        comments: Arc<dyn CommentStore>,
        settings: ReviewSettings,
    ) -> Self {
        Self {
            portfolios,
            comments,
            settings,
            locks: RecordLocks::default(),
        }
    }

    /// Build an engine over a single backend that stores both portfolios and comments.
    pub fn with_store<S>(store: Arc<S>, settings: ReviewSettings) -> Self
    where
        S: PortfolioStore + CommentStore + 'static,
    {
        Self::new(store.clone(), store, settings)
    }

    pub fn settings(&self) -> &ReviewSettings {
        &self.settings
    }

    /// Upload a new portfolio, either as a draft or straight into review.
    pub async fn create(
        &self,
        actor: &Actor,
        input: NewPortfolio,
    ) -> Result<portfolio::Model, ReviewError> {
        if actor.role != Roles::Student {
            return Err(ReviewError::Unauthorized(format!(
                "only students can upload portfolios, not {}",
                actor.role
            )));
        }

        let now = chrono::Utc::now();
        let portfolio = portfolio::Model {
            id: Uuid::new_v4(),
            owner_id: actor.id,
            title: input.title,
            university: input.university,
            year: input.year,
            category: input.category,
            description: input.description,
            files: FileRefs(input.files),
            status: if input.submit {
                Status::Pending
            } else {
                Status::Draft
            },
            visibility: None,
            feedback: None,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        if input.submit {
            rules::validate_submission(&portfolio, &self.settings)?;
        } else {
            rules::validate_draft(&portfolio, &self.settings)?;
        }

        let saved = self.portfolios.save(portfolio).await?;
        info!(portfolio_id = %saved.id, owner = %actor, status = %saved.status, "portfolio created");
        Ok(saved)
    }

    /// Change fields or files of a draft or failed portfolio without moving it.
    pub async fn edit(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: PortfolioChanges,
    ) -> Result<portfolio::Model, ReviewError> {
        self.locks.run(id, self.edit_locked(actor, id, changes)).await
    }

    async fn edit_locked(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: PortfolioChanges,
    ) -> Result<portfolio::Model, ReviewError> {
        let current = self.portfolios.get(id).await?;

        if current.owner_id != actor.id {
            return Err(ReviewError::Unauthorized(
                "only the owner may edit this portfolio".to_string(),
            ));
        }
        if !rules::is_editable(current.status) {
            return Err(ReviewError::InvalidTransition {
                action: "edit",
                from: current.status,
            });
        }

        let mut next = current;
        changes.apply_to(&mut next);
        rules::validate_draft(&next, &self.settings)?;
        next.updated_at = chrono::Utc::now();

        let saved = self.portfolios.save(next).await?;
        debug!(portfolio_id = %id, owner = %actor, "portfolio edited");
        Ok(saved)
    }

    /// Validate and apply one status transition. Either the whole transition
    /// is persisted or nothing is.
    pub async fn apply(
        &self,
        actor: &Actor,
        id: Uuid,
        action: Action,
    ) -> Result<portfolio::Model, ReviewError> {
        let kind = action.kind();
        let result = self.apply_checked(actor, id, action).await;
        if let Err(e) = &result {
            debug!(portfolio_id = %id, action = %kind, actor = %actor, kind = e.kind(), "transition refused: {e}");
        }
        result
    }

    async fn apply_checked(
        &self,
        actor: &Actor,
        id: Uuid,
        action: Action,
    ) -> Result<portfolio::Model, ReviewError> {
        let kind = action.kind();
        let rule = rules::transition_for(kind);

        // Role gates are decided before the current state is even looked at.
        if !rule.gate.admits_role(actor.role) {
            return Err(ReviewError::Unauthorized(format!(
                "{kind} is not permitted for the {} role",
                actor.role
            )));
        }
        if let Action::AdvisorReject { feedback } | Action::SuperReject { feedback } = &action {
            rules::validate_feedback(feedback)?;
        }

        self.locks
            .run(id, self.transition_locked(actor, id, action, rule))
            .await
    }

    async fn transition_locked(
        &self,
        actor: &Actor,
        id: Uuid,
        action: Action,
        rule: &'static Transition,
    ) -> Result<portfolio::Model, ReviewError> {
        let kind = action.kind();
        let current = self.portfolios.get(id).await?;

        if rule.gate == Gate::Owner && current.owner_id != actor.id {
            return Err(ReviewError::Unauthorized(format!(
                "only the owner may {kind} this portfolio"
            )));
        }
        let disabled = kind == rules::ActionKind::SuperReject && !self.settings.allow_super_reject;
        if disabled || current.status != rule.from {
            return Err(ReviewError::InvalidTransition {
                action: kind.as_str(),
                from: current.status,
            });
        }

        let mut next = current.clone();
        match action {
            Action::Submit(changes) | Action::Resubmit(changes) => {
                changes.apply_to(&mut next);
                rules::validate_submission(&next, &self.settings)?;
                next.feedback = None;
                next.visibility = None;
            }
            Action::AdvisorApprove => {}
            Action::AdvisorReject { feedback } | Action::SuperReject { feedback } => {
                next.feedback = Some(feedback);
                next.visibility = None;
            }
            Action::SuperApprove => {
                next.visibility = Some(Visibility::Private);
            }
            Action::SetVisibility(target) => {
                if current.visibility == Some(target) {
                    debug!(portfolio_id = %id, visibility = ?target, "visibility unchanged");
                    return Ok(current);
                }
                next.visibility = Some(target);
            }
        }
        next.status = rule.to;
        next.updated_at = chrono::Utc::now();

        let saved = self.portfolios.save(next).await?;
        info!(
            portfolio_id = %id,
            action = %kind,
            from = %current.status,
            to = %saved.status,
            actor = %actor,
            "transition applied"
        );
        Ok(saved)
    }

    /// Read a portfolio as `actor` is allowed to see it. Hidden records
    /// report `NotFound` so their existence does not leak.
    pub async fn get_for(&self, actor: &Actor, id: Uuid) -> Result<portfolio::Model, ReviewError> {
        let portfolio = self.portfolios.get(id).await?;
        let visible = portfolio.owner_id == actor.id
            || (actor.role.is_reviewer() && portfolio.status != Status::Draft)
            || portfolio.is_published();

        if visible {
            Ok(portfolio)
        } else {
            Err(ReviewError::NotFound(id))
        }
    }

    /// Every portfolio the actor owns, most recently changed first.
    pub async fn list_by_owner(&self, actor: &Actor) -> Result<Vec<portfolio::Model>, ReviewError> {
        let mut owned = self.portfolios.list_by_owner(actor.id).await?;
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }

    /// Portfolios waiting at `stage`, oldest first. Advisors read the
    /// pending queue and super-admins the in-process queue; drafts never
    /// appear in either.
    pub async fn review_queue(
        &self,
        actor: &Actor,
        stage: Status,
    ) -> Result<Vec<portfolio::Model>, ReviewError> {
        let allowed = matches!(
            (actor.role, stage),
            (Roles::Advisor, Status::Pending) | (Roles::SuperAdmin, Status::InProcess)
        );
        if !allowed {
            return Err(ReviewError::Unauthorized(format!(
                "the {} role cannot read the {stage} queue",
                actor.role
            )));
        }
        let mut queue = self.portfolios.list_by_status(stage).await?;
        queue.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));
        Ok(queue)
    }

    pub async fn public_gallery(
        &self,
        page: &PaginationQuery,
    ) -> Result<Vec<portfolio::Model>, ReviewError> {
        Ok(self
            .portfolios
            .list_public(page.offset(), page.limit())
            .await?)
    }

    /// A published portfolio; anything else is `NotFound`.
    pub async fn public_portfolio(&self, id: Uuid) -> Result<portfolio::Model, ReviewError> {
        let portfolio = self.portfolios.get(id).await?;
        if portfolio.is_published() {
            Ok(portfolio)
        } else {
            Err(ReviewError::NotFound(id))
        }
    }

    pub async fn add_comment(
        &self,
        actor: &Actor,
        id: Uuid,
        text: &str,
    ) -> Result<comments::Model, ReviewError> {
        let portfolio = self.public_portfolio(id).await?;
        let text = rules::validate_comment(text, self.settings.max_comment_len)?;

        let comment = comments::Model {
            id: Uuid::new_v4(),
            portfolio_id: portfolio.id,
            author_id: actor.id,
            text,
            created_at: chrono::Utc::now(),
        };
        let saved = self.comments.add_comment(comment).await?;
        debug!(portfolio_id = %id, author = %actor, "comment added");
        Ok(saved)
    }

    pub async fn list_comments(&self, id: Uuid) -> Result<Vec<comments::Model>, ReviewError> {
        let portfolio = self.public_portfolio(id).await?;
        Ok(self.comments.list_comments(portfolio.id).await?)
    }
}
