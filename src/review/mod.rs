//! Portfolio review workflow: the role-gated state machine that moves a
//! portfolio from draft through advisor and super-admin review.

pub mod actor;
pub mod engine;
pub mod gateway;
pub mod rules;
pub mod store;

pub use actor::Actor;
pub use engine::TransitionEngine;
pub use gateway::{AdvisorDesk, ReviewGateway, SuperAdminDesk};
pub use rules::{Action, ActionKind};
pub use store::{CommentStore, InMemoryStore, PortfolioStore};
