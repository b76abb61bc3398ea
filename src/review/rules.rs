//! The transition table and the field rules checked before a portfolio may
//! enter review.

use serde::Serialize;

use crate::config::ReviewSettings;
use crate::error::ReviewError;
use crate::models::portfolio::{self, PortfolioChanges, Status, Visibility};
use crate::models::users::Roles;

/// Categories a portfolio can be filed under.
pub const CATEGORIES: &[&str] = &[
    "AI",
    "ML",
    "BI",
    "QA",
    "UX/UI",
    "Database",
    "Software Engineering",
    "IOT",
    "Gaming",
    "Web Development",
    "Coding",
    "Data Science",
    "Hackathon",
    "Bigdata",
    "Data Analytics",
];

/// Name of a status-changing action, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Submit,
    AdvisorApprove,
    AdvisorReject,
    SuperApprove,
    SuperReject,
    Resubmit,
    SetVisibility,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Submit => "submit",
            ActionKind::AdvisorApprove => "advisor_approve",
            ActionKind::AdvisorReject => "advisor_reject",
            ActionKind::SuperApprove => "super_approve",
            ActionKind::SuperReject => "super_reject",
            ActionKind::Resubmit => "resubmit",
            ActionKind::SetVisibility => "set_visibility",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested transition together with its payload.
#[derive(Debug, Clone)]
pub enum Action {
    /// Draft → pending. Pending edits are applied before validation.
    Submit(PortfolioChanges),
    AdvisorApprove,
    AdvisorReject { feedback: String },
    SuperApprove,
    SuperReject { feedback: String },
    /// Failed → pending, usually carrying the corrected form.
    Resubmit(PortfolioChanges),
    SetVisibility(Visibility),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Submit(_) => ActionKind::Submit,
            Action::AdvisorApprove => ActionKind::AdvisorApprove,
            Action::AdvisorReject { .. } => ActionKind::AdvisorReject,
            Action::SuperApprove => ActionKind::SuperApprove,
            Action::SuperReject { .. } => ActionKind::SuperReject,
            Action::Resubmit(_) => ActionKind::Resubmit,
            Action::SetVisibility(_) => ActionKind::SetVisibility,
        }
    }
}

/// Who may perform an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// The student who owns the portfolio.
    Owner,
    /// Anyone holding this role.
    Role(Roles),
}

impl Gate {
    /// Role gates can be decided before the record is loaded.
    pub fn admits_role(self, role: Roles) -> bool {
        match self {
            Gate::Owner => true,
            Gate::Role(required) => required == role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub action: ActionKind,
    pub gate: Gate,
    pub from: Status,
    pub to: Status,
}

pub const TRANSITIONS: &[Transition] = &[
    Transition {
        action: ActionKind::Submit,
        gate: Gate::Owner,
        from: Status::Draft,
        to: Status::Pending,
    },
    Transition {
        action: ActionKind::AdvisorApprove,
        gate: Gate::Role(Roles::Advisor),
        from: Status::Pending,
        to: Status::InProcess,
    },
    Transition {
        action: ActionKind::AdvisorReject,
        gate: Gate::Role(Roles::Advisor),
        from: Status::Pending,
        to: Status::Failed,
    },
    Transition {
        action: ActionKind::SuperApprove,
        gate: Gate::Role(Roles::SuperAdmin),
        from: Status::InProcess,
        to: Status::Approved,
    },
    Transition {
        action: ActionKind::SuperReject,
        gate: Gate::Role(Roles::SuperAdmin),
        from: Status::InProcess,
        to: Status::Failed,
    },
    Transition {
        action: ActionKind::Resubmit,
        gate: Gate::Owner,
        from: Status::Failed,
        to: Status::Pending,
    },
    Transition {
        action: ActionKind::SetVisibility,
        gate: Gate::Owner,
        from: Status::Approved,
        to: Status::Approved,
    },
];

/// Row of the transition table for `kind`. Every kind has exactly one row.
pub fn transition_for(kind: ActionKind) -> &'static Transition {
    TRANSITIONS
        .iter()
        .find(|t| t.action == kind)
        .unwrap_or_else(|| unreachable!("no transition row for {kind}"))
}

/// Statuses in which the owner may still change fields and files.
pub fn is_editable(status: Status) -> bool {
    matches!(status, Status::Draft | Status::Failed)
}

/// Reject feedback must carry some text.
pub fn validate_feedback(feedback: &str) -> Result<(), ReviewError> {
    if feedback.trim().is_empty() {
        return Err(ReviewError::Validation(
            "feedback is required when rejecting a portfolio".to_string(),
        ));
    }
    Ok(())
}

/// Checks that hold in every state: file cap, and year/category well-formed
/// whenever they are filled in.
pub fn validate_draft(
    portfolio: &portfolio::Model,
    settings: &ReviewSettings,
) -> Result<(), ReviewError> {
    if portfolio.files.len() > settings.max_files {
        return Err(ReviewError::Validation(format!(
            "at most {} files may be attached, got {}",
            settings.max_files,
            portfolio.files.len()
        )));
    }
    if portfolio.files.0.iter().any(|f| f.trim().is_empty()) {
        return Err(ReviewError::Validation(
            "file references must not be empty".to_string(),
        ));
    }
    if !portfolio.year.trim().is_empty() {
        validate_year(&portfolio.year, settings)?;
    }
    if !portfolio.category.trim().is_empty() {
        validate_category(&portfolio.category)?;
    }
    Ok(())
}

/// Everything `validate_draft` checks, plus: all descriptive fields filled in
/// and at least one file attached.
pub fn validate_submission(
    portfolio: &portfolio::Model,
    settings: &ReviewSettings,
) -> Result<(), ReviewError> {
    let missing: Vec<&str> = [
        ("title", &portfolio.title),
        ("university", &portfolio.university),
        ("year", &portfolio.year),
        ("category", &portfolio.category),
        ("description", &portfolio.description),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(ReviewError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }
    if portfolio.files.is_empty() {
        return Err(ReviewError::Validation(
            "at least one file must be attached".to_string(),
        ));
    }
    validate_draft(portfolio, settings)
}

/// Trim a comment and enforce the length limit, returning the stored text.
pub fn validate_comment(text: &str, max_len: usize) -> Result<String, ReviewError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ReviewError::Validation("comment must not be empty".to_string()));
    }
    let len = text.chars().count();
    if len > max_len {
        return Err(ReviewError::Validation(format!(
            "comment is {len} characters, the limit is {max_len}"
        )));
    }
    Ok(text.to_string())
}

fn validate_year(year: &str, settings: &ReviewSettings) -> Result<(), ReviewError> {
    let parsed: i32 = year
        .trim()
        .parse()
        .map_err(|_| ReviewError::Validation(format!("year {year:?} is not a number")))?;
    if parsed < settings.min_year || parsed > settings.max_year {
        return Err(ReviewError::Validation(format!(
            "year must be between {} and {}",
            settings.min_year, settings.max_year
        )));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), ReviewError> {
    if CATEGORIES.contains(&category.trim()) {
        Ok(())
    } else {
        Err(ReviewError::Validation(format!(
            "unknown category {category:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::portfolio::FileRefs;
    use uuid::Uuid;

    fn settings() -> ReviewSettings {
        ReviewSettings {
            allow_super_reject: true,
            max_files: 3,
            max_comment_len: 10,
            min_year: 2020,
            max_year: 2025,
        }
    }

    fn complete() -> portfolio::Model {
        let now = chrono::Utc::now();
        portfolio::Model {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Sensor mesh".into(),
            university: "KMUTT".into(),
            year: "2024".into(),
            category: "IOT".into(),
            description: "Low-power mesh of soil sensors".into(),
            files: FileRefs(vec!["uploads/report.pdf".into()]),
            status: Status::Draft,
            visibility: None,
            feedback: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn every_action_has_exactly_one_row() {
        for kind in [
            ActionKind::Submit,
            ActionKind::AdvisorApprove,
            ActionKind::AdvisorReject,
            ActionKind::SuperApprove,
            ActionKind::SuperReject,
            ActionKind::Resubmit,
            ActionKind::SetVisibility,
        ] {
            let rows = TRANSITIONS.iter().filter(|t| t.action == kind).count();
            assert_eq!(rows, 1, "{kind}");
        }
    }

    #[test]
    fn drafts_are_never_a_reviewer_source_state() {
        for t in TRANSITIONS {
            if let Gate::Role(_) = t.gate {
                assert_ne!(t.from, Status::Draft, "{}", t.action);
            }
        }
    }

    #[test]
    fn role_gates_only_admit_their_role() {
        let gate = transition_for(ActionKind::SuperApprove).gate;
        assert!(gate.admits_role(Roles::SuperAdmin));
        assert!(!gate.admits_role(Roles::Advisor));
        assert!(!gate.admits_role(Roles::Student));
        assert!(Gate::Owner.admits_role(Roles::Recruiter));
    }

    #[test]
    fn submission_lists_every_missing_field() {
        let mut p = complete();
        p.title = "  ".into();
        p.category = String::new();
        let err = validate_submission(&p, &settings()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: missing required fields: title, category"
        );
    }

    #[test]
    fn submission_needs_a_file() {
        let mut p = complete();
        p.files = FileRefs::default();
        assert!(matches!(
            validate_submission(&p, &settings()),
            Err(ReviewError::Validation(_))
        ));
        assert!(validate_draft(&p, &settings()).is_ok());
    }

    #[test]
    fn file_cap_applies_to_drafts_too() {
        let mut p = complete();
        p.files = FileRefs((0..4).map(|i| format!("uploads/{i}.png")).collect());
        assert!(validate_draft(&p, &settings()).is_err());
    }

    #[test]
    fn year_and_category_are_checked_when_present() {
        let mut p = complete();
        p.year = "2019".into();
        assert!(validate_submission(&p, &settings()).is_err());
        p.year = "twenty".into();
        assert!(validate_draft(&p, &settings()).is_err());
        p.year = String::new();
        p.category = "Knitting".into();
        assert!(validate_draft(&p, &settings()).is_err());
        p.category = String::new();
        assert!(validate_draft(&p, &settings()).is_ok());
    }

    #[test]
    fn whitespace_feedback_is_rejected() {
        assert!(validate_feedback(" \n\t").is_err());
        assert!(validate_feedback("x").is_ok());
    }

    #[test]
    fn comments_are_trimmed_and_capped_by_characters() {
        assert_eq!(validate_comment("  nice  ", 10).unwrap(), "nice");
        assert!(validate_comment("   ", 10).is_err());
        // ten multi-byte characters still fit
        assert!(validate_comment("ดีมากเลยคะ", 10).is_ok());
        assert!(validate_comment("eleven char", 10).is_err());
    }
}
