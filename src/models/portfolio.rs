use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review lifecycle of a portfolio, stored as a snake_case string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_process")]
    InProcess,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::Draft => "draft",
            Status::Pending => "pending",
            Status::InProcess => "in_process",
            Status::Approved => "approved",
            Status::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Owner-controlled publication flag of an approved portfolio.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[sea_orm(string_value = "private")]
    Private,
    #[sea_orm(string_value = "public")]
    Public,
}

/// Ordered list of opaque stored-file references, persisted as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct FileRefs(pub Vec<String>);

impl FileRefs {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for FileRefs {
    fn from(files: Vec<String>) -> Self {
        Self(files)
    }
}

/// SeaORM entity for the `portfolios` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "portfolios")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub university: String,
    pub year: String,
    pub category: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub files: FileRefs,
    pub status: Status,
    pub visibility: Option<Visibility>,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,
    /// Bumped on every save; writes compare against the value they read.
    pub version: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Approved and switched to public by its owner.
    pub fn is_published(&self) -> bool {
        self.status == Status::Approved && self.visibility == Some(Visibility::Public)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Request body for POST /api/portfolios.
///
/// `submit = false` keeps the portfolio as a draft; `true` sends it straight
/// to the advisor queue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPortfolio {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub university: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub submit: bool,
}

/// Partial update of the owner-editable fields. `files` replaces the whole list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioChanges {
    pub title: Option<String>,
    pub university: Option<String>,
    pub year: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub files: Option<Vec<String>>,
}

impl PortfolioChanges {
    pub fn apply_to(self, portfolio: &mut Model) {
        if let Some(title) = self.title {
            portfolio.title = title;
        }
        if let Some(university) = self.university {
            portfolio.university = university;
        }
        if let Some(year) = self.year {
            portfolio.year = year;
        }
        if let Some(category) = self.category {
            portfolio.category = category;
        }
        if let Some(description) = self.description {
            portfolio.description = description;
        }
        if let Some(files) = self.files {
            portfolio.files = FileRefs(files);
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateVisibility {
    pub visibility: Visibility,
}

/// Request body for the reviewer reject endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectPortfolio {
    #[serde(default)]
    pub feedback: String,
}
