use sea_orm::*;
use crate::models::users::{self, CreateUserFromAuth, Roles};

/// Find the user behind a token subject, creating a student account on first sight.
pub async fn find_or_create_from_auth(
    db: &DatabaseConnection,
    input: CreateUserFromAuth,
) -> Result<users::Model, DbErr> {
    if let Some(existing) = users::Entity::find_by_id(input.id).one(db).await? {
        return Ok(existing);
    }

    // Reviewer roles are granted out of band; everyone starts as a student.
    let new_user = users::ActiveModel {
        id: Set(input.id),
        email: Set(input.email),
        display_name: Set(input.display_name),
        role: Set(Roles::Student),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_user.insert(db).await
}
