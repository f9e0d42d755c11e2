use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::config::APP_CONFIG;
use crate::entities::{sea_orm_active_enums::RoleEnum, user};

/// Guarantees one admin account exists so a fresh deployment can be
/// administered at all. Tokens for it are minted out of band.
pub async fn initialize_admin_user(db: &DatabaseConnection) -> Result<()> {
    let admin_email: &str = &APP_CONFIG.admin_email;

    let existing_admin = user::Entity::find()
        .filter(user::Column::Email.eq(admin_email))
        .one(db)
        .await
        .context("Failed to check existing admin")?;

    if existing_admin.is_some() {
        tracing::info!("Admin user already exists, skipping initialization");
        return Ok(());
    }

    tracing::info!("Creating default admin user...");

    let user_id = Uuid::new_v4();
    let now = Utc::now().naive_utc();

    let admin_user = user::ActiveModel {
        user_id: Set(user_id),
        first_name: Set("System".to_string()),
        last_name: Set("Administrator".to_string()),
        email: Set(admin_email.to_string()),
        role: Set(RoleEnum::Admin),
        student_code: Set(None),
        department_id: Set(None),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    admin_user
        .insert(db)
        .await
        .context("Failed to insert admin user")?;

    tracing::info!("Admin user created successfully");
    tracing::info!("  Email: {}", admin_email);
    tracing::info!("  User ID: {}", user_id);

    Ok(())
}
