use anyhow::Result;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{notification, user};
use crate::static_service::DATABASE_CONNECTION;

pub struct NotificationRepository;

impl NotificationRepository {
    pub fn new() -> Self {
        Self
    }

    fn get_connection(&self) -> &'static DatabaseConnection {
        DATABASE_CONNECTION
            .get()
            .expect("DATABASE_CONNECTION not set")
    }

    pub async fn find_for_user(&self, user_id: Uuid) -> Result<Vec<notification::Model>> {
        let db = self.get_connection();
        let notifications = notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(notifications)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<u64> {
        let db = self.get_connection();
        let count = notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::ReadAt.is_null())
            .count(db)
            .await?;
        Ok(count)
    }

    pub async fn create(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
        title: String,
        body: String,
    ) -> Result<notification::Model> {
        let db = self.get_connection();
        let notification_model = notification::ActiveModel {
            notification_id: Set(notification_id),
            user_id: Set(user_id),
            title: Set(title),
            body: Set(body),
            read_at: Set(None),
            created_at: Set(Utc::now().naive_utc()),
        };

        let result = notification_model.insert(db).await?;
        Ok(result)
    }

    /// One notification per active user. Returns how many were sent.
    pub async fn broadcast(&self, title: &str, body: &str) -> Result<u64> {
        let db = self.get_connection();
        let recipients = user::Entity::find()
            .filter(user::Column::Active.eq(true))
            .all(db)
            .await?;
        if recipients.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().naive_utc();
        let rows: Vec<notification::ActiveModel> = recipients
            .iter()
            .map(|recipient| notification::ActiveModel {
                notification_id: Set(Uuid::new_v4()),
                user_id: Set(recipient.user_id),
                title: Set(title.to_string()),
                body: Set(body.to_string()),
                read_at: Set(None),
                created_at: Set(now),
            })
            .collect();

        let sent = rows.len() as u64;
        notification::Entity::insert_many(rows).exec(db).await?;
        Ok(sent)
    }

    /// Only the owner can mark a notification read; marking twice
    /// keeps the original read timestamp.
    pub async fn mark_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<notification::Model>> {
        let db = self.get_connection();
        let Some(row) = notification::Entity::find_by_id(notification_id)
            .filter(notification::Column::UserId.eq(user_id))
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        if row.read_at.is_some() {
            return Ok(Some(row));
        }

        let mut active_model: notification::ActiveModel = row.into();
        active_model.read_at = Set(Some(Utc::now().naive_utc()));
        let result = active_model.update(db).await?;
        Ok(Some(result))
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let db = self.get_connection();
        let result = notification::Entity::update_many()
            .col_expr(
                notification::Column::ReadAt,
                Expr::value(Utc::now().naive_utc()),
            )
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::ReadAt.is_null())
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Course-event fanout helper: notifies every student on a course
    /// roster, e.g. when a schedule slot changes.
    pub async fn notify_roster(
        &self,
        student_ids: &[Uuid],
        title: &str,
        body: &str,
    ) -> Result<u64> {
        if student_ids.is_empty() {
            return Ok(0);
        }
        let db = self.get_connection();
        let now = Utc::now().naive_utc();
        let rows: Vec<notification::ActiveModel> = student_ids
            .iter()
            .map(|student_id| notification::ActiveModel {
                notification_id: Set(Uuid::new_v4()),
                user_id: Set(*student_id),
                title: Set(title.to_string()),
                body: Set(body.to_string()),
                read_at: Set(None),
                created_at: Set(now),
            })
            .collect();

        let sent = rows.len() as u64;
        notification::Entity::insert_many(rows).exec(db).await?;
        Ok(sent)
    }
}
