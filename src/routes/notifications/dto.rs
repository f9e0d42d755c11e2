use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::notification;

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub notification_id: Uuid,
    pub title: String,
    pub body: String,
    pub read_at: Option<String>,
    pub created_at: String,
}

impl From<&notification::Model> for NotificationResponse {
    fn from(row: &notification::Model) -> Self {
        NotificationResponse {
            notification_id: row.notification_id,
            title: row.title.clone(),
            body: row.body.clone(),
            read_at: row
                .read_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
            created_at: row.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// The inbox split into its two tabs. Rows keep their stored order
/// (newest first) within each tab.
#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationListResponse {
    pub unread: Vec<NotificationResponse>,
    pub read: Vec<NotificationResponse>,
    pub unread_count: u64,
}

impl NotificationListResponse {
    pub fn from_rows(rows: &[notification::Model]) -> Self {
        let (unread, read): (Vec<_>, Vec<_>) = rows.iter().partition(|row| row.is_unread());
        let unread_count = unread.len() as u64;
        NotificationListResponse {
            unread: unread.into_iter().map(NotificationResponse::from).collect(),
            read: read.into_iter().map(NotificationResponse::from).collect(),
            unread_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendNotificationRequest {
    pub user_id: Uuid,

    #[schema(example = "Advising week")]
    pub title: String,

    #[schema(example = "Book an advising slot before Friday.")]
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BroadcastRequest {
    #[schema(example = "Registration opens Monday")]
    pub title: String,

    #[schema(example = "Fall registration opens at 9:00 on Monday.")]
    pub body: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BroadcastResponse {
    pub recipients: u64,
}

fn non_blank(value: &str, what: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} cannot be blank", what));
    }
    Ok(())
}

impl SendNotificationRequest {
    pub fn validate(&self) -> Result<(), String> {
        non_blank(&self.title, "Title")?;
        non_blank(&self.body, "Body")
    }
}

impl BroadcastRequest {
    pub fn validate(&self) -> Result<(), String> {
        non_blank(&self.title, "Title")?;
        non_blank(&self.body, "Body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(read: bool) -> notification::Model {
        let now = Utc::now().naive_utc();
        notification::Model {
            notification_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "t".to_string(),
            body: "b".to_string(),
            read_at: read.then_some(now),
            created_at: now,
        }
    }

    #[test]
    fn inbox_splits_by_read_state() {
        let rows = vec![row(false), row(true), row(false), row(false)];
        let response = NotificationListResponse::from_rows(&rows);
        assert_eq!(response.unread.len(), 3);
        assert_eq!(response.read.len(), 1);
        assert_eq!(response.unread_count, 3);
    }

    #[test]
    fn partition_keeps_relative_order() {
        let first = row(false);
        let second = row(false);
        let rows = vec![first.clone(), row(true), second.clone()];
        let response = NotificationListResponse::from_rows(&rows);
        assert_eq!(response.unread[0].notification_id, first.notification_id);
        assert_eq!(response.unread[1].notification_id, second.notification_id);
    }

    #[test]
    fn blank_title_is_rejected() {
        let request = BroadcastRequest {
            title: "   ".to_string(),
            body: "b".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
