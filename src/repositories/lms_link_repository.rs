use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::lms_link;
use crate::static_service::DATABASE_CONNECTION;

pub struct LmsLinkRepository;

impl LmsLinkRepository {
    pub fn new() -> Self {
        Self
    }

    fn get_connection(&self) -> &'static DatabaseConnection {
        DATABASE_CONNECTION
            .get()
            .expect("DATABASE_CONNECTION not set")
    }

    pub async fn find(&self, moodle_id: &str) -> Result<Option<lms_link::Model>> {
        let db = self.get_connection();
        let link = lms_link::Entity::find_by_id(moodle_id.to_string())
            .one(db)
            .await?;
        Ok(link)
    }

    /// Anchors a Moodle id on first reference. An existing row is left
    /// untouched; `last_synced` stays unset until the external system
    /// reports a sync.
    pub async fn ensure(&self, moodle_id: &str) -> Result<lms_link::Model> {
        if let Some(existing) = self.find(moodle_id).await? {
            return Ok(existing);
        }

        let db = self.get_connection();
        let now = Utc::now().naive_utc();
        let link_model = lms_link::ActiveModel {
            moodle_id: Set(moodle_id.to_string()),
            last_synced: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = link_model.insert(db).await?;
        Ok(result)
    }
}
