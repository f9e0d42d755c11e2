use anyhow::Result;
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DeleteResult, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::calendar_event;
use crate::static_service::DATABASE_CONNECTION;

pub struct CalendarEventRepository;

impl CalendarEventRepository {
    pub fn new() -> Self {
        Self
    }

    fn get_connection(&self) -> &'static DatabaseConnection {
        DATABASE_CONNECTION
            .get()
            .expect("DATABASE_CONNECTION not set")
    }

    pub async fn find_by_id(&self, event_id: Uuid) -> Result<Option<calendar_event::Model>> {
        let db = self.get_connection();
        let event = calendar_event::Entity::find_by_id(event_id).one(db).await?;
        Ok(event)
    }

    /// Events overlapping [from, to), soonest first. Either bound may
    /// be `None`, which leaves that side of the range open.
    pub async fn find_in_range(
        &self,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<Vec<calendar_event::Model>> {
        let db = self.get_connection();
        let mut query = calendar_event::Entity::find();
        if let Some(from) = from {
            query = query.filter(calendar_event::Column::EndsAt.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(calendar_event::Column::StartsAt.lt(to));
        }
        let events = query
            .order_by_asc(calendar_event::Column::StartsAt)
            .all(db)
            .await?;
        Ok(events)
    }

    pub async fn find_for_course(&self, course_id: Uuid) -> Result<Vec<calendar_event::Model>> {
        let db = self.get_connection();
        let events = calendar_event::Entity::find()
            .filter(calendar_event::Column::CourseId.eq(course_id))
            .order_by_asc(calendar_event::Column::StartsAt)
            .all(db)
            .await?;
        Ok(events)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        event_id: Uuid,
        title: String,
        description: Option<String>,
        location: Option<String>,
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
        course_id: Option<Uuid>,
        created_by: Uuid,
    ) -> Result<calendar_event::Model> {
        let db = self.get_connection();
        let now = Utc::now().naive_utc();
        let event_model = calendar_event::ActiveModel {
            event_id: Set(event_id),
            title: Set(title),
            description: Set(description),
            location: Set(location),
            starts_at: Set(starts_at),
            ends_at: Set(ends_at),
            course_id: Set(course_id),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = event_model.insert(db).await?;
        Ok(result)
    }

    pub async fn update(
        &self,
        event_id: Uuid,
        updates: CalendarEventUpdate,
    ) -> Result<calendar_event::Model> {
        let event = self
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Event not found"))?;
        let db = self.get_connection();

        let mut active_model: calendar_event::ActiveModel = event.into();

        if let Some(title) = updates.title {
            active_model.title = Set(title);
        }
        if let Some(description) = updates.description {
            active_model.description = Set(Some(description));
        }
        if let Some(location) = updates.location {
            active_model.location = Set(Some(location));
        }
        if let Some(starts_at) = updates.starts_at {
            active_model.starts_at = Set(starts_at);
        }
        if let Some(ends_at) = updates.ends_at {
            active_model.ends_at = Set(ends_at);
        }

        active_model.updated_at = Set(Utc::now().naive_utc());

        let result = active_model.update(db).await?;
        Ok(result)
    }

    pub async fn delete(&self, event_id: Uuid) -> Result<DeleteResult> {
        let event = self
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Event not found"))?;
        let db = self.get_connection();

        let active_model: calendar_event::ActiveModel = event.into();
        let result = active_model.delete(db).await?;
        Ok(result)
    }
}

pub struct CalendarEventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
}
