use anyhow::Result;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

use super::enrollment_outcome::{DropOutcome, RegisterOutcome};
use crate::catalog::schedule_format::{self, ScheduleSlot};
use crate::entities::sea_orm_active_enums::EnrollmentStatus;
use crate::entities::{course, enrollment, schedule, user};
use crate::static_service::DATABASE_CONNECTION;

/// One row of the "my schedule" view: the student's enrollment, the
/// course it points at and the formatted meeting summary.
#[derive(Debug, Clone)]
pub struct ScheduleEntry {
    pub enrollment: enrollment::Model,
    pub course: course::Model,
    pub schedule_summary: String,
}

pub struct EnrollmentRepository;

impl EnrollmentRepository {
    pub fn new() -> Self {
        Self
    }

    fn get_connection(&self) -> &'static DatabaseConnection {
        DATABASE_CONNECTION
            .get()
            .expect("DATABASE_CONNECTION not set")
    }

    pub async fn find_one(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<enrollment::Model>> {
        let db = self.get_connection();
        let row = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::CourseId.eq(course_id))
            .one(db)
            .await?;
        Ok(row)
    }

    /// Rows in `registered` status for one course. Waitlisted and
    /// dropped rows do not consume seats.
    pub async fn count_registered(&self, course_id: Uuid) -> Result<u64> {
        let db = self.get_connection();
        let count = enrollment::Entity::find()
            .filter(enrollment::Column::CourseId.eq(course_id))
            .filter(enrollment::Column::Status.eq(EnrollmentStatus::Registered))
            .count(db)
            .await?;
        Ok(count)
    }

    /// The viewer's enrollment status per course, for resolving card
    /// statuses over a cached page.
    pub async fn find_status_map(
        &self,
        student_id: Uuid,
        course_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, EnrollmentStatus>> {
        if course_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let db = self.get_connection();
        let rows = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::CourseId.is_in(course_ids.to_vec()))
            .all(db)
            .await?;
        Ok(rows.into_iter().map(|e| (e.course_id, e.status)).collect())
    }

    /// Attempts to register `student_id` for `course_id`.
    ///
    /// The capacity check and the write are sequential, not atomic; the
    /// unique index on (student, course) keeps duplicate rows out and a
    /// concurrent race can only overshoot capacity, never corrupt state.
    /// A previously dropped enrollment is re-activated in place.
    pub async fn register(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        join_waitlist: bool,
    ) -> Result<RegisterOutcome> {
        let db = self.get_connection();

        let Some(course) = course::Entity::find_by_id(course_id).one(db).await? else {
            return Ok(RegisterOutcome::CourseNotFound);
        };

        let existing = self.find_one(student_id, course_id).await?;
        if let Some(row) = &existing {
            if row.status != EnrollmentStatus::Dropped {
                return Ok(RegisterOutcome::AlreadyEnrolled);
            }
        }

        let registered = self.count_registered(course_id).await?;
        let status = if registered >= course.capacity.max(0) as u64 {
            if !join_waitlist {
                return Ok(RegisterOutcome::CourseFull);
            }
            EnrollmentStatus::Waitlisted
        } else {
            EnrollmentStatus::Registered
        };

        let now = Utc::now().naive_utc();
        let model = match existing {
            Some(row) => {
                let mut active_model: enrollment::ActiveModel = row.into();
                active_model.status = Set(status);
                active_model.updated_at = Set(now);
                active_model.update(db).await?
            }
            None => {
                enrollment::ActiveModel {
                    enrollment_id: Set(Uuid::new_v4()),
                    student_id: Set(student_id),
                    course_id: Set(course_id),
                    status: Set(status),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(db)
                .await?
            }
        };

        Ok(match status {
            EnrollmentStatus::Waitlisted => RegisterOutcome::Waitlisted(model),
            _ => RegisterOutcome::Registered(model),
        })
    }

    /// Marks the enrollment dropped. The row stays; history keeps it
    /// and a later register re-activates it.
    pub async fn drop_course(&self, student_id: Uuid, course_id: Uuid) -> Result<DropOutcome> {
        let db = self.get_connection();

        match self.find_one(student_id, course_id).await? {
            Some(row) if row.status != EnrollmentStatus::Dropped => {
                let mut active_model: enrollment::ActiveModel = row.into();
                active_model.status = Set(EnrollmentStatus::Dropped);
                active_model.updated_at = Set(Utc::now().naive_utc());
                let model = active_model.update(db).await?;
                Ok(DropOutcome::Dropped(model))
            }
            _ => Ok(DropOutcome::NotEnrolled),
        }
    }

    /// Registered and waitlisted courses for one student, code
    /// ascending, with formatted schedule summaries.
    pub async fn find_my_schedule(&self, student_id: Uuid) -> Result<Vec<ScheduleEntry>> {
        let db = self.get_connection();

        let rows: Vec<(enrollment::Model, Option<course::Model>)> = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::Status.ne(EnrollmentStatus::Dropped))
            .find_also_related(course::Entity)
            .all(db)
            .await?;

        let course_ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|(_, c)| c.as_ref().map(|c| c.course_id))
            .collect();

        let mut slots_by_course: HashMap<Uuid, Vec<schedule::Model>> = HashMap::new();
        if !course_ids.is_empty() {
            let slot_rows = schedule::Entity::find()
                .filter(schedule::Column::CourseId.is_in(course_ids))
                .all(db)
                .await?;
            for slot in slot_rows {
                slots_by_course.entry(slot.course_id).or_default().push(slot);
            }
        }

        let mut entries: Vec<ScheduleEntry> = rows
            .into_iter()
            .filter_map(|(enrollment, course)| {
                let course = course?;
                let mut slots = slots_by_course.remove(&course.course_id).unwrap_or_default();
                slots.sort_by_key(|s| {
                    (
                        schedule_format::day_order(&s.day_of_week),
                        s.start_time.clone(),
                    )
                });
                let slot_views: Vec<ScheduleSlot> = slots.iter().map(ScheduleSlot::from).collect();
                Some(ScheduleEntry {
                    enrollment,
                    schedule_summary: schedule_format::format_schedule(&slot_views),
                    course,
                })
            })
            .collect();

        entries.sort_by(|a, b| a.course.code.cmp(&b.course.code));
        Ok(entries)
    }

    /// Every enrollment the student has ever had, dropped included,
    /// most recently changed first.
    pub async fn find_history(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<(enrollment::Model, course::Model)>> {
        let db = self.get_connection();
        let rows = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .find_also_related(course::Entity)
            .order_by_desc(enrollment::Column::UpdatedAt)
            .all(db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(e, c)| c.map(|c| (e, c)))
            .collect())
    }

    /// Students on one course's roster (registered or waitlisted).
    pub async fn find_roster(&self, course_id: Uuid) -> Result<Vec<enrollment::Model>> {
        let db = self.get_connection();
        let rows = enrollment::Entity::find()
            .filter(enrollment::Column::CourseId.eq(course_id))
            .filter(enrollment::Column::Status.ne(EnrollmentStatus::Dropped))
            .order_by_asc(enrollment::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(rows)
    }

    /// Roster rows paired with the student records, for instructor views.
    pub async fn find_roster_with_students(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<(enrollment::Model, user::Model)>> {
        let db = self.get_connection();
        let rows = enrollment::Entity::find()
            .filter(enrollment::Column::CourseId.eq(course_id))
            .filter(enrollment::Column::Status.ne(EnrollmentStatus::Dropped))
            .find_also_related(user::Entity)
            .order_by_asc(enrollment::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(e, u)| u.map(|u| (e, u)))
            .collect())
    }
}
