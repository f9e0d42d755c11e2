use anyhow::Result;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DeleteResult, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

use super::lms_link_repository::LmsLinkRepository;
use crate::catalog::filter::{self, CourseFilter};
use crate::catalog::schedule_format::{self, ScheduleSlot};
use crate::entities::sea_orm_active_enums::{DayOfWeek, DeliveryMode, EnrollmentStatus};
use crate::entities::{course, department, enrollment, schedule, user};
use crate::static_service::DATABASE_CONNECTION;

/// One course with everything a card needs except the viewer's own
/// status. Viewer-independent, so whole pages of these are cacheable.
#[derive(Debug, Clone)]
pub struct CourseListing {
    pub course: course::Model,
    pub department_code: String,
    pub instructor_name: Option<String>,
    pub schedule_summary: String,
    pub registered_count: u64,
}

#[derive(Debug, Clone)]
pub struct CoursePage {
    pub listings: Vec<CourseListing>,
    pub total_items: u64,
    pub total_pages: u64,
}

pub struct CourseRepository;

impl CourseRepository {
    pub fn new() -> Self {
        Self
    }

    fn get_connection(&self) -> &'static DatabaseConnection {
        DATABASE_CONNECTION
            .get()
            .expect("DATABASE_CONNECTION not set")
    }

    /// Translates the filter into SQL. All filters are conjunctive;
    /// the search term matches code, title or instructor name, all
    /// case-insensitively (LOWER + LIKE, portable across backends).
    fn filtered_query(&self, course_filter: &CourseFilter) -> Select<course::Entity> {
        let mut query = course::Entity::find();

        if let Some(department_id) = course_filter.department_id {
            query = query.filter(course::Column::DepartmentId.eq(department_id));
        }
        if let Some(mode) = course_filter.delivery_mode {
            query = query.filter(course::Column::DeliveryMode.eq(mode));
        }
        if let Some(min) = course_filter.min_level {
            query = query.filter(course::Column::Level.gte(min));
        }
        if let Some(max) = course_filter.max_level {
            query = query.filter(course::Column::Level.lte(max));
        }
        if let Some(semester) = &course_filter.semester {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(course::Column::Semester)))
                    .eq(semester.to_lowercase()),
            );
        }
        if let Some(year) = course_filter.year {
            query = query.filter(course::Column::Year.eq(year));
        }
        if let Some(term) = &course_filter.search {
            let pattern = format!("%{}%", term.to_lowercase());
            let instructor_subquery = Query::select()
                .column(user::Column::UserId)
                .from(user::Entity)
                .and_where(
                    Expr::expr(Func::lower(Expr::cust("first_name || ' ' || last_name")))
                        .like(&pattern),
                )
                .to_owned();
            query = query.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(course::Column::Code))).like(&pattern))
                    .add(Expr::expr(Func::lower(Expr::col(course::Column::Title))).like(&pattern))
                    .add(course::Column::InstructorId.in_subquery(instructor_subquery)),
            );
        }

        query
    }

    /// One page of the filtered catalog, code-ascending, with the total
    /// count taken before the page window is applied. A page past the
    /// end returns empty listings with the true totals.
    pub async fn find_page(
        &self,
        course_filter: &CourseFilter,
        page: u64,
        page_size: u64,
    ) -> Result<CoursePage> {
        let db = self.get_connection();

        let query = self.filtered_query(course_filter);
        let total_items = query.clone().count(db).await?;
        let total_pages = filter::total_pages(total_items, page_size);

        // Every page past the end is the same empty page, so the offset
        // never needs to grow beyond one page past the last.
        let page = page.clamp(1, total_pages.saturating_add(1));

        let courses = query
            .order_by_asc(course::Column::Code)
            .limit(page_size)
            .offset((page - 1) * page_size)
            .all(db)
            .await?;

        let listings = self.assemble_listings(courses).await?;

        Ok(CoursePage {
            listings,
            total_items,
            total_pages,
        })
    }

    pub async fn find_by_id(&self, course_id: Uuid) -> Result<Option<course::Model>> {
        let db = self.get_connection();
        let course = course::Entity::find_by_id(course_id).one(db).await?;
        Ok(course)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<course::Model>> {
        let db = self.get_connection();
        let course = course::Entity::find()
            .filter(course::Column::Code.eq(code))
            .one(db)
            .await?;
        Ok(course)
    }

    pub async fn find_listing(&self, course_id: Uuid) -> Result<Option<CourseListing>> {
        let db = self.get_connection();
        let Some(course) = course::Entity::find_by_id(course_id).one(db).await? else {
            return Ok(None);
        };
        let mut listings = self.assemble_listings(vec![course]).await?;
        Ok(listings.pop())
    }

    pub async fn find_by_instructor(&self, instructor_id: Uuid) -> Result<Vec<CourseListing>> {
        let db = self.get_connection();
        let courses = course::Entity::find()
            .filter(course::Column::InstructorId.eq(instructor_id))
            .order_by_asc(course::Column::Code)
            .all(db)
            .await?;
        self.assemble_listings(courses).await
    }

    pub async fn count_in_department(&self, department_id: Uuid) -> Result<u64> {
        let db = self.get_connection();
        let count = course::Entity::find()
            .filter(course::Column::DepartmentId.eq(department_id))
            .count(db)
            .await?;
        Ok(count)
    }

    /// Joins in department codes, instructor names, schedule summaries
    /// and registered counts for a batch of courses, one query per
    /// concern instead of one per course.
    async fn assemble_listings(&self, courses: Vec<course::Model>) -> Result<Vec<CourseListing>> {
        if courses.is_empty() {
            return Ok(Vec::new());
        }
        let db = self.get_connection();

        let course_ids: Vec<Uuid> = courses.iter().map(|c| c.course_id).collect();
        let department_ids: Vec<Uuid> = courses.iter().map(|c| c.department_id).collect();
        let instructor_ids: Vec<Uuid> = courses.iter().filter_map(|c| c.instructor_id).collect();

        let department_codes: HashMap<Uuid, String> = department::Entity::find()
            .filter(department::Column::DepartmentId.is_in(department_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|d| (d.department_id, d.code))
            .collect();

        let instructor_names: HashMap<Uuid, String> = user::Entity::find()
            .filter(user::Column::UserId.is_in(instructor_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.user_id, u.full_name()))
            .collect();

        let mut slots_by_course: HashMap<Uuid, Vec<schedule::Model>> = HashMap::new();
        let slot_rows = schedule::Entity::find()
            .filter(schedule::Column::CourseId.is_in(course_ids.clone()))
            .all(db)
            .await?;
        for slot in slot_rows {
            slots_by_course.entry(slot.course_id).or_default().push(slot);
        }

        let mut registered_counts: HashMap<Uuid, u64> = HashMap::new();
        let counted: Vec<(Uuid, i64)> = enrollment::Entity::find()
            .select_only()
            .column(enrollment::Column::CourseId)
            .column_as(enrollment::Column::EnrollmentId.count(), "cnt")
            .filter(enrollment::Column::CourseId.is_in(course_ids))
            .filter(enrollment::Column::Status.eq(EnrollmentStatus::Registered))
            .group_by(enrollment::Column::CourseId)
            .into_tuple()
            .all(db)
            .await?;
        for (course_id, count) in counted {
            registered_counts.insert(course_id, count.max(0) as u64);
        }

        let listings = courses
            .into_iter()
            .map(|course| {
                let mut slots = slots_by_course.remove(&course.course_id).unwrap_or_default();
                slots.sort_by_key(|s| {
                    (
                        schedule_format::day_order(&s.day_of_week),
                        s.start_time.clone(),
                    )
                });
                let slot_views: Vec<ScheduleSlot> = slots.iter().map(ScheduleSlot::from).collect();

                CourseListing {
                    department_code: department_codes
                        .get(&course.department_id)
                        .cloned()
                        .unwrap_or_default(),
                    instructor_name: course
                        .instructor_id
                        .and_then(|id| instructor_names.get(&id).cloned()),
                    schedule_summary: schedule_format::format_schedule(&slot_views),
                    registered_count: registered_counts
                        .get(&course.course_id)
                        .copied()
                        .unwrap_or(0),
                    course,
                }
            })
            .collect();

        Ok(listings)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        course_id: Uuid,
        code: String,
        title: String,
        description: String,
        credits: i32,
        department_id: Uuid,
        instructor_id: Option<Uuid>,
        capacity: i32,
        delivery_mode: DeliveryMode,
        level: i32,
        semester: String,
        year: i32,
        moodle_id: Option<String>,
    ) -> Result<course::Model> {
        let db = self.get_connection();
        if let Some(moodle_id) = &moodle_id {
            LmsLinkRepository::new().ensure(moodle_id).await?;
        }
        let now = Utc::now().naive_utc();
        let course_model = course::ActiveModel {
            course_id: Set(course_id),
            code: Set(code),
            title: Set(title),
            description: Set(description),
            credits: Set(credits),
            department_id: Set(department_id),
            instructor_id: Set(instructor_id),
            capacity: Set(capacity),
            delivery_mode: Set(delivery_mode),
            level: Set(level),
            semester: Set(semester),
            year: Set(year),
            moodle_id: Set(moodle_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = course_model.insert(db).await?;
        Ok(result)
    }

    pub async fn update(&self, course_id: Uuid, updates: CourseUpdate) -> Result<course::Model> {
        let course = self
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Course not found"))?;
        let db = self.get_connection();

        let mut active_model: course::ActiveModel = course.into();

        if let Some(code) = updates.code {
            active_model.code = Set(code);
        }
        if let Some(title) = updates.title {
            active_model.title = Set(title);
        }
        if let Some(description) = updates.description {
            active_model.description = Set(description);
        }
        if let Some(credits) = updates.credits {
            active_model.credits = Set(credits);
        }
        if let Some(department_id) = updates.department_id {
            active_model.department_id = Set(department_id);
        }
        if let Some(instructor_id) = updates.instructor_id {
            active_model.instructor_id = Set(Some(instructor_id));
        }
        if let Some(capacity) = updates.capacity {
            active_model.capacity = Set(capacity);
        }
        if let Some(delivery_mode) = updates.delivery_mode {
            active_model.delivery_mode = Set(delivery_mode);
        }
        if let Some(level) = updates.level {
            active_model.level = Set(level);
        }
        if let Some(semester) = updates.semester {
            active_model.semester = Set(semester);
        }
        if let Some(year) = updates.year {
            active_model.year = Set(year);
        }
        if let Some(moodle_id) = updates.moodle_id {
            LmsLinkRepository::new().ensure(&moodle_id).await?;
            active_model.moodle_id = Set(Some(moodle_id));
        }

        active_model.updated_at = Set(Utc::now().naive_utc());

        let result = active_model.update(db).await?;
        Ok(result)
    }

    /// Hard delete; schedules and enrollments go with it via FK cascade.
    pub async fn delete(&self, course_id: Uuid) -> Result<DeleteResult> {
        let course = self
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Course not found"))?;
        let db = self.get_connection();

        let active_model: course::ActiveModel = course.into();
        let result = active_model.delete(db).await?;
        Ok(result)
    }

    pub async fn find_slots(&self, course_id: Uuid) -> Result<Vec<schedule::Model>> {
        let db = self.get_connection();
        let mut slots = schedule::Entity::find()
            .filter(schedule::Column::CourseId.eq(course_id))
            .all(db)
            .await?;
        slots.sort_by_key(|s| {
            (
                schedule_format::day_order(&s.day_of_week),
                s.start_time.clone(),
            )
        });
        Ok(slots)
    }

    pub async fn add_slot(
        &self,
        schedule_id: Uuid,
        course_id: Uuid,
        day_of_week: DayOfWeek,
        start_time: String,
        end_time: String,
        location: String,
    ) -> Result<schedule::Model> {
        let db = self.get_connection();
        self.find_by_id(course_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Course not found"))?;

        let now = Utc::now().naive_utc();
        let slot = schedule::ActiveModel {
            schedule_id: Set(schedule_id),
            course_id: Set(course_id),
            day_of_week: Set(day_of_week),
            start_time: Set(start_time),
            end_time: Set(end_time),
            location: Set(location),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = slot.insert(db).await?;
        Ok(result)
    }

    pub async fn find_slot(&self, schedule_id: Uuid) -> Result<Option<schedule::Model>> {
        let db = self.get_connection();
        let slot = schedule::Entity::find_by_id(schedule_id).one(db).await?;
        Ok(slot)
    }

    pub async fn remove_slot(&self, schedule_id: Uuid) -> Result<DeleteResult> {
        let db = self.get_connection();
        let result = schedule::Entity::delete_by_id(schedule_id).exec(db).await?;
        Ok(result)
    }
}

pub struct CourseUpdate {
    pub code: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub credits: Option<i32>,
    pub department_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub capacity: Option<i32>,
    pub delivery_mode: Option<DeliveryMode>,
    pub level: Option<i32>,
    pub semester: Option<String>,
    pub year: Option<i32>,
    pub moodle_id: Option<String>,
}
