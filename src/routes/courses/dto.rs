use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::catalog::display_status::DisplayStatus;
use crate::catalog::filter::CourseFilter;
use crate::entities::sea_orm_active_enums::{DayOfWeek, DeliveryMode, EnrollmentStatus};
use crate::entities::schedule;
use crate::repositories::course_repository::CourseListing;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCoursesParams {
    /// 1-based page number; 0 and missing both mean page 1.
    pub page: Option<u64>,
    pub department_id: Option<Uuid>,
    pub delivery_mode: Option<DeliveryMode>,
    pub min_level: Option<i32>,
    pub max_level: Option<i32>,
    pub semester: Option<String>,
    pub year: Option<i32>,
    /// Case-insensitive substring over code, title, instructor name.
    pub search: Option<String>,
}

impl ListCoursesParams {
    pub fn filter(&self) -> CourseFilter {
        CourseFilter {
            department_id: self.department_id,
            delivery_mode: self.delivery_mode,
            min_level: self.min_level,
            max_level: self.max_level,
            semester: self.semester.clone(),
            year: self.year,
            search: self.search.clone(),
        }
    }
}

/// One catalog card, fully resolved for the requesting viewer.
#[derive(Debug, Serialize, ToSchema)]
pub struct CourseCard {
    pub course_id: Uuid,
    pub code: String,
    pub title: String,
    pub credits: i32,
    pub department_code: String,
    pub instructor_name: Option<String>,
    pub delivery_mode: DeliveryMode,
    pub level: i32,
    pub semester: String,
    pub year: i32,
    pub capacity: i32,
    pub enrolled_count: u64,
    pub schedule_summary: String,
    pub display_status: DisplayStatus,
    pub status_label: String,
    pub can_register: bool,
}

impl CourseCard {
    /// Overlays the viewer's own enrollment (if any) onto a cached,
    /// viewer-independent listing.
    pub fn from_listing(
        listing: &CourseListing,
        viewer_status: Option<EnrollmentStatus>,
    ) -> Self {
        let status = DisplayStatus::resolve(
            listing.registered_count,
            listing.course.capacity,
            viewer_status,
        );
        Self {
            course_id: listing.course.course_id,
            code: listing.course.code.clone(),
            title: listing.course.title.clone(),
            credits: listing.course.credits,
            department_code: listing.department_code.clone(),
            instructor_name: listing.instructor_name.clone(),
            delivery_mode: listing.course.delivery_mode,
            level: listing.course.level,
            semester: listing.course.semester.clone(),
            year: listing.course.year,
            capacity: listing.course.capacity,
            enrolled_count: listing.registered_count,
            schedule_summary: listing.schedule_summary.clone(),
            display_status: status,
            status_label: status.label(listing.registered_count, listing.course.capacity),
            can_register: status.is_actionable(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseListResponse {
    pub courses: Vec<CourseCard>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleSlotResponse {
    pub schedule_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
}

impl From<schedule::Model> for ScheduleSlotResponse {
    fn from(model: schedule::Model) -> Self {
        Self {
            schedule_id: model.schedule_id,
            day_of_week: model.day_of_week,
            start_time: model.start_time,
            end_time: model.end_time,
            location: model.location,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub card: CourseCard,
    pub description: String,
    pub moodle_id: Option<String>,
    pub slots: Vec<ScheduleSlotResponse>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCourseRequest {
    #[schema(example = "CS 350")]
    pub code: String,

    #[schema(example = "Operating Systems")]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[schema(example = 4)]
    pub credits: i32,

    pub department_id: Uuid,

    pub instructor_id: Option<Uuid>,

    #[schema(example = 30)]
    pub capacity: i32,

    pub delivery_mode: DeliveryMode,

    #[schema(example = 300)]
    pub level: i32,

    #[schema(example = "fall")]
    pub semester: String,

    #[schema(example = 2026)]
    pub year: i32,

    pub moodle_id: Option<String>,
}

impl CreateCourseRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            return Err("Course code is required".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("Course title is required".to_string());
        }
        if self.credits <= 0 {
            return Err("Credits must be positive".to_string());
        }
        if self.capacity < 0 {
            return Err("Capacity cannot be negative".to_string());
        }
        if self.level <= 0 {
            return Err("Level must be positive".to_string());
        }
        if self.semester.trim().is_empty() {
            return Err("Semester is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateCourseRequest {
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

impl UpdateCourseRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(credits) = self.credits {
            if credits <= 0 {
                return Err("Credits must be positive".to_string());
            }
        }
        if let Some(capacity) = self.capacity {
            if capacity < 0 {
                return Err("Capacity cannot be negative".to_string());
            }
        }
        if let Some(level) = self.level {
            if level <= 0 {
                return Err("Level must be positive".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddScheduleSlotRequest {
    pub day_of_week: DayOfWeek,

    #[schema(example = "10:00")]
    pub start_time: String,

    #[schema(example = "11:30")]
    pub end_time: String,

    #[schema(example = "Science Hall 204")]
    pub location: String,
}

impl AddScheduleSlotRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !valid_time(&self.start_time) || !valid_time(&self.end_time) {
            return Err("Times must be HH:MM in 24-hour format".to_string());
        }
        // zero-padded HH:MM compares correctly as a string
        if self.end_time <= self.start_time {
            return Err("End time must be after start time".to_string());
        }
        Ok(())
    }
}

/// Accepts zero-padded 24-hour `HH:MM`.
pub fn valid_time(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let (Ok(hours), Ok(minutes)) = (value[0..2].parse::<u8>(), value[3..5].parse::<u8>()) else {
        return false;
    };
    hours < 24 && minutes < 60
}
