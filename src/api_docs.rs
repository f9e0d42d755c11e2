use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::cache;
use crate::catalog::display_status::DisplayStatus;
use crate::entities::sea_orm_active_enums::{DayOfWeek, DeliveryMode, EnrollmentStatus, RoleEnum};
use crate::navigation::NavEntry;
use crate::routes::{
    cache_admin, courses, departments, enrollments, events, gradebook, health, notifications,
    profile, users,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::route::health_check,
        courses::route::list_courses,
        courses::route::get_course,
        courses::route::my_teaching,
        courses::route::create_course,
        courses::route::update_course,
        courses::route::delete_course,
        courses::route::add_schedule_slot,
        courses::route::remove_schedule_slot,
        departments::route::create_department,
        departments::route::get_all_departments,
        departments::route::get_department,
        departments::route::update_department,
        departments::route::delete_department,
        enrollments::route::register,
        enrollments::route::drop_course,
        enrollments::route::my_schedule,
        enrollments::route::my_history,
        enrollments::route::course_roster,
        events::route::list_events,
        events::route::course_events,
        events::route::create_event,
        events::route::update_event,
        events::route::delete_event,
        gradebook::route::course_assignments,
        gradebook::route::create_assignment,
        gradebook::route::delete_assignment,
        gradebook::route::record_grade,
        gradebook::route::assignment_grades,
        gradebook::route::my_grades,
        notifications::route::my_notifications,
        notifications::route::unread_count,
        notifications::route::mark_read,
        notifications::route::mark_all_read,
        notifications::route::send,
        notifications::route::broadcast,
        profile::route::my_profile,
        profile::route::my_navigation,
        users::route::list_users,
        users::route::get_user,
        users::route::create_user,
        users::route::update_user,
        users::route::deactivate_user,
        cache_admin::route::cache_stats,
        cache_admin::route::invalidate_cache,
    ),
    components(schemas(
        RoleEnum,
        EnrollmentStatus,
        DeliveryMode,
        DayOfWeek,
        DisplayStatus,
        NavEntry,
        cache::Resource,
        cache::CacheStats,
        cache::FamilyStats,
        courses::dto::CourseCard,
        courses::dto::CourseListResponse,
        courses::dto::CourseDetailResponse,
        courses::dto::ScheduleSlotResponse,
        courses::dto::CreateCourseRequest,
        courses::dto::UpdateCourseRequest,
        courses::dto::AddScheduleSlotRequest,
        departments::dto::CreateDepartmentRequest,
        departments::dto::UpdateDepartmentRequest,
        departments::dto::DepartmentResponse,
        departments::dto::DepartmentListResponse,
        enrollments::dto::RegisterRequest,
        enrollments::dto::EnrollmentResponse,
        enrollments::dto::ScheduleRowResponse,
        enrollments::dto::MyScheduleResponse,
        enrollments::dto::EnrollmentHistoryRow,
        enrollments::dto::EnrollmentHistoryResponse,
        enrollments::dto::RosterRowResponse,
        enrollments::dto::RosterResponse,
        events::dto::CalendarEventResponse,
        events::dto::CalendarEventListResponse,
        events::dto::CreateEventRequest,
        events::dto::UpdateEventRequest,
        gradebook::dto::AssignmentResponse,
        gradebook::dto::AssignmentListResponse,
        gradebook::dto::CreateAssignmentRequest,
        gradebook::dto::RecordGradeRequest,
        gradebook::dto::GradeResponse,
        gradebook::dto::GradeRecordedResponse,
        gradebook::dto::AssignmentGradeRow,
        gradebook::dto::AssignmentGradesResponse,
        gradebook::dto::GradeReportRowResponse,
        gradebook::dto::GradeReportResponse,
        notifications::dto::NotificationResponse,
        notifications::dto::NotificationListResponse,
        notifications::dto::UnreadCountResponse,
        notifications::dto::SendNotificationRequest,
        notifications::dto::BroadcastRequest,
        notifications::dto::BroadcastResponse,
        profile::dto::ProfileResponse,
        profile::dto::NavigationResponse,
        users::dto::UserResponse,
        users::dto::UserListResponse,
        users::dto::CreateUserRequest,
        users::dto::UpdateUserRequest,
        cache_admin::route::InvalidateRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Courses", description = "Course catalog browsing and administration"),
        (name = "Departments", description = "Department management"),
        (name = "Enrollments", description = "Registration, drops, schedules and rosters"),
        (name = "Calendar", description = "Academic calendar events"),
        (name = "Gradebook", description = "Assignments and grades"),
        (name = "Notifications", description = "In-app notifications"),
        (name = "Profile", description = "The authenticated account"),
        (name = "Users", description = "User account administration"),
        (name = "Admin", description = "Operational endpoints"),
    ),
    info(
        title = "Registrar Service API",
        description = "Course catalog, registration and gradebook service",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
