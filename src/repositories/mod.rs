pub mod calendar_event_repository;
pub mod course_repository;
pub mod department_repository;
pub mod enrollment_outcome;
pub mod enrollment_repository;
pub mod gradebook_repository;
pub mod lms_link_repository;
pub mod notification_repository;
pub mod user_repository;

pub use calendar_event_repository::{CalendarEventRepository, CalendarEventUpdate};
pub use course_repository::{CourseRepository, CourseUpdate};
pub use department_repository::{DepartmentRepository, DepartmentUpdate};
pub use enrollment_outcome::{DropOutcome, RegisterOutcome};
pub use enrollment_repository::{EnrollmentRepository, ScheduleEntry};
pub use gradebook_repository::{GradeOutcome, GradeReportRow, GradebookRepository};
pub use lms_link_repository::LmsLinkRepository;
pub use notification_repository::NotificationRepository;
pub use user_repository::{UserRepository, UserUpdate};
