pub mod assignment;
pub mod calendar_event;
pub mod course;
pub mod department;
pub mod enrollment;
pub mod grade;
pub mod lms_link;
pub mod notification;
pub mod schedule;
pub mod sea_orm_active_enums;
pub mod user;
