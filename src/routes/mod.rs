pub mod cache_admin;
pub mod courses;
pub mod departments;
pub mod enrollments;
pub mod events;
pub mod gradebook;
pub mod health;
pub mod notifications;
pub mod profile;
pub mod users;
