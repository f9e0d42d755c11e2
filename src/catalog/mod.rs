//! Catalog domain logic shared by the course and enrollment routes.
//!
//! Everything in here is pure: no database handles, no globals. The
//! repositories fetch rows, these modules decide what the rows mean for
//! the viewer (display status, schedule summary, paging state).

pub mod display_status;
pub mod filter;
pub mod schedule_format;
pub mod view_state;
