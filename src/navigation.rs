//! Role capability matrix.
//!
//! Each role maps to one ordered list of navigation entries. The
//! client renders the list as-is; nothing else in the codebase
//! branches on role for screen visibility, so this table is the whole
//! permission matrix for navigation.

use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::sea_orm_active_enums::RoleEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct NavEntry {
    pub label: &'static str,
    pub path: &'static str,
}

const fn entry(label: &'static str, path: &'static str) -> NavEntry {
    NavEntry { label, path }
}

const STUDENT_NAV: &[NavEntry] = &[
    entry("Dashboard", "/dashboard"),
    entry("Course Catalog", "/courses"),
    entry("My Schedule", "/schedule"),
    entry("Grades", "/grades"),
    entry("Calendar", "/calendar"),
    entry("Notifications", "/notifications"),
];

const FACULTY_NAV: &[NavEntry] = &[
    entry("Dashboard", "/dashboard"),
    entry("My Courses", "/teaching"),
    entry("Gradebook", "/gradebook"),
    entry("Calendar", "/calendar"),
    entry("Notifications", "/notifications"),
];

const ADMIN_NAV: &[NavEntry] = &[
    entry("Dashboard", "/dashboard"),
    entry("Courses", "/admin/courses"),
    entry("Departments", "/admin/departments"),
    entry("Users", "/admin/users"),
    entry("Calendar", "/calendar"),
    entry("Notifications", "/notifications"),
];

pub fn nav_entries(role: &RoleEnum) -> &'static [NavEntry] {
    match role {
        RoleEnum::Student => STUDENT_NAV,
        RoleEnum::Faculty => FACULTY_NAV,
        RoleEnum::Admin => ADMIN_NAV,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_gets_dashboard_and_notifications() {
        for role in [RoleEnum::Student, RoleEnum::Faculty, RoleEnum::Admin] {
            let entries = nav_entries(&role);
            assert_eq!(entries.first().map(|e| e.path), Some("/dashboard"));
            assert!(entries.iter().any(|e| e.path == "/notifications"));
        }
    }

    #[test]
    fn only_admins_see_admin_screens() {
        assert!(
            nav_entries(&RoleEnum::Admin)
                .iter()
                .any(|e| e.path.starts_with("/admin/"))
        );
        for role in [RoleEnum::Student, RoleEnum::Faculty] {
            assert!(
                nav_entries(&role)
                    .iter()
                    .all(|e| !e.path.starts_with("/admin/"))
            );
        }
    }

    #[test]
    fn students_browse_the_catalog_but_faculty_do_not() {
        assert!(
            nav_entries(&RoleEnum::Student)
                .iter()
                .any(|e| e.path == "/courses")
        );
        assert!(
            nav_entries(&RoleEnum::Faculty)
                .iter()
                .all(|e| e.path != "/courses")
        );
    }

    #[test]
    fn entry_order_is_stable() {
        let first = nav_entries(&RoleEnum::Student);
        let second = nav_entries(&RoleEnum::Student);
        assert_eq!(first, second);
    }
}
