//! Catalog filter state and pagination math.

use uuid::Uuid;

use crate::entities::course;
use crate::entities::sea_orm_active_enums::DeliveryMode;

/// All catalog filters. Every field is optional and filters combine
/// conjunctively; the default value matches every course.
///
/// The filter doubles as part of the query-cache key, so it has to be
/// normalized (trimmed, empties collapsed to `None`) before use. Both
/// the route layer and the cache go through [`CourseFilter::normalized`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CourseFilter {
    pub department_id: Option<Uuid>,
    pub delivery_mode: Option<DeliveryMode>,
    pub min_level: Option<i32>,
    pub max_level: Option<i32>,
    pub semester: Option<String>,
    pub year: Option<i32>,
    /// Case-insensitive substring over code, title and instructor name.
    pub search: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CourseFilter {
    /// Collapses blank strings to `None` and trims the rest, so that
    /// `?search=` and a missing `search` produce the same cache key.
    pub fn normalized(mut self) -> Self {
        self.semester = non_blank(self.semester);
        self.search = non_blank(self.search);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &CourseFilter::default()
    }

    /// In-memory predicate mirroring the SQL the repository builds.
    /// Used by the detail route to decide whether a card still matches
    /// after a mutation, and by tests as the query-builder oracle.
    pub fn matches(&self, course: &course::Model, instructor_name: Option<&str>) -> bool {
        if let Some(department_id) = self.department_id {
            if course.department_id != department_id {
                return false;
            }
        }
        if let Some(mode) = &self.delivery_mode {
            if &course.delivery_mode != mode {
                return false;
            }
        }
        if let Some(min) = self.min_level {
            if course.level < min {
                return false;
            }
        }
        if let Some(max) = self.max_level {
            if course.level > max {
                return false;
            }
        }
        if let Some(semester) = &self.semester {
            if !course.semester.eq_ignore_ascii_case(semester) {
                return false;
            }
        }
        if let Some(year) = self.year {
            if course.year != year {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let needle = term.to_lowercase();
            let hit = course.code.to_lowercase().contains(&needle)
                || course.title.to_lowercase().contains(&needle)
                || instructor_name
                    .map(|name| name.to_lowercase().contains(&needle))
                    .unwrap_or(false);
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Page count for a result set. Zero matches means zero pages, not one
/// empty page.
pub fn total_pages(total_items: u64, page_size: u64) -> u64 {
    total_items.div_ceil(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn course(code: &str, title: &str, level: i32) -> course::Model {
        let now = Utc::now().naive_utc();
        course::Model {
            course_id: Uuid::new_v4(),
            code: code.to_string(),
            title: title.to_string(),
            description: String::new(),
            credits: 3,
            department_id: Uuid::new_v4(),
            instructor_id: None,
            capacity: 30,
            delivery_mode: DeliveryMode::InPerson,
            level,
            semester: "fall".to_string(),
            year: 2026,
            moodle_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn default_filter_matches_everything() {
        let filter = CourseFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&course("CS 101", "Intro", 100), None));
    }

    #[test]
    fn filters_combine_conjunctively() {
        let target = course("CS 350", "Operating Systems", 300);
        let filter = CourseFilter {
            department_id: Some(target.department_id),
            min_level: Some(300),
            max_level: Some(399),
            year: Some(2026),
            ..Default::default()
        };
        assert!(filter.matches(&target, None));

        let wrong_year = CourseFilter {
            year: Some(2025),
            ..filter
        };
        assert!(!wrong_year.matches(&target, None));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let target = course("CS 350", "Operating Systems", 300);
        let by_code = CourseFilter {
            search: Some("cs 35".to_string()),
            ..Default::default()
        };
        let by_title = CourseFilter {
            search: Some("OPERATING".to_string()),
            ..Default::default()
        };
        let by_instructor = CourseFilter {
            search: Some("knuth".to_string()),
            ..Default::default()
        };
        assert!(by_code.matches(&target, None));
        assert!(by_title.matches(&target, None));
        assert!(by_instructor.matches(&target, Some("Donald Knuth")));
        assert!(!by_instructor.matches(&target, None));
    }

    #[test]
    fn normalization_collapses_blank_search() {
        let blank = CourseFilter {
            search: Some("   ".to_string()),
            semester: Some(String::new()),
            ..Default::default()
        }
        .normalized();
        assert!(blank.is_empty());

        let trimmed = CourseFilter {
            search: Some("  algebra ".to_string()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(trimmed.search.as_deref(), Some("algebra"));
    }

    #[test]
    fn page_count_rounds_up_and_empties_to_zero() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 10), 10);
    }
}
