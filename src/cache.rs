//! In-process TTL cache for read queries.
//!
//! Every list endpoint is cached independently under a key built from
//! its normalized parameters, so two in-flight requests for different
//! filter/page combinations never interfere. A key holds at most one
//! value and inserts replace it outright, which gives last-write-wins
//! when a refresh races an older fetch for the same key.
//!
//! Writes never patch cached values. Mutation handlers call
//! [`QueryCache::invalidate`] with the logical resource they changed
//! after the database write resolves, and the next read re-fetches
//! ground truth. The resource-to-family mapping lives in one table
//! ([`INVALIDATES`]) instead of ad hoc calls at each mutation site.

use std::hash::Hash;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::catalog::filter::CourseFilter;
use crate::config::APP_CONFIG;
use crate::entities::department;
use crate::repositories::course_repository::CoursePage;
use crate::repositories::enrollment_repository::ScheduleEntry;

pub static QUERY_CACHE: Lazy<QueryCache> =
    Lazy::new(|| QueryCache::new(Duration::from_secs(APP_CONFIG.catalog_cache_ttl_secs)));

/// Logical resources mutations act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Courses,
    Enrollments,
    Departments,
}

/// Cached key families, one per read endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    CoursePages,
    MySchedule,
    Departments,
}

/// Which cached families a write to each resource can affect. Editing
/// a course or enrollment changes card counts and schedule rows;
/// editing a department changes the code embedded in every card.
const INVALIDATES: &[(Resource, &[KeyFamily])] = &[
    (
        Resource::Courses,
        &[KeyFamily::CoursePages, KeyFamily::MySchedule],
    ),
    (
        Resource::Enrollments,
        &[KeyFamily::CoursePages, KeyFamily::MySchedule],
    ),
    (
        Resource::Departments,
        &[KeyFamily::Departments, KeyFamily::CoursePages],
    ),
];

/// Key for one cached catalog page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoursePageKey {
    pub filter: CourseFilter,
    pub page: u64,
}

#[derive(Debug, Clone)]
struct CachedValue<V> {
    value: V,
    cached_at: Instant,
}

/// One key family: a concurrent map with per-entry expiry.
struct TtlStore<K, V> {
    entries: DashMap<K, CachedValue<V>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlStore<K, V> {
    fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns a clone of the cached value, dropping the entry when it
    /// has outlived the TTL.
    fn get(&self, key: &K) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if entry.cached_at.elapsed() < self.ttl {
                    return Some(entry.value.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    fn insert(&self, key: K, value: V) {
        self.entries.insert(
            key,
            CachedValue {
                value,
                cached_at: Instant::now(),
            },
        );
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn stats(&self) -> FamilyStats {
        let mut expired = 0;
        for entry in self.entries.iter() {
            if entry.cached_at.elapsed() >= self.ttl {
                expired += 1;
            }
        }
        FamilyStats {
            entries: self.entries.len(),
            expired,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct FamilyStats {
    pub entries: usize,
    pub expired: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CacheStats {
    pub course_pages: FamilyStats,
    pub schedules: FamilyStats,
    pub departments: FamilyStats,
    pub ttl_secs: u64,
}

pub struct QueryCache {
    course_pages: TtlStore<CoursePageKey, CoursePage>,
    schedules: TtlStore<Uuid, Vec<ScheduleEntry>>,
    departments: TtlStore<(), Vec<department::Model>>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            course_pages: TtlStore::new(ttl),
            schedules: TtlStore::new(ttl),
            departments: TtlStore::new(ttl),
            ttl,
        }
    }

    pub fn get_course_page(&self, key: &CoursePageKey) -> Option<CoursePage> {
        self.course_pages.get(key)
    }

    pub fn insert_course_page(&self, key: CoursePageKey, page: CoursePage) {
        self.course_pages.insert(key, page);
    }

    pub fn get_schedule(&self, student_id: Uuid) -> Option<Vec<ScheduleEntry>> {
        self.schedules.get(&student_id)
    }

    pub fn insert_schedule(&self, student_id: Uuid, entries: Vec<ScheduleEntry>) {
        self.schedules.insert(student_id, entries);
    }

    pub fn get_departments(&self) -> Option<Vec<department::Model>> {
        self.departments.get(&())
    }

    pub fn insert_departments(&self, rows: Vec<department::Model>) {
        self.departments.insert((), rows);
    }

    /// Drops every cached family a write to `resource` can affect.
    /// Called after the mutation's database work has resolved, never
    /// before, so a re-fetch can only observe the new state.
    pub fn invalidate(&self, resource: Resource) {
        for (mapped, families) in INVALIDATES {
            if *mapped != resource {
                continue;
            }
            for family in *families {
                match family {
                    KeyFamily::CoursePages => self.course_pages.clear(),
                    KeyFamily::MySchedule => self.schedules.clear(),
                    KeyFamily::Departments => self.departments.clear(),
                }
            }
        }
    }

    pub fn clear_all(&self) {
        self.course_pages.clear();
        self.schedules.clear();
        self.departments.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            course_pages: self.course_pages.stats(),
            schedules: self.schedules.stats(),
            departments: self.departments.stats(),
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::filter::total_pages;

    fn page_key(page: u64) -> CoursePageKey {
        CoursePageKey {
            filter: CourseFilter::default(),
            page,
        }
    }

    fn empty_page() -> CoursePage {
        CoursePage {
            listings: Vec::new(),
            total_items: 0,
            total_pages: total_pages(0, 10),
        }
    }

    #[test]
    fn entries_expire_after_the_ttl() {
        let cache = QueryCache::new(Duration::from_millis(30));
        cache.insert_course_page(page_key(1), empty_page());
        assert!(cache.get_course_page(&page_key(1)).is_some());

        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get_course_page(&page_key(1)).is_none());
    }

    #[test]
    fn keys_are_independent_per_page() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert_course_page(page_key(1), empty_page());
        assert!(cache.get_course_page(&page_key(1)).is_some());
        assert!(cache.get_course_page(&page_key(2)).is_none());
    }

    #[test]
    fn filtered_and_unfiltered_pages_do_not_collide() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let filtered = CoursePageKey {
            filter: CourseFilter {
                search: Some("bio".to_string()),
                ..Default::default()
            },
            page: 1,
        };
        cache.insert_course_page(filtered.clone(), empty_page());
        assert!(cache.get_course_page(&filtered).is_some());
        assert!(cache.get_course_page(&page_key(1)).is_none());
    }

    #[test]
    fn insert_replaces_the_previous_value() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert_course_page(page_key(1), empty_page());
        let mut refreshed = empty_page();
        refreshed.total_items = 42;
        cache.insert_course_page(page_key(1), refreshed);

        let stored = cache.get_course_page(&page_key(1)).unwrap();
        assert_eq!(stored.total_items, 42);
    }

    #[test]
    fn enrollment_writes_clear_courses_and_schedules_but_not_departments() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert_course_page(page_key(1), empty_page());
        cache.insert_schedule(Uuid::new_v4(), Vec::new());
        cache.insert_departments(Vec::new());

        cache.invalidate(Resource::Enrollments);

        let stats = cache.stats();
        assert_eq!(stats.course_pages.entries, 0);
        assert_eq!(stats.schedules.entries, 0);
        assert_eq!(stats.departments.entries, 1);
    }

    #[test]
    fn department_writes_clear_course_pages_too() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert_course_page(page_key(1), empty_page());
        cache.insert_departments(Vec::new());

        cache.invalidate(Resource::Departments);

        let stats = cache.stats();
        assert_eq!(stats.course_pages.entries, 0);
        assert_eq!(stats.departments.entries, 0);
    }

    #[test]
    fn clear_all_empties_every_family() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert_course_page(page_key(1), empty_page());
        cache.insert_schedule(Uuid::new_v4(), Vec::new());
        cache.insert_departments(Vec::new());

        cache.clear_all();

        let stats = cache.stats();
        assert_eq!(stats.course_pages.entries, 0);
        assert_eq!(stats.schedules.entries, 0);
        assert_eq!(stats.departments.entries, 0);
    }
}
