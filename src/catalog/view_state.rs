//! Browsing state for the catalog page.
//!
//! The state machine that decides which page of which filtered list a
//! viewer is looking at. Every filter change resets the page to 1 so a
//! narrowed result set can never point past its own end; plain page
//! turns keep the filter. The route layer builds one of these from
//! request params, which funnels all normalization through one place.

use uuid::Uuid;

use super::filter::CourseFilter;
use crate::entities::sea_orm_active_enums::DeliveryMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogTab {
    #[default]
    Catalog,
    MySchedule,
}

#[derive(Debug, Clone)]
pub struct CatalogViewState {
    filter: CourseFilter,
    page: u64,
    tab: CatalogTab,
}

impl CatalogViewState {
    pub fn new() -> Self {
        Self {
            filter: CourseFilter::default(),
            page: 1,
            tab: CatalogTab::Catalog,
        }
    }

    /// Builds the state a request is asking for. Missing or zero pages
    /// clamp to 1, the filter is normalized.
    pub fn from_request(filter: CourseFilter, page: Option<u64>) -> Self {
        Self {
            filter: filter.normalized(),
            page: page.unwrap_or(1).max(1),
            tab: CatalogTab::Catalog,
        }
    }

    pub fn filter(&self) -> &CourseFilter {
        &self.filter
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn tab(&self) -> CatalogTab {
        self.tab
    }

    pub fn set_page(&mut self, page: u64) {
        self.page = page.max(1);
    }

    /// Switching tabs lands on the first page of the other list.
    pub fn set_tab(&mut self, tab: CatalogTab) {
        if self.tab != tab {
            self.tab = tab;
            self.page = 1;
        }
    }

    pub fn set_department(&mut self, department_id: Option<Uuid>) {
        self.filter.department_id = department_id;
        self.page = 1;
    }

    pub fn set_delivery_mode(&mut self, mode: Option<DeliveryMode>) {
        self.filter.delivery_mode = mode;
        self.page = 1;
    }

    pub fn set_level_range(&mut self, min: Option<i32>, max: Option<i32>) {
        self.filter.min_level = min;
        self.filter.max_level = max;
        self.page = 1;
    }

    pub fn set_term(&mut self, semester: Option<String>, year: Option<i32>) {
        self.filter.semester = semester;
        self.filter.year = year;
        self.filter = self.filter.clone().normalized();
        self.page = 1;
    }

    pub fn set_search(&mut self, term: Option<String>) {
        self.filter.search = term;
        self.filter = self.filter.clone().normalized();
        self.page = 1;
    }

    pub fn reset_filters(&mut self) {
        self.filter = CourseFilter::default();
        self.page = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_page_one_of_the_catalog() {
        let state = CatalogViewState::new();
        assert_eq!(state.page(), 1);
        assert_eq!(state.tab(), CatalogTab::Catalog);
        assert!(state.filter().is_empty());
    }

    #[test]
    fn every_filter_change_resets_the_page() {
        let mut state = CatalogViewState::new();
        state.set_page(7);

        state.set_search(Some("algebra".to_string()));
        assert_eq!(state.page(), 1);

        state.set_page(4);
        state.set_department(Some(Uuid::new_v4()));
        assert_eq!(state.page(), 1);

        state.set_page(3);
        state.set_level_range(Some(300), None);
        assert_eq!(state.page(), 1);

        state.set_page(9);
        state.set_delivery_mode(Some(DeliveryMode::Online));
        assert_eq!(state.page(), 1);

        state.set_page(2);
        state.set_term(Some("fall".to_string()), Some(2026));
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn page_turns_keep_the_filter() {
        let mut state = CatalogViewState::new();
        state.set_search(Some("bio".to_string()));
        state.set_page(3);
        assert_eq!(state.page(), 3);
        assert_eq!(state.filter().search.as_deref(), Some("bio"));
    }

    #[test]
    fn switching_tab_lands_on_page_one() {
        let mut state = CatalogViewState::new();
        state.set_page(5);
        state.set_tab(CatalogTab::MySchedule);
        assert_eq!(state.page(), 1);

        // re-selecting the current tab is a no-op
        state.set_page(2);
        state.set_tab(CatalogTab::MySchedule);
        assert_eq!(state.page(), 2);
    }

    #[test]
    fn request_pages_clamp_to_one() {
        let state = CatalogViewState::from_request(CourseFilter::default(), Some(0));
        assert_eq!(state.page(), 1);
        let state = CatalogViewState::from_request(CourseFilter::default(), None);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn request_filters_are_normalized() {
        let filter = CourseFilter {
            search: Some("  ".to_string()),
            ..Default::default()
        };
        let state = CatalogViewState::from_request(filter, Some(2));
        assert!(state.filter().is_empty());
        assert_eq!(state.page(), 2);
    }

    #[test]
    fn reset_clears_filters_and_page() {
        let mut state = CatalogViewState::new();
        state.set_search(Some("chem".to_string()));
        state.set_page(4);
        state.reset_filters();
        assert!(state.filter().is_empty());
        assert_eq!(state.page(), 1);
    }
}
