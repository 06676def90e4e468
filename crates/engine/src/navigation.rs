//! Per-route list state shared between a screen and whoever wants it refreshed.
use std::collections::HashMap;
use std::fmt;

use crate::params::{DEFAULT_PAGE, FilterParams, SortOrder};

/// Stable identifier of a list screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(&'static str);

impl RouteId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteState {
    pub page: u32,
    pub per_page: u32,
    pub sort: Option<SortOrder>,
    pub column: Option<String>,
    pub search: Option<String>,
    pub filters: FilterParams,
    refetch: bool,
}

impl RouteState {
    fn new(per_page: u32) -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page,
            sort: None,
            column: None,
            search: None,
            filters: FilterParams::new(),
            refetch: false,
        }
    }

    pub fn refetch_pending(&self) -> bool {
        self.refetch
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty() || self.search.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// In-memory state of every opened route. Not persisted.
#[derive(Debug)]
pub struct NavigationContext {
    default_per_page: u32,
    routes: HashMap<RouteId, RouteState>,
}

impl NavigationContext {
    pub fn new(default_per_page: u32) -> Self {
        Self {
            default_per_page: default_per_page.max(1),
            routes: HashMap::new(),
        }
    }

    pub fn default_per_page(&self) -> u32 {
        self.default_per_page
    }

    /// State of `route`, created with defaults on first use.
    pub fn open(&mut self, route: RouteId) -> &mut RouteState {
        let per_page = self.default_per_page;
        self.routes
            .entry(route)
            .or_insert_with(|| RouteState::new(per_page))
    }

    pub fn route(&self, route: RouteId) -> Option<&RouteState> {
        self.routes.get(&route)
    }

    pub fn route_mut(&mut self, route: RouteId) -> Option<&mut RouteState> {
        self.routes.get_mut(&route)
    }

    /// Reset filters, search, sort and pagination of `route`.
    pub fn clear(&mut self, route: RouteId) {
        let per_page = self.default_per_page;
        if let Some(state) = self.routes.get_mut(&route) {
            let refetch = state.refetch;
            *state = RouteState::new(per_page);
            state.refetch = refetch;
        }
    }

    /// Ask the screen bound to `route` to reload. Returns `false` when the
    /// route was never opened; it will fetch on mount anyway.
    pub fn set_refetch(&mut self, route: RouteId) -> bool {
        match self.routes.get_mut(&route) {
            Some(state) => {
                state.refetch = true;
                true
            }
            None => false,
        }
    }

    /// Consume the refetch signal of `route`.
    pub fn take_refetch(&mut self, route: RouteId) -> bool {
        self.routes
            .get_mut(&route)
            .is_some_and(|state| std::mem::take(&mut state.refetch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FilterValue;

    const LOANS: RouteId = RouteId::new("loans");

    #[test]
    fn open_uses_default_page_size() {
        let mut nav = NavigationContext::new(25);
        let state = nav.open(LOANS);
        assert_eq!(state.page, 1);
        assert_eq!(state.per_page, 25);
    }

    #[test]
    fn refetch_signal_is_taken_once() {
        let mut nav = NavigationContext::new(10);
        assert!(!nav.set_refetch(LOANS));
        nav.open(LOANS);
        assert!(nav.set_refetch(LOANS));
        assert!(nav.take_refetch(LOANS));
        assert!(!nav.take_refetch(LOANS));
    }

    #[test]
    fn clear_resets_filters_and_pagination() {
        let mut nav = NavigationContext::new(10);
        let state = nav.open(LOANS);
        state.page = 4;
        state.search = Some("amina".to_string());
        state
            .filters
            .insert("status".to_string(), FilterValue::text("active"));
        assert!(state.has_filters());

        nav.clear(LOANS);
        let state = nav.route(LOANS).unwrap();
        assert_eq!(state.page, 1);
        assert!(!state.has_filters());
    }
}
