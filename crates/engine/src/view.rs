//! Binding between a table on screen and its store.
//!
//! The view reads its route state from the [`NavigationContext`], derives the
//! request params and decides once per tick whether a fetch is due.
use tracing::debug;

use crate::navigation::{NavigationContext, RouteId, RouteState};
use crate::params::{DEFAULT_PAGE, FilterParams, FilterValue, ListParams, SortOrder};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    Fetching,
}

/// Pagination and sort change coming from the table widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableChange {
    pub page: u32,
    pub per_page: u32,
    pub sort: Option<(String, SortOrder)>,
}

#[derive(Debug)]
pub struct ListView {
    route: RouteId,
    base_filters: FilterParams,
    last_requested: Option<ListParams>,
    mounted: bool,
    phase: ViewPhase,
}

impl ListView {
    pub fn new(route: RouteId) -> Self {
        Self {
            route,
            base_filters: FilterParams::new(),
            last_requested: None,
            mounted: false,
            phase: ViewPhase::Idle,
        }
    }

    /// Filter sent on every request of this view, under the route's own filters.
    pub fn with_base_filter(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        self.base_filters.insert(key.into(), value);
        self
    }

    pub fn route(&self) -> RouteId {
        self.route
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn derive_params(&self, state: &RouteState) -> ListParams {
        let mut filters = self.base_filters.clone();
        filters.extend(state.filters.clone());
        ListParams {
            page: state.page,
            per_page: state.per_page,
            sort: state.sort,
            column: state.column.clone(),
            search: state.search.clone(),
            filters,
        }
    }

    /// Params of the fetch due this tick, if any.
    ///
    /// Mounting, a pending refetch signal, or params that differ from the
    /// last request each yield one fetch; changes made between two ticks
    /// collapse into that single fetch.
    pub fn next_fetch(&mut self, nav: &mut NavigationContext) -> Option<ListParams> {
        let first = !self.mounted;
        self.mounted = true;
        let refetch = nav.take_refetch(self.route);
        let params = self.derive_params(nav.open(self.route));
        let changed = self.last_requested.as_ref() != Some(&params);

        if !(first || refetch || changed) {
            return None;
        }
        debug!(route = %self.route, first, refetch, changed, "list fetch due");
        self.last_requested = Some(params.clone());
        self.phase = ViewPhase::Fetching;
        Some(params)
    }

    /// The store finished the last fetch, whatever the result.
    pub fn settled(&mut self) {
        self.phase = ViewPhase::Idle;
    }

    /// The screen was left; the next `next_fetch` counts as a fresh mount.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.last_requested = None;
        self.phase = ViewPhase::Idle;
    }

    pub fn on_table_change(&self, nav: &mut NavigationContext, change: TableChange) {
        let state = nav.open(self.route);
        state.page = change.page;
        state.per_page = change.per_page;
        match change.sort {
            Some((column, order)) => {
                state.column = Some(column);
                state.sort = Some(order);
            }
            None => {
                state.column = None;
                state.sort = None;
            }
        }
    }

    /// Set or remove one filter. The page is kept unless `reset_page`.
    pub fn on_filter(
        &self,
        nav: &mut NavigationContext,
        key: &str,
        value: Option<FilterValue>,
        reset_page: bool,
    ) {
        let state = nav.open(self.route);
        match value {
            Some(value) => {
                state.filters.insert(key.to_string(), value);
            }
            None => {
                state.filters.remove(key);
            }
        }
        if reset_page {
            state.page = DEFAULT_PAGE;
        }
    }

    pub fn on_search(&self, nav: &mut NavigationContext, text: &str) {
        let text = text.trim();
        nav.open(self.route).search = (!text.is_empty()).then(|| text.to_string());
    }

    pub fn clear_filters(&self, nav: &mut NavigationContext) {
        nav.clear(self.route);
    }

    pub fn request_refetch(&self, nav: &mut NavigationContext) {
        nav.open(self.route);
        nav.set_refetch(self.route);
    }
}

/// One table column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub title: &'static str,
    pub sortable: bool,
    pub visible: bool,
}

impl Column {
    pub const fn new(key: &'static str, title: &'static str) -> Self {
        Self {
            key,
            title,
            sortable: false,
            visible: true,
        }
    }

    pub const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Columns of a table with their visibility and the focused header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<Column>,
    focus: usize,
}

impl ColumnSet {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, focus: 0 }
    }

    pub fn all(&self) -> &[Column] {
        &self.columns
    }

    pub fn visible(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.visible)
    }

    /// Flip visibility of `key`. The last visible column stays on.
    pub fn toggle(&mut self, key: &str) -> bool {
        let visible = self.visible().count();
        match self.columns.iter_mut().find(|column| column.key == key) {
            Some(column) if column.visible && visible <= 1 => false,
            Some(column) => {
                column.visible = !column.visible;
                true
            }
            None => false,
        }
    }

    pub fn focused(&self) -> Option<&Column> {
        self.columns.get(self.focus)
    }

    pub fn focus_next(&mut self) {
        if !self.columns.is_empty() {
            self.focus = (self.focus + 1) % self.columns.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.columns.is_empty() {
            self.focus = (self.focus + self.columns.len() - 1) % self.columns.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOANS: RouteId = RouteId::new("loans");

    #[test]
    fn mount_fetches_once() {
        let mut nav = NavigationContext::new(10);
        let mut view = ListView::new(LOANS);

        let params = view.next_fetch(&mut nav).unwrap();
        assert_eq!(params, ListParams::new(1, 10));
        assert_eq!(view.phase(), ViewPhase::Fetching);
        view.settled();
        assert!(view.next_fetch(&mut nav).is_none());
    }

    #[test]
    fn changes_between_ticks_coalesce() {
        let mut nav = NavigationContext::new(10);
        let mut view = ListView::new(LOANS);
        view.next_fetch(&mut nav);
        view.settled();

        view.on_table_change(
            &mut nav,
            TableChange {
                page: 2,
                per_page: 10,
                sort: Some(("amount".to_string(), SortOrder::Ascending)),
            },
        );
        view.on_filter(&mut nav, "status", Some(FilterValue::text("active")), false);

        let params = view.next_fetch(&mut nav).unwrap();
        assert_eq!(params.page, 2);
        assert_eq!(params.sort, Some(SortOrder::Ascending));
        assert_eq!(params.filters.len(), 1);
        assert!(view.next_fetch(&mut nav).is_none());
    }

    #[test]
    fn refetch_signal_forces_same_params() {
        let mut nav = NavigationContext::new(10);
        let mut view = ListView::new(LOANS);
        let first = view.next_fetch(&mut nav).unwrap();
        view.settled();

        nav.set_refetch(LOANS);
        assert_eq!(view.next_fetch(&mut nav), Some(first));
        assert!(view.next_fetch(&mut nav).is_none());
    }

    #[test]
    fn filter_can_reset_page() {
        let mut nav = NavigationContext::new(10);
        let view = ListView::new(LOANS);
        nav.open(LOANS).page = 5;

        view.on_filter(&mut nav, "status", Some(FilterValue::text("repaid")), false);
        assert_eq!(nav.route(LOANS).unwrap().page, 5);
        view.on_filter(&mut nav, "status", None, true);
        assert_eq!(nav.route(LOANS).unwrap().page, 1);
        assert!(nav.route(LOANS).unwrap().filters.is_empty());
    }

    #[test]
    fn base_filter_is_always_sent() {
        let mut nav = NavigationContext::new(10);
        let mut view = ListView::new(LOANS).with_base_filter("status", FilterValue::text("pending"));
        let params = view.next_fetch(&mut nav).unwrap();
        assert_eq!(params.filters.get("status"), Some(&FilterValue::text("pending")));
    }

    #[test]
    fn remount_fetches_again() {
        let mut nav = NavigationContext::new(10);
        let mut view = ListView::new(LOANS);
        view.next_fetch(&mut nav);
        view.unmount();
        assert!(view.next_fetch(&mut nav).is_some());
    }

    #[test]
    fn last_visible_column_cannot_be_hidden() {
        let mut columns = ColumnSet::new(vec![
            Column::new("id", "ID"),
            Column::new("amount", "Amount").sortable(),
        ]);
        assert!(columns.toggle("id"));
        assert!(!columns.toggle("amount"));
        assert_eq!(columns.visible().count(), 1);
        assert!(columns.toggle("id"));
        assert!(!columns.toggle("missing"));
    }

    #[test]
    fn focus_wraps_around() {
        let mut columns = ColumnSet::new(vec![Column::new("a", "A"), Column::new("b", "B")]);
        columns.focus_prev();
        assert_eq!(columns.focused().map(|c| c.key), Some("b"));
        columns.focus_next();
        assert_eq!(columns.focused().map(|c| c.key), Some("a"));
    }
}
