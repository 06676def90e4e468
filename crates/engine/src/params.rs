//! Request parameters of a paginated list and their query-string form.
use std::collections::BTreeMap;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    /// Next step of the usual table header cycle: none, ascending, descending, none.
    pub fn cycle(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(Self::Ascending),
            Some(Self::Ascending) => Some(Self::Descending),
            Some(Self::Descending) => None,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// Value of a single filter key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    List(Vec<String>),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    fn push_query(&self, key: &str, out: &mut Vec<(String, String)>) {
        match self {
            Self::Text(value) => out.push((key.to_string(), value.clone())),
            Self::Integer(value) => out.push((key.to_string(), value.to_string())),
            Self::Bool(value) => out.push((key.to_string(), value.to_string())),
            Self::List(values) => {
                let array_key = format!("{key}[]");
                out.extend(values.iter().map(|v| (array_key.clone(), v.clone())));
            }
        }
    }

    /// Short human form used by filter chips.
    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::List(values) => values.join(","),
        }
    }
}

pub type FilterParams = BTreeMap<String, FilterValue>;

/// Parameters of one list request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub per_page: u32,
    pub sort: Option<SortOrder>,
    pub column: Option<String>,
    pub search: Option<String>,
    pub filters: FilterParams,
}

impl Default for ListParams {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PER_PAGE)
    }
}

impl ListParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            sort: None,
            column: None,
            search: None,
            filters: FilterParams::new(),
        }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        self.filters.insert(key.into(), value);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Query pairs in wire form. Absent keys are omitted, never sent empty.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("page".to_string(), self.page.to_string()),
            ("perPage".to_string(), self.per_page.to_string()),
        ];
        if let Some(sort) = self.sort {
            out.push(("sort".to_string(), sort.as_param().to_string()));
        }
        if let Some(column) = self.column.as_deref().filter(|c| !c.is_empty()) {
            out.push(("column".to_string(), column.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            out.push(("search".to_string(), search.to_string()));
        }
        for (key, value) in &self.filters {
            value.push_query(key, &mut out);
        }
        out
    }

    /// Shallow merge of `patch` into these params.
    pub fn merge(&mut self, patch: ParamsPatch) {
        if let Some(page) = patch.page {
            self.page = page;
        }
        if let Some(per_page) = patch.per_page {
            self.per_page = per_page;
        }
        if let Some(sort) = patch.sort {
            self.sort = sort;
        }
        if let Some(column) = patch.column {
            self.column = column;
        }
        if let Some(search) = patch.search {
            self.search = search;
        }
        for (key, value) in patch.filters {
            match value {
                Some(value) => {
                    self.filters.insert(key, value);
                }
                None => {
                    self.filters.remove(&key);
                }
            }
        }
    }
}

/// Partial update of [`ListParams`].
///
/// Outer `None` leaves a field untouched, inner `None` clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamsPatch {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort: Option<Option<SortOrder>>,
    pub column: Option<Option<String>>,
    pub search: Option<Option<String>>,
    pub filters: BTreeMap<String, Option<FilterValue>>,
}

impl ParamsPatch {
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn sort(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(Some(order));
        self.column = Some(Some(column.into()));
        self
    }

    pub fn clear_sort(mut self) -> Self {
        self.sort = Some(None);
        self.column = Some(None);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(Some(search.into()));
        self
    }

    pub fn clear_search(mut self) -> Self {
        self.search = Some(None);
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        self.filters.insert(key.into(), Some(value));
        self
    }

    pub fn clear_filter(mut self, key: impl Into<String>) -> Self {
        self.filters.insert(key.into(), None);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &[(String, String)]) -> Vec<(&str, &str)> {
        query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn default_query_has_only_pagination() {
        let query = ListParams::default().to_query();
        assert_eq!(pairs(&query), vec![("page", "1"), ("perPage", "10")]);
    }

    #[test]
    fn sort_maps_to_wire_words() {
        let mut params = ListParams::new(2, 20);
        params.merge(ParamsPatch::default().sort("amount", SortOrder::Descending));
        let query = params.to_query();
        assert_eq!(
            pairs(&query),
            vec![
                ("page", "2"),
                ("perPage", "20"),
                ("sort", "desc"),
                ("column", "amount")
            ]
        );

        params.merge(ParamsPatch::default().clear_sort());
        assert_eq!(params.to_query().len(), 2);
    }

    #[test]
    fn list_filters_repeat_with_brackets() {
        let params = ListParams::default()
            .with_filter("status", FilterValue::List(vec!["active".into(), "repaid".into()]))
            .with_filter("paid", FilterValue::Bool(true));
        let query = params.to_query();
        assert_eq!(
            pairs(&query)[2..],
            [
                ("paid", "true"),
                ("status[]", "active"),
                ("status[]", "repaid")
            ]
        );
    }

    #[test]
    fn merge_is_shallow_and_clears_keys() {
        let mut params = ListParams::default()
            .with_filter("status", FilterValue::text("active"))
            .with_filter("user_id", FilterValue::Integer(7));
        params.merge(
            ParamsPatch::default()
                .search("jo")
                .clear_filter("status")
                .page(3),
        );

        assert_eq!(params.page, 3);
        assert_eq!(params.per_page, DEFAULT_PER_PAGE);
        assert_eq!(params.search.as_deref(), Some("jo"));
        assert!(!params.filters.contains_key("status"));
        assert_eq!(params.filters.get("user_id"), Some(&FilterValue::Integer(7)));
    }

    #[test]
    fn empty_search_is_not_sent() {
        let params = ListParams::default().with_search("");
        assert!(params.to_query().iter().all(|(k, _)| k != "search"));
    }

    #[test]
    fn sort_cycle_returns_to_none() {
        let first = SortOrder::cycle(None);
        let second = SortOrder::cycle(first);
        assert_eq!(first, Some(SortOrder::Ascending));
        assert_eq!(second, Some(SortOrder::Descending));
        assert_eq!(SortOrder::cycle(second), None);
    }
}
