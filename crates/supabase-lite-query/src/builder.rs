use std::fmt::Display;

use crate::filter::Filterable;
use crate::postgrest::build_query_string;
use crate::types::{CountOption, OrderDirection, RowRange};

/// Dynamic, string-based query against one table.
///
/// Filters and modifiers are rendered eagerly, in call order, into PostgREST
/// `key=value` strings. Execute it with
/// [`PostgrestClient::execute`](crate::PostgrestClient::execute) or use it as the row
/// selector of an update or delete batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    table: String,
    filters: Vec<String>,
    range: Option<RowRange>,
    count: Option<CountOption>,
}

impl QueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            range: None,
            count: None,
        }
    }

    /// Columns to return, e.g. `"id,name,email"` or `"*"`.
    pub fn select(mut self, columns: &str) -> Self {
        self.filters.push(format!("select={}", columns));
        self
    }

    /// Limit the number of rows returned.
    pub fn limit(mut self, n: u64) -> Self {
        self.filters.push(format!("limit={}", n));
        self
    }

    /// Skip the first `n` rows.
    pub fn offset(mut self, n: u64) -> Self {
        self.filters.push(format!("offset={}", n));
        self
    }

    /// Order by a column.
    pub fn order(mut self, column: &str, direction: OrderDirection) -> Self {
        self.filters
            .push(format!("order={}.{}", column, direction.as_postgrest()));
        self
    }

    /// Request rows `start..=end` through the `Range` header.
    pub fn range(mut self, start: u64, end: u64) -> Self {
        self.range = Some(RowRange { start, end });
        self
    }

    /// Ask the backend for a total row count, reported back through `Content-Range`.
    pub fn count(mut self, option: CountOption) -> Self {
        self.count = Some(option);
        self
    }

    /// Append an already rendered `key=value` filter verbatim.
    pub fn filter_raw(mut self, filter: impl Display) -> Self {
        self.filters.push(filter.to_string());
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn range_window(&self) -> Option<RowRange> {
        self.range
    }

    pub fn count_option(&self) -> Option<CountOption> {
        self.count
    }

    /// Encoded query string: `?` followed by the filters joined with `&`, or empty.
    pub fn to_query_string(&self) -> String {
        build_query_string(&self.filters)
    }
}

impl Filterable for QueryBuilder {
    fn filters_mut(&mut self) -> &mut Vec<String> {
        &mut self.filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_scenario() {
        let query = QueryBuilder::new("users")
            .select("id,name,email")
            .eq("id", "123")
            .limit(10);
        assert_eq!(
            query.to_query_string(),
            "?select=id%2Cname%2Cemail&id=eq.123&limit=10"
        );
    }

    #[test]
    fn test_filters_in_call_order() {
        let query = QueryBuilder::new("posts")
            .order("created_at", OrderDirection::Descending)
            .gt("likes", 5)
            .offset(20)
            .select("*");
        assert_eq!(
            query.filters(),
            ["order=created_at.desc", "likes=gt.5", "offset=20", "select=*"]
        );
    }

    #[test]
    fn test_empty_query_string() {
        let query = QueryBuilder::new("users");
        assert_eq!(query.to_query_string(), "");
        assert_eq!(query.table(), "users");
    }

    #[test]
    fn test_range_and_count_are_not_filters() {
        let query = QueryBuilder::new("users")
            .range(0, 9)
            .count(CountOption::Exact);
        assert!(query.filters().is_empty());
        assert_eq!(query.range_window(), Some(RowRange { start: 0, end: 9 }));
        assert_eq!(query.count_option(), Some(CountOption::Exact));
    }

    #[test]
    fn test_in_filter_chains() {
        let query = QueryBuilder::new("users")
            .in_("id", ["a", "b"])
            .unwrap()
            .eq("active", true);
        assert_eq!(query.filters(), ["id=in.(a,b)", "active=eq.true"]);
        assert_eq!(query.to_query_string(), "?id=in.%28a%2Cb%29&active=eq.true");
    }
}
