use std::fmt::Display;

use supabase_lite_core::{SupabaseError, SupabaseResult};

use crate::types::{FilterOperator, IsValue};

/// Filter methods shared by query builders.
///
/// Every call appends exactly one rendered `<column>=<operator>.<value>` string to the
/// builder's filter list, in call order. Column names and values are not validated; values
/// are rendered with their `Display` implementation.
pub trait Filterable: Sized {
    /// Get a mutable reference to the rendered filter list.
    fn filters_mut(&mut self) -> &mut Vec<String>;

    #[doc(hidden)]
    fn push_operator(
        mut self,
        column: &str,
        operator: FilterOperator,
        value: impl Display,
    ) -> Self {
        self.filters_mut()
            .push(format!("{}={}.{}", column, operator.as_postgrest(), value));
        self
    }

    /// Filter: column = value
    fn eq(self, column: &str, value: impl Display) -> Self {
        self.push_operator(column, FilterOperator::Eq, value)
    }

    /// Filter: column != value
    fn neq(self, column: &str, value: impl Display) -> Self {
        self.push_operator(column, FilterOperator::Neq, value)
    }

    /// Filter: column > value
    fn gt(self, column: &str, value: impl Display) -> Self {
        self.push_operator(column, FilterOperator::Gt, value)
    }

    /// Filter: column >= value
    fn gte(self, column: &str, value: impl Display) -> Self {
        self.push_operator(column, FilterOperator::Gte, value)
    }

    /// Filter: column < value
    fn lt(self, column: &str, value: impl Display) -> Self {
        self.push_operator(column, FilterOperator::Lt, value)
    }

    /// Filter: column <= value
    fn lte(self, column: &str, value: impl Display) -> Self {
        self.push_operator(column, FilterOperator::Lte, value)
    }

    /// Filter: column LIKE pattern
    fn like(self, column: &str, pattern: impl Display) -> Self {
        self.push_operator(column, FilterOperator::Like, pattern)
    }

    /// Filter: column ILIKE pattern (case-insensitive)
    fn ilike(self, column: &str, pattern: impl Display) -> Self {
        self.push_operator(column, FilterOperator::ILike, pattern)
    }

    /// Filter: column IS value
    fn is(self, column: &str, value: IsValue) -> Self {
        self.push_operator(column, FilterOperator::Is, value)
    }

    /// Filter: column IN (v1, v2, ...)
    ///
    /// Values keep their input order. An empty list is rejected with
    /// [`SupabaseError::EmptyInList`] since PostgREST cannot express it.
    fn in_<I, V>(mut self, column: &str, values: I) -> SupabaseResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        let rendered: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        if rendered.is_empty() {
            return Err(SupabaseError::EmptyInList {
                column: column.to_string(),
            });
        }
        self.filters_mut()
            .push(format!("{}=in.({})", column, rendered.join(",")));
        Ok(self)
    }

    /// Negate an operator: `<column>=not.<op>.<value>`
    fn not(mut self, column: &str, operator: FilterOperator, value: impl Display) -> Self {
        self.filters_mut().push(format!(
            "{}=not.{}.{}",
            column,
            operator.as_postgrest(),
            value
        ));
        self
    }

    /// Filter: column @> {value} (array/jsonb contains)
    fn contains(mut self, column: &str, value: impl Display) -> Self {
        self.filters_mut().push(format!("{}=cs.{{{}}}", column, value));
        self
    }

    /// Filter: column <@ {value} (contained by)
    fn contained_by(mut self, column: &str, value: impl Display) -> Self {
        self.filters_mut().push(format!("{}=cd.{{{}}}", column, value));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collector(Vec<String>);

    impl Filterable for Collector {
        fn filters_mut(&mut self) -> &mut Vec<String> {
            &mut self.0
        }
    }

    #[test]
    fn test_comparison_filters() {
        let c = Collector::default()
            .eq("id", 1)
            .neq("name", "bob")
            .gt("age", 18)
            .gte("age", 21)
            .lt("score", 9.5)
            .lte("score", 10);
        assert_eq!(
            c.0,
            vec![
                "id=eq.1",
                "name=neq.bob",
                "age=gt.18",
                "age=gte.21",
                "score=lt.9.5",
                "score=lte.10"
            ]
        );
    }

    #[test]
    fn test_pattern_and_is_filters() {
        let c = Collector::default()
            .like("name", "%al%")
            .ilike("email", "%@EXAMPLE.com")
            .is("deleted_at", IsValue::Null);
        assert_eq!(
            c.0,
            vec!["name=like.%al%", "email=ilike.%@EXAMPLE.com", "deleted_at=is.null"]
        );
    }

    #[test]
    fn test_in_keeps_order() {
        let c = Collector::default().in_("id", [3, 1, 2]).unwrap();
        assert_eq!(c.0, vec!["id=in.(3,1,2)"]);
    }

    #[test]
    fn test_in_empty_is_error() {
        let err = Collector::default()
            .in_("id", Vec::<i32>::new())
            .err()
            .unwrap();
        match err {
            SupabaseError::EmptyInList { column } => assert_eq!(column, "id"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_not_and_containment() {
        let c = Collector::default()
            .not("status", FilterOperator::Eq, "archived")
            .not("role", FilterOperator::Is, IsValue::Null)
            .contains("tags", "a,b")
            .contained_by("tags", "x");
        assert_eq!(
            c.0,
            vec![
                "status=not.eq.archived",
                "role=not.is.null",
                "tags=cs.{a,b}",
                "tags=cd.{x}"
            ]
        );
    }
}
