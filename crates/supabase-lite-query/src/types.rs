use std::fmt;

/// Comparison operators accepted by [`Filterable::not`](crate::Filterable::not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    Is,
    In,
    Contains,
    ContainedBy,
}

impl FilterOperator {
    /// PostgREST operator keyword.
    pub fn as_postgrest(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::ILike => "ilike",
            Self::Is => "is",
            Self::In => "in",
            Self::Contains => "cs",
            Self::ContainedBy => "cd",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_postgrest())
    }
}

/// Right-hand side of an `is` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsValue {
    Null,
    True,
    False,
    Unknown,
}

impl IsValue {
    pub fn as_postgrest(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for IsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_postgrest())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

impl OrderDirection {
    pub fn as_postgrest(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// Count mode requested through the `Prefer` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountOption {
    /// Exact count via `COUNT(*)`.
    Exact,
    /// Planner estimate.
    Planned,
    /// Exact for small tables, planner estimate above PostgREST's threshold.
    Estimated,
}

impl CountOption {
    pub fn as_postgrest(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Planned => "planned",
            Self::Estimated => "estimated",
        }
    }
}

/// Inclusive row window, sent as `Range: <start>-<end>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: u64,
    pub end: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_keywords() {
        assert_eq!(FilterOperator::Eq.to_string(), "eq");
        assert_eq!(FilterOperator::ILike.to_string(), "ilike");
        assert_eq!(FilterOperator::Contains.to_string(), "cs");
        assert_eq!(FilterOperator::ContainedBy.to_string(), "cd");
    }

    #[test]
    fn test_is_values() {
        assert_eq!(IsValue::Null.to_string(), "null");
        assert_eq!(IsValue::Unknown.to_string(), "unknown");
    }
}
