//! Row queries: equality filters, ordering and column projection.
//!
//! Rendered as data-API query parameters by [`Query::to_params`]; the
//! offline backend interprets the same structure against SQLite.

use serde_json::Value;

use crate::error::{RemoteError, RemoteResult};

/// Equality predicate on a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    /// `column = value`.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Render as a `(column, "eq.value")` pair.
    pub fn to_param(&self) -> (String, String) {
        let rendered = match &self.value {
            Value::Null => "is.null".to_string(),
            Value::String(s) => format!("eq.{}", s),
            other => format!("eq.{}", other),
        };
        (self.column.clone(), rendered)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// A single ordering term.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// Select query against one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Equality filters, combined with AND
    pub filters: Vec<Filter>,
    /// Ordering terms, applied left to right
    pub order: Vec<Order>,
    /// Projected columns (`None` = all)
    pub columns: Option<Vec<String>>,
    /// Maximum number of rows
    pub limit: Option<usize>,
}

impl Query {
    /// Query for every row of the table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    /// Add an ordering term.
    pub fn order(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order.push(Order {
            column: column.into(),
            direction,
        });
        self
    }

    /// Restrict the returned columns.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Cap the number of rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Reject column names that could escape the query syntax.
    pub fn validate(&self) -> RemoteResult<()> {
        let filter_columns = self.filters.iter().map(|f| f.column.as_str());
        let order_columns = self.order.iter().map(|o| o.column.as_str());
        let projected = self.columns.iter().flatten().map(String::as_str);

        for column in filter_columns.chain(order_columns).chain(projected) {
            validate_column(column)?;
        }
        Ok(())
    }

    /// Render as data-API query parameters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 3);

        let select = match &self.columns {
            Some(columns) if !columns.is_empty() => columns.join(","),
            _ => "*".to_string(),
        };
        params.push(("select".to_string(), select));

        params.extend(self.filters.iter().map(Filter::to_param));

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, o.direction.as_str()))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }
}

/// Column and table identifiers: ASCII letters, digits and underscores.
pub fn validate_column(name: &str) -> RemoteResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RemoteError::InvalidRequest(format!(
            "invalid identifier: {:?}",
            name
        )))
    }
}

/// Render filters alone (for update and delete requests).
pub fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(Filter::to_param).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_query_selects_everything() {
        let params = Query::new().to_params();
        assert_eq!(params, vec![("select".to_string(), "*".to_string())]);
    }

    #[test]
    fn test_filters_and_order() {
        let query = Query::new()
            .eq("patient_id", 7)
            .eq("date", "2024-06-01")
            .order("date", Direction::Desc)
            .order("time", Direction::Asc);

        let params = query.to_params();
        assert!(params.contains(&("patient_id".into(), "eq.7".into())));
        assert!(params.contains(&("date".into(), "eq.2024-06-01".into())));
        assert!(params.contains(&("order".into(), "date.desc,time.asc".into())));
    }

    #[test]
    fn test_null_filter_uses_is() {
        let (column, value) = Filter::eq("patient_id", Value::Null).to_param();
        assert_eq!(column, "patient_id");
        assert_eq!(value, "is.null");
    }

    #[test]
    fn test_projection_and_limit() {
        let params = Query::new().columns(["id", "name"]).limit(5).to_params();
        assert_eq!(params[0], ("select".to_string(), "id,name".to_string()));
        assert!(params.contains(&("limit".into(), "5".into())));
    }

    #[test]
    fn test_validate_rejects_injection() {
        assert!(Query::new().eq("name", "x").validate().is_ok());
        assert!(Query::new().eq("name;drop", "x").validate().is_err());
        assert!(Query::new().order("", Direction::Asc).validate().is_err());
        assert!(Query::new().columns(["id,name"]).validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_identifier_charset(name in "[a-z_][a-z0-9_]{0,20}") {
            prop_assert!(validate_column(&name).is_ok());
        }

        #[test]
        fn prop_punctuation_rejected(prefix in "[a-z]{1,5}", bad in "[.,;=&() ]", suffix in "[a-z]{0,5}") {
            let name = format!("{}{}{}", prefix, bad, suffix);
            prop_assert!(validate_column(&name).is_err());
        }
    }
}
