//! Parameterized predicate builder for store filters.
//!
//! Filters are built from (field, operator, value) triples and rendered to
//! `?`-placeholder SQL plus an ordered bind list. Field names are
//! compile-time literals and values are always bound, never interpolated.

use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::SqliteArguments;
use sqlx::{Sqlite, sqlite::SqliteRow};

/// A bindable filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// A filter expression over one store table.
#[derive(Debug, Clone)]
pub enum Filter {
    /// `field = ?`
    Eq(&'static str, Value),
    /// `field < ?`
    Lt(&'static str, Value),
    /// Conjunction; renders `1=1` when empty
    And(Vec<Filter>),
    /// Disjunction; renders `0=1` when empty
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Eq(field, value.into())
    }

    pub fn lt(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Lt(field, value.into())
    }

    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }

    /// Render to a SQL fragment, appending bind values in placeholder order.
    pub fn render(&self, binds: &mut Vec<Value>) -> String {
        match self {
            Filter::Eq(field, value) => {
                binds.push(value.clone());
                format!("{field} = ?")
            }
            Filter::Lt(field, value) => {
                binds.push(value.clone());
                format!("{field} < ?")
            }
            Filter::And(filters) => {
                if filters.is_empty() {
                    return "1=1".to_string();
                }
                let parts: Vec<String> = filters.iter().map(|f| f.render(binds)).collect();
                format!("({})", parts.join(" AND "))
            }
            Filter::Or(filters) => {
                if filters.is_empty() {
                    return "0=1".to_string();
                }
                let parts: Vec<String> = filters.iter().map(|f| f.render(binds)).collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }
}

pub(crate) fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: Vec<Value>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            Value::Text(v) => query.bind(v),
            Value::Int(v) => query.bind(v),
            Value::Bool(v) => query.bind(v),
        };
    }
    query
}

pub(crate) fn bind_all_as<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    values: Vec<Value>,
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>>
where
    O: for<'r> sqlx::FromRow<'r, SqliteRow>,
{
    for value in values {
        query = match value {
            Value::Text(v) => query.bind(v),
            Value::Int(v) => query.bind(v),
            Value::Bool(v) => query.bind(v),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_eq() {
        let mut binds = Vec::new();
        let sql = Filter::eq("bot_scope", "botto").render(&mut binds);
        assert_eq!(sql, "bot_scope = ?");
        assert_eq!(binds, vec![Value::Text("botto".to_string())]);
    }

    #[test]
    fn test_render_nested() {
        let filter = Filter::or([
            Filter::and([
                Filter::eq("bot_scope", "botto"),
                Filter::eq("norm_text", "stay hungry"),
            ]),
            Filter::eq("message_id", "42"),
        ]);

        let mut binds = Vec::new();
        let sql = filter.render(&mut binds);
        assert_eq!(
            sql,
            "((bot_scope = ? AND norm_text = ?) OR message_id = ?)"
        );
        assert_eq!(binds.len(), 3);
    }

    #[test]
    fn test_values_never_interpolated() {
        // A hostile value lands in the bind list, not the SQL text
        let mut binds = Vec::new();
        let sql = Filter::eq("norm_text", "x' OR '1'='1").render(&mut binds);
        assert_eq!(sql, "norm_text = ?");
        assert_eq!(binds, vec![Value::Text("x' OR '1'='1".to_string())]);
    }

    #[test]
    fn test_empty_groups() {
        let mut binds = Vec::new();
        assert_eq!(Filter::and([]).render(&mut binds), "1=1");
        assert_eq!(Filter::or([]).render(&mut binds), "0=1");
        assert!(binds.is_empty());
    }

    #[test]
    fn test_lt() {
        let mut binds = Vec::new();
        let sql = Filter::lt("created_at", 1700000000i64).render(&mut binds);
        assert_eq!(sql, "created_at < ?");
        assert_eq!(binds, vec![Value::Int(1700000000)]);
    }
}
