//! JSON row storage for the offline table backend.
//!
//! Filters and ordering run in SQLite through `json_extract`; identifiers are
//! validated and JSON paths are bound as parameters, never spliced into SQL.

use chrono::{SecondsFormat, Utc};
use fisionet_remote::query::validate_column;
use fisionet_remote::{Direction, Filter, Query};
use rusqlite::params_from_iter;
use rusqlite::types::Value as SqlValue;
use serde_json::{Map, Value};

use super::{Database, DbError, DbResult};

fn sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn json_path(column: &str) -> DbResult<SqlValue> {
    validate_column(column).map_err(|e| DbError::Constraint(e.to_string()))?;
    Ok(SqlValue::Text(format!("$.{}", column)))
}

/// `WHERE` clause for one table plus equality filters.
fn where_clause(table: &str, filters: &[Filter], params: &mut Vec<SqlValue>) -> DbResult<String> {
    params.push(SqlValue::Text(table.to_string()));
    let mut sql = String::from(" WHERE table_name = ?1");

    for filter in filters {
        params.push(json_path(&filter.column)?);
        let path_idx = params.len();
        match &filter.value {
            Value::Null => {
                sql.push_str(&format!(" AND json_extract(body, ?{}) IS NULL", path_idx));
            }
            value => {
                params.push(sql_value(value));
                sql.push_str(&format!(
                    " AND json_extract(body, ?{}) = ?{}",
                    path_idx,
                    params.len()
                ));
            }
        }
    }
    Ok(sql)
}

fn require_object(row: &Value) -> DbResult<&Map<String, Value>> {
    row.as_object()
        .ok_or_else(|| DbError::Constraint(format!("row must be a JSON object, got {}", row)))
}

impl Database {
    /// Select rows of `table` matching `query`.
    pub fn select_rows(&self, table: &str, query: &Query) -> DbResult<Vec<Value>> {
        validate_column(table).map_err(|e| DbError::Constraint(e.to_string()))?;

        let mut params = Vec::new();
        let mut sql = String::from("SELECT body FROM local_rows");
        sql.push_str(&where_clause(table, &query.filters, &mut params)?);

        let mut terms = Vec::with_capacity(query.order.len() + 1);
        for order in &query.order {
            params.push(json_path(&order.column)?);
            let direction = match order.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            terms.push(format!("json_extract(body, ?{}) {}", params.len(), direction));
        }
        terms.push("id ASC".to_string());
        sql.push_str(" ORDER BY ");
        sql.push_str(&terms.join(", "));

        if let Some(limit) = query.limit {
            params.push(SqlValue::Integer(limit as i64));
            sql.push_str(&format!(" LIMIT ?{}", params.len()));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let bodies = stmt
            .query_map(params_from_iter(params.iter()), |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(bodies.len());
        for body in bodies {
            let mut row: Value = serde_json::from_str(&body)?;
            if let (Some(columns), Value::Object(map)) = (&query.columns, &mut row) {
                map.retain(|key, _| columns.iter().any(|c| c == key));
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// Advance and return the id counter of `table`. A table without a
    /// counter starts after its highest stored id. Ids are never reused,
    /// even after the rows holding them are deleted.
    fn next_id(&self, table: &str) -> DbResult<i64> {
        self.conn.execute(
            "INSERT INTO row_sequences (table_name, last_id)
             VALUES (?1, COALESCE((SELECT MAX(id) FROM local_rows WHERE table_name = ?1), 0) + 1)
             ON CONFLICT(table_name) DO UPDATE SET last_id = last_id + 1",
            [table],
        )?;
        Ok(self.conn.query_row(
            "SELECT last_id FROM row_sequences WHERE table_name = ?1",
            [table],
            |r| r.get(0),
        )?)
    }

    /// Insert a row, assigning the next id of `table` and a `created_at`
    /// stamp when absent. Returns the stored row.
    pub fn insert_row(&self, table: &str, row: &Value) -> DbResult<Value> {
        validate_column(table).map_err(|e| DbError::Constraint(e.to_string()))?;
        let mut body = require_object(row)?.clone();

        let id = self.next_id(table)?;
        body.insert("id".to_string(), Value::from(id));
        if body.get("created_at").map_or(true, Value::is_null) {
            body.insert(
                "created_at".to_string(),
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
            );
        }

        let stored = Value::Object(body);
        self.conn.execute(
            "INSERT INTO local_rows (table_name, id, body) VALUES (?1, ?2, ?3)",
            rusqlite::params![table, id, serde_json::to_string(&stored)?],
        )?;
        Ok(stored)
    }

    /// Merge `patch` into every matching row. `id` is never overwritten.
    /// Returns the number of rows touched.
    pub fn update_rows(&self, table: &str, patch: &Value, filters: &[Filter]) -> DbResult<usize> {
        validate_column(table).map_err(|e| DbError::Constraint(e.to_string()))?;
        let patch = require_object(patch)?;

        let mut params = Vec::new();
        let mut sql = String::from("SELECT id, body FROM local_rows");
        sql.push_str(&where_clause(table, filters, &mut params)?);

        let matches = {
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(params.iter()), |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        for (id, body) in &matches {
            let mut row: Map<String, Value> = serde_json::from_str(body)?;
            for (key, value) in patch {
                if key != "id" {
                    row.insert(key.clone(), value.clone());
                }
            }
            self.conn.execute(
                "UPDATE local_rows SET body = ?1 WHERE table_name = ?2 AND id = ?3",
                rusqlite::params![serde_json::to_string(&row)?, table, id],
            )?;
        }
        Ok(matches.len())
    }

    /// Delete every matching row. Returns the number removed.
    pub fn delete_rows(&self, table: &str, filters: &[Filter]) -> DbResult<usize> {
        validate_column(table).map_err(|e| DbError::Constraint(e.to_string()))?;

        let mut params = Vec::new();
        let mut sql = String::from("DELETE FROM local_rows");
        sql.push_str(&where_clause(table, filters, &mut params)?);

        Ok(self.conn.execute(&sql, params_from_iter(params.iter()))?)
    }
}
