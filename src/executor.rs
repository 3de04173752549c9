use crate::ast::*;
use crate::database::{Database, Row};
use crate::join::STANCE_POINT_SOURCES;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use uuid::Uuid;

/// Current time as an ISO 8601 UTC string with millisecond precision.
fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Row field lookup. Qualified names (`alias.col`) resolve against the
/// unqualified field, since rows never store qualified keys.
fn field<'a>(row: &'a Row, name: &str) -> Option<&'a Value> {
    let name = name.rsplit('.').next().unwrap_or(name);
    row.get(name)
}

pub fn execute_insert(
    db: &mut Database,
    stmt: &InsertStatement,
    params: &[Value],
) -> crate::Result<Vec<Row>> {
    let table = db.table_mut(&stmt.table)?;

    let mut row = Row::new();
    row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    row.insert("created_at".to_string(), Value::String(iso_now()));
    // Columns bind to parameters strictly by position; literal placeholder
    // numbers in the VALUES list are ignored. A column past the end of the
    // parameter array binds nothing, and an explicit `id` or `created_at`
    // column overrides the generated value.
    for (column, value) in stmt.columns.iter().zip(params) {
        row.insert(column.clone(), value.clone());
    }

    tracing::debug!(table = %stmt.table, "insert");
    table.push(row.clone());
    Ok(vec![row])
}

pub fn execute_update(
    db: &mut Database,
    stmt: &UpdateStatement,
    params: &[Value],
) -> crate::Result<Vec<Row>> {
    let now = iso_now();

    // SET resolves left to right: NOW() consumes no parameter, a
    // placeholder consumes the next unconsumed one regardless of its
    // literal number.
    let mut next = 0usize;
    let mut updates: Vec<(String, Value)> = Vec::new();
    for assignment in &stmt.assignments {
        let value = match assignment.value {
            SetValue::Now => Value::String(now.clone()),
            SetValue::Param => {
                let value = params.get(next).cloned().unwrap_or(Value::Null);
                next += 1;
                value
            }
        };
        updates.push((assignment.column.clone(), value));
    }
    updates.push(("updated_at".to_string(), Value::String(now)));

    // The filter value is always the last parameter, not the one the WHERE
    // placeholder number points at.
    let filter = params.last();

    let table = db.table_mut(&stmt.table)?;
    let Some(row) = table
        .iter_mut()
        .find(|row| field(row, &stmt.where_column) == filter)
    else {
        return Ok(Vec::new());
    };

    for (column, value) in updates {
        row.insert(column, value);
    }
    tracing::debug!(table = %stmt.table, column = %stmt.where_column, "update");
    Ok(vec![row.clone()])
}

pub fn execute_delete(
    db: &mut Database,
    stmt: &DeleteStatement,
    params: &[Value],
) -> crate::Result<Vec<Row>> {
    let table = db.table_mut(&stmt.table)?;

    // A WHERE clause outside the single supported shape deletes nothing.
    let Some(column) = &stmt.filter_column else {
        return Ok(Vec::new());
    };
    let target = params.first();

    let before = table.len();
    table.retain(|row| field(row, column) != target);
    tracing::debug!(
        table = %stmt.table,
        removed = before - table.len(),
        "delete"
    );
    Ok(Vec::new())
}

pub fn execute_select(
    db: &Database,
    stmt: &SelectStatement,
    params: &[Value],
) -> crate::Result<Vec<Row>> {
    let rows = db.table(&stmt.table)?;
    let mut rows = apply_where(rows, &stmt.where_clause, params);

    if stmt.table == STANCE_POINT_SOURCES.parent && !stmt.joins.is_empty() {
        STANCE_POINT_SOURCES.attach(db, &mut rows);
    }

    if let Some(order) = &stmt.order_by {
        sort_rows(&mut rows, order);
    }
    Ok(rows)
}

/// Equality-only, AND-only filtering. Each equality term consumes the next
/// parameter in term order; vacuous terms filter nothing and consume
/// nothing. No WHERE terms means no filtering.
fn apply_where(rows: &[Row], terms: &[WhereTerm], params: &[Value]) -> Vec<Row> {
    let mut next = 0usize;
    let conditions: Vec<(&str, Option<&Value>)> = terms
        .iter()
        .filter_map(|term| match term {
            WhereTerm::Eq { column } => {
                let value = params.get(next);
                next += 1;
                Some((column.as_str(), value))
            }
            WhereTerm::Vacuous => None,
        })
        .collect();

    rows.iter()
        .filter(|row| {
            conditions
                .iter()
                .all(|(column, value)| field(row, column) == *value)
        })
        .cloned()
        .collect()
}

/// Stable sort on one field. Missing fields sort as null.
fn sort_rows(rows: &mut [Row], order: &OrderBy) {
    rows.sort_by(|a, b| {
        let ordering = compare_fields(field(a, &order.column), field(b, &order.column));
        if order.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        // Mixed or structured types order by kind only; stability keeps
        // their relative input order.
        _ => rank(a).cmp(&rank(b)),
    }
}
