//! Typed statements for the restricted query surface.
//!
//! The grammar is intentionally closed: four statement kinds, positional
//! parameters only, a single FROM table, equality-and-AND WHERE clauses,
//! and a single-column ORDER BY. Anything the original surface tolerated
//! but ignored (GROUP BY, join clauses on unsupported tables, vacuous
//! WHERE terms) is still represented so the executor can ignore it in the
//! same places.

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    /// Column names in declaration order; column `i` binds to `params[i]`
    /// regardless of the placeholder numbers written in the VALUES list.
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: String,
    pub assignments: Vec<Assignment>,
    /// Column from the single `WHERE <col>=$m` pair. The filter value used
    /// at execution time is the last element of the parameter array.
    pub where_column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: SetValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetValue {
    /// `$n` — consumes the next unconsumed positional parameter.
    Param,
    /// `NOW()` — resolves to the current timestamp, consumes nothing.
    Now,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub table: String,
    pub joins: Vec<JoinClause>,
    pub where_clause: Vec<WhereTerm>,
    /// Parsed but never applied to results.
    pub group_by: Vec<String>,
    pub order_by: Option<OrderBy>,
}

/// A parsed `LEFT JOIN <table> [<alias>] ON <left>=<right>` clause. Only
/// the stance-point relationship described in [`crate::join`] has any
/// effect; other join clauses are carried but inert.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub table: String,
    pub alias: Option<String>,
    pub left: String,
    pub right: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WhereTerm {
    /// `<column> = $n` — equality against the next sequentially consumed
    /// parameter.
    Eq { column: String },
    /// Any other condition shape. Imposes no filter and consumes no
    /// parameter.
    Vacuous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: String,
    /// Column from `WHERE <col> = $1`. `None` when the WHERE clause did not
    /// match that exact shape; such a statement silently deletes nothing.
    pub filter_column: Option<String>,
}
