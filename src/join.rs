//! The one supported join relationship.
//!
//! This is not a general join engine. Exactly one relationship exists:
//! stance points gain a `sources` array of their linked reference rows,
//! resolved through the `stance_point_references` junction table. The
//! descriptor below names every part of that relationship so it can be
//! tested on its own; no other table combination is honored.

use crate::database::{Database, Row};
use serde_json::Value;

/// A named parent/junction/child relationship attached during SELECT.
pub struct JoinSpec {
    /// FROM table that activates the join.
    pub parent: &'static str,
    /// Junction table holding one row per link.
    pub junction: &'static str,
    /// Junction column matching the parent row's `id`.
    pub junction_parent_key: &'static str,
    /// Junction column matching the child row's `id`.
    pub junction_child_key: &'static str,
    /// Table the junction resolves into.
    pub child: &'static str,
    /// Field name the resolved child rows are attached under.
    pub attach_as: &'static str,
    /// Child fields projected into the attached rows.
    pub projected: &'static [&'static str],
}

pub const STANCE_POINT_SOURCES: JoinSpec = JoinSpec {
    parent: "stance_points",
    junction: "stance_point_references",
    junction_parent_key: "stance_point_id",
    junction_child_key: "reference_id",
    child: "references",
    attach_as: "sources",
    projected: &[
        "id",
        "url",
        "title",
        "excerpt",
        "published_date",
        "source_type",
    ],
};

impl JoinSpec {
    /// Attach resolved child rows to each parent row. Rows with no links
    /// get an empty array. Attached rows follow the junction table's
    /// insertion order.
    pub fn attach(&self, db: &Database, rows: &mut [Row]) {
        let junction = db.table(self.junction);
        let children = db.table(self.child);
        let (Ok(junction), Ok(children)) = (junction, children) else {
            return;
        };

        for row in rows.iter_mut() {
            let parent_id = row.get("id").cloned().unwrap_or(Value::Null);
            let resolved: Vec<Value> = junction
                .iter()
                .filter(|link| link.get(self.junction_parent_key) == Some(&parent_id))
                .filter_map(|link| {
                    let child_id = link.get(self.junction_child_key)?;
                    children
                        .iter()
                        .find(|child| child.get("id") == Some(child_id))
                })
                .map(|child| Value::Object(self.project(child)))
                .collect();
            row.insert(self.attach_as.to_string(), Value::Array(resolved));
        }
    }

    fn project(&self, child: &Row) -> Row {
        let mut out = Row::new();
        for field in self.projected {
            if let Some(value) = child.get(*field) {
                out.insert((*field).to_string(), value.clone());
            }
        }
        out
    }
}
