use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One record within a table: an open field-to-value mapping. Rows inserted
/// through the query interface always carry `id` and `created_at`.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Names of the five tables, in on-disk key order.
pub const TABLE_NAMES: [&str; 5] = [
    "tracking_sessions",
    "stance_points",
    "references",
    "stance_point_references",
    "scraper_configs",
];

/// The whole database. The table set is closed at compile time: a struct
/// with five fields rather than a map, so no other table can be created and
/// the serialized file is always a single object with exactly these five
/// keys.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub tracking_sessions: Vec<Row>,
    #[serde(default)]
    pub stance_points: Vec<Row>,
    #[serde(default)]
    pub references: Vec<Row>,
    #[serde(default)]
    pub stance_point_references: Vec<Row>,
    #[serde(default)]
    pub scraper_configs: Vec<Row>,
}

impl Database {
    pub fn new() -> Self {
        Database::default()
    }

    pub fn table(&self, name: &str) -> Result<&Vec<Row>> {
        match name {
            "tracking_sessions" => Ok(&self.tracking_sessions),
            "stance_points" => Ok(&self.stance_points),
            "references" => Ok(&self.references),
            "stance_point_references" => Ok(&self.stance_point_references),
            "scraper_configs" => Ok(&self.scraper_configs),
            other => Err(Error::UnknownTable(other.to_string())),
        }
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut Vec<Row>> {
        match name {
            "tracking_sessions" => Ok(&mut self.tracking_sessions),
            "stance_points" => Ok(&mut self.stance_points),
            "references" => Ok(&mut self.references),
            "stance_point_references" => Ok(&mut self.stance_point_references),
            "scraper_configs" => Ok(&mut self.scraper_configs),
            other => Err(Error::UnknownTable(other.to_string())),
        }
    }
}
