use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

/// One small table handed to the renderer.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ReportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn new(title: &str, headers: &[&str]) -> Self {
        ReportTable {
            title: title.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row with a leading 1-based row number.
    pub fn push_numbered(&mut self, cells: Vec<String>) {
        let mut row = vec![(self.rows.len() + 1).to_string()];
        row.extend(cells);
        self.rows.push(row);
    }
}

/// Renderer handoff for one system: the placeholder values substituted into
/// the report template plus the tables populated into it. Every key is
/// written by exactly one rule; the key names are the template's placeholder
/// names and must not be changed here.
#[derive(Debug, Default, Serialize)]
pub struct ReportContext {
    pub values: BTreeMap<String, String>,
    pub tables: Vec<ReportTable>,
}

impl ReportContext {
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn add_table(&mut self, table: ReportTable) {
        self.tables.push(table);
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ── Tests ──
