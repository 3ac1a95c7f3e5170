//! Core table types for representing delimited text data

use crate::error::ParseError;
use serde::Serialize;
use std::collections::HashSet;

/// Ordered, unique column names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    /// Build a header, rejecting an empty name list or repeated names
    pub fn new<I, S>(names: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ParseError::DuplicateHeader(name.clone()));
            }
        }

        Ok(Self { names })
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether there are no columns
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column names in order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Position of a column by name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub(crate) fn push(&mut self, name: String) -> usize {
        self.names.push(name);
        self.names.len() - 1
    }

    pub(crate) fn remove(&mut self, index: usize) -> String {
        self.names.remove(index)
    }
}

/// A row of data, one field per header column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub(crate) fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// A row of `width` empty fields
    pub(crate) fn blank(width: usize) -> Self {
        Self {
            cells: vec![String::new(); width],
        }
    }

    /// Get a field by column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn set(&mut self, index: usize, value: String) {
        self.cells[index] = value;
    }

    pub(crate) fn push(&mut self, value: String) {
        self.cells.push(value);
    }

    pub(crate) fn remove(&mut self, index: usize) -> String {
        self.cells.remove(index)
    }
}

/// A header plus rows, every row exactly as wide as the header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    header: Header,
    rows: Vec<Row>,
}

impl Table {
    /// Create a table with no rows
    pub fn new(header: Header) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Look up a field by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.header.position(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    pub(crate) fn push_row(&mut self, row: Row) -> usize {
        debug_assert_eq!(row.len(), self.header.len());
        self.rows.push(row);
        self.rows.len() - 1
    }

    pub(crate) fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(Header::new(["name", "note"]).unwrap());
        table.push_row(Row::new(vec!["Ada".to_string(), "hi".to_string()]));
        table.push_row(Row::blank(2));
        table
    }

    #[test]
    fn test_header_rejects_duplicates() {
        assert_eq!(
            Header::new(["a", "b", "a"]),
            Err(ParseError::DuplicateHeader("a".to_string()))
        );
    }

    #[test]
    fn test_header_rejects_empty() {
        assert_eq!(
            Header::new(Vec::<String>::new()),
            Err(ParseError::EmptyInput)
        );
    }

    #[test]
    fn test_header_allows_single_empty_name() {
        let header = Header::new([""]).unwrap();
        assert_eq!(header.len(), 1);
        assert_eq!(header.position(""), Some(0));
    }

    #[test]
    fn test_get_by_column_name() {
        let table = sample();
        assert_eq!(table.get(0, "note"), Some("hi"));
        assert_eq!(table.get(1, "name"), Some(""));
        assert_eq!(table.get(0, "missing"), None);
        assert_eq!(table.get(2, "name"), None);
    }

    #[test]
    fn test_table_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["header"], serde_json::json!(["name", "note"]));
        assert_eq!(json["rows"][0], serde_json::json!(["Ada", "hi"]));
    }
}
