//! The editable table model
//!
//! `TableModel` is the single owner of a [`Table`] for one editing session.
//! Every operation either succeeds completely or returns an [`EditError`]
//! leaving the table untouched, and every row always has exactly one field
//! per header column.
//!
//! Rows are addressed by position. Deleting a row shifts every later row
//! down by one, so indices must not be held across a delete.

use crate::error::EditError;
use crate::table::{Header, Row, Table};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    table: Table,
}

impl TableModel {
    /// Create a model with the given header and no rows
    pub fn new(header: Header) -> Self {
        Self {
            table: Table::new(header),
        }
    }

    /// Read-only view of the live table
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// An owned copy of the current table
    pub fn snapshot(&self) -> Table {
        self.table.clone()
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.table.column_count()
    }

    pub fn cell(&self, row: usize, column: &str) -> Result<&str, EditError> {
        self.check_row(row)?;
        let index = self.column_index(column)?;
        Ok(self.table.rows()[row].get(index).unwrap_or_default())
    }

    /// Replace a single field
    pub fn set_cell(
        &mut self,
        row: usize,
        column: &str,
        value: impl Into<String>,
    ) -> Result<(), EditError> {
        self.check_row(row)?;
        let index = self.column_index(column)?;
        self.table.rows_mut()[row].set(index, value.into());
        Ok(())
    }

    /// Append a row of empty fields and return its index
    pub fn add_row(&mut self) -> usize {
        let width = self.table.column_count();
        self.table.push_row(Row::blank(width))
    }

    /// Remove a row, shifting later rows down by one
    pub fn delete_row(&mut self, row: usize) -> Result<(), EditError> {
        self.check_row(row)?;
        self.table.rows_mut().remove(row);
        Ok(())
    }

    /// Append a column; every existing row gets an empty field for it
    pub fn add_column(&mut self, name: impl Into<String>) -> Result<usize, EditError> {
        let name = name.into();
        if self.table.header().contains(&name) {
            return Err(EditError::DuplicateColumn(name));
        }

        for row in self.table.rows_mut() {
            row.push(String::new());
        }
        Ok(self.table.header_mut().push(name))
    }

    /// Remove a column and its field from every row
    pub fn remove_column(&mut self, name: &str) -> Result<(), EditError> {
        let index = self.column_index(name)?;
        if self.table.column_count() == 1 {
            return Err(EditError::LastColumn);
        }

        self.table.header_mut().remove(index);
        for row in self.table.rows_mut() {
            row.remove(index);
        }
        Ok(())
    }

    fn check_row(&self, row: usize) -> Result<(), EditError> {
        let len = self.table.row_count();
        if row >= len {
            return Err(EditError::RowOutOfRange { row, len });
        }
        Ok(())
    }

    fn column_index(&self, column: &str) -> Result<usize, EditError> {
        self.table
            .header()
            .position(column)
            .ok_or_else(|| EditError::UnknownColumn(column.to_string()))
    }
}

impl From<Table> for TableModel {
    fn from(table: Table) -> Self {
        Self { table }
    }
}
