//! Edit scripts: a JSON list of edit operations applied to a table
//!
//! A script is applied to a scratch copy of the table and only committed
//! when every operation succeeds, so a bad script never leaves a half-edited
//! table behind.

use crate::error::{EditError, Error, Result};
use crate::model::TableModel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A single edit operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    /// Replace one field
    SetCell {
        row: usize,
        column: String,
        value: String,
    },
    /// Append an empty row
    AddRow,
    /// Remove a row; later rows shift down
    DeleteRow { row: usize },
    AddColumn { name: String },
    RemoveColumn { name: String },
}

impl EditOp {
    /// Create a set-cell operation
    pub fn set_cell(row: usize, column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SetCell {
            row,
            column: column.into(),
            value: value.into(),
        }
    }

    /// Apply to a model; returns the index of the row created, if any
    pub fn apply(&self, model: &mut TableModel) -> std::result::Result<Option<usize>, EditError> {
        match self {
            EditOp::SetCell { row, column, value } => {
                model.set_cell(*row, column, value.as_str())?;
            }
            EditOp::AddRow => return Ok(Some(model.add_row())),
            EditOp::DeleteRow { row } => model.delete_row(*row)?,
            EditOp::AddColumn { name } => {
                model.add_column(name.as_str())?;
            }
            EditOp::RemoveColumn { name } => model.remove_column(name)?,
        }
        Ok(None)
    }
}

/// A script file containing edits, applied in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditScript {
    /// List of edits
    pub edits: Vec<EditOp>,
}

impl EditScript {
    /// Create a new empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edit to the script
    pub fn push(&mut self, edit: EditOp) {
        self.edits.push(edit);
    }

    /// Load a script file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the script file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply every edit, or none of them
    pub fn apply(&self, model: &mut TableModel) -> Result<ScriptResult> {
        let mut scratch = model.clone();
        let mut result = ScriptResult::default();

        for (index, edit) in self.edits.iter().enumerate() {
            let added = edit
                .apply(&mut scratch)
                .map_err(|source| Error::Script { index, source })?;
            if let Some(row) = added {
                result.rows_added.push(row);
            }
            result.edits_applied += 1;
        }

        *model = scratch;
        Ok(result)
    }
}

/// Result of applying a script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptResult {
    /// Number of edits applied
    pub edits_applied: usize,
    /// Indices of rows created by `add_row`, as they were when created
    pub rows_added: Vec<usize>,
}
