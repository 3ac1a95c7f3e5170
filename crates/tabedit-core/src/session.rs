//! Editing session: load raw bytes, hold the model, export text
//!
//! This is the glue between an input source (bytes plus a file name), the
//! [`TableModel`] kept across user interactions, and an output sink that
//! receives serialized bytes with a suggested file name.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::TableModel;
use crate::parser::parse_with;
use crate::writer::serialize_with;
use tracing::{debug, info, warn};

/// Serialized output handed to a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub bytes: Vec<u8>,
    /// Suggested file name for the download or write
    pub file_name: String,
}

/// One load-edit-export lifecycle
#[derive(Debug, Default)]
pub struct EditSession {
    config: Config,
    model: Option<TableModel>,
    source_name: Option<String>,
}

impl EditSession {
    /// Create a session, rejecting a dialect that cannot round-trip
    pub fn new(config: Config) -> Result<Self> {
        config.dialect.validate()?;
        Ok(Self {
            config,
            model: None,
            source_name: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the file the current table was loaded from
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Parse `bytes` and replace the current table wholesale
    ///
    /// On failure the previously loaded table and file name stay as they were.
    pub fn load(&mut self, bytes: &[u8], file_name: &str) -> Result<&TableModel> {
        let text = std::str::from_utf8(bytes)?;
        let table = match parse_with(text, &self.config.dialect) {
            Ok(table) => table,
            Err(e) => {
                warn!(file = file_name, error = %e, "rejected input");
                return Err(e.into());
            }
        };

        if let Some(previous) = &self.source_name {
            debug!(previous = %previous, "discarding loaded table");
        }
        info!(
            file = file_name,
            rows = table.row_count(),
            columns = table.column_count(),
            "loaded table"
        );

        self.source_name = Some(file_name.to_string());
        Ok(self.model.insert(TableModel::from(table)))
    }

    pub fn model(&self) -> Result<&TableModel> {
        self.model.as_ref().ok_or(Error::NoTableLoaded)
    }

    pub fn model_mut(&mut self) -> Result<&mut TableModel> {
        self.model.as_mut().ok_or(Error::NoTableLoaded)
    }

    /// Serialize the current table with the configured dialect and export name
    pub fn export(&self) -> Result<Export> {
        let model = self.model()?;
        let text = serialize_with(model.table(), &self.config.dialect);
        debug!(
            bytes = text.len(),
            file = %self.config.export_file_name,
            "exported table"
        );
        Ok(Export {
            bytes: text.into_bytes(),
            file_name: self.config.export_file_name.clone(),
        })
    }

    /// Discard the loaded table
    pub fn close(&mut self) {
        if self.model.take().is_some() {
            debug!("closed table");
        }
        self.source_name = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::error::ParseError;

    #[test]
    fn test_load_edit_export() {
        let mut session = EditSession::default();
        session.load(b"name,note\nAda,x\n", "people.csv").unwrap();

        let model = session.model_mut().unwrap();
        model.set_cell(0, "note", "hi, there").unwrap();
        let row = model.add_row();
        model.set_cell(row, "name", "Lin").unwrap();

        let export = session.export().unwrap();
        assert_eq!(export.file_name, "edited_data.csv");
        assert_eq!(
            String::from_utf8(export.bytes).unwrap(),
            "name,note\nAda,\"hi, there\"\nLin,"
        );
        assert_eq!(session.source_name(), Some("people.csv"));
    }

    #[test]
    fn test_failed_load_keeps_previous_table() {
        let mut session = EditSession::default();
        session.load(b"a,b\n1,2", "first.csv").unwrap();

        let err = session.load(b"a,a\n1,2", "second.csv").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::DuplicateHeader(ref name)) if name == "a"
        ));
        assert_eq!(session.source_name(), Some("first.csv"));
        assert_eq!(session.model().unwrap().cell(0, "b"), Ok("2"));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut session = EditSession::default();
        assert!(matches!(
            session.load(&[0x61, 0xff, 0x0a], "bad.csv"),
            Err(Error::InvalidUtf8(_))
        ));
        assert!(!session.is_loaded());
    }

    #[test]
    fn test_reload_replaces_table() {
        let mut session = EditSession::default();
        session.load(b"a\n1\n2", "one.csv").unwrap();
        session.load(b"x,y\n9,8", "two.csv").unwrap();

        let table = session.model().unwrap().table();
        assert_eq!(table.header().names(), ["x", "y"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_no_table_loaded() {
        let mut session = EditSession::default();
        assert!(matches!(session.export(), Err(Error::NoTableLoaded)));
        assert!(matches!(session.model_mut(), Err(Error::NoTableLoaded)));

        session.load(b"a\n1", "t.csv").unwrap();
        session.close();
        assert!(matches!(session.model(), Err(Error::NoTableLoaded)));
        assert_eq!(session.source_name(), None);
    }

    #[test]
    fn test_session_uses_configured_dialect() {
        let config = Config {
            dialect: Dialect::tsv(),
            export_file_name: "edited.tsv".to_string(),
        };
        let mut session = EditSession::new(config).unwrap();
        session.load(b"a\tb\n1,5\t2\n", "in.tsv").unwrap();

        assert_eq!(session.model().unwrap().cell(0, "a"), Ok("1,5"));
        let export = session.export().unwrap();
        assert_eq!(export.file_name, "edited.tsv");
        assert_eq!(export.bytes, b"a\tb\n1,5\t2");
    }

    #[test]
    fn test_new_rejects_invalid_dialect() {
        let config = Config {
            dialect: Dialect::with_delimiter('"'),
            ..Config::default()
        };
        assert!(matches!(
            EditSession::new(config),
            Err(Error::InvalidDialect(_))
        ));
    }
}
