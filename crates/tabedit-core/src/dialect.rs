//! Delimiter, quote and line-break settings shared by the parser and writer

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Line breaks the parser recognizes as record separators
const LINE_BREAKS: [&str; 3] = ["\n", "\r\n", "\r"];

/// The textual conventions of a delimited file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    /// Field separator
    pub delimiter: char,
    /// Character that opens and closes a quoted field
    pub quote: char,
    /// Record separator used when writing
    pub line_break: String,
    /// Whether the writer ends the last record with a line break
    pub trailing_line_break: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            line_break: "\n".to_string(),
            trailing_line_break: false,
        }
    }
}

impl Dialect {
    /// Tab-separated values
    pub fn tsv() -> Self {
        Self::with_delimiter('\t')
    }

    /// Default dialect with a different field separator
    pub fn with_delimiter(delimiter: char) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }

    /// Check that text written with this dialect parses back unchanged
    pub fn validate(&self) -> Result<()> {
        if self.delimiter == self.quote {
            return Err(Error::InvalidDialect(format!(
                "delimiter and quote are both {:?}",
                self.delimiter
            )));
        }
        for (role, c) in [("delimiter", self.delimiter), ("quote", self.quote)] {
            if is_line_break(c) {
                return Err(Error::InvalidDialect(format!(
                    "{} cannot be a line break character",
                    role
                )));
            }
        }
        if !LINE_BREAKS.contains(&self.line_break.as_str()) {
            return Err(Error::InvalidDialect(format!(
                "line break must be \\n, \\r\\n or \\r, got {:?}",
                self.line_break
            )));
        }
        Ok(())
    }
}

/// Byte order mark; stripped by the parser when it leads the input
pub(crate) const BOM: char = '\u{feff}';

pub(crate) fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}
