//! Serialize a Table back into delimited text

use crate::dialect::{is_line_break, Dialect, BOM};
use crate::table::Table;

/// Serialize a table as comma-separated text
pub fn serialize(table: &Table) -> String {
    serialize_with(table, &Dialect::default())
}

/// Serialize a table using the given dialect
///
/// The header is written first, then one record per row. Fields are quoted
/// only when they contain the delimiter, the quote character or a line
/// break, or start with a byte order mark. The dialect must pass
/// [`Dialect::validate`].
pub fn serialize_with(table: &Table, dialect: &Dialect) -> String {
    debug_assert!(dialect.validate().is_ok(), "invalid dialect: {:?}", dialect);
    let mut out = String::new();

    write_record(&mut out, table.header().names(), dialect);
    for row in table.rows() {
        out.push_str(&dialect.line_break);
        write_record(&mut out, row.cells(), dialect);
    }

    if dialect.trailing_line_break {
        out.push_str(&dialect.line_break);
    }

    out
}

fn write_record(out: &mut String, fields: &[String], dialect: &Dialect) {
    // a lone empty field would read back as a blank line
    if let [only] = fields {
        if only.is_empty() {
            out.push(dialect.quote);
            out.push(dialect.quote);
            return;
        }
    }

    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(dialect.delimiter);
        }
        write_field(out, field, dialect);
    }
}

fn write_field(out: &mut String, field: &str, dialect: &Dialect) {
    if !needs_quoting(field, dialect) {
        out.push_str(field);
        return;
    }

    out.push(dialect.quote);
    for c in field.chars() {
        if c == dialect.quote {
            out.push(dialect.quote);
        }
        out.push(c);
    }
    out.push(dialect.quote);
}

/// Whether a field must be wrapped in quotes to survive a re-parse
///
/// A leading BOM is quoted too: unquoted at the start of the text, the
/// parser would strip it.
pub fn needs_quoting(field: &str, dialect: &Dialect) -> bool {
    field.starts_with(BOM)
        || field
            .chars()
            .any(|c| c == dialect.delimiter || c == dialect.quote || is_line_break(c))
}
