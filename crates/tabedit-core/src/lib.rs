//! tabedit-core: Core library for editing delimited text tables
//!
//! This library provides functionality to:
//! - Parse delimited text (CSV, TSV, ...) into a header plus rows
//! - Edit the table in memory while every row keeps one field per column
//! - Serialize the table back, quoting only fields that need it
//! - Drive a load, edit and export session, optionally from JSON edit scripts

pub mod config;
pub mod dialect;
pub mod error;
pub mod model;
pub mod parser;
pub mod script;
pub mod session;
pub mod table;
pub mod writer;

pub use config::{Config, DEFAULT_EXPORT_FILE_NAME};
pub use dialect::Dialect;
pub use error::{EditError, Error, ParseError, Result};
pub use model::TableModel;
pub use parser::{parse, parse_file, parse_with};
pub use script::{EditOp, EditScript, ScriptResult};
pub use session::{EditSession, Export};
pub use table::{Header, Row, Table};
pub use writer::{needs_quoting, serialize, serialize_with};
