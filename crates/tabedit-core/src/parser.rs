//! Delimited text parser
//!
//! Text is scanned one character at a time by a small state machine that
//! emits field and record-end tokens. Records are then checked against the
//! header width: short records are padded with empty fields, long records
//! are rejected with the line they start on.

use crate::dialect::{is_line_break, Dialect, BOM};
use crate::error::{Error, ParseError, Result};
use crate::table::{Header, Row, Table};
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

/// Parse comma-separated text into a Table
pub fn parse(raw: &str) -> std::result::Result<Table, ParseError> {
    parse_with(raw, &Dialect::default())
}

/// Parse delimited text using the given dialect
///
/// The dialect must pass [`Dialect::validate`]; with a delimiter equal to the
/// quote character, quoted fields cannot be recognized.
pub fn parse_with(raw: &str, dialect: &Dialect) -> std::result::Result<Table, ParseError> {
    debug_assert!(dialect.validate().is_ok(), "invalid dialect: {:?}", dialect);
    let raw = raw.strip_prefix(BOM).unwrap_or(raw);
    let mut records = Records::new(Tokenizer::new(raw, dialect));

    let first = records.next().transpose()?.ok_or(ParseError::EmptyInput)?;
    let mut table = Table::new(Header::new(first.fields)?);
    let width = table.column_count();

    for record in records {
        let Record { line, mut fields } = record?;
        if fields.len() > width {
            return Err(ParseError::MalformedRow {
                line,
                expected: width,
                actual: fields.len(),
            });
        }
        fields.resize(width, String::new());
        table.push_row(Row::new(fields));
    }

    Ok(table)
}

/// Read and parse a file from disk
pub fn parse_file<P: AsRef<Path>>(path: P, dialect: &Dialect) -> Result<Table> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(parse_with(&content, dialect)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Field(String),
    /// End of a record, carrying the line the record started on
    RecordEnd { line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unquoted,
    Quoted,
    /// Just saw a quote inside a quoted field: either an escaped quote or the close
    QuoteEscapeCheck,
}

struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    delimiter: char,
    quote: char,
    /// Current physical line, 1-based
    line: usize,
    /// Line the current record started on
    record_line: usize,
    /// Whether the current record has produced any content or delimiter yet
    record_started: bool,
    /// Line of the most recent opening quote
    quote_line: usize,
    pending: Option<Token>,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str, dialect: &Dialect) -> Self {
        Self {
            chars: input.chars().peekable(),
            delimiter: dialect.delimiter,
            quote: dialect.quote,
            line: 1,
            record_line: 1,
            record_started: false,
            quote_line: 1,
            pending: None,
            done: false,
        }
    }

    /// Consume a line break whose first character was `c`; `\r\n` counts once
    fn consume_line_break(&mut self, c: char) {
        if c == '\r' && self.chars.peek() == Some(&'\n') {
            self.chars.next();
        }
        self.line += 1;
    }

    fn end_record(&mut self, field: String) -> Token {
        self.pending = Some(Token::RecordEnd {
            line: self.record_line,
        });
        self.record_line = self.line;
        self.record_started = false;
        Token::Field(field)
    }

    fn next_token(&mut self) -> std::result::Result<Option<Token>, ParseError> {
        if let Some(token) = self.pending.take() {
            return Ok(Some(token));
        }
        if self.done {
            return Ok(None);
        }

        let mut state = State::Unquoted;
        let mut field = String::new();
        let mut at_start = true;

        loop {
            match state {
                State::Unquoted => match self.chars.next() {
                    None => {
                        self.done = true;
                        if !self.record_started && at_start {
                            return Ok(None);
                        }
                        return Ok(Some(self.end_record(field)));
                    }
                    Some(c) if c == self.delimiter => {
                        self.record_started = true;
                        return Ok(Some(Token::Field(field)));
                    }
                    Some(c) if is_line_break(c) => {
                        self.consume_line_break(c);
                        if !self.record_started && at_start {
                            // blank line
                            self.record_line = self.line;
                            continue;
                        }
                        return Ok(Some(self.end_record(field)));
                    }
                    Some(c) if c == self.quote && at_start => {
                        self.record_started = true;
                        at_start = false;
                        self.quote_line = self.line;
                        state = State::Quoted;
                    }
                    Some(c) => {
                        self.record_started = true;
                        at_start = false;
                        field.push(c);
                    }
                },
                State::Quoted => match self.chars.next() {
                    None => {
                        return Err(ParseError::UnterminatedQuote {
                            line: self.quote_line,
                        })
                    }
                    Some(c) if c == self.quote => state = State::QuoteEscapeCheck,
                    Some(c) => {
                        field.push(c);
                        if c == '\n' || (c == '\r' && self.chars.peek() != Some(&'\n')) {
                            self.line += 1;
                        }
                    }
                },
                State::QuoteEscapeCheck => {
                    if self.chars.peek() == Some(&self.quote) {
                        self.chars.next();
                        field.push(self.quote);
                        state = State::Quoted;
                    } else {
                        // closing quote; anything up to the next separator is kept literally
                        state = State::Unquoted;
                    }
                }
            }
        }
    }
}

/// One logical record with the line it started on
#[derive(Debug)]
struct Record {
    line: usize,
    fields: Vec<String>,
}

/// Groups tokens into records
struct Records<'a> {
    tokens: Tokenizer<'a>,
}

impl<'a> Records<'a> {
    fn new(tokens: Tokenizer<'a>) -> Self {
        Self { tokens }
    }
}

impl Iterator for Records<'_> {
    type Item = std::result::Result<Record, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut fields = Vec::new();
        loop {
            match self.tokens.next_token() {
                Err(e) => return Some(Err(e)),
                Ok(None) => return None,
                Ok(Some(Token::Field(value))) => fields.push(value),
                Ok(Some(Token::RecordEnd { line })) => {
                    return Some(Ok(Record { line, fields }));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_of(table: &Table) -> Vec<Vec<&str>> {
        table
            .rows()
            .iter()
            .map(|r| r.cells().iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_parse_simple_csv() {
        let table = parse("ID,Name,Value\n1,foo,100\n2,bar,200").unwrap();

        assert_eq!(table.header().names(), ["ID", "Name", "Value"]);
        assert_eq!(rows_of(&table), vec![vec!["1", "foo", "100"], vec!["2", "bar", "200"]]);
    }

    #[test]
    fn test_parse_quoted_delimiter() {
        let table = parse("name,note\nAda,\"hi, there\"\nLin,plain").unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, "name"), Some("Ada"));
        assert_eq!(table.get(0, "note"), Some("hi, there"));
        assert_eq!(table.get(1, "name"), Some("Lin"));
        assert_eq!(table.get(1, "note"), Some("plain"));
    }

    #[test]
    fn test_parse_escaped_quotes_and_newlines() {
        let table = parse("a,b\n\"say \"\"hi\"\"\",\"two\nlines\"\n").unwrap();

        assert_eq!(rows_of(&table), vec![vec!["say \"hi\"", "two\nlines"]]);
    }

    #[test]
    fn test_parse_trailing_newline_drops_phantom_row() {
        let table = parse("a,b\n1,2\n").unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_parse_blank_lines_skipped() {
        let table = parse("a,b\n\n1,2\n\n\n3,4\n\n").unwrap();
        assert_eq!(rows_of(&table), vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn test_parse_quoted_empty_line_is_a_row() {
        let table = parse("a\n\"\"\nx").unwrap();
        assert_eq!(rows_of(&table), vec![vec![""], vec!["x"]]);
    }

    #[test]
    fn test_parse_crlf_and_cr() {
        let table = parse("a,b\r\n1,2\r3,4\r\n").unwrap();
        assert_eq!(rows_of(&table), vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn test_parse_short_row_padded() {
        let table = parse("a,b,c\n1\n2,3").unwrap();
        assert_eq!(rows_of(&table), vec![vec!["1", "", ""], vec!["2", "3", ""]]);
    }

    #[test]
    fn test_parse_trailing_delimiter_is_empty_field() {
        let table = parse("a,b\n1,").unwrap();
        assert_eq!(rows_of(&table), vec![vec!["1", ""]]);
    }

    #[test]
    fn test_parse_long_row_rejected() {
        assert_eq!(
            parse("a,b\n1,2\n3,4,5"),
            Err(ParseError::MalformedRow {
                line: 3,
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_malformed_row_line_counts_physical_lines() {
        // the quoted field spans lines 2-3, the bad record starts on line 5
        let err = parse("a,b\n\"x\ny\",1\n\n1,2,3\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedRow {
                line: 5,
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_parse_duplicate_header() {
        assert_eq!(
            parse("id,name,id\n1,2,3"),
            Err(ParseError::DuplicateHeader("id".to_string()))
        );
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse(""), Err(ParseError::EmptyInput));
        assert_eq!(parse("\n\n"), Err(ParseError::EmptyInput));
        assert_eq!(parse("\u{feff}"), Err(ParseError::EmptyInput));
    }

    #[test]
    fn test_parse_header_only() {
        let table = parse("a,b\n").unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_parse_unterminated_quote() {
        assert_eq!(
            parse("a,b\n1,2\n3,\"open\n4,5"),
            Err(ParseError::UnterminatedQuote { line: 3 })
        );
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        let table = parse("a,b\n5\"2,x").unwrap();
        assert_eq!(rows_of(&table), vec![vec!["5\"2", "x"]]);
    }

    #[test]
    fn test_text_after_closing_quote_is_kept() {
        let table = parse("a,b\n\"ab\"c,d").unwrap();
        assert_eq!(rows_of(&table), vec![vec!["abc", "d"]]);
    }

    #[test]
    fn test_parse_strips_bom() {
        let table = parse("\u{feff}id,name\n1,x").unwrap();
        assert_eq!(table.header().names(), ["id", "name"]);
    }

    #[test]
    fn test_parse_custom_dialect() {
        let dialect = Dialect {
            delimiter: ';',
            quote: '\'',
            ..Dialect::default()
        };
        let table = parse_with("a;b\n'x;y','it''s'\n", &dialect).unwrap();
        assert_eq!(rows_of(&table), vec![vec!["x;y", "it's"]]);
    }

    #[test]
    fn test_parse_tsv() {
        let table = parse_with("a\tb\n1,5\t2\n", &Dialect::tsv()).unwrap();
        assert_eq!(rows_of(&table), vec![vec!["1,5", "2"]]);
    }

    #[test]
    fn test_agrees_with_csv_crate() {
        let input = "name,note\r\nAda,\"hi, \"\"there\"\"\"\r\n\"multi\nline\",x\r\n,\r\n";
        let table = parse(input).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        let records: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();

        assert_eq!(table.header().names(), headers.as_slice());
        let ours: Vec<Vec<String>> = table.rows().iter().map(|r| r.cells().to_vec()).collect();
        assert_eq!(ours, records);
    }

    #[test]
    fn test_parse_file() {
        let path = std::env::temp_dir().join("tabedit_parser_test_parse_file.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();
        let table = parse_file(&path, &Dialect::default()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.get(0, "b"), Some("2"));
    }

    #[test]
    fn test_parse_file_missing() {
        let path = std::env::temp_dir().join("tabedit_parser_definitely_missing.csv");
        assert!(matches!(
            parse_file(&path, &Dialect::default()),
            Err(Error::FileRead { .. })
        ));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid dialect")]
    fn test_parse_with_rejects_delimiter_equal_to_quote() {
        let _ = parse_with("a\"b", &Dialect::with_delimiter('"'));
    }
}
