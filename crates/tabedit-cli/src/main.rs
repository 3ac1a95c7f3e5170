//! tabedit CLI
//!
//! Command-line tool for viewing, editing and exporting delimited text tables.
//! Every command is a thin pass: read the file, parse, apply edits, serialize.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tabedit_core::{
    serialize_with, Config, EditOp, EditScript, EditSession, Error, Table,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tabedit")]
#[command(about = "Delimited text table editor", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON config file with dialect and export file name
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Field delimiter (use \t or "tab" for tabs)
    #[arg(short, long, global = true, value_parser = parse_char)]
    delimiter: Option<char>,

    /// Quote character
    #[arg(long, global = true, value_parser = parse_char)]
    quote: Option<char>,

    /// Write CRLF line breaks
    #[arg(long, global = true)]
    crlf: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and print a summary
    Parse {
        /// Path to the input file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show a table
    Show {
        /// Path to the input file
        #[arg(short, long)]
        file: PathBuf,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,

        /// Columns to display (comma-separated)
        #[arg(short, long)]
        columns: Option<String>,

        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Set a single cell and export the result
    Set {
        /// Path to the input file
        #[arg(short, long)]
        file: PathBuf,

        /// Row index (0-based, header excluded)
        #[arg(long)]
        row: usize,

        /// Column name
        #[arg(long)]
        col: String,

        /// New value
        #[arg(long)]
        value: String,

        /// Output path (defaults to the configured export name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply an edit script and export the result
    Apply {
        /// Path to the input file
        #[arg(short, long)]
        file: PathBuf,

        /// Path to the edit script (JSON)
        #[arg(short, long)]
        script: PathBuf,

        /// Output path (defaults to the configured export name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create an edit script template
    CreateScript {
        /// Output path for the script
        #[arg(short, long)]
        output: PathBuf,

        /// Example edits to include (row:column:value)
        #[arg(short, long)]
        example: Vec<String>,
    },

    /// Re-serialize a file in another dialect
    Convert {
        /// Path to the input file
        #[arg(short, long)]
        file: PathBuf,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,

        /// Delimiter for the output file
        #[arg(long, value_parser = parse_char)]
        to_delimiter: Option<char>,

        /// Write CRLF line breaks in the output file
        #[arg(long)]
        to_crlf: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> tabedit_core::Result<()> {
    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Parse { file } => cmd_parse(config, &file),
        Commands::Show {
            file,
            limit,
            columns,
            format,
        } => cmd_show(config, &file, limit, columns, &format),
        Commands::Set {
            file,
            row,
            col,
            value,
            output,
        } => cmd_set(config, &file, row, &col, value, output),
        Commands::Apply {
            file,
            script,
            output,
        } => cmd_apply(config, &file, &script, output),
        Commands::CreateScript { output, example } => cmd_create_script(&output, &example),
        Commands::Convert {
            file,
            output,
            to_delimiter,
            to_crlf,
        } => cmd_convert(config, &file, &output, to_delimiter, to_crlf),
    }
}

/// Config file first, then command-line overrides
fn resolve_config(cli: &Cli) -> tabedit_core::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(delimiter) = cli.delimiter {
        config.dialect.delimiter = delimiter;
    }
    if let Some(quote) = cli.quote {
        config.dialect.quote = quote;
    }
    if cli.crlf {
        config.dialect.line_break = "\r\n".to_string();
    }

    debug!(?config, "resolved config");
    Ok(config)
}

fn parse_char(s: &str) -> Result<char, String> {
    if s == "\\t" || s == "tab" {
        return Ok('\t');
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!("expected a single character, got '{}'", s)),
    }
}

fn open_session(config: Config, file: &Path) -> tabedit_core::Result<EditSession> {
    let bytes = fs::read(file).map_err(|e| Error::FileRead {
        path: file.to_path_buf(),
        source: e,
    })?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let mut session = EditSession::new(config)?;
    session.load(&bytes, &name)?;
    Ok(session)
}

fn write_export(session: &EditSession, output: Option<PathBuf>) -> tabedit_core::Result<PathBuf> {
    let export = session.export()?;
    let path = output.unwrap_or_else(|| PathBuf::from(&export.file_name));
    fs::write(&path, &export.bytes)?;
    Ok(path)
}

fn display_value(value: &str) -> String {
    value.replace('\r', "\\r").replace('\n', "\\n")
}

fn print_rows(table: &Table, columns: &[usize], limit: usize) {
    let header: Vec<&str> = columns
        .iter()
        .map(|&i| table.header().names()[i].as_str())
        .collect();
    println!("{}", header.join("\t"));
    println!("{}", "-".repeat(header.len() * 12));

    for row in table.rows().iter().take(limit) {
        let values: Vec<String> = columns
            .iter()
            .map(|&i| display_value(row.get(i).unwrap_or_default()))
            .collect();
        println!("{}", values.join("\t"));
    }

    if table.row_count() > limit {
        println!("... ({} more rows)", table.row_count() - limit);
    }
}

fn cmd_parse(config: Config, file: &Path) -> tabedit_core::Result<()> {
    let session = open_session(config, file)?;
    let table = session.model()?.table();

    println!("File: {}", file.display());
    println!("Columns: {}", table.column_count());
    println!("Rows: {}", table.row_count());
    println!();

    let all: Vec<usize> = (0..table.column_count()).collect();
    print_rows(table, &all, 10);

    Ok(())
}

fn cmd_show(
    config: Config,
    file: &Path,
    limit: Option<usize>,
    columns: Option<String>,
    format: &str,
) -> tabedit_core::Result<()> {
    let session = open_session(config, file)?;
    let table = session.model()?.table();

    // Filter columns if specified, keeping header order
    let col_filter: Option<Vec<&str>> = columns.as_ref().map(|c| c.split(',').collect());
    let display_cols: Vec<usize> = table
        .header()
        .iter()
        .enumerate()
        .filter(|(_, name)| col_filter.as_ref().map_or(true, |f| f.contains(name)))
        .map(|(i, _)| i)
        .collect();

    if let Some(filter) = &col_filter {
        for name in filter {
            if !table.header().contains(name) {
                eprintln!("Warning: unknown column '{}'", name);
            }
        }
    }

    let row_limit = limit.unwrap_or(table.row_count());

    match format.to_lowercase().as_str() {
        "table" => print_rows(table, &display_cols, row_limit),
        "json" => {
            let header: Vec<&str> = display_cols
                .iter()
                .map(|&i| table.header().names()[i].as_str())
                .collect();
            let rows: Vec<Vec<&str>> = table
                .rows()
                .iter()
                .take(row_limit)
                .map(|row| {
                    display_cols
                        .iter()
                        .map(|&i| row.get(i).unwrap_or_default())
                        .collect()
                })
                .collect();
            let json = serde_json::json!({ "header": header, "rows": rows });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => {
            eprintln!("Unknown format: {}. Supported formats: table, json", format);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn cmd_set(
    config: Config,
    file: &Path,
    row: usize,
    col: &str,
    value: String,
    output: Option<PathBuf>,
) -> tabedit_core::Result<()> {
    let mut session = open_session(config, file)?;
    session.model_mut()?.set_cell(row, col, value)?;

    let path = write_export(&session, output)?;
    println!("Set row {}, column '{}'", row, col);
    println!("Wrote {}", path.display());

    Ok(())
}

fn cmd_apply(
    config: Config,
    file: &Path,
    script_path: &Path,
    output: Option<PathBuf>,
) -> tabedit_core::Result<()> {
    let script = EditScript::load(script_path)?;
    println!("Loaded script with {} edits", script.edits.len());

    let mut session = open_session(config, file)?;
    let result = script.apply(session.model_mut()?)?;

    let path = write_export(&session, output)?;
    let table = session.model()?.table();

    println!("\nExport complete:");
    println!("  {} edits applied", result.edits_applied);
    if !result.rows_added.is_empty() {
        println!("  {} rows added", result.rows_added.len());
    }
    println!(
        "  {} rows x {} columns written to {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );

    Ok(())
}

fn cmd_create_script(output: &Path, examples: &[String]) -> tabedit_core::Result<()> {
    let mut script = EditScript::new();

    // Parse example edits: "row:column:value"
    for example in examples {
        let parts: Vec<&str> = example.splitn(3, ':').collect();
        if parts.len() != 3 {
            eprintln!(
                "Warning: Invalid example format '{}', expected 'row:column:value'",
                example
            );
            continue;
        }

        let row: usize = match parts[0].parse() {
            Ok(row) => row,
            Err(_) => {
                eprintln!("Warning: Invalid row '{}' in example", parts[0]);
                continue;
            }
        };

        script.push(EditOp::set_cell(row, parts[1], parts[2]));
    }

    // If no examples provided, add a placeholder
    if script.edits.is_empty() {
        script.push(EditOp::set_cell(0, "ColumnName", "NewValue"));
    }

    script.save(output)?;
    println!("Created script: {}", output.display());
    println!("Edits: {}", script.edits.len());
    println!();
    println!("Edit the file to add your changes, then run:");
    println!(
        "  tabedit apply --file <table> --script {}",
        output.display()
    );

    Ok(())
}

fn cmd_convert(
    config: Config,
    file: &Path,
    output: &Path,
    to_delimiter: Option<char>,
    to_crlf: bool,
) -> tabedit_core::Result<()> {
    let mut target = config.dialect.clone();
    if let Some(delimiter) = to_delimiter {
        target.delimiter = delimiter;
    }
    if to_crlf {
        target.line_break = "\r\n".to_string();
    }
    target.validate()?;

    let session = open_session(config, file)?;
    let table = session.model()?.table();
    fs::write(output, serialize_with(table, &target))?;

    println!(
        "Converted {} rows to {}",
        table.row_count(),
        output.display()
    );

    Ok(())
}
