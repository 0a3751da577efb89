//! Tablecraft CLI - span-aware table editing from the command line

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use log::{debug, info};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, IsTerminal, Read, Write};
#[cfg(feature = "cli")]
use std::path::Path;
#[cfg(feature = "cli")]
use tablecraft::{
    check_table, format_diagnostics, parse_table, render_table, CellAddress, CommandOutcome,
    EngineOptions, Format, HeaderType, InsertTableOptions, Selection, Table, TableCommand,
    TableEditor, TableError, TableResult,
};
#[cfg(feature = "cli")]
use tracing_subscriber::filter::LevelFilter;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "tablecraft")]
#[command(version)]
#[command(about = "Tablecraft - span-aware table editing for LaTeX and Typst tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Run table commands against a table file
    Apply {
        /// Input file path (reads from stdin if not provided)
        input: Option<String>,

        /// Command as "<name> <row>:<cell>[..<row>:<cell>] [arg]", repeatable
        #[arg(short, long = "command", required = true)]
        commands: Vec<String>,

        /// Output file path (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (defaults to the input format)
        #[arg(long, value_enum)]
        to: Option<OutputFormat>,

        /// Engine options file (TOML)
        #[arg(long)]
        config: Option<String>,
    },

    /// Create an empty table
    New {
        rows: usize,
        cols: usize,

        #[arg(long, default_value_t = 0)]
        header_rows: usize,

        #[arg(long, default_value_t = 0)]
        header_cols: usize,

        /// How header rows are made: section, cells or sectionCells
        #[arg(long)]
        header_type: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Latex)]
        to: OutputFormat,
    },

    /// Check a table for structural problems
    Check {
        input: Option<String>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Convert a table between formats
    Convert {
        input: Option<String>,

        #[arg(short, long)]
        output: Option<String>,

        #[arg(long, value_enum)]
        to: OutputFormat,
    },
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Latex,
    Typst,
    Json,
}

#[cfg(feature = "cli")]
impl OutputFormat {
    fn from_format(format: Format) -> Self {
        match format {
            Format::Latex => OutputFormat::Latex,
            Format::Typst => OutputFormat::Typst,
        }
    }
}

/// Log to stderr at the level picked by `-v`
///
/// The fmt subscriber also picks up the library's `log` records.
#[cfg(feature = "cli")]
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    if let Err(e) = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("Warning: logging disabled: {}", e);
    }
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn run(command: Commands) -> TableResult<()> {
    match command {
        Commands::Apply {
            input,
            commands,
            output,
            to,
            config,
        } => {
            let options = match config {
                Some(path) => load_options(&path)?,
                None => EngineOptions::default(),
            };
            let (mut table, format) = read_table(input.as_deref())?;
            let mut editor = TableEditor::with_options(options);
            for line in &commands {
                let (name, selection, arg) = parse_command_line(line)?;
                let command = TableCommand::parse(name, arg)?;
                match editor.execute(&mut table, &selection, &command)? {
                    CommandOutcome::Erased => {
                        info!("{}: table erased", name);
                        return write_output(output.as_deref(), "");
                    }
                    outcome => info!("{}: {:?}", name, outcome),
                }
            }
            let rendered = render(&table, to.unwrap_or(format))?;
            write_output(output.as_deref(), &rendered)
        }

        Commands::New {
            rows,
            cols,
            header_rows,
            header_cols,
            header_type,
            to,
        } => {
            let header_type = match header_type {
                Some(name) => Some(HeaderType::from_name(&name).ok_or_else(|| {
                    TableError::parse(format!("unknown header type '{}'", name))
                })?),
                None => None,
            };
            let options = InsertTableOptions {
                header_rows,
                header_columns: header_cols,
                header_type,
            };
            let (table, _) = tablecraft::insert_table(rows, cols, &options)?;
            write_output(None, &render(&table, to)?)
        }

        Commands::Check { input, no_color } => {
            let (table, _) = read_table(input.as_deref())?;
            let result = check_table(&table);
            println!(
                "{}",
                format_diagnostics(&result, !no_color && io::stdout().is_terminal())
            );
            if result.is_degraded() {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Convert { input, output, to } => {
            let (table, _) = read_table(input.as_deref())?;
            write_output(output.as_deref(), &render(&table, to)?)
        }
    }
}

#[cfg(feature = "cli")]
fn load_options(path: &str) -> TableResult<EngineOptions> {
    let text = fs::read_to_string(path)?;
    toml::from_str(&text).map_err(|e| TableError::parse(format!("{}: {}", path, e)))
}

/// Read a table as LaTeX, Typst or JSON, by extension or content
#[cfg(feature = "cli")]
fn read_table(path: Option<&str>) -> TableResult<(Table, OutputFormat)> {
    let input = match path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let extension = path
        .and_then(|p| Path::new(p).extension())
        .and_then(|e| e.to_str());
    if extension == Some("json") || input.trim_start().starts_with('{') {
        let table = serde_json::from_str(&input)
            .map_err(|e| TableError::parse(format!("invalid table JSON: {}", e)))?;
        return Ok((table, OutputFormat::Json));
    }
    let hint = extension.and_then(Format::from_name);
    let (table, format) = parse_table(&input, hint)?;
    debug!("read {} table with {} rows", format.name(), table.rows.len());
    Ok((table, OutputFormat::from_format(format)))
}

#[cfg(feature = "cli")]
fn render(table: &Table, format: OutputFormat) -> TableResult<String> {
    match format {
        OutputFormat::Latex => Ok(render_table(table, Format::Latex)),
        OutputFormat::Typst => Ok(render_table(table, Format::Typst)),
        OutputFormat::Json => serde_json::to_string_pretty(table)
            .map_err(|e| TableError::parse(format!("cannot encode table: {}", e))),
    }
}

#[cfg(feature = "cli")]
fn write_output(path: Option<&str>, content: &str) -> TableResult<()> {
    match path {
        Some(path) => fs::write(path, content)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
    }
    Ok(())
}

/// Split "<name> <selection> [arg]" into its parts
///
/// Selections are `r:c`, `r:c..r:c` for a range, or `r:c,r:c,...` for a
/// set of cells.
#[cfg(feature = "cli")]
fn parse_command_line(line: &str) -> TableResult<(&str, Selection, Option<&str>)> {
    let mut parts = line.trim().splitn(3, char::is_whitespace);
    let name = parts.next().filter(|n| !n.is_empty());
    let selection = parts.next();
    let (Some(name), Some(selection)) = (name, selection) else {
        return Err(TableError::parse(format!(
            "expected \"<command> <row>:<cell> [arg]\", got '{}'",
            line
        )));
    };
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());
    Ok((name, parse_selection(selection)?, arg))
}

#[cfg(feature = "cli")]
fn parse_selection(text: &str) -> TableResult<Selection> {
    let address = |s: &str| s.parse::<CellAddress>().map_err(TableError::parse);
    if let Some((start, end)) = text.split_once("..") {
        return Ok(Selection::Range {
            start: address(start)?,
            end: address(end)?,
        });
    }
    if text.contains(',') {
        let cells = text
            .split(',')
            .map(address)
            .collect::<TableResult<Vec<_>>>()?;
        return Ok(Selection::Cells(cells));
    }
    Ok(Selection::Cell(address(text)?))
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install tablecraft --features cli");
    eprintln!("  tablecraft apply table.tex -c \"insertRowAfter 0:0\"");
}
