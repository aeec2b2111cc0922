//! xlsxport CLI - declarative CSV to XLSX export, and XLSX to CSV reading
//!
//! Usage:
//!   xlsxport export input.csv output.xlsx [--sheet-name "Sheet1"] [--column 80:number:0.00]...
//!   xlsxport read input.xlsx [--output out.csv]
//!
//! Library warnings go to stderr; `--verbose` adds debug output.

use clap::{Parser, Subcommand};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Instant;
use xlsxport::{
    convert_csv_to_xlsx, convert_xlsx_to_csv, parse_column_spec, parse_merge_range,
    CsvExportOptions, DateOrder, ExcelError,
};

#[derive(Parser, Debug)]
#[command(name = "xlsxport")]
#[command(version)]
#[command(about = "Declarative Excel export and import")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Show progress information
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a CSV file as a typed, formatted XLSX sheet
    #[command(long_about = "Exports a CSV file to XLSX. Leading records become header rows;\n\
        the rest are data rows, inferred as numbers, booleans or text.\n\
        Columns are configured positionally with WIDTH:TYPE:FORMAT, e.g.\n\
        --column 80:number:0.00 --column 120 --column :date:yyyy-mm-dd")]
    Export {
        /// Input CSV file path
        input: String,

        /// Output XLSX file path
        output: String,

        /// Sheet name
        #[arg(short, long, default_value = "Sheet1")]
        sheet_name: String,

        /// Number of leading CSV records treated as header rows
        #[arg(long, default_value_t = 1)]
        header_rows: usize,

        /// Column config WIDTH:TYPE:FORMAT, one per column in order
        #[arg(short, long = "column")]
        columns: Vec<String>,

        /// Merged range such as A1:C1 (repeatable)
        #[arg(short, long = "merge")]
        merges: Vec<String>,

        /// Order for ambiguous dates: auto, mdy/us, dmy/eu
        #[arg(long, default_value = "auto")]
        date_order: String,
    },
    /// Read the first sheet of an XLSX file as CSV records
    Read {
        /// Input XLSX file path
        input: String,

        /// Output CSV file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Writes library log records (skipped merges, typing decisions) to stderr
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Warnings are always shown; `--verbose` adds debug output
fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

fn init_logging(verbose: bool) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log_level(verbose));
    }
}

fn run(command: Command, verbose: bool) -> Result<String, ExcelError> {
    match command {
        Command::Export {
            input,
            output,
            sheet_name,
            header_rows,
            columns,
            merges,
            date_order,
        } => {
            let date_order = DateOrder::parse(&date_order).ok_or_else(|| {
                ExcelError::InvalidArgument(format!(
                    "Invalid date order '{}'. Valid values: auto, mdy, us, dmy, eu",
                    date_order
                ))
            })?;
            let options = CsvExportOptions {
                sheet_name,
                header_rows,
                columns: columns
                    .iter()
                    .map(|spec| parse_column_spec(spec))
                    .collect::<Result<_, _>>()?,
                merges: merges
                    .iter()
                    .map(|range| parse_merge_range(range))
                    .collect::<Result<_, _>>()?,
                date_order,
            };

            if verbose {
                eprintln!("xlsxport - CSV to XLSX export");
                eprintln!("Input:   {}", input);
                eprintln!("Output:  {}", output);
                eprintln!("Sheet:   {}", options.sheet_name);
                eprintln!("Columns: {}", options.columns.len());
            }

            let (rows, cols) = convert_csv_to_xlsx(&input, &output, &options)?;
            Ok(format!("OK {} {}", rows, cols))
        }
        Command::Read { input, output } => {
            if verbose {
                eprintln!("xlsxport - XLSX to CSV read");
                eprintln!("Input:  {}", input);
            }

            let writer: Box<dyn Write> = match output {
                Some(path) => Box::new(BufWriter::new(File::create(path)?)),
                None => Box::new(io::stdout().lock()),
            };
            let records = convert_xlsx_to_csv(&input, writer)?;
            Ok(format!("OK {}", records))
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    let start = Instant::now();

    let to_stdout = matches!(args.command, Command::Read { output: None, .. });

    match run(args.command, args.verbose) {
        Ok(summary) => {
            if args.verbose {
                eprintln!("Done in {:.2}s", start.elapsed().as_secs_f64());
            }
            // Keep stdout clean when it carries the CSV
            if to_stdout {
                eprintln!("{}", summary);
            } else {
                println!("{}", summary);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
