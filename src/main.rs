use std::path::PathBuf;

use clap::{Parser, Subcommand};
use usager_sheets::import::{DEFAULT_CITY, DEFAULT_POSTAL_CODE, DEFAULT_YEAR, ImportSettings};
use usager_sheets::io::excel_read::{DEFAULT_HEADER_ROW, SheetSelection};
use usager_sheets::{Result, ToolError, logging, pipeline};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            // Help and version requests are not failures.
            let code = if error.use_stderr() { 1 } else { 0 };
            if error.print().is_err() {
                eprintln!("{error}");
            }
            std::process::exit(code);
        }
    };

    if let Err(error) = logging::init(cli.verbose).and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Export(args) => execute_export(args),
        Command::Import(args) => execute_import(args),
        Command::Analyze(args) => execute_analyze(args),
    }
}

fn execute_export(args: ExportArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(ToolError::MissingInput(args.input));
    }
    pipeline::export_users(&args.input, &args.output)?;
    println!("Excel file created successfully at {}", args.output.display());
    Ok(())
}

fn execute_import(args: ImportArgs) -> Result<()> {
    println!("Processing file: {}", args.input.display());
    let settings = ImportSettings {
        city: args.city,
        postal_code: args.postal_code,
        year: args.year,
        selection: args.sheet.into(),
    };
    let count = pipeline::import_mediation(&args.input, &args.output, &settings)?;
    println!("Conversion complete: {count} usagers extracted.");
    println!("JSON file saved: {}", args.output.display());
    Ok(())
}

fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    let analysis = pipeline::analyze_workbook(&args.input, &args.sheet.into())?;
    print!("{analysis}");
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Export usager records to Excel and convert mediation spreadsheets to JSON."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a JSON array of usager records as a styled Excel workbook.
    Export(ExportArgs),
    /// Convert a mediation spreadsheet into importable JSON records.
    Import(ImportArgs),
    /// Describe the columns of a spreadsheet without converting it.
    Analyze(AnalyzeArgs),
}

#[derive(clap::Args)]
struct ExportArgs {
    /// JSON file holding an array of usager records.
    input: PathBuf,

    /// Excel workbook to create.
    output: PathBuf,
}

#[derive(clap::Args)]
struct ImportArgs {
    /// Mediation spreadsheet (.xlsx).
    input: PathBuf,

    /// JSON file to create.
    output: PathBuf,

    /// City attached to every imported address.
    #[arg(long, env = "USAGER_IMPORT_CITY", default_value = DEFAULT_CITY)]
    city: String,

    /// Postal code attached to every imported address.
    #[arg(long, env = "USAGER_IMPORT_POSTAL_CODE", default_value = DEFAULT_POSTAL_CODE)]
    postal_code: String,

    /// Activity year assigned to every imported record.
    #[arg(long, env = "USAGER_IMPORT_YEAR", default_value_t = DEFAULT_YEAR)]
    year: i32,

    #[command(flatten)]
    sheet: SheetArgs,
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Spreadsheet to inspect (.xlsx).
    input: PathBuf,

    #[command(flatten)]
    sheet: SheetArgs,
}

#[derive(clap::Args)]
struct SheetArgs {
    /// Worksheet to read. Defaults to the first one.
    #[arg(long)]
    sheet: Option<String>,

    /// 0-based index of the row holding the column labels.
    #[arg(long, default_value_t = DEFAULT_HEADER_ROW)]
    header_row: usize,
}

impl From<SheetArgs> for SheetSelection {
    fn from(args: SheetArgs) -> Self {
        SheetSelection {
            sheet: args.sheet,
            header_row: args.header_row,
        }
    }
}
