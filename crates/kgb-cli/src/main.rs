//! kgb CLI: track salary-step (KGB) increases for civil servants.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use kgb_core::import::ImportStrategy;
use kgb_core::query::SortOrder;

mod commands;

use commands::export::ExportFormat;
use commands::suggest::SuggestArgs;
use commands::{FieldArgs, GlobalArgs, RemainingUnit};

#[derive(Parser)]
#[command(
    name = "kgb",
    version,
    about = "Salary-step (KGB) increase tracker for civil-service personnel offices"
)]
struct Cli {
    /// Config file path (default: ./kgb.toml, then ~/.config/kgb/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the employee data (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Field values shared by `edit` and `bulk-edit`.
#[derive(Args)]
struct Fields {
    /// New name
    #[arg(long)]
    name: Option<String>,

    /// New position
    #[arg(long)]
    position: Option<String>,

    /// New NIP
    #[arg(long)]
    nip: Option<String>,

    /// New last KGB date (YYYY-MM-DD)
    #[arg(long)]
    last_kgb_date: Option<String>,

    /// New status, e.g. "Proses" or "selesai"
    #[arg(long)]
    status: Option<String>,
}

impl From<Fields> for FieldArgs {
    fn from(f: Fields) -> Self {
        FieldArgs {
            name: f.name,
            position: f.position,
            nip: f.nip,
            last_kgb_date: f.last_kgb_date,
            status: f.status,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and data directory
    Init,

    /// List employees with their next KGB date
    List {
        /// Filter by name, position (case-insensitive) or NIP
        #[arg(long)]
        search: Option<String>,

        /// Sort by next KGB: closest or furthest
        #[arg(long, default_value = "closest")]
        sort: SortOrder,

        /// Only show employees with this status
        #[arg(long)]
        status: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Unit for the remaining-time column
        #[arg(long, value_enum, default_value = "days")]
        unit: RemainingUnit,
    },

    /// Show employees due for a KGB review soon
    Reviews {
        /// Days to look ahead (default from config, 90)
        #[arg(long)]
        window: Option<u32>,

        /// Also list overdue reviews
        #[arg(long)]
        overdue: bool,

        /// Unit for the remaining-time column
        #[arg(long, value_enum, default_value = "days")]
        unit: RemainingUnit,
    },

    /// Add an employee
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        position: String,

        #[arg(long)]
        nip: String,

        /// Date of the last KGB (YYYY-MM-DD)
        #[arg(long)]
        last_kgb_date: String,

        /// Initial status (default: Belum Diajukan)
        #[arg(long)]
        status: Option<String>,
    },

    /// Edit one employee
    Edit {
        /// Employee id
        id: String,

        #[command(flatten)]
        fields: Fields,
    },

    /// Delete one employee
    Delete {
        /// Employee id
        id: String,
    },

    /// Apply the same change to several employees
    BulkEdit {
        /// Comma-separated employee ids
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<String>,

        #[command(flatten)]
        fields: Fields,
    },

    /// Delete several employees
    BulkDelete {
        /// Comma-separated employee ids
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<String>,
    },

    /// Replace the collection from a JSON export or a CSV sheet
    Import {
        /// .json export or .csv sheet
        file: PathBuf,

        /// Sheet layout: auto, year-matrix, date-column (default from config)
        #[arg(long)]
        strategy: Option<ImportStrategy>,
    },

    /// Export the collection
    Export {
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Output file (default: kgb-data-export-<date>.json or kgb-schedule-<start>-<end>.csv)
        #[arg(long)]
        output: Option<PathBuf>,

        /// First year of the sheet (default: current year)
        #[arg(long)]
        start_year: Option<i32>,

        /// Last year of the sheet (default: start year + 5)
        #[arg(long)]
        end_year: Option<i32>,
    },

    /// Ask an LLM for promotion candidates
    Suggest {
        /// JSON file with employee data
        #[arg(long)]
        input: PathBuf,

        /// Number of candidates to suggest (default 3)
        #[arg(long)]
        count: Option<u32>,

        /// Provider name from the config (default: default_provider)
        #[arg(long)]
        provider: Option<String>,

        /// Model id (default: default_model)
        #[arg(long)]
        model: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Unit for the remaining-time column
        #[arg(long, value_enum, default_value = "days")]
        unit: RemainingUnit,
    },
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "kgb=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global = GlobalArgs {
        config: cli.config,
        data_dir: cli.data_dir,
    };

    let result = match cli.command {
        Commands::Init => commands::init::execute(&global),
        Commands::List {
            search,
            sort,
            status,
            json,
            unit,
        } => commands::list::execute(&global, search, sort, status, json, unit),
        Commands::Reviews {
            window,
            overdue,
            unit,
        } => commands::reviews::execute(&global, window, overdue, unit),
        Commands::Add {
            name,
            position,
            nip,
            last_kgb_date,
            status,
        } => commands::add::execute(&global, name, position, nip, last_kgb_date, status),
        Commands::Edit { id, fields } => commands::edit::execute(&global, id, fields.into()),
        Commands::Delete { id } => commands::delete::execute(&global, id),
        Commands::BulkEdit { ids, fields } => {
            commands::edit::execute_bulk(&global, ids, fields.into())
        }
        Commands::BulkDelete { ids } => commands::delete::execute_bulk(&global, ids),
        Commands::Import { file, strategy } => commands::import::execute(&global, file, strategy),
        Commands::Export {
            format,
            output,
            start_year,
            end_year,
        } => commands::export::execute(&global, format, output, start_year, end_year),
        Commands::Suggest {
            input,
            count,
            provider,
            model,
            json,
            unit: _,
        } => {
            commands::suggest::execute(
                &global,
                SuggestArgs {
                    input,
                    count,
                    provider,
                    model,
                    json,
                },
            )
            .await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
