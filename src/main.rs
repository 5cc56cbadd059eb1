use anyhow::Result;
use chrono::Utc;
use clap::{Args, CommandFactory, Parser, Subcommand};
use log::LevelFilter;
use nro_reject_tools::commands::{self, SearchOptions};
use nro_reject_tools::credentials::DEFAULT_CREDENTIALS_FILE;
use nro_reject_tools::quickwit_api::DEFAULT_INDEX;
use nro_reject_tools::search::query::{BucketFilter, DEFAULT_FIELD, DEFAULT_TERMS_SIZE};
use nro_reject_tools::utils::time::{parse_month, QueryWindow};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "agg-uid")]
#[command(about = "Aggregate eduroam Access-Reject events per user from Quickwit", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Properties file with QW_USER, QW_PASS and optional QW_URL
    #[arg(long, default_value = DEFAULT_CREDENTIALS_FILE)]
    credentials: PathBuf,

    /// Quickwit base URL (default: QW_URL from the credentials file)
    #[arg(long)]
    url: Option<String>,

    /// Index to search
    #[arg(long, default_value = DEFAULT_INDEX)]
    index: String,

    /// Field holding the raw log line
    #[arg(long, default_value = DEFAULT_FIELD)]
    field: String,

    /// Maximum number of terms buckets to request
    #[arg(long, default_value_t = DEFAULT_TERMS_SIZE)]
    size: u32,
}

impl From<ConnectionArgs> for SearchOptions {
    fn from(args: ConnectionArgs) -> Self {
        SearchOptions {
            credentials: args.credentials,
            url: args.url,
            index: args.index,
            field: args.field,
            size: args.size,
        }
    }
}

#[derive(Args)]
struct MonthArgs {
    /// Calendar month to search, as YYYY-MM (default: previous month)
    #[arg(long, conflicts_with = "all_time")]
    month: Option<String>,

    /// Search without any time bound
    #[arg(long)]
    all_time: bool,
}

impl MonthArgs {
    fn window(&self) -> Result<Option<QueryWindow>> {
        if self.all_time {
            return Ok(None);
        }
        match &self.month {
            Some(month) => parse_month(month).map(Some),
            None => QueryWindow::previous_month(Utc::now()).map(Some),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print per-user reject counts for a calendar month
    Console {
        /// Institution domain (e.g. "ku" for ku.ac.th)
        domain: String,

        #[command(flatten)]
        month: MonthArgs,

        /// Extract user identities locally instead of with a Quickwit regex
        #[arg(long)]
        client_filter: bool,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Save a calendar month's per-user reject counts as a sorted JSON list
    Monthly {
        /// Institution domain (e.g. "ku" for ku.ac.th)
        domain: String,

        #[command(flatten)]
        month: MonthArgs,

        /// Directory the <domain>/ report directory is created in
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Save the last N days of per-user reject counts with window metadata
    Export {
        /// Institution domain (e.g. "ku" for ku.ac.th)
        domain: String,

        /// Number of days to look back
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,

        /// Directory the <domain>/ report directory is created in
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Print a timestamp range clause covering the last N days
    Timedelta {
        /// Number of days to look back
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,
    },

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Console {
            domain,
            month,
            client_filter,
            connection,
        } => {
            let filter = if client_filter {
                BucketFilter::Client
            } else {
                BucketFilter::Server
            };
            commands::console::run(&domain, month.window()?, filter, &connection.into()).await
        }
        Commands::Monthly {
            domain,
            month,
            output_dir,
            connection,
        } => commands::monthly::run(&domain, month.window()?, &output_dir, &connection.into())
            .await
            .map(|_| ()),
        Commands::Export {
            domain,
            days,
            output_dir,
            connection,
        } => commands::export::run(&domain, days, &output_dir, &connection.into())
            .await
            .map(|_| ()),
        Commands::Timedelta { days } => commands::timedelta::run(days),
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "agg-uid", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    // Usage errors exit with 1 rather than clap's default 2
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    init_logger(cli.verbose);

    if let Err(e) = run(cli.command).await {
        eprintln!("An error occurred: {:#}", e);
        process::exit(1);
    }
}
