use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use commands::context::{AppContext, GlobalOptions};

#[derive(Parser)]
#[command(name = "tasklane")]
#[command(about = "Tasklane - manage your to-do list from the terminal", long_about = None)]
struct Cli {
    /// Base URL of the task API (overrides TASKLANE_API_URL and config.toml)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding config.toml and the persisted session
    #[arg(long, global = true, env = "TASKLANE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the current session
    Logout,
    /// Show who is logged in
    Whoami,
    /// List your tasks
    List,
    /// Add a task
    Add {
        title: String,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Mark a task done, or not done again
    Toggle { id: String },
    /// Change a task's title and description
    Edit {
        id: String,
        #[arg(long, short)]
        title: String,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Delete a task
    Rm { id: String },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let options = GlobalOptions {
        api_url: cli.api_url,
        data_dir: cli.data_dir,
    };
    let ctx = AppContext::build(&options)?;

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(&ctx, name, email, password).await,
        Commands::Login { email, password } => commands::auth::login(&ctx, email, password).await,
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Whoami => commands::auth::whoami(&ctx),
        Commands::List => commands::tasks::list(&ctx).await,
        Commands::Add { title, description } => {
            commands::tasks::add(&ctx, title, description).await
        }
        Commands::Toggle { id } => commands::tasks::toggle(&ctx, &id).await,
        Commands::Edit {
            id,
            title,
            description,
        } => commands::tasks::edit(&ctx, &id, &title, description.as_deref()).await,
        Commands::Rm { id } => commands::tasks::remove(&ctx, &id).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("Error: {:#}", e).red());
            ExitCode::FAILURE
        }
    }
}
