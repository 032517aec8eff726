use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gitwriter::cli::CommandContext;
use gitwriter::cli::commands;

#[derive(Parser)]
#[command(name = "gitwriter")]
#[command(
    version,
    about = "Generate README files for GitHub repositories and commit them back"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a README for a repository and store it
    Generate {
        #[arg(help = "Repository URL, e.g. https://github.com/owner/repo")]
        repo_url: String,
        #[arg(long, short, help = "Account whose GitHub token is used")]
        account: String,
        #[arg(long, short, help = "Write the README to this file instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Commit a README to the repository's default branch
    Commit {
        #[arg(help = "Repository URL")]
        repo_url: String,
        #[arg(long, short, help = "Account whose GitHub token is used")]
        account: String,
        #[arg(long, short, help = "README file to commit (default: last generated)")]
        file: Option<PathBuf>,
    },

    /// List repositories visible to an account
    Repos {
        #[arg(long, short, help = "Account whose GitHub token is used")]
        account: String,
    },

    /// Show generated README history
    History {
        #[arg(long, short)]
        account: String,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Manage accounts and credits
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Register an account or refresh its token
    Add {
        id: String,
        #[arg(long, short)]
        username: String,
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Show account details and credit balance
    Show { id: String },
    /// Deduct credits from an account
    Deduct { id: String, amount: i64 },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration and database paths
    Path,
    /// Write a default configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mGitWriter encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            repo_url,
            account,
            output,
        } => {
            let ctx = CommandContext::load()?;
            let rt = Runtime::new()?;
            rt.block_on(commands::generate::run(
                &ctx,
                &repo_url,
                &account,
                output.as_deref(),
            ))?;
        }
        Commands::Commit {
            repo_url,
            account,
            file,
        } => {
            let ctx = CommandContext::load()?;
            let rt = Runtime::new()?;
            rt.block_on(commands::commit::run(
                &ctx,
                &repo_url,
                &account,
                file.as_deref(),
            ))?;
        }
        Commands::Repos { account } => {
            let ctx = CommandContext::load()?;
            let rt = Runtime::new()?;
            rt.block_on(commands::repos::run(&ctx, &account))?;
        }
        Commands::History { account, format } => {
            let ctx = CommandContext::load()?;
            commands::history::run(&ctx, &account, &format)?;
        }
        Commands::Account { action } => {
            let ctx = CommandContext::load()?;
            match action {
                AccountAction::Add {
                    id,
                    username,
                    token,
                } => commands::account::add(&ctx, &id, &username, &token)?,
                AccountAction::Show { id } => commands::account::show(&ctx, &id)?,
                AccountAction::Deduct { id, amount } => {
                    commands::account::deduct(&ctx, &id, amount)?
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => commands::config::show(&format)?,
            ConfigAction::Path => commands::config::path()?,
            ConfigAction::Init { global, force } => commands::config::init(global, force)?,
        },
    }

    Ok(())
}
