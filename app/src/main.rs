use anyhow::Result;
use bookshelf_server::{bootstrap_only, logging, serve, AppConfig};
use catalog::Argon2Credentials;
use clap::{Parser, Subcommand};
use colored::*;

/// Bookshelf - book catalog and review service
#[derive(Parser)]
#[command(name = "bookshelf-server")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// Create the default account and seed sample books, then exit
    Bootstrap,

    /// Print an argon2 hash suitable for ADMIN_PASSWORD_HASH
    HashPassword {
        /// Password to hash
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = AppConfig::from_env();
            let _guard = match logging::init_logging(&config.log_dir, log_level) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("{} failed to initialize logging: {}", "Error:".red().bold(), e);
                    std::process::exit(1);
                }
            };
            config.report_warnings();
            tracing::info!(
                environment = %config.environment,
                "=== Bookshelf starting on {}:{} ===",
                config.host,
                config.port
            );

            let result = serve(config).await;
            logging::log_shutdown();
            result?;
        }
        Commands::Bootstrap => {
            tracing_subscriber::fmt().with_env_filter(log_level).init();
            let config = AppConfig::from_env();
            config.report_warnings();

            let report = bootstrap_only(&config).await?;
            println!(
                "{} admin account {}, {} book(s) seeded, {} in collection",
                "Bootstrap complete:".green().bold(),
                if report.admin_created { "created" } else { "present" },
                report.books_seeded,
                report.books_total
            );
        }
        Commands::HashPassword { password } => {
            if password.is_empty() {
                eprintln!("{} password cannot be empty", "Error:".red().bold());
                std::process::exit(1);
            }
            println!("{}", Argon2Credentials::hash_blocking(&password)?);
        }
    }

    Ok(())
}
