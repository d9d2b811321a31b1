mod analyze;
mod crawl;
mod output;
mod reports;

use std::path::PathBuf;

use aivis_crawler::SiteProfile;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::reports::ReportsCommands;

#[derive(Debug, Parser)]
#[command(name = "aivis-cli")]
#[command(about = "AI visibility tracker command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Score saved prompt/response pairs against the tracked brands
    Analyze {
        /// JSON array of `{"prompt", "responseText"}` objects
        #[arg(long)]
        input: PathBuf,
        /// Category label (defaults to the tracking file)
        #[arg(long)]
        category: Option<String>,
        /// Tracked brand, repeatable (defaults to the tracking file)
        #[arg(long = "brand")]
        brands: Vec<String>,
        /// Write the CSV export here (a directory gets `report-<category>.csv`)
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Write the Markdown report here
        #[arg(long)]
        markdown: Option<PathBuf>,
        /// Store the report in the history database
        #[arg(long)]
        save: bool,
    },
    /// Send the tracked prompts through a chat site in a real browser
    Crawl {
        /// Chat site to drive: chatgpt or gemini
        #[arg(long)]
        site: SiteProfile,
        /// Prompt to send, repeatable (defaults to the tracking file)
        #[arg(long = "prompt")]
        prompts: Vec<String>,
        /// Store the report and a crawl run record in the history database
        #[arg(long)]
        save: bool,
    },
    /// Query stored reports
    Reports {
        #[command(subcommand)]
        command: ReportsCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = aivis_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Analyze {
            input,
            category,
            brands,
            csv,
            markdown,
            save,
        }) => {
            analyze::run_analyze(
                &config,
                analyze::AnalyzeArgs {
                    input,
                    category,
                    brands,
                    csv,
                    markdown,
                    save,
                },
            )
            .await
        }
        Some(Commands::Crawl {
            site,
            prompts,
            save,
        }) => crawl::run_crawl(&config, site, prompts, save).await,
        Some(Commands::Reports { command }) => {
            let pool = aivis_db::connect_from_app_config(&config).await?;
            reports::run_reports(&pool, command).await
        }
        Some(Commands::Db { command }) => run_db(&config, command).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

async fn run_db(config: &aivis_core::AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = aivis_db::connect_from_app_config(config).await?;
    match command {
        DbCommands::Ping => {
            aivis_db::ping(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = aivis_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
