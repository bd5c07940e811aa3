use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::anyhow;
use clap::Parser;
use gn_core::config::{DevotionalConfig, GoodNewsConfig};
use gn_core::Error;
use gn_inference::{create_model, DevotionalOutcome, DevotionalService, GoodNewsSummarizer};
use gn_news::{DigestService, McpPageFetcher, McpSearchTool};
use gn_storage::create_store;
use gn_web::AppState;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(long, default_value = "markdown", help = "Where daily documents go: markdown (default) or memory")]
    storage: String,
    #[arg(long, default_value = "openai", help = "Model provider: openai (default) or dummy")]
    model: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Search, summarize and save today's good news digest
    Digest {
        /// Print the report without saving it
        #[arg(long)]
        no_write: bool,
    },
    /// Write today's scripture devotional
    Devotional {
        /// Print the devotional without saving it
        #[arg(long)]
        no_write: bool,
    },
    /// Serve the comfort and text-to-speech endpoints
    Serve {
        #[arg(long, default_value = "0.0.0.0:8000")]
        addr: SocketAddr,
    },
}

async fn run_digest(cli: &Cli, no_write: bool) -> anyhow::Result<()> {
    let config = GoodNewsConfig::from_env()?;
    let models = create_model(&cli.model)?;
    info!("🧠 Using {} for summaries ({})", models.chat.name(), config.model);

    let store = create_store(&cli.storage, &config.output_dir)?;
    let summarizer = Arc::new(GoodNewsSummarizer::new(
        models.chat,
        config.model.clone(),
        config.fetch_max_chars,
    ));
    let service = DigestService::new(
        config.clone(),
        Arc::new(McpSearchTool::new(config.search_server.clone())),
        Arc::new(McpPageFetcher::new(config.fetch_server.clone())),
        summarizer,
        store,
    );

    match service.generate(None, !no_write).await {
        Ok(digest) if digest.written => {
            println!("Saved good news digest to {}", digest.output_path.display());
            Ok(())
        }
        Ok(digest) => {
            if !no_write {
                println!("{} already exists; leaving it untouched.", digest.output_path.display());
            }
            println!("{}", digest.report);
            Ok(())
        }
        Err(Error::Write { path, source, digest }) => {
            println!("{}", digest.report);
            Err(anyhow!("Failed to write {}: {}", path.display(), source))
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_devotional(cli: &Cli, no_write: bool) -> anyhow::Result<()> {
    let config = DevotionalConfig::from_env();
    let models = create_model(&cli.model)?;
    let store = create_store(&cli.storage, &config.output_dir)?;
    let service = DevotionalService::new(config, models.chat, store);

    match service.generate(None, !no_write).await? {
        DevotionalOutcome::AlreadyExists(path) => {
            println!("{} already exists. Skip writing.", path.display());
        }
        DevotionalOutcome::Generated(devotional) if devotional.written => {
            println!("Successfully wrote devotional to {}", devotional.output_path.display());
        }
        DevotionalOutcome::Generated(devotional) => println!("{}", devotional.report),
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Digest { no_write } => run_digest(&cli, no_write).await,
        Commands::Devotional { no_write } => run_devotional(&cli, no_write).await,
        Commands::Serve { addr } => {
            let state = AppState::from_provider(&cli.model)?;
            gn_web::serve(addr, state).await?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_digest_flags() {
        let cli = Cli::try_parse_from(["gn", "--storage", "memory", "digest", "--no-write"]).unwrap();
        assert_eq!(cli.storage, "memory");
        assert_eq!(cli.model, "openai");
        assert!(matches!(cli.command, Commands::Digest { no_write: true }));
    }

    #[test]
    fn test_serve_default_addr() {
        let cli = Cli::try_parse_from(["gn", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { addr } => assert_eq!(addr.port(), 8000),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
