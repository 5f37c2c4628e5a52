use clap::{Parser, Subcommand};
use corpus_chat::Result;
use corpus_chat::commands::{ask, build_index, chat, init_config, show_config, show_status};
use corpus_chat::config::{Config, default_base_dir};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "corpus-chat")]
#[command(about = "A retrieval-augmented chat assistant over a local document corpus")]
#[command(version)]
struct Cli {
    /// Override the configuration/data directory
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or inspect the configuration
    Config {
        /// Show the resolved configuration
        #[arg(long)]
        show: bool,
    },
    /// Build the persisted index from the documents directory
    Index {
        /// Discard any persisted index and rebuild from the current documents
        #[arg(long)]
        rebuild: bool,
    },
    /// Ask a single question
    Ask {
        /// The question to answer
        question: String,
    },
    /// Start an interactive chat session
    Chat,
    /// Show connectivity and index status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let base_dir = match cli.config_dir {
        Some(dir) => dir,
        None => default_base_dir().map_err(|e| corpus_chat::CorpusError::Config(e.to_string()))?,
    };
    let config = Config::load(&base_dir)?;

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config(&config)?;
            } else {
                init_config(&config)?;
            }
        }
        Commands::Index { rebuild } => {
            build_index(&config, rebuild).await?;
        }
        Commands::Ask { question } => {
            ask(&config, &question).await?;
        }
        Commands::Chat => {
            chat(&config).await?;
        }
        Commands::Status => {
            show_status(&config).await?;
        }
    }

    Ok(())
}
