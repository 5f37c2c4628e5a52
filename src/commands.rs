use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use indicatif::ProgressBar;
use std::time::Duration;
use tracing::info;

use crate::chat::{Answerer, ConversationTurn};
use crate::config::Config;
use crate::embeddings::ollama::OllamaClient;
use crate::index::Indexer;
use crate::llm::groq::GroqClient;

/// Build the persisted index, or report the existing one. `rebuild` discards
/// any persisted index first.
#[inline]
pub async fn build_index(config: &Config, rebuild: bool) -> Result<()> {
    let embedder = OllamaClient::new(&config.ollama)?;
    embedder
        .health_check()
        .context("Ollama embedding server is not available")?;

    let indexer = Indexer::new(config, &embedder);

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(if rebuild {
        "Rebuilding index from documents..."
    } else {
        "Preparing index..."
    });
    spinner.enable_steady_tick(Duration::from_millis(100));

    let store = if rebuild {
        indexer.rebuild().await?
    } else {
        indexer.ensure_index().await?
    };

    spinner.finish_and_clear();

    let count = store.count_chunks().await?;
    println!(
        "{} {} chunks indexed at {}",
        style("✓").green(),
        count,
        style(config.vector_db_path().display()).cyan()
    );

    Ok(())
}

/// Answer a single question with no conversation history.
#[inline]
pub async fn ask(config: &Config, question: &str) -> Result<()> {
    let embedder = OllamaClient::new(&config.ollama)?;
    let model = GroqClient::new(&config.groq)?;
    let store = Indexer::new(config, &embedder).ensure_index().await?;

    let answerer = Answerer::new(config, &embedder, &model, &store);
    let answer = answerer.answer(question, &[]).await?;

    println!("{}", answer);
    Ok(())
}

/// Interactive chat session. The session owns the conversation history; the
/// index is loaded (or built) once up front, so initialization failures halt
/// the session before any chat interaction.
#[inline]
pub async fn chat(config: &Config) -> Result<()> {
    let embedder = OllamaClient::new(&config.ollama)?;
    let model = GroqClient::new(&config.groq)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Loading index...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let store = Indexer::new(config, &embedder).ensure_index().await?;
    spinner.finish_and_clear();

    let answerer = Answerer::new(config, &embedder, &model, &store);
    let mut history: Vec<ConversationTurn> = Vec::new();

    println!(
        "{}",
        style("Ask a question about the corpus. Type 'exit' to quit.").dim()
    );

    loop {
        let line: String = Input::new()
            .with_prompt(style("you").bold().to_string())
            .allow_empty(true)
            .interact_text()?;
        let question = line.trim();

        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        match answerer.answer(question, &history).await {
            Ok(answer) => {
                println!("{} {}", style("assistant").bold().cyan(), answer);
                history.push(ConversationTurn::user(question));
                history.push(ConversationTurn::assistant(answer));
            }
            Err(e) => {
                // The failed turn is not added to the history.
                eprintln!("{} {:#}", style("error:").bold().red(), e);
            }
        }
    }

    info!("Chat session ended with {} turns", history.len());
    Ok(())
}

/// Show connectivity and index status.
#[inline]
pub async fn show_status(config: &Config) -> Result<()> {
    println!("📊 Corpus Chat Status");
    println!("{}", "=".repeat(50));
    println!();

    println!("🤖 Embedding Server:");
    match OllamaClient::new(&config.ollama) {
        Ok(client) => match client.health_check() {
            Ok(()) => {
                println!(
                    "   ✅ Ollama: Connected ({}:{})",
                    config.ollama.host, config.ollama.port
                );
                println!("   📋 Model: {}", config.ollama.model);
            }
            Err(e) => {
                println!("   ⚠️  Ollama: Unreachable or unhealthy - {:#}", e);
            }
        },
        Err(e) => {
            println!("   ❌ Ollama: Invalid configuration - {:#}", e);
        }
    }

    println!();
    println!("💬 Chat Model:");
    if config.groq.has_api_key() {
        println!("   ✅ Groq: API key configured");
        println!("   📋 Model: {}", config.groq.model);
    } else {
        println!("   ❌ Groq: API key not set (export GROQ_API_KEY)");
    }

    println!();
    println!("📚 Corpus:");
    let documents_dir = config.documents_dir();
    if documents_dir.is_dir() {
        let supported = count_supported_documents(&documents_dir)?;
        println!("   📂 Directory: {}", documents_dir.display());
        println!("   📄 Supported documents: {}", supported);
    } else {
        println!(
            "   ❌ Documents directory does not exist: {}",
            documents_dir.display()
        );
    }

    println!();
    println!("🔍 Index:");
    match crate::index::VectorStore::new(config).await {
        Ok(store) => {
            let count = store.count_chunks().await?;
            if count > 0 {
                println!("   ✅ Persisted index: {} chunks", count);
            } else {
                println!("   📭 No chunks indexed yet");
            }
        }
        Err(e) => {
            println!("   ❌ Index: Failed to open - {}", e);
        }
    }

    println!();
    println!("💡 Next Steps:");
    println!("   • Use 'corpus-chat index' to build the index from your documents");
    println!("   • Use 'corpus-chat ask <question>' for a one-shot answer");
    println!("   • Use 'corpus-chat chat' for an interactive session");

    Ok(())
}

/// Print the resolved configuration with the API key masked.
#[inline]
pub fn show_config(config: &Config) -> Result<()> {
    println!("Configuration file: {}", config.config_file_path().display());
    println!();
    println!("[documents]");
    println!("dir = {:?}", config.documents_dir());
    println!();
    println!("[ollama]");
    println!(
        "url = {}://{}:{}",
        config.ollama.protocol, config.ollama.host, config.ollama.port
    );
    println!("model = {:?}", config.ollama.model);
    println!("batch_size = {}", config.ollama.batch_size);
    println!("embedding_dimension = {}", config.ollama.embedding_dimension);
    println!();
    println!("[groq]");
    println!("base_url = {:?}", config.groq.base_url);
    println!("model = {:?}", config.groq.model);
    println!(
        "api_key = {}",
        if config.groq.has_api_key() {
            "<configured>"
        } else {
            "<not set>"
        }
    );
    println!();
    println!("[chunking]");
    println!("chunk_size = {}", config.chunking.chunk_size);
    println!("chunk_overlap = {}", config.chunking.chunk_overlap);
    println!();
    println!("[retrieval]");
    println!("top_k = {}", config.retrieval.top_k);
    println!();
    println!("[assistant]");
    println!("history_window = {}", config.assistant.history_window);
    println!("persona = {:?}", config.assistant.persona);

    Ok(())
}

/// Write a default configuration file if none exists yet.
#[inline]
pub fn init_config(config: &Config) -> Result<()> {
    let config_path = config.config_file_path();

    if config_path.exists() {
        println!("Configuration already exists: {}", config_path.display());
        println!("Use 'corpus-chat config --show' to inspect it.");
        return Ok(());
    }

    config.save().context("Failed to write configuration")?;
    println!(
        "{} Wrote default configuration to {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    println!("Edit it to point [documents] dir at your corpus.");

    Ok(())
}

fn count_supported_documents(dir: &std::path::Path) -> Result<usize> {
    let count = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read documents directory: {}", dir.display()))?
        .filter_map(std::result::Result::ok)
        .filter(|entry| {
            let path = entry.path();
            path.is_file()
                && matches!(
                    path.extension()
                        .map(|ext| ext.to_string_lossy().to_lowercase())
                        .as_deref(),
                    Some("pdf") | Some("txt")
                )
        })
        .count();
    Ok(count)
}
