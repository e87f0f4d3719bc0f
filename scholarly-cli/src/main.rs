//! Scholarly CLI - Command-line tooling for the research corpus
//!
//! Loads documents into the vector index and asks questions against it.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use scholarly_core::{
    init_logging, log_operation_error, AppConfig, LogFormat, LoggingConfig, RetryConfig,
};
use scholarly_rag::http::build_client;
use scholarly_rag::{
    chunk_text, IndexManager, IngestProgress, Ingestor, OpenAiEmbedder, PineconeIndex,
    RagPipeline, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "scholarly")]
#[command(about = "Manage and query the scholarly research corpus")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk a text document, embed it and upload it to the vector index
    Ingest {
        /// Plain-text or Markdown document
        file: PathBuf,

        /// Source label stored with every chunk (defaults to the file name)
        #[arg(long)]
        source: Option<String>,

        /// Maximum characters per chunk
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Characters shared by consecutive chunks
        #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
        overlap: usize,

        /// Chunks per embedding and upsert request
        #[arg(long, default_value_t = 100)]
        batch_size: usize,

        /// Only chunk the document and report the result
        #[arg(long)]
        dry_run: bool,
    },

    /// Ask a question against the indexed corpus
    Ask {
        /// Question to ask
        question: String,

        /// Number of chunks to retrieve (overrides RAG_TOP_K)
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Validate configuration and report the vector index status
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let mut logging_config = LoggingConfig::from_env();
    logging_config.format = LogFormat::Compact;
    if cli.verbose {
        logging_config.level = "debug".to_string();
    } else {
        logging_config.filter_directives.clear();
        logging_config.level = "warn".to_string();
    }
    init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Ingest {
            file,
            source,
            chunk_size,
            overlap,
            batch_size,
            dry_run,
        } => {
            handle_ingest(
                &config,
                &file,
                source,
                chunk_size,
                overlap,
                batch_size,
                dry_run,
            )
            .await
        }
        Commands::Ask { question, top_k } => handle_ask(&config, &question, top_k).await,
        Commands::CheckConfig => handle_check_config(&config).await,
    }
}

/// Read a text document, rejecting formats that need extraction first
async fn read_document(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    if extension.as_deref() == Some("pdf") {
        bail!(
            "{} is a PDF; extract its text to a .txt or .md file first",
            path.display()
        );
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if text.trim().is_empty() {
        bail!("{} contains no text", path.display());
    }
    Ok(text)
}

fn source_label(path: &Path, source: Option<String>) -> String {
    source.unwrap_or_else(|| {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    })
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{msg:10} [{bar:40.cyan/blue}] {pos}/{len} chunks")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}

async fn handle_ingest(
    config: &AppConfig,
    file: &Path,
    source: Option<String>,
    chunk_size: usize,
    overlap: usize,
    batch_size: usize,
    dry_run: bool,
) -> Result<()> {
    if chunk_size == 0 {
        bail!("--chunk-size must be greater than zero");
    }

    let text = read_document(file).await?;
    let source = source_label(file, source);
    let chunks = chunk_text(&text, chunk_size, overlap);

    println!(
        "Read {} characters from {}, produced {} chunks",
        text.chars().count(),
        file.display(),
        chunks.len()
    );

    if dry_run || chunks.is_empty() {
        return Ok(());
    }

    let client = build_client(config.rag.upstream_timeout)?;
    let manager = IndexManager::new(client.clone(), &config.pinecone);

    let wait = RetryConfig {
        max_attempts: 30,
        initial_delay_ms: 2000,
        max_delay_ms: 10000,
        backoff_multiplier: 1.5,
        jitter: false,
    };
    let description = manager
        .ensure_index(
            &config.pinecone.index_name,
            config.pinecone.default_dimension,
            &config.pinecone.environment,
            &wait,
        )
        .await
        .context("Failed to prepare the vector index")?;

    println!(
        "Using index {} (dimension {})",
        description.name, description.dimension
    );

    let host = config
        .pinecone
        .index_host
        .clone()
        .unwrap_or_else(|| description.host.clone());
    let embedder =
        OpenAiEmbedder::with_client(client.clone(), &config.openai, description.dimension);
    let index = PineconeIndex::new(client, &host, config.pinecone.api_key.clone());

    let ingestor = Ingestor::new(Arc::new(embedder), Arc::new(index)).with_batch_size(batch_size);

    let bar = progress_bar(chunks.len());
    let report = |event: IngestProgress| match event {
        IngestProgress::Embedded { done, .. } => {
            bar.set_message("embedding");
            bar.set_position(done as u64);
        }
        IngestProgress::Upserted { done, .. } => {
            bar.set_message("uploading");
            bar.set_position(done as u64);
        }
    };

    let stats = match ingestor.ingest(&chunks, &source, &report).await {
        Ok(stats) => stats,
        Err(e) => {
            bar.abandon();
            log_operation_error!("ingest", e, file = %file.display());
            return Err(e.into());
        }
    };
    bar.finish_with_message("done");

    info!(vectors = stats.vectors_upserted, source = %source, "Ingestion finished");
    println!(
        "Uploaded {} vectors in {} batches from {}",
        stats.vectors_upserted, stats.batches, source
    );

    Ok(())
}

async fn handle_ask(config: &AppConfig, question: &str, top_k: Option<usize>) -> Result<()> {
    let mut config = config.clone();
    if let Some(top_k) = top_k {
        if top_k == 0 {
            bail!("--top-k must be greater than zero");
        }
        config.rag.top_k = top_k;
    }

    let pipeline = RagPipeline::from_app_config(&config).await?;
    let response = pipeline.query(question).await?;

    println!("{}\n", response.answer);
    if !response.sources.is_empty() {
        println!("Sources:");
        for (i, source) in response.sources.iter().enumerate() {
            let preview: String = source.chars().take(160).collect();
            println!("  [{}] {}", i + 1, preview.replace('\n', " "));
        }
    }

    Ok(())
}

async fn handle_check_config(config: &AppConfig) -> Result<()> {
    println!("Configuration loaded");
    println!("  server:     {}", config.server.address());
    println!("  debug:      {}", config.server.debug);
    println!("  llm model:  {}", config.openai.llm_model);
    println!("  embeddings: {}", config.openai.embedding_model);
    println!("  top_k:      {}", config.rag.top_k);
    println!(
        "  smtp:       {}:{} from {}",
        config.email.host, config.email.port, config.email.default_from_email
    );

    let client = build_client(config.rag.upstream_timeout)?;
    let manager = IndexManager::new(client, &config.pinecone);

    let indexes = manager.list_indexes().await?;
    println!("Indexes in project: {}", indexes.join(", "));

    match manager.describe_index(&config.pinecone.index_name).await? {
        Some(description) => println!(
            "Index {}: dimension {}, host {}, ready {}",
            description.name,
            description.dimension,
            description.host,
            description.is_ready()
        ),
        None => println!(
            "Index {} does not exist yet; `scholarly ingest` will create it",
            config.pinecone.index_name
        ),
    }

    Ok(())
}
