mod config;
mod export;
mod progress;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use futures_util::StreamExt;
use llm::ChatClient;
use orchestrator::{workflow_graph, Pipeline, RunRecorder};
use search::TavilyClient;
use studio_core::ProductionResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{StudioConfig, STUDIO_DIR};
use crate::progress::RunProgress;

#[derive(Parser)]
#[command(name = "film-studio")]
#[command(about = "Research, write and review film scripts with an LLM", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a config file (default: .film-studio/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true, global = true)]
    groq_api_key: Option<String>,

    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true, global = true)]
    tavily_api_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce a script for a topic
    Run {
        topic: String,

        /// Override the generation model
        #[arg(long)]
        model: Option<String>,

        /// Skip writing the JSON export
        #[arg(long)]
        no_export: bool,

        /// Directory for the JSON export
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Verify credentials and model selection
    Check,
    /// Print the workflow diagram (Mermaid)
    Graph,
    /// Write a default config file
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir()?;

    match &cli.command {
        Commands::Run {
            topic,
            model,
            no_export,
            output_dir,
        } => {
            let mut config = StudioConfig::load(cli.config.as_deref(), &cwd)?;
            if let Some(model) = model {
                config.llm.model = model.clone();
            }
            if let Some(dir) = output_dir {
                config.output.dir = dir.clone();
            }
            run(&cli, &config, topic, !no_export).await
        }
        Commands::Check => {
            let config = StudioConfig::load(cli.config.as_deref(), &cwd)?;
            check(&cli, &config).await
        }
        Commands::Graph => {
            println!("{}", workflow_graph());
            Ok(())
        }
        Commands::Init { force } => init_config(&cwd, *force).await,
    }
}

fn build_pipeline(cli: &Cli, config: &StudioConfig) -> Result<Pipeline> {
    let groq_key = cli
        .groq_api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| anyhow!("GROQ_API_KEY is not set (use the env var, .env or --groq-api-key)"))?;

    let generator = ChatClient::new(config.chat_client_config(groq_key))
        .context("Failed to create generation client")?;

    let mut builder = Pipeline::builder()
        .generator(Arc::new(generator))
        .policy(config.policy()?);

    match cli.tavily_api_key.as_deref().filter(|key| !key.trim().is_empty()) {
        Some(key) => {
            let retriever = TavilyClient::new(config.tavily_config(key))
                .context("Failed to create search client")?;
            builder = builder.retriever(Arc::new(retriever));
        }
        None => {
            tracing::warn!("TAVILY_API_KEY is not set, research will use the fallback summary");
        }
    }

    Ok(builder.build()?)
}

async fn run(cli: &Cli, config: &StudioConfig, topic: &str, export: bool) -> Result<()> {
    let pipeline = build_pipeline(cli, config)?;
    let mut snapshots = pipeline.run(topic)?;
    let mut recorder = RunRecorder::new(pipeline.model_name());

    println!();
    println!("{} {}", style("Film Studio").bold(), style(topic).cyan());
    println!("════════════════════════════════════════");
    println!("  Model:     {}", pipeline.model_name());
    println!(
        "  Research:  {}",
        if pipeline.has_retriever() { "web search" } else { "fallback only" }
    );
    println!(
        "  Approval:  rating >= {} or {} drafts",
        pipeline.policy().approval_threshold,
        pipeline.policy().max_iterations
    );
    println!();

    let progress = RunProgress::start(topic)?;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            item = snapshots.next() => match item {
                Some(Ok(snapshot)) => {
                    progress.step_done(&snapshot);
                    recorder.observe(&snapshot);
                }
                Some(Err(e)) => {
                    progress.fail("Production failed");
                    report_partial(&recorder);
                    return Err(e).context("Production run failed");
                }
                None => break,
            },
            _ = &mut ctrl_c => {
                progress.fail("Cancelled");
                report_partial(&recorder);
                bail!("Run cancelled");
            }
        }
    }

    let result = recorder.finish()?;
    print_result(&result);

    if export {
        let path = export::write_result(&result, &config.output.dir).await?;
        println!("  Saved to:  {}", path.display());
        println!();
    }

    Ok(())
}

fn report_partial(recorder: &RunRecorder) {
    let completed = recorder.history().len();
    if completed == 0 {
        return;
    }
    eprintln!("Completed {} review iteration(s) before stopping.", completed);
    if let Some(last) = recorder.history().last() {
        eprintln!("Last rating: {}/10", last.rating);
    }
}

fn print_result(result: &ProductionResult) {
    println!();
    println!("{}", style("FINAL SCRIPT").bold());
    println!("────────────────────────────────────────");
    println!("{}", result.script);
    println!("────────────────────────────────────────");
    println!();
    println!("  Rating:     {}/10", result.rating);
    println!("  Drafts:     {}", result.iterations);
    println!("  Approval:   {}", result.approval.as_str());
    println!("  Research:   {}", result.research_source.as_str());
    println!("  Feedback:   {}", result.feedback);
}

async fn check(cli: &Cli, config: &StudioConfig) -> Result<()> {
    let groq_key = cli
        .groq_api_key
        .as_deref()
        .ok_or_else(|| anyhow!("GROQ_API_KEY is not set"))?;
    let client = ChatClient::new(config.chat_client_config(groq_key))?;

    println!("Generation: {} at {}", config.llm.model, config.llm.base_url);
    client
        .ping()
        .await
        .context("Generation service check failed")?;
    println!("  {} reachable, credentials accepted", style("✓").green());

    match cli.tavily_api_key.as_deref() {
        Some(key) => {
            let client = TavilyClient::new(config.tavily_config(key))?;
            println!("Search:     {}", config.search.base_url);
            match client.search_hits("film industry trends").await {
                Ok(hits) => println!("  {} {} result(s)", style("✓").green(), hits.len()),
                Err(e) => println!("  {} {} (research will use the fallback)", style("!").yellow(), e),
            }
        }
        None => println!("Search:     not configured, research will use the fallback"),
    }

    Ok(())
}

async fn init_config(cwd: &Path, force: bool) -> Result<()> {
    let path = StudioConfig::project_path(cwd);
    if path.exists() && !force {
        println!("Config already exists at {}", path.display());
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    tokio::fs::create_dir_all(cwd.join(STUDIO_DIR)).await?;
    tokio::fs::write(&path, StudioConfig::default().to_toml()?).await?;

    println!("Wrote default config to {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set GROQ_API_KEY (and optionally TAVILY_API_KEY) in your environment or .env");
    println!("  2. Run 'film-studio run \"<topic>\"'");

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
