//! storyforge CLI
//!
//! Runs the content workflow API server or a single workflow from the
//! command line.
//!
//! Usage:
//!   storyforge serve --port 8000
//!   storyforge create "A lighthouse keeper on Europa"
//!   storyforge create "A lighthouse keeper on Europa" --stream
//!   storyforge agents list
//!   storyforge agents show writer
//!   storyforge config

use std::sync::Arc;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use futures_util::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storyforge_agent::{AgentCapability, Specialist, StudioConfig};
use storyforge_orchestrator::web::{self, AppState};
use storyforge_orchestrator::{
    ArtifactStore, ContentService, LlmCapability, MarkdownStore, ProgressEvent, SpecialistRegistry,
};

#[derive(Parser)]
#[command(name = "storyforge")]
#[command(about = "Research, image and story generation with cooperating AI agents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Ollama server URL
    #[arg(long, env = "OLLAMA_URL", global = true)]
    ollama_url: Option<String>,

    /// Model for every specialist, overriding the configured models
    #[arg(short = 'm', long, global = true)]
    model: Option<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is the configured level.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one content workflow and print the result as JSON
    Create {
        /// What to create content about
        prompt: String,

        /// Print progress events as they happen
        #[arg(long)]
        stream: bool,

        /// Do not save the result as markdown
        #[arg(long)]
        no_save: bool,
    },
    /// Specialist management
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },
    /// Show the resolved configuration
    Config,
}

#[derive(Subcommand)]
enum AgentCommands {
    /// List available specialists
    List,
    /// Show specialist configuration
    Show {
        /// Specialist name (researcher, prompt_generator, artist, writer)
        agent: String,
    },
}

/// Initialize tracing with the given verbosity level
///
/// - 0: configured level (`LOG_LEVEL` or `[logging] level`)
/// - 1: info (-v)
/// - 2: debug (-vv)
/// - 3+: trace (-vvv)
fn init_tracing(verbosity: u8, configured: &str, json: bool) {
    let level = match verbosity {
        0 => configured.to_string(),
        1 => tracing::Level::INFO.to_string(),
        2 => tracing::Level::DEBUG.to_string(),
        _ => tracing::Level::TRACE.to_string(),
    };

    // Allow RUST_LOG to override if set
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing is not up yet, so config discovery is silent
    let mut config = StudioConfig::load()?;
    if let Some(url) = cli.ollama_url.clone() {
        config.llm.url = url;
    }
    if let Some(model) = cli.model.clone() {
        config.llm.model = model;
    }

    init_tracing(cli.verbose, &config.logging.level, cli.log_json);
    config.validate()?;

    let registry = specialist_registry(&config, cli.model.as_deref());

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let capability: Arc<dyn AgentCapability> = Arc::new(LlmCapability::new(&config, registry));
            let state = AppState::from_config(&config, capability);
            web::serve(state, &host, port).await
        }
        Commands::Create {
            prompt,
            stream,
            no_save,
        } => run_create(&config, registry, &prompt, stream, !no_save).await,
        Commands::Agents { command } => run_agents_command(command, &registry),
        Commands::Config => {
            print_config(&config);
            Ok(())
        }
    }
}

/// Specialists from config, all on `model` when one was given on the command line
fn specialist_registry(config: &StudioConfig, model: Option<&str>) -> SpecialistRegistry {
    let mut registry = SpecialistRegistry::from_llm_config(&config.llm);
    if let Some(model) = model {
        registry.set_all_models(model);
    }
    registry
}

async fn run_create(
    config: &StudioConfig,
    registry: SpecialistRegistry,
    prompt: &str,
    stream: bool,
    save_markdown: bool,
) -> Result<()> {
    let capability: Arc<dyn AgentCapability> = Arc::new(LlmCapability::new(config, registry));
    let store: Arc<dyn ArtifactStore> = Arc::new(MarkdownStore::new(config.output.dir.clone()));
    let service = ContentService::new(capability, Some(store));

    if !stream {
        let result = service.create_content(prompt, save_markdown).await;
        println!("{}", serde_json::to_string_pretty(&result)?);
        if !result.is_completed() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let mut events = Box::pin(service.create_content_stream(prompt.to_string(), save_markdown));
    let mut failed = false;
    while let Some(event) = events.next().await {
        match &event {
            ProgressEvent::ToolUpdate { tool, status } => eprintln!("[{:?}] {}", status, tool),
            ProgressEvent::Complete { result } => println!("{}", serde_json::to_string_pretty(result)?),
            ProgressEvent::Error { message } => {
                eprintln!("Workflow failed: {}", message);
                failed = true;
            }
        }
        if event.is_terminal() {
            break;
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn run_agents_command(command: AgentCommands, registry: &SpecialistRegistry) -> Result<()> {
    match command {
        AgentCommands::List => {
            println!("Available Agents:\n");
            for agent in registry.iter() {
                println!("  {} ({}) - {}", agent.specialist, agent.model, agent.display_name);
            }
        }

        AgentCommands::Show { agent } => {
            match Specialist::from_name(&agent).and_then(|s| registry.get(s)) {
                Some(config) => {
                    println!("Agent: {}\n", config.specialist);
                    println!("Display Name: {}", config.display_name);
                    println!("Model: {}", config.model);
                    println!("Temperature: {}", config.temperature);
                    if let Some(max) = config.max_tokens {
                        println!("Max Tokens: {}", max);
                    }
                    println!("Output: {:?}", config.output);
                    println!("\nSystem Prompt:\n{}", config.system_prompt);
                }
                None => {
                    eprintln!("Agent '{}' not found.", agent);
                    eprintln!("Use 'storyforge agents list' to see available agents.");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn print_config(config: &StudioConfig) {
    println!("LLM:");
    println!("  URL: {}", config.llm.url);
    println!("  Model: {}", config.llm.model);
    println!("  Mini model: {}", config.llm.mini_model());
    println!("  Researcher model: {}", config.llm.researcher_model());
    println!("  Temperature: {}", config.llm.temperature);
    match config.llm.max_tokens {
        Some(max) => println!("  Max tokens: {}", max),
        None => println!("  Max tokens: (model default)"),
    }
    println!("  Timeout: {}s", config.llm.timeout_secs);

    println!("\nImages:");
    if config.images.is_enabled() {
        println!("  Backend: {} ({})", config.images.api_url, config.images.model);
        println!(
            "  Size/quality/style: {} / {} / {}",
            config.images.size, config.images.quality, config.images.style
        );
    } else {
        println!("  Backend: disabled (set OPENAI_API_KEY to enable)");
    }

    println!("\nSearch:");
    match config.search.url.as_deref().filter(|_| config.search.is_enabled()) {
        Some(url) => println!("  Backend: searxng ({}, {} results)", url, config.search.max_results),
        None => println!("  Backend: disabled (set SEARXNG_URL to enable)"),
    }

    println!("\nServer: {}:{}", config.server.host, config.server.port);
    println!(
        "Output: {} (save markdown: {})",
        config.output.dir.display(),
        config.output.save_markdown
    );
    println!("Log level: {}", config.logging.level);
}
