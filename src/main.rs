#![forbid(unsafe_code)]

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use undoctrinator::services::{
    render_report_text, AnalysisWorkflow, ConsoleRenderer, HtmlContentExtractor, ModelController,
    PageContentChannel,
};
use undoctrinator::{AppConfig, ConfigService, SettingsUpdate};
use undoctrinator_llm::ModelKind;

#[derive(Parser)]
#[command(
    name = "undoctrinator",
    version,
    about = "Detect ideological bias, emotional manipulation and logical fallacies in text"
)]
struct Cli {
    /// Config file (defaults to ~/.undoctrinator/config.json)
    #[arg(long, global = true, env = "UNDOCTRINATOR_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a file, or stdin when PATH is omitted or `-`
    Analyze {
        path: Option<PathBuf>,
        /// Treat the input as HTML markup
        #[arg(long)]
        html: bool,
        /// Backend for this run (LOCAL_QWEN, OPENAI, ANTHROPIC, ...)
        #[arg(long)]
        model: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        openai_key: Option<String>,
        #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
        anthropic_key: Option<String>,
    },
    /// Show or edit stored settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the configuration with keys masked
    Show,
    /// Store the default backend
    SetModel { model: String },
    /// Store an API key
    SetKey { provider: Provider, key: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum Provider {
    Openai,
    Anthropic,
}

fn open_config(path: Option<PathBuf>) -> anyhow::Result<ConfigService> {
    let service = match path {
        Some(path) => ConfigService::open(path)?,
        None => ConfigService::new()?,
    };
    Ok(service)
}

fn read_input(path: Option<PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn parse_model(model: &str) -> anyhow::Result<ModelKind> {
    model.parse::<ModelKind>().map_err(|e| anyhow!("{}", e))
}

async fn analyze(
    config: AppConfig,
    input: String,
    html: bool,
    json: bool,
) -> anyhow::Result<()> {
    if config.model_kind().is_none() {
        warn!(model = %config.model_to_use, "Unrecognized model in configuration");
    }

    let renderer = Arc::new(ConsoleRenderer::new());
    let controller = Arc::new(ModelController::new());
    let workflow = Arc::new(AnalysisWorkflow::new(controller, renderer));

    workflow.initialize(&config).await?;

    let interrupt = {
        let workflow = workflow.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling analysis");
                if let Err(e) = workflow.cancel().await {
                    warn!(error = %e, "Cancel failed");
                }
            }
        })
    };

    let result = if html {
        let page = PageContentChannel::serve(input);
        workflow.analyze_page(&page, &HtmlContentExtractor).await
    } else {
        workflow.analyze_text(&input).await
    };
    interrupt.abort();

    let Some(report) = result? else {
        info!("Analysis cancelled, no report produced");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report_text(&report));
    }
    workflow.close_report().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut service = open_config(cli.config)?;

    match cli.command {
        Commands::Analyze {
            path,
            html,
            model,
            json,
            openai_key,
            anthropic_key,
        } => {
            let mut config = service.get_config().clone();
            if let Some(model) = model {
                config.model_to_use = parse_model(&model)?.as_str().to_string();
            }
            if let Some(key) = openai_key.filter(|k| !k.is_empty()) {
                config.open_ai_api_key = key;
            }
            if let Some(key) = anthropic_key.filter(|k| !k.is_empty()) {
                config.anthropic_api_key = key;
            }

            let input = read_input(path)?;
            analyze(config, input, html, json).await?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let shown = service.get_config().redacted();
                println!("{}", serde_json::to_string_pretty(&shown)?);
                println!("# {}", service.path().display());
            }
            ConfigCommands::SetModel { model } => {
                let kind = parse_model(&model)?;
                service.update_config(SettingsUpdate {
                    model_to_use: Some(kind.as_str().to_string()),
                    ..Default::default()
                })?;
                info!(model = %kind, "Default model updated");
            }
            ConfigCommands::SetKey { provider, key } => {
                let update = match provider {
                    Provider::Openai => SettingsUpdate {
                        open_ai_api_key: Some(key),
                        ..Default::default()
                    },
                    Provider::Anthropic => SettingsUpdate {
                        anthropic_api_key: Some(key),
                        ..Default::default()
                    },
                };
                service.update_config(update)?;
                info!("API key stored");
            }
        },
    }

    Ok(())
}
