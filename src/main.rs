use anyhow::Context;
use chrono::{Days, Local};
use std::path::Path;
use std::sync::Arc;
use switchboard::agents::{build_registry, ToolDependencies};
use switchboard::cli::output::Output;
use switchboard::cli::{Cli, Commands};
use switchboard::db::{CompanyStore, EventStore};
use switchboard::rag::{DocumentIndex, KnowledgeBase};
use switchboard::services::{DuckDuckGoSearch, OpenAIImageClient, WeatherApiClient};
use switchboard::utils::toml_config::{
    ConfigError, LogFormat, RoutingMode, SwitchboardConfig, DEFAULT_CONFIG_FILE,
};
use switchboard::{
    AgentLoop, ChatSession, LLMClient, LlmRoutingPolicy, RoutingPolicy, RuleBasedRoutingPolicy,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let config = load_config(&cli.config)?;
    init_logging(&config, cli.verbose);

    match cli.command() {
        Commands::Chat => {
            let agent = build_agent(&config, &output).await?;
            run_chat(Arc::new(agent), &output).await
        }
        Commands::Ask { message } => {
            let agent = build_agent(&config, &output).await?;
            let mut session = ChatSession::new(Arc::new(agent));
            let reply = session.send(&message.join(" ")).await;
            println!("{}", reply);
            Ok(())
        }
        Commands::Seed { company, events } => {
            let both = !company && !events;
            seed_stores(&config, *company || both, *events || both, &output).await
        }
        Commands::Config { validate } => show_config(&config, *validate, &output),
    }
}

/// Read the configuration file, falling back to defaults when the default
/// file does not exist. An explicitly named file must exist.
fn load_config(path: &Path) -> anyhow::Result<SwitchboardConfig> {
    match SwitchboardConfig::from_file(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) if path == Path::new(DEFAULT_CONFIG_FILE) => {
            Ok(SwitchboardConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("loading {}", path.display())),
    }
}

fn init_logging(config: &SwitchboardConfig, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("{},hyper_util=off", level)));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

async fn build_agent(config: &SwitchboardConfig, output: &Output) -> anyhow::Result<AgentLoop> {
    config.validate()?;

    let provider = config.provider();
    let llm: Arc<dyn LLMClient> = Arc::from(
        provider
            .create_client()
            .await
            .with_context(|| format!("creating {} client", provider.name()))?,
    );
    tracing::info!(provider = provider.name(), model = llm.model_name(), "LLM client ready");

    let mut deps = ToolDependencies::new(
        llm.clone(),
        Arc::new(WeatherApiClient::new(
            &config.weather.base_url,
            config.weather_api_key()?,
        )),
        Arc::new(OpenAIImageClient::new(
            &config.images.base_url,
            config.image_api_key(),
            &config.images.model,
            &config.images.size,
        )),
        Arc::new(DuckDuckGoSearch::new(config.search.num_results)),
        Arc::new(CompanyStore::new(&config.database.company_path)),
        Arc::new(EventStore::new(&config.database.events_path)),
    );
    deps.document_top_k = config.documents.top_k;
    deps.history_window = config.agent.history_window;

    if !config.documents.paths.is_empty() {
        let knowledge_base = KnowledgeBase::from_files(
            &config.documents.paths,
            config.documents.chunk_size,
            config.documents.chunk_overlap,
        );
        tracing::info!(chunks = knowledge_base.chunk_count(), "Document index built");
        if knowledge_base.chunk_count() == 0 {
            output.warning("No text could be indexed from the configured documents");
        }
        let index: Arc<dyn DocumentIndex> = Arc::new(knowledge_base);
        deps = deps.with_documents(index);
    }

    let policy: Arc<dyn RoutingPolicy> = match config.agent.routing {
        RoutingMode::Llm => Arc::new(LlmRoutingPolicy::new(llm, config.agent.history_window)),
        RoutingMode::Rules => Arc::new(RuleBasedRoutingPolicy::new()),
    };

    let registry = build_registry(&deps)?;
    Ok(AgentLoop::new(registry, policy).with_turn_budget(config.agent.turn_budget))
}

async fn run_chat(agent: Arc<AgentLoop>, output: &Output) -> anyhow::Result<()> {
    let mut session = ChatSession::new(agent);
    output.banner();
    output.list_item("/reset  start a new session");
    output.list_item("/quit   leave the chat");
    output.newline();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        output.prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                session.reset();
                output.success("Started a new session");
            }
            message => {
                let reply = session.send(message).await;
                output.reply(&reply);
            }
        }
    }

    output.info("Goodbye");
    Ok(())
}

async fn seed_stores(
    config: &SwitchboardConfig,
    company: bool,
    events: bool,
    output: &Output,
) -> anyhow::Result<()> {
    output.header("Seeding stores");

    if company {
        let path = &config.database.company_path;
        CompanyStore::new(path)
            .seed()
            .await
            .with_context(|| format!("seeding {}", path.display()))?;
        output.success("Company store ready");
        output.kv("path", &path.display().to_string());
    }

    if events {
        let path = &config.database.events_path;
        let today = Local::now().date_naive();
        EventStore::new(path)
            .seed(today)
            .await
            .with_context(|| format!("seeding {}", path.display()))?;
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
        output.success("Event store ready");
        output.kv("path", &path.display().to_string());
        output.kv("dates", &format!("{} and {}", today, tomorrow));
    }

    Ok(())
}

fn show_config(config: &SwitchboardConfig, validate: bool, output: &Output) -> anyhow::Result<()> {
    output.header("Configuration");
    println!("{}", config.to_toml_string()?);

    if validate {
        match config.validate() {
            Ok(()) => output.success("Configuration is valid"),
            Err(e) => {
                output.error(&e.to_string());
                anyhow::bail!("invalid configuration");
            }
        }
    } else {
        output.hint("Run `switchboard config --validate` to check API keys as well.");
    }

    Ok(())
}
