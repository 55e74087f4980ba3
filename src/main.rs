use kidtutor::cli::output::Output;
use kidtutor::cli::{Cli, Commands};
use kidtutor::{AppState, TutorConfig};
use std::process::exit;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    let output = Output::from_flag(cli.no_color);

    if let Err(e) = run(cli, &output).await {
        output.error(&format!("{:#}", e));
        exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> anyhow::Result<()> {
    // Load .env for API keys
    dotenvy::dotenv().ok();

    let (mut config, found) = TutorConfig::read_or_default(&cli.config)?;

    match cli.command() {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            init_tracing(&config.server.log_level, cli.verbose, cli.json_logs);
            if !found {
                warn!(path = %cli.config.display(), "Config file not found, using defaults");
            }
            serve(config, output).await
        }
        Commands::Ask { question, session } => {
            init_tracing("warn", cli.verbose, cli.json_logs);
            ask(config, &question, session.as_deref(), output).await
        }
        Commands::Config { validate } => show_config(&config, &cli, found, validate, output),
    }
}

fn init_tracing(level: &str, verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { level };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("kidtutor={level},kidtutor_server={level},tower_http={level}").into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn serve(config: TutorConfig, output: &Output) -> anyhow::Result<()> {
    config.validate()?;

    let provider = config.provider()?;
    let model = provider.create_client()?;
    info!(
        provider = provider.name(),
        model = provider.model(),
        "Language model configured"
    );

    let addr = config.bind_address();
    let session_ttl = config.session_ttl();
    let reap_interval = config.reap_interval();

    let state = AppState::new(config, model)?;
    if let Some(ttl) = session_ttl {
        state.engine.sessions().spawn_reaper(ttl, reap_interval);
        info!(idle_ttl_secs = ttl.as_secs(), "Idle session eviction enabled");
    }

    let app = state.router();
    let listener = TcpListener::bind(&addr).await?;

    output.banner();
    output.info(&format!("Listening on http://{}", addr));
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to install Ctrl+C handler");
        return;
    }
    info!("Ctrl+C received, shutting down");
}

async fn ask(
    config: TutorConfig,
    question: &str,
    session: Option<&str>,
    output: &Output,
) -> anyhow::Result<()> {
    config.validate()?;
    let model = config.provider()?.create_client()?;
    let state = AppState::new(config, model)?;

    let answer = state.engine.ask(session, question).await?;
    output.answer(&answer);
    Ok(())
}

fn show_config(
    config: &TutorConfig,
    cli: &Cli,
    found: bool,
    validate: bool,
    output: &Output,
) -> anyhow::Result<()> {
    output.header("Configuration");
    if !found {
        output.warning(&format!(
            "{} not found, showing built-in defaults",
            cli.config.display()
        ));
    }
    output.kv("File", &cli.config.display().to_string());
    output.kv("Listen", &config.bind_address());
    output.kv("Provider", &format!("{:?}", config.llm.provider).to_lowercase());
    output.kv("Model", &config.llm.model);
    output.kv("Temperature", &config.llm.temperature.to_string());
    output.kv(
        "API key",
        &format!(
            "{} ({})",
            config.llm.api_key_env,
            if config.api_key().is_ok() { "set" } else { "not set" }
        ),
    );
    output.kv(
        "Timeout",
        &format!("{}s, {} retries", config.llm.request_timeout_secs, config.llm.max_retries),
    );
    output.kv(
        "Session TTL",
        &config
            .sessions
            .idle_ttl_secs
            .map(|secs| format!("{}s", secs))
            .unwrap_or_else(|| "disabled".to_string()),
    );
    output.kv(
        "Prompt",
        if config.prompt.template.is_some() {
            "custom"
        } else {
            "built-in"
        },
    );

    if validate {
        output.newline();
        config.validate()?;
        output.success("Configuration is valid");
    } else {
        output.hint("Run with --validate to check the API key and values");
    }
    Ok(())
}
