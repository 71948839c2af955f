use crate::{
    checks::{
        agent_check, llm_check, vector_check, DEFAULT_AGENT_INSTRUCTION, DEFAULT_LLM_PROMPT,
        DEFAULT_VECTOR_QUERY,
    },
    config::{Provider, ProviderConfig},
    env::{load_local_environment, EnvStore, LoadReport, ProcessEnv, LOCAL_ENV_PATH},
    vector::DEFAULT_K,
    AgentStrategy,
};
use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn command() -> Command {
    Command::new("sprout-smoke")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Check that secrets load and that the LLM, agent and vector store work end to end")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("provider")
                .short('p')
                .long("provider")
                .global(true)
                .value_name("NAME")
                .help("gemini, openai or openrouter (or set SPROUT_PROVIDER)"),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .global(true)
                .value_name("MODEL")
                .help("Chat model (or set SPROUT_CHAT_MODEL)"),
        )
        .arg(
            Arg::new("embedding-model")
                .long("embedding-model")
                .global(true)
                .value_name("MODEL")
                .help("Embedding model (or set SPROUT_EMBEDDING_MODEL)"),
        )
        .arg(
            Arg::new("temperature")
                .long("temperature")
                .global(true)
                .value_name("T")
                .value_parser(value_parser!(f32))
                .help("Sampling temperature (or set SPROUT_TEMPERATURE)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .global(true)
                .value_name("URL")
                .help("OpenAI-compatible base URL (or set SPROUT_BASE_URL)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .global(true)
                .value_name("SECONDS")
                .value_parser(value_parser!(u64).range(1..))
                .help("Request timeout in seconds (or set SPROUT_TIMEOUT_SECS)"),
        )
        .subcommand(Command::new("env").about("Show what the local secrets file provided"))
        .subcommand(
            Command::new("llm").about("Call the chat model once").arg(
                Arg::new("prompt")
                    .long("prompt")
                    .value_name("TEXT")
                    .default_value(DEFAULT_LLM_PROMPT),
            ),
        )
        .subcommand(
            Command::new("agent")
                .about("Run a tool-using agent")
                .arg(
                    Arg::new("instruction")
                        .long("instruction")
                        .value_name("TEXT")
                        .default_value(DEFAULT_AGENT_INSTRUCTION),
                )
                .arg(
                    Arg::new("strategy")
                        .short('s')
                        .long("strategy")
                        .value_name("STRATEGY")
                        .help("tools (native function calling) or react")
                        .default_value("tools"),
                )
                .arg(
                    Arg::new("max-iterations")
                        .short('i')
                        .long("max-iterations")
                        .value_name("COUNT")
                        .value_parser(value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    Arg::new("trace")
                        .long("trace")
                        .action(ArgAction::SetTrue)
                        .help("Print every step of the run"),
                ),
        )
        .subcommand(
            Command::new("vector")
                .about("Build an in-memory vector store and query it")
                .arg(
                    Arg::new("query")
                        .long("query")
                        .value_name("TEXT")
                        .default_value(DEFAULT_VECTOR_QUERY),
                )
                .arg(
                    Arg::new("k")
                        .short('k')
                        .value_name("COUNT")
                        .value_parser(value_parser!(usize))
                        .help("Number of matches to return [default: 4]"),
                ),
        )
        .subcommand(Command::new("all").about("Run the llm, agent and vector checks in turn"))
}

/// CLI entry point for the sprout-smoke tool
pub async fn run() -> anyhow::Result<()> {
    // Secrets first, so RUST_LOG and API keys from the file are visible below.
    let report = load_local_environment(&mut ProcessEnv);
    init_tracing();
    log_report(&report);

    let matches = command().get_matches();

    match matches.subcommand() {
        Some(("env", _)) => {
            print_env_summary(&report, &ProcessEnv);
            Ok(())
        }
        Some(("llm", sub)) => {
            let config = build_config(&matches)?;
            let prompt = required(sub, "prompt")?;
            run_llm(&config, prompt).await
        }
        Some(("agent", sub)) => {
            let config = build_config(&matches)?;
            let instruction = required(sub, "instruction")?;
            let strategy: AgentStrategy = required(sub, "strategy")?.parse()?;
            let max_iterations = sub.get_one::<usize>("max-iterations").copied().unwrap_or(10);
            run_agent(
                &config,
                instruction,
                strategy,
                max_iterations,
                sub.get_flag("trace"),
            )
            .await
        }
        Some(("vector", sub)) => {
            let config = build_config(&matches)?;
            let query = required(sub, "query")?;
            let k = sub.get_one::<usize>("k").copied().unwrap_or(DEFAULT_K);
            run_vector(&config, query, k).await
        }
        Some(("all", _)) => {
            let config = build_config(&matches)?;
            run_llm(&config, DEFAULT_LLM_PROMPT).await?;
            run_agent(
                &config,
                DEFAULT_AGENT_INSTRUCTION,
                AgentStrategy::default(),
                10,
                false,
            )
            .await?;
            run_vector(&config, DEFAULT_VECTOR_QUERY, DEFAULT_K).await
        }
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn log_report(report: &LoadReport) {
    if report.found {
        info!(
            applied = report.applied.len(),
            preserved = report.preserved.len(),
            skipped = report.skipped_lines,
            "Read {}",
            LOCAL_ENV_PATH
        );
    } else {
        info!("{} not found; using the existing environment", LOCAL_ENV_PATH);
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing --{}", name))
}

/// Environment config with command-line overrides on top
fn build_config(matches: &ArgMatches) -> anyhow::Result<ProviderConfig> {
    let mut config = match matches.get_one::<String>("provider") {
        Some(name) => {
            let provider: Provider = name.parse()?;
            ProviderConfig::from_env_for(provider, &ProcessEnv)?
        }
        None => ProviderConfig::from_env(&ProcessEnv)?,
    };

    if let Some(model) = matches.get_one::<String>("model") {
        config = config.with_chat_model(model.as_str());
    }
    if let Some(model) = matches.get_one::<String>("embedding-model") {
        config = config.with_embedding_model(model.as_str());
    }
    if let Some(temperature) = matches.get_one::<f32>("temperature") {
        config = config.with_temperature(*temperature);
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(base_url.as_str());
    }
    if let Some(secs) = matches.get_one::<u64>("timeout") {
        config = config.with_timeout(Duration::from_secs(*secs));
    }

    info!(
        provider = %config.provider,
        chat_model = %config.chat_model,
        embedding_model = %config.embedding_model,
        base_url = %config.base_url,
        "Using provider"
    );
    Ok(config)
}

async fn run_llm(config: &ProviderConfig, prompt: &str) -> anyhow::Result<()> {
    println!("\n📝 Prompt: {}", prompt);
    match llm_check(config, prompt).await {
        Ok(reply) => {
            println!("✅ Response:\n{}", reply);
            Ok(())
        }
        Err(e) => {
            error!("LLM check failed: {}", e);
            Err(e).context("LLM check failed")
        }
    }
}

async fn run_agent(
    config: &ProviderConfig,
    instruction: &str,
    strategy: AgentStrategy,
    max_iterations: usize,
    trace: bool,
) -> anyhow::Result<()> {
    println!("\n🤖 Instruction: {}", instruction);
    match agent_check(config, instruction, strategy, max_iterations).await {
        Ok(result) => {
            if trace {
                println!("{}", result.replay());
            }
            println!("✅ Agent answer:\n{}", result.output);
            Ok(())
        }
        Err(e) => {
            error!("Agent check failed: {}", e);
            Err(e).context("Agent check failed")
        }
    }
}

async fn run_vector(config: &ProviderConfig, query: &str, k: usize) -> anyhow::Result<()> {
    println!("\n🔎 Query: {}", query);
    match vector_check(config, query, k).await {
        Ok(documents) => {
            for (rank, document) in documents.iter().enumerate() {
                println!("{}. {}", rank + 1, document.page_content);
            }
            Ok(())
        }
        Err(e) => {
            error!("Vector check failed: {}", e);
            Err(e).context("Vector check failed")
        }
    }
}

fn print_env_summary<S: EnvStore + ?Sized>(report: &LoadReport, env: &S) {
    println!("Secrets file: {}", LOCAL_ENV_PATH);
    if !report.found {
        println!("  not present (nothing loaded)");
    } else {
        println!("  applied:   {}", join_or_dash(&report.applied));
        println!("  preserved: {}", join_or_dash(&report.preserved));
        println!("  skipped lines: {}", report.skipped_lines);
    }

    println!("\nProvider keys:");
    for provider in [Provider::Gemini, Provider::OpenAI, Provider::OpenRouter] {
        for var in provider.api_key_vars() {
            let status = match env.get(var) {
                Some(value) if !value.is_empty() => mask(&value),
                _ => "(not set)".to_string(),
            };
            println!("  {:<10} {:<20} {}", provider.as_str(), var, status);
        }
    }
}

fn join_or_dash(keys: &[String]) -> String {
    if keys.is_empty() {
        "-".to_string()
    } else {
        keys.join(", ")
    }
}

/// Length and a fixed mask; never any characters of the secret
fn mask(value: &str) -> String {
    format!("set ({} chars) {}", value.chars().count(), "*".repeat(8))
}
