use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use sandbox_agent::agent::{Agent, AgentConfig, AgentOutcome, DEFAULT_SYSTEM_PROMPT};
use sandbox_agent::cli::Console;
use sandbox_agent::config::Settings;
use sandbox_agent::llm::GeminiProvider;
use sandbox_agent::logging;
use sandbox_agent::sandbox::SandboxRoot;
use sandbox_agent::tools::Dispatcher;

/// Coding agent confined to a single working directory
#[derive(Parser, Debug)]
#[command(name = "sandbox-agent", version, about)]
struct Cli {
    /// What the agent should do
    prompt: Option<String>,

    /// Print tool arguments, tool responses and token usage
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let console = Console::new();

    let Some(prompt) = cli.prompt else {
        println!("Prompt value not found!");
        return ExitCode::FAILURE;
    };

    match run(&prompt, cli.verbose).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Fatal: {:#}", e);
            console.print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(prompt: &str, verbose: bool) -> anyhow::Result<ExitCode> {
    let settings = Settings::from_env()?;

    let _guard = logging::init_logging(&settings.log_dir)?;
    tracing::info!("=== Sandbox Agent Starting ===");

    let root = SandboxRoot::new(&settings.sandbox_dir).with_context(|| {
        format!("Invalid working directory {}", settings.sandbox_dir.display())
    })?;
    tracing::info!("Working directory: {}", root.path().display());

    let llm = GeminiProvider::new(settings.api_key.clone()).with_model(settings.model.clone());

    let config = AgentConfig::new(DEFAULT_SYSTEM_PROMPT)
        .with_max_steps(settings.max_steps)
        .with_verbose(verbose);

    let mut agent = Agent::new(config, Arc::new(llm), Dispatcher::new(root), Console::new());

    let result = agent.run(prompt).await;

    // Shown whenever the model answered at least once, even if the run then failed
    if verbose && (result.is_ok() || agent.state().last_usage().is_some()) {
        agent
            .console()
            .print_summary(prompt, agent.state().last_usage());
    }

    let code = match result? {
        AgentOutcome::Completed { text } => {
            agent.console().print_final(&text);
            ExitCode::SUCCESS
        }
        AgentOutcome::StepBudgetExhausted { steps } => {
            agent.console().print_notice(&format!(
                "Stopped after {} model requests without a final response",
                steps
            ));
            ExitCode::SUCCESS
        }
    };

    tracing::info!("=== Sandbox Agent Shutting Down ===");
    Ok(code)
}
