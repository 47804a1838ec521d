use std::env;

use clap::Parser;
use colored::Colorize;
use forgeops_cli::cli::Cli;
use forgeops_cli::commands::{self, CommandContext};
use forgeops_cli::config::{process_env, FileConfig, Settings};
use forgeops_cli::errors::{Error, EXIT_OK};
use forgeops_cli::logging;
use forgeops_cli::prompt::StdinPrompter;
use forgeops_core::{check_token, Prompter};
use github_client::create_token_executor;
use tracing::{error, info};

async fn run(cli: Cli) -> Result<(), Error> {
    let cwd = env::current_dir()
        .map_err(|e| Error::Config(format!("Cannot read the working directory: {e}")))?;
    let overrides = cli.overrides();
    let file = FileConfig::discover(overrides.config.as_deref(), &cwd)?;
    let settings = Settings::resolve(&overrides, &process_env, &file);
    logging::init(&settings.log);

    commands::validate(&cli.command)?;

    let executor = match settings.token.clone() {
        Some(token) => Some(create_token_executor(
            token,
            &settings.api_url,
            settings.user_agent.as_deref(),
        )?),
        None => None,
    };

    if let (Some(operation), Some(executor)) = (cli.command.operation(), executor.as_ref()) {
        if cli.global.skip_token_check {
            info!(event = "token_check_skipped", operation = %operation, "Skipping token check");
        } else {
            check_token(executor, operation).await?;
        }
    }

    let prompter = StdinPrompter::when_interactive();
    let ctx = CommandContext {
        env: &process_env,
        prompter: prompter.as_ref().map(|p| p as &dyn Prompter),
        page_size: settings.page_size,
        social: &settings.social,
    };
    commands::execute(&cli.command, executor.as_ref(), &ctx).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(EXIT_OK),
        Err(e) => {
            error!(
                event = "command_failed",
                error_type = e.kind(),
                error_message = %e,
                "Command failed"
            );
            eprintln!("{} {e}", "Error:".red().bold());
            std::process::exit(e.exit_code());
        }
    }
}
