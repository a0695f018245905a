use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cursor_rules::cli::{Cli, Commands, ConfigAction, Display};
use cursor_rules::config::RulesConfig;
use cursor_rules::error::Result;
use cursor_rules::output::OutputWriter;
use cursor_rules::rules::{LoadOutcome, MatchRequest, RuleLoader, lookup, resolve};

/// Shared state for command handlers.
struct CommandContext {
    display: Display,
    writer: OutputWriter,
    root: PathBuf,
    rules_dir: PathBuf,
    config: RulesConfig,
}

impl CommandContext {
    async fn load_rules(&self) -> Result<LoadOutcome> {
        let outcome = RuleLoader::new(&self.rules_dir)
            .with_config(self.config.loader.clone())
            .load()
            .await?;
        self.display.print_load_errors(&outcome.errors);
        Ok(outcome)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            Display::new().print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("cursor_rules=debug")
    } else {
        EnvFilter::new("cursor_rules=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let root = tokio::fs::canonicalize(&cli.root).await?;
    let config = RulesConfig::load(&root).await?;
    let rules_dir = match &cli.rules_dir {
        Some(dir) => root.join(dir),
        None => config.rules_dir(&root),
    };

    let ctx = CommandContext {
        display: Display::new(),
        writer: OutputWriter::new(cli.output),
        root,
        rules_dir,
        config,
    };

    match cli.command {
        Commands::Resolve { files, names } => cmd_resolve(&ctx, &files, names).await,
        Commands::List => cmd_list(&ctx).await,
        Commands::Show { name } => cmd_show(&ctx, &name).await,
        Commands::Check => cmd_check(&ctx).await,
        Commands::Config { action } => cmd_config(&ctx, action),
    }
}

fn exit_code(outcome: &LoadOutcome) -> ExitCode {
    if outcome.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn cmd_resolve(ctx: &CommandContext, files: &[PathBuf], names: bool) -> Result<ExitCode> {
    let outcome = ctx.load_rules().await?;
    let request = MatchRequest::relative_to(&ctx.root, files);
    let result = resolve(&outcome.rule_set, &request);

    ctx.writer.emit_resolution(
        &result,
        &outcome.errors,
        names,
        ctx.config.resolver.max_rule_content_chars,
    )?;
    Ok(exit_code(&outcome))
}

async fn cmd_list(ctx: &CommandContext) -> Result<ExitCode> {
    let outcome = ctx.load_rules().await?;
    ctx.writer.emit_rule_set(&outcome.rule_set, &outcome.errors)?;
    Ok(exit_code(&outcome))
}

async fn cmd_show(ctx: &CommandContext, name: &str) -> Result<ExitCode> {
    let outcome = ctx.load_rules().await?;
    let rule = lookup(&outcome.rule_set, name)?;
    ctx.writer.emit_rule(rule)?;
    Ok(exit_code(&outcome))
}

async fn cmd_check(ctx: &CommandContext) -> Result<ExitCode> {
    let outcome = ctx.load_rules().await?;
    ctx.writer.emit_check(&outcome.rule_set, &outcome.errors)?;
    Ok(exit_code(&outcome))
}

fn cmd_config(ctx: &CommandContext, action: ConfigAction) -> Result<ExitCode> {
    match action {
        ConfigAction::Show => {
            ctx.writer.emit_message(ctx.config.to_toml()?.trim_end())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
