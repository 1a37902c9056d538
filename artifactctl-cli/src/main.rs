//! artifactctl CLI - bulk export of Claude conversation artifacts
//!
//! - `export`: fetch every conversation of an organization and package the
//!   artifacts found in assistant replies into `claude-artifacts-<date>.zip`
//! - `extract`: the same packaging, offline, from a local conversations file
//! - `orgs`: list organizations visible to a session key

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod env;
mod tracing_setup;
mod ui;

#[derive(Parser, Debug)]
#[command(
    name = "artifactctl",
    author,
    version,
    about = "Export artifacts from your Claude conversation history into a zip archive",
    long_about = "Walks your claude.ai conversation history one conversation at a time, pulls out \
                  every artifact the assistant produced, and saves them into a single zip with one \
                  folder per conversation."
)]
struct Cli {
    /// Suppress progress bars (for script consumption)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export artifacts from claude.ai into a zip archive
    Export(commands::export::ExportArgs),
    /// Export artifacts from a local conversations file (no network)
    Extract(commands::export::ExtractArgs),
    /// List organizations visible to the session key
    Orgs(commands::export::OrgsArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing so clap's env fallbacks see .env values
    let dotenv_loads = env::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    env::log_loads(&dotenv_loads);
    ui::init_quiet_mode(cli.quiet);

    match cli.command {
        Commands::Export(args) => commands::run_export(args).await?,
        Commands::Extract(args) => commands::run_extract(args).await?,
        Commands::Orgs(args) => commands::run_orgs(args).await?,
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
