use clap::Parser;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use winattend::cli::cmd::Commands;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct CommandLine {
    #[clap(subcommand)]
    command: Commands,

    /// Log debug output
    #[clap(long, short, num_args = 0, global = true)]
    verbose: bool,
}

pub fn main() -> ExitCode {
    // Parse command line options before we configure logging so we can set the
    // default level
    let command_line = CommandLine::parse();

    // Configure logging
    let default_filter = if command_line.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    debug!(
        version = winattend::built_info::PKG_VERSION,
        profile = winattend::built_info::PROFILE,
        "Starting winattend"
    );

    // Dispatch command
    match &command_line.command {
        Commands::Render { .. } => winattend::cli::cmd::render::run(command_line.command),
        Commands::Variants { .. } => winattend::cli::cmd::variants::run(command_line.command),
        Commands::Init { .. } => winattend::cli::cmd::init::run(command_line.command),
    }
}
