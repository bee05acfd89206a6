//! CLI command definitions and execution
//!
//! This module contains all CLI commands and their implementations.

use clap::{Parser, Subcommand};
use fh_core::{ConfigManager, Defaults, FileHostClient};
use fh_http::HttpTransport;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod completions;
mod ls;
mod profile;
mod rb;
mod replace;
mod rm;
pub mod upload;

/// fh - file-hosting CLI client
///
/// Upload, list, replace and delete files in buckets of a remote
/// file-hosting service.
#[derive(Parser, Debug)]
#[command(name = "fh")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinner
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// Profile to use
    #[arg(short, long, global = true, env = "FH_PROFILE", default_value = "default")]
    pub profile: String,

    /// Items in flight at once for batch operations (overrides the config default)
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage endpoint profiles
    #[command(subcommand)]
    Profile(profile::ProfileCommands),

    /// Upload one or more files to a bucket
    Upload(upload::UploadArgs),

    /// Upload a file, removing the file it replaces
    Replace(replace::ReplaceArgs),

    /// List the files of a bucket
    Ls(ls::LsArgs),

    /// Remove files by key or URL
    Rm(rm::RmArgs),

    /// Remove a bucket (API v2)
    Rb(rb::RbArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Which profile to connect with
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub profile: String,
    pub concurrency: Option<usize>,
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let defaults = match ConfigManager::new().and_then(|manager| manager.load()) {
        Ok(config) => config.defaults,
        Err(e) => {
            tracing::debug!(error = %e, "Using built-in output defaults");
            Defaults::default()
        }
    };
    let output_config = output_config(&cli, &defaults);
    let client_options = ClientOptions {
        profile: cli.profile,
        concurrency: cli.concurrency,
    };

    match cli.command {
        Commands::Profile(cmd) => profile::execute(cmd, output_config).await,
        Commands::Upload(args) => upload::execute(args, &client_options, output_config).await,
        Commands::Replace(args) => replace::execute(args, &client_options, output_config).await,
        Commands::Ls(args) => ls::execute(args, &client_options, output_config).await,
        Commands::Rm(args) => rm::execute(args, &client_options, output_config).await,
        Commands::Rb(args) => rb::execute(args, &client_options, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Combine output flags with the configured defaults; flags only ever enable
fn output_config(cli: &Cli, defaults: &Defaults) -> OutputConfig {
    OutputConfig {
        json: cli.json || defaults.output.eq_ignore_ascii_case("json"),
        no_color: cli.no_color || defaults.color.eq_ignore_ascii_case("never"),
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    }
}

/// Build a client for the selected profile, reporting failures
pub(crate) fn connect(
    options: &ClientOptions,
    formatter: &Formatter,
) -> Result<FileHostClient<HttpTransport>, ExitCode> {
    let config = match ConfigManager::new().and_then(|manager| manager.load()) {
        Ok(config) => config,
        Err(e) => {
            formatter.error(&format!("Failed to load configuration: {e}"));
            return Err(ExitCode::from_error(&e));
        }
    };

    let Some(profile) = config.profiles.iter().find(|p| p.name == options.profile) else {
        formatter.error(&format!(
            "Profile '{}' not found. Add it with `fh profile set`",
            options.profile
        ));
        return Err(ExitCode::NotFound);
    };

    let concurrency = options.concurrency.unwrap_or(config.defaults.concurrency);
    tracing::debug!(
        profile = %profile.name,
        api_version = %profile.api_version,
        concurrency,
        "Connecting"
    );

    fh_http::connect(profile, concurrency).map_err(|e| {
        formatter.error(&format!("Failed to create client: {e}"));
        ExitCode::from_error(&e)
    })
}
