//! Profile management commands
//!
//! Profiles are named references to file-hosting endpoints, including the
//! API key and the API version the endpoint speaks.

use clap::Subcommand;
use fh_core::{ApiVersion, Error, Profile, ProfileManager, TimeoutConfig};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Add or update a profile
    Set(SetArgs),

    /// List all configured profiles
    List(ListArgs),

    /// Remove a profile
    Remove(RemoveArgs),
}

/// Arguments for the `profile set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name (e.g., "default", "staging")
    pub name: String,

    /// Base endpoint URL of the API (e.g., "https://files.example.com/api")
    pub endpoint: String,

    /// API key
    pub api_key: String,

    /// Origin header to send, for services that allow-list origins
    #[arg(long)]
    pub origin: Option<String>,

    /// API version spoken by the endpoint: v1 or v2
    #[arg(long, default_value = "v2", value_parser = parse_api_version)]
    pub api_version: ApiVersion,

    /// Connection timeout in milliseconds
    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    /// Whole-request timeout in milliseconds
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,
}

/// Arguments for the `profile list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show full details
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `profile remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the profile to remove
    pub name: String,
}

fn parse_api_version(s: &str) -> Result<ApiVersion, String> {
    s.parse().map_err(|e: Error| e.to_string())
}

/// JSON output for profile list
#[derive(Serialize)]
struct ProfileListOutput {
    profiles: Vec<ProfileInfo>,
}

/// Profile information for output (without the API key)
#[derive(Serialize)]
struct ProfileInfo {
    name: String,
    endpoint: String,
    api_version: ApiVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<String>,
}

impl From<&Profile> for ProfileInfo {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            endpoint: profile.endpoint.clone(),
            api_version: profile.api_version,
            origin: profile.origin.clone(),
        }
    }
}

/// JSON output for profile set/remove operations
#[derive(Serialize)]
struct ProfileOperationOutput {
    success: bool,
    profile: String,
    message: String,
}

/// Execute a profile subcommand
pub async fn execute(cmd: ProfileCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let manager = match ProfileManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            formatter.error(&format!("Failed to load profiles: {e}"));
            return ExitCode::GeneralError;
        }
    };

    match cmd {
        ProfileCommands::Set(args) => execute_set(args, &manager, &formatter),
        ProfileCommands::List(args) => execute_list(args, &manager, &formatter),
        ProfileCommands::Remove(args) => execute_remove(args, &manager, &formatter),
    }
}

fn execute_set(args: SetArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    if args.name.is_empty() {
        formatter.error("Profile name cannot be empty");
        return ExitCode::UsageError;
    }

    if args.api_key.is_empty() {
        formatter.error("API key cannot be empty");
        return ExitCode::UsageError;
    }

    let profile = build_profile(&args);

    match manager.set(profile) {
        Ok(()) => {
            let message = format!("Profile '{}' configured successfully", args.name);
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name.clone(),
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(e @ Error::InvalidUrl(_)) => {
            formatter.error(&format!("Invalid endpoint '{}': {e}", args.endpoint));
            ExitCode::UsageError
        }
        Err(e) => formatter.fail(&e),
    }
}

fn build_profile(args: &SetArgs) -> Profile {
    let mut profile = Profile::new(&args.name, &args.endpoint, &args.api_key)
        .with_api_version(args.api_version);

    if let Some(origin) = &args.origin {
        profile = profile.with_origin(origin);
    }

    if args.connect_timeout_ms.is_some() || args.request_timeout_ms.is_some() {
        let defaults = TimeoutConfig::default();
        profile.timeout = Some(TimeoutConfig {
            connect_ms: args.connect_timeout_ms.unwrap_or(defaults.connect_ms),
            request_ms: args.request_timeout_ms.unwrap_or(defaults.request_ms),
        });
    }

    profile
}

fn execute_list(args: ListArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    let profiles = match manager.list() {
        Ok(profiles) => profiles,
        Err(e) => return formatter.fail(&e),
    };

    if formatter.is_json() {
        formatter.json(&ProfileListOutput {
            profiles: profiles.iter().map(ProfileInfo::from).collect(),
        });
    } else if profiles.is_empty() {
        formatter.println("No profiles configured.");
    } else if args.long {
        for profile in &profiles {
            formatter.println(&format!(
                "{:<12} {} (api: {}, origin: {})",
                profile.name,
                profile.endpoint,
                profile.api_version,
                profile.origin.as_deref().unwrap_or("-")
            ));
        }
    } else {
        for profile in &profiles {
            formatter.println(&format!("{:<12} {}", profile.name, profile.endpoint));
        }
    }

    ExitCode::Success
}

fn execute_remove(args: RemoveArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    match manager.remove(&args.name) {
        Ok(()) => {
            let message = format!("Profile '{}' removed successfully", args.name);
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name.clone(),
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(Error::ProfileNotFound(_)) => {
            formatter.error(&format!("Profile '{}' not found", args.name));
            ExitCode::NotFound
        }
        Err(e) => formatter.fail(&e),
    }
}
