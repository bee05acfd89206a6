//! rb command - Remove a bucket
//!
//! Only API v2 endpoints can delete buckets.

use clap::Args;
use serde::Serialize;
use serde_json::Value;

use super::{ClientOptions, connect};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Remove a bucket
#[derive(Args, Debug)]
pub struct RbArgs {
    /// Bucket to remove
    pub bucket: String,

    /// Confirm removal of the bucket and everything in it
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct RbOutput<'a> {
    status: &'static str,
    bucket: &'a str,
    response: &'a Value,
}

/// Execute the rb command
pub async fn execute(
    args: RbArgs,
    options: &ClientOptions,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if !args.force {
        formatter.error(&format!(
            "Refusing to remove bucket '{}' without --force",
            args.bucket
        ));
        return ExitCode::UsageError;
    }

    let client = match connect(options, &formatter) {
        Ok(client) => client,
        Err(code) => return code,
    };

    match client.delete_bucket(&args.bucket).await {
        Ok(response) => {
            if formatter.is_json() {
                formatter.json(&RbOutput {
                    status: "success",
                    bucket: &args.bucket,
                    response: &response,
                });
            } else {
                formatter.success(&format!("Removed bucket '{}'", args.bucket));
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail(&e),
    }
}
