//! rm command - Remove files
//!
//! Files are named by bare key or by URL. Several files are removed as a
//! batch where each removal succeeds or fails on its own.

use clap::Args;
use fh_core::{DeleteEntry, extract_key};
use serde::Serialize;
use serde_json::Value;

use super::{ClientOptions, connect};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Remove files
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Bucket holding the files
    pub bucket: String,

    /// Keys or URLs of the files to remove
    #[arg(required = true)]
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RmOutput<'a> {
    status: &'static str,
    bucket: &'a str,
    key: &'a str,
    response: &'a Value,
}

#[derive(Debug, Serialize)]
struct BatchRmOutput<'a> {
    status: &'static str,
    bucket: &'a str,
    results: &'a [DeleteEntry],
    succeeded: usize,
    failed: usize,
}

/// Execute the rm command
pub async fn execute(
    args: RmArgs,
    options: &ClientOptions,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let client = match connect(options, &formatter) {
        Ok(client) => client,
        Err(code) => return code,
    };

    if let [key_or_url] = args.keys.as_slice() {
        let key = extract_key(key_or_url);
        return match client.remove(&args.bucket, key_or_url).await {
            Ok(response) => {
                if formatter.is_json() {
                    formatter.json(&RmOutput {
                        status: "success",
                        bucket: &args.bucket,
                        key,
                        response: &response,
                    });
                } else {
                    formatter.success(&format!("Removed: {}/{key}", args.bucket));
                }
                ExitCode::Success
            }
            Err(e) => formatter.fail(&e),
        };
    }

    let spinner = ProgressBar::spinner(
        formatter.config(),
        &format!("Removing {} files from {}", args.keys.len(), args.bucket),
    );
    let results = client.delete_multiple(&args.bucket, &args.keys).await;
    spinner.finish_and_clear();

    report_batch(&formatter, &args.bucket, &results)
}

fn report_batch(formatter: &Formatter, bucket: &str, results: &[DeleteEntry]) -> ExitCode {
    let (succeeded, failed) = tally(results);

    if formatter.is_json() {
        formatter.json(&BatchRmOutput {
            status: if failed == 0 { "success" } else { "partial" },
            bucket,
            results,
            succeeded,
            failed,
        });
    } else {
        for entry in results {
            match &entry.error {
                None => formatter.println(&format!("Removed: {bucket}/{}", entry.key)),
                Some(error) => formatter.error(&format!("{bucket}/{}: {error}", entry.key)),
            }
        }
        formatter.success(&format!("Removed {succeeded} of {} file(s).", results.len()));
    }

    if failed == 0 {
        ExitCode::Success
    } else {
        ExitCode::GeneralError
    }
}

fn tally(results: &[DeleteEntry]) -> (usize, usize) {
    let failed = results.iter().filter(|r| !r.success).count();
    (results.len() - failed, failed)
}
