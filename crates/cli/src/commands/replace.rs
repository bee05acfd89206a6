//! replace command - Swap a stored file for a new upload
//!
//! Removes the previous file if one is named, then uploads. A failed
//! removal is reported as a warning and does not stop the upload.

use std::path::PathBuf;

use clap::Args;
use fh_core::ReplaceOutcome;
use serde::Serialize;

use super::upload::load_upload_file;
use super::{ClientOptions, connect};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Replace a file
#[derive(Args, Debug)]
pub struct ReplaceArgs {
    /// Target bucket
    pub bucket: String,

    /// Local file to upload
    pub path: PathBuf,

    /// Key or URL of the file being replaced
    #[arg(long)]
    pub previous: Option<String>,

    /// Content type for the uploaded file (guessed from the extension by default)
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReplaceOutput<'a> {
    status: &'static str,
    bucket: &'a str,
    #[serde(flatten)]
    outcome: &'a ReplaceOutcome,
}

/// Execute the replace command
pub async fn execute(
    args: ReplaceArgs,
    options: &ClientOptions,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let file = match load_upload_file(&args.path, args.content_type.as_deref()) {
        Ok(file) => file,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::UsageError;
        }
    };
    let name = file.file_name.clone();

    let client = match connect(options, &formatter) {
        Ok(client) => client,
        Err(code) => return code,
    };

    let outcome = match client
        .replace_detailed(&args.bucket, file, args.previous.as_deref())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => return formatter.fail(&e),
    };

    if formatter.is_json() {
        formatter.json(&ReplaceOutput {
            status: "success",
            bucket: &args.bucket,
            outcome: &outcome,
        });
        return ExitCode::Success;
    }

    if let Some(cleanup) = &outcome.cleanup {
        match &cleanup.error {
            None => formatter.println(&format!("Removed previous file: {}", cleanup.key)),
            Some(error) => formatter.warning(&format!(
                "Previous file '{}' was not removed: {error}",
                cleanup.key
            )),
        }
    }

    formatter.success(&format!(
        "Uploaded {name} -> {}",
        outcome.upload.url().unwrap_or("(no URL returned)")
    ));

    ExitCode::Success
}
