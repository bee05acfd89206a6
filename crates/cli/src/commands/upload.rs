//! upload command - Upload files to a bucket
//!
//! A single file goes through a plain upload; several files go through a
//! batch upload where each file succeeds or fails on its own.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Args;
use fh_core::{UploadEntry, UploadFile, UploadResult};
use serde::Serialize;

use super::{ClientOptions, connect};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Upload files
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Target bucket
    pub bucket: String,

    /// Local files to upload (glob patterns are expanded)
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Content type for uploaded files (guessed from the extension by default)
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct UploadOutput<'a> {
    status: &'static str,
    bucket: &'a str,
    #[serde(flatten)]
    result: &'a UploadResult,
}

#[derive(Debug, Serialize)]
struct BatchUploadOutput<'a> {
    status: &'static str,
    bucket: &'a str,
    results: &'a [UploadEntry],
    succeeded: usize,
    failed: usize,
}

/// Execute the upload command
pub async fn execute(
    args: UploadArgs,
    options: &ClientOptions,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let paths = match expand_paths(&args.paths) {
        Ok(paths) => paths,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::UsageError;
        }
    };

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        match load_upload_file(path, args.content_type.as_deref()) {
            Ok(file) => files.push(file),
            Err(e) => {
                formatter.error(&format!("{e:#}"));
                return ExitCode::UsageError;
            }
        }
    }

    let client = match connect(options, &formatter) {
        Ok(client) => client,
        Err(code) => return code,
    };

    if files.len() == 1 {
        let Some(file) = files.pop() else {
            return ExitCode::UsageError;
        };
        let name = file.file_name.clone();
        let size = file.len();

        return match client.upload(&args.bucket, file).await {
            Ok(result) => {
                if formatter.is_json() {
                    formatter.json(&UploadOutput {
                        status: "success",
                        bucket: &args.bucket,
                        result: &result,
                    });
                } else {
                    formatter.success(&format!(
                        "Uploaded {name} ({}) -> {}",
                        humansize::format_size(size as u64, humansize::BINARY),
                        result.url().unwrap_or("(no URL returned)")
                    ));
                }
                ExitCode::Success
            }
            Err(e) => formatter.fail(&e),
        };
    }

    let spinner = ProgressBar::spinner(
        formatter.config(),
        &format!("Uploading {} files to {}", files.len(), args.bucket),
    );
    let results = client.upload_multiple(&args.bucket, files).await;
    spinner.finish_and_clear();

    report_batch(&formatter, &args.bucket, &results)
}

fn report_batch(formatter: &Formatter, bucket: &str, results: &[UploadEntry]) -> ExitCode {
    let failed = results.iter().filter(|r| !r.success).count();
    let succeeded = results.len() - failed;

    if formatter.is_json() {
        formatter.json(&BatchUploadOutput {
            status: if failed == 0 { "success" } else { "partial" },
            bucket,
            results,
            succeeded,
            failed,
        });
    } else {
        for entry in results {
            match (&entry.data, &entry.error) {
                (Some(data), _) => formatter.println(&format!(
                    "Uploaded: {} -> {}",
                    entry.file,
                    data.url().unwrap_or("(no URL returned)")
                )),
                (None, Some(error)) => formatter.error(&format!("{}: {error}", entry.file)),
                (None, None) => {}
            }
        }
        formatter.success(&format!("Uploaded {succeeded} of {} file(s).", results.len()));
    }

    if failed == 0 {
        ExitCode::Success
    } else {
        ExitCode::GeneralError
    }
}

/// Expand glob patterns; plain paths are passed through
pub fn expand_paths(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let matches = glob::glob(pattern)
            .with_context(|| format!("Invalid pattern '{pattern}'"))?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect::<Vec<_>>();

        if matches.is_empty() {
            bail!("No files match '{pattern}'");
        }
        paths.extend(matches);
    }

    Ok(paths)
}

/// Read a local file into an upload payload
pub fn load_upload_file(path: &Path, content_type: Option<&str>) -> anyhow::Result<UploadFile> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file path: {}", path.display()))?;

    let content_type = match content_type {
        Some(ct) => ct.to_string(),
        None => mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    };

    Ok(UploadFile::new(file_name, content_type, data))
}
