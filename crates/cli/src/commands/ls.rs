//! ls command - List the files of a bucket

use clap::Args;
use comfy_table::presets::NOTHING;
use comfy_table::{Cell, Table};
use fh_core::{StoredFile, extract_key};
use serde::Serialize;

use super::{ClientOptions, connect};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List files in a bucket
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Bucket to list
    pub bucket: String,

    /// Print the raw response body instead of the parsed listing (JSON mode)
    #[arg(long)]
    pub raw: bool,

    /// Summarize output (show totals only)
    #[arg(long)]
    pub summarize: bool,
}

/// Output structure for ls command (JSON format)
#[derive(Debug, Serialize)]
struct LsOutput<'a> {
    bucket: &'a str,
    files: &'a [StoredFile],
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_files: usize,
    total_size_bytes: u64,
    total_size_human: String,
}

/// Execute the ls command
pub async fn execute(
    args: LsArgs,
    options: &ClientOptions,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let client = match connect(options, &formatter) {
        Ok(client) => client,
        Err(code) => return code,
    };

    let listing = match client.list(&args.bucket).await {
        Ok(listing) => listing,
        Err(e) => return formatter.fail(&e),
    };

    let summary = summarize(&listing.files);

    if formatter.is_json() {
        if args.raw {
            formatter.json(&listing.response);
        } else {
            formatter.json(&LsOutput {
                bucket: &args.bucket,
                files: &listing.files,
                summary: args.summarize.then_some(summary),
            });
        }
        return ExitCode::Success;
    }

    if !args.summarize {
        if listing.files.is_empty() {
            formatter.println(&format!("Bucket '{}' is empty.", args.bucket));
        } else {
            formatter.println(&render_table(&listing.files).to_string());
        }
    }

    formatter.println(&format!(
        "Total: {} file(s), {}",
        summary.total_files, summary.total_size_human
    ));

    ExitCode::Success
}

fn summarize(files: &[StoredFile]) -> Summary {
    let total_size_bytes = files.iter().filter_map(|f| f.size).sum();
    Summary {
        total_files: files.len(),
        total_size_bytes,
        total_size_human: humansize::format_size(total_size_bytes, humansize::BINARY),
    }
}

fn render_table(files: &[StoredFile]) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec!["KEY", "SIZE", "TYPE", "PUBLIC", "UPLOADED", "URL"]);

    for file in files {
        let url = file.urls.original.as_deref().unwrap_or("-");
        let key = match &file.key {
            Some(key) => key.clone(),
            None => extract_key(url).to_string(),
        };

        table.add_row(vec![
            Cell::new(key),
            Cell::new(
                file.size
                    .map(|s| humansize::format_size(s, humansize::BINARY))
                    .unwrap_or_else(|| "-".into()),
            ),
            Cell::new(file.content_type.as_deref().unwrap_or("-")),
            Cell::new(match file.is_public {
                Some(true) => "yes",
                Some(false) => "no",
                None => "-",
            }),
            Cell::new(
                file.uploaded_at
                    .map(|t| t.strftime("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
            Cell::new(url),
        ]);
    }

    table
}
