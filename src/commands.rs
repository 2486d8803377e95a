//! The two subcommands end to end: load, process, write back.

use crate::auth::Credentials;
use crate::cli::{MergeArgs, UpdateArgs};
use crate::dataset::{load_array, save_pretty};
use crate::github::GitHubClient;
use crate::merge::{merge_projects, MergeStats};
use crate::updater::{StatsUpdater, UpdateSummary, UpdaterConfig};
use anyhow::{Context, Result};
use tracing::info;

/// Merge the input files into `args.output`. Only a failed write is an
/// error; unusable inputs are logged and skipped.
pub fn run_merge(args: &MergeArgs) -> Result<(usize, MergeStats)> {
    let (projects, stats) = merge_projects(&args.input_files);

    info!(
        files_read = stats.files_read,
        files_skipped = stats.files_skipped,
        records_skipped = stats.records_skipped,
        replaced = stats.replaced,
        "Merge finished"
    );

    save_pretty(&args.output, &projects)
        .with_context(|| format!("Could not write to file {}", args.output.display()))?;

    Ok((projects.len(), stats))
}

/// Refresh every repository in `args.json` and write the result to the
/// output path, which defaults to the input file.
pub async fn run_update(args: &UpdateArgs) -> Result<UpdateSummary> {
    info!("Starting GitHub repository stats updater");

    let credentials = Credentials::resolve(
        args.token.as_deref(),
        args.username.as_deref(),
        args.password.as_deref(),
    )?;
    let client = GitHubClient::with_base_url(credentials, &args.api_url)?;

    info!("Loading repository data from {}", args.json.display());
    let mut data = load_array(&args.json)
        .with_context(|| format!("Failed to load {}", args.json.display()))?;

    let updater = StatsUpdater::new(
        client,
        UpdaterConfig {
            max_retries: args.max_retries,
            ..Default::default()
        },
    );
    let summary = updater.update_all(&mut data).await;

    let output = args.output_path();
    info!("Saving updated data to {}", output.display());
    save_pretty(output, &data)
        .with_context(|| format!("Could not write to file {}", output.display()))?;

    info!(
        not_found = summary.not_found,
        failed = summary.failed,
        skipped = summary.skipped,
        "Successfully updated {}/{} repositories",
        summary.updated,
        summary.total
    );
    Ok(summary)
}
