use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "project-stars")]
#[command(about = "Merge project lists and refresh their GitHub star/fork counts")]
#[command(version)]
pub struct Cli {
    /// Directory for the rotated log file
    #[arg(long, global = true, env = "PROJECT_STARS_LOG_DIR", default_value = ".")]
    pub log_dir: PathBuf,

    /// Log to standard output only
    #[arg(long, global = true)]
    pub no_log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge project JSON files, keeping the highest stars_count per name
    Merge(MergeArgs),
    /// Update GitHub repository stats in a JSON file
    Update(UpdateArgs),
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// One or more input JSON files containing project arrays
    #[arg(required = true, num_args = 1..)]
    pub input_files: Vec<PathBuf>,

    /// Output file path
    #[arg(short, long, default_value = "projects.json")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Path to JSON file containing repository data
    pub json: PathBuf,

    /// GitHub personal access token (recommended instead of password)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub username (deprecated, used only without a token)
    #[arg(long, env = "GITHUB_USERNAME")]
    pub username: Option<String>,

    /// GitHub password (deprecated, used only without a token)
    #[arg(long, env = "GITHUB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Optional output file (defaults to overwriting the input file)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Failed attempts per repository before giving up
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_retries: u32,

    /// GitHub API root URL
    #[arg(long, env = "GITHUB_API_URL", default_value = crate::github::API_BASE_URL)]
    pub api_url: String,
}

impl UpdateArgs {
    pub fn output_path(&self) -> &PathBuf {
        self.output.as_ref().unwrap_or(&self.json)
    }
}
