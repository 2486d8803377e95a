use clap::Parser;
use colored::*;
use project_stars::cli::{Cli, Command};
use project_stars::commands::{run_merge, run_update};
use project_stars::logging::{self, LogConfig};
use std::process::ExitCode;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let log_config = LogConfig {
        directory: (!cli.no_log_file).then(|| cli.log_dir.clone()),
        ..Default::default()
    };
    let _log_guard = match logging::init(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            return ExitCode::FAILURE;
        }
    };

    let result = match &cli.command {
        Command::Merge(args) => run_merge(args).map(|(merged, _)| {
            println!(
                "{}",
                format!(
                    "Successfully merged {} projects into {}",
                    merged,
                    args.output.display()
                )
                .green()
            );
        }),
        Command::Update(args) => run_update(args).await.map(|_| ()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Program failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
