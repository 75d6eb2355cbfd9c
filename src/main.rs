//! Command line frontend for the vk-album-rs library.
//!
//! Exit codes: 0 on success (including "no albums matched" and the listing
//! modes), 1 when the run failed before downloading anything, 2 for a
//! configuration error, 3 when some photos or albums could not be downloaded.

use clap::Parser;
use std::process::ExitCode;
use vk_album_rs::api::VkClient;
use vk_album_rs::cli::Cli;
use vk_album_rs::{check_token_access, download_group_photos, list_albums, RunOutcome};

const EXIT_FATAL: u8 = 1;
const EXIT_CONFIG: u8 = 2;
const EXIT_PARTIAL: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG overrides the default level
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("⚠ Configuration error: {}\n", e);
            eprintln!("{}", e.remediation());
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    log::debug!("{:?}", config);

    let client = VkClient::with_base(
        reqwest::Client::new(),
        config.api_base.clone(),
        config.access_token.clone(),
    );

    if config.check_token {
        return match check_token_access(&client, &config.group).await {
            Ok(report) => {
                println!("{}", report);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("✗ {}", e);
                eprintln!("Get a new token with the 'photos' permission at https://vkhost.github.io/");
                ExitCode::from(EXIT_FATAL)
            }
        };
    }

    if config.list_only {
        list_albums(&client, &config.group).await;
        return ExitCode::SUCCESS;
    }

    match download_group_photos(&client, &config).await {
        Ok(RunOutcome::NoMatches) => ExitCode::SUCCESS,
        Ok(RunOutcome::Completed(summary)) if summary.is_partial() => {
            eprintln!(
                "{} photos failed, {} had no downloadable size, {} albums could not be listed",
                summary.failed,
                summary.skipped,
                summary.failed_albums.len()
            );
            ExitCode::from(EXIT_PARTIAL)
        }
        Ok(RunOutcome::Completed(_)) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Run aborted");
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
