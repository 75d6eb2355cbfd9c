//! A Rust library for downloading photos from the albums of a VK community.
//!
//! The flow is a straight pipeline: resolve the community, list its albums,
//! keep the ones selected by an [`filter::AlbumFilter`], then for each album
//! list its photos, pick the largest size of every photo and stream it to
//! `{output}/{album id}_{sanitized title}/{photo id}.jpg`.
//!
//! # Logging
//!
//! This library uses the [`log`] crate for logging. The `vk-album-dl` binary
//! initializes [`env_logger`]; set the RUST_LOG environment variable to
//! control log levels (e.g., `RUST_LOG=debug`).
//!
//! Per-photo failures are logged as warnings and never abort a run.

/// Module containing data model structures
pub mod models;

/// Module building VK method URLs
pub mod endpoint;

/// Module for authenticated VK API calls
pub mod api;

/// Module selecting albums by id or title
pub mod filter;

/// Module containing size selection and naming helpers
pub mod utils;

/// Module streaming photos to disk
pub mod download;

/// Module holding the validated run configuration
pub mod config;

/// Module defining the command line interface
pub mod cli;

use api::{ApiError, VkClient};
use config::Config;
use models::{Album, Group, User};
use std::fmt;
use std::path::PathBuf;

/// Fatal outcomes of a download run
///
/// Every variant is raised before any photo has been written.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The output root could not be created
    #[error("Cannot create output directory {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The community could not be resolved
    #[error(
        "Cannot resolve group: {0}\n\nPossible causes:\n\
         1. Invalid access token\n\
         2. Invalid group id\n\
         3. No access to the group"
    )]
    Resolve(#[source] ApiError),
    /// The album list could not be fetched
    #[error("Cannot list albums: {0}")]
    Enumerate(#[source] ApiError),
}

/// Totals for a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Albums processed
    pub albums: usize,
    /// Albums whose photo list could not be fetched
    pub failed_albums: Vec<i64>,
    /// Photos written successfully
    pub downloaded: usize,
    /// Photos whose transfer failed
    pub failed: usize,
    /// Photos without any downloadable size
    pub skipped: usize,
    /// Absolute path of the output root
    pub output_dir: PathBuf,
}

impl DownloadSummary {
    /// True when anything was left undownloaded
    pub fn is_partial(&self) -> bool {
        self.failed > 0 || self.skipped > 0 || !self.failed_albums.is_empty()
    }
}

/// Non-fatal outcome of a download run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Album filters were given but matched nothing; nothing was downloaded
    NoMatches,
    /// Every selected album was processed
    Completed(DownloadSummary),
}

/// Formats one row of the album table
pub fn format_album_row(album: &Album) -> String {
    format!(
        "ID: {:>6} | Title: {:<50} | Photos: {}",
        album.id, album.title, album.photo_count
    )
}

/// Resolves a community and lists its albums
///
/// # Arguments
///
/// * `client` - An authenticated VK client
/// * `group` - Community numeric id or short name
///
/// # Returns
///
/// The resolved community and its albums in API order
pub async fn fetch_albums(client: &VkClient, group: &str) -> Result<(Group, Vec<Album>), RunError> {
    let group = client.resolve_group(group).await.map_err(RunError::Resolve)?;
    let albums = client
        .get_albums(endpoint::community_owner_id(group.id))
        .await
        .map_err(RunError::Enumerate)?;
    Ok((group, albums))
}

/// Prints the albums of a community as a table and returns them
///
/// Any API failure is logged and yields an empty list instead of an error.
pub async fn list_albums(client: &VkClient, group: &str) -> Vec<Album> {
    match fetch_albums(client, group).await {
        Ok((group, albums)) => {
            println!("\n=== Albums of '{}' ===\n", group.name);
            for album in &albums {
                println!("{}", format_album_row(album));
            }
            println!();
            albums
        }
        Err(e) => {
            log::error!("Failed to list albums: {}", e);
            Vec::new()
        }
    }
}

/// Downloads the photos of the selected albums of a community
///
/// This function orchestrates the entire run:
/// 1. Creating the output root
/// 2. Resolving the community and listing its albums
/// 3. Applying the album filter
/// 4. For each album, creating its directory, listing its photos and
///    downloading them
///
/// Photo failures and albums whose listing fails are counted in the summary
/// and do not stop the run.
///
/// # Arguments
///
/// * `client` - An authenticated VK client
/// * `config` - The validated run configuration
///
/// # Returns
///
/// [`RunOutcome::NoMatches`] if the filter selected nothing, otherwise the
/// run summary
pub async fn download_group_photos(
    client: &VkClient,
    config: &Config,
) -> Result<RunOutcome, RunError> {
    let root = &config.output_folder;
    tokio::fs::create_dir_all(root)
        .await
        .map_err(|source| RunError::Io {
            path: root.clone(),
            source,
        })?;

    log::info!("Downloading photos of group {}", config.group);
    let (group, albums) = fetch_albums(client, &config.group).await?;
    log::info!("Group: {} (id {})", group.name, group.id);

    let selected = config.filter.apply(&albums);
    if selected.is_empty() && !config.filter.is_empty() {
        println!("⚠ No albums matched the given ids or titles");
        println!("Run with --list-albums to see every available album");
        return Ok(RunOutcome::NoMatches);
    }

    let owner_id = endpoint::community_owner_id(group.id);
    let mut summary = DownloadSummary::default();

    for album in &selected {
        println!("\nProcessing album: {}", album.title);

        let album_dir = root.join(utils::album_dir_name(album));
        if let Err(e) = tokio::fs::create_dir_all(&album_dir).await {
            log::error!("Cannot create {}: {}", album_dir.display(), e);
            summary.failed_albums.push(album.id);
            continue;
        }
        log::info!("Created folder: {}", album_dir.display());

        let photos = match client
            .get_photos(owner_id, album.id, config.photo_count)
            .await
        {
            Ok(photos) => photos,
            Err(e) => {
                log::error!("Cannot list photos of album {}: {}", album.id, e);
                summary.failed_albums.push(album.id);
                continue;
            }
        };
        log::info!("Album {} returned {} photos", album.id, photos.len());

        let report =
            download::download_album_photos(client, owner_id, photos, &album_dir, config.concurrency)
                .await;
        summary.albums += 1;
        summary.downloaded += report.downloaded;
        summary.failed += report.failed.len();
        summary.skipped += report.skipped.len();
    }

    summary.output_dir = tokio::fs::canonicalize(root)
        .await
        .unwrap_or_else(|_| root.clone());
    println!("\n✓ Done! Photos downloaded: {}", summary.downloaded);
    println!("Photos saved to: {}", summary.output_dir.display());

    Ok(RunOutcome::Completed(summary))
}

/// Error from one step of [`check_token_access`]
#[derive(Debug, thiserror::Error)]
#[error("{step} check failed: {source}")]
pub struct TokenCheckError {
    pub step: &'static str,
    #[source]
    pub source: ApiError,
}

/// Findings of [`check_token_access`]
#[derive(Debug, Clone)]
pub struct AccessReport {
    pub user: User,
    pub group: Group,
    pub album_count: usize,
    /// Up to three albums, for display
    pub first_albums: Vec<Album>,
    /// `None` when there was no album to probe or it was empty
    pub photo_urls_available: Option<bool>,
}

impl fmt::Display for AccessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "1. Token is valid (user: {} {})",
            self.user.first_name, self.user.last_name
        )?;
        writeln!(f, "2. Group access: {} (id {})", self.group.name, self.group.id)?;
        writeln!(f, "3. Album access: {} albums found", self.album_count)?;
        for album in &self.first_albums {
            writeln!(f, "   - {} (id {})", album.title, album.id)?;
        }
        match self.photo_urls_available {
            Some(true) => writeln!(f, "4. Photo URLs are available for download"),
            Some(false) => writeln!(
                f,
                "4. Photo URLs are not available; the token may need the 'photos' permission"
            ),
            None => writeln!(f, "4. No photos to probe"),
        }
    }
}

/// Checks what the token can access, step by step, without downloading
///
/// The steps are: token validity (`users.get`), community resolution, album
/// listing, and whether one photo of the first album exposes a size URL.
pub async fn check_token_access(
    client: &VkClient,
    group: &str,
) -> Result<AccessReport, TokenCheckError> {
    let user = client
        .get_current_user()
        .await
        .map_err(|source| TokenCheckError { step: "token", source })?;
    let group = client
        .resolve_group(group)
        .await
        .map_err(|source| TokenCheckError { step: "group", source })?;

    let owner_id = endpoint::community_owner_id(group.id);
    let albums = client
        .get_albums(owner_id)
        .await
        .map_err(|source| TokenCheckError { step: "albums", source })?;

    let photo_urls_available = match albums.first() {
        Some(album) => {
            let photos = client
                .get_photos(owner_id, album.id, 1)
                .await
                .map_err(|source| TokenCheckError { step: "photos", source })?;
            photos
                .first()
                .map(|photo| utils::select_best_size(&photo.sizes).is_some())
        }
        None => None,
    };

    Ok(AccessReport {
        user,
        group,
        album_count: albums.len(),
        first_albums: albums.iter().take(3).cloned().collect(),
        photo_urls_available,
    })
}
