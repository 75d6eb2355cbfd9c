//! Photo downloads.
//!
//! [`download_file`] streams one URL to disk chunk by chunk, so memory use
//! does not depend on image size. [`download_album_photos`] drives the
//! per-photo loop for one album: it picks the best size of every photo, falls
//! back to `photos.getById` when the listing carries no usable URL, and keeps
//! each photo's failure from affecting its siblings.

use crate::api::VkClient;
use crate::models::Photo;
use crate::utils::{photo_file_name, select_best_size};
use log::{debug, error, info, warn};
use reqwest::Client;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;

/// Errors for a single photo transfer
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("HTTP error downloading {path}: {source}")]
    Http {
        source: reqwest::Error,
        path: String,
    },

    #[error("HTTP error {status} downloading {path}")]
    HttpStatus { status: u16, path: String },

    #[error("Disk error: {0}")]
    Disk(#[from] std::io::Error),
}

/// Result of handling one photo
#[derive(Debug)]
pub enum PhotoOutcome {
    /// The photo was written to `path`
    Downloaded {
        photo_id: i64,
        path: PathBuf,
        bytes: u64,
    },
    /// No size variant with a URL was available, even after `photos.getById`
    Skipped { photo_id: i64 },
    /// The transfer or the write failed
    Failed {
        photo_id: i64,
        error: DownloadError,
    },
}

impl PhotoOutcome {
    /// Id of the photo this outcome is about
    pub fn photo_id(&self) -> i64 {
        match self {
            PhotoOutcome::Downloaded { photo_id, .. }
            | PhotoOutcome::Skipped { photo_id }
            | PhotoOutcome::Failed { photo_id, .. } => *photo_id,
        }
    }
}

/// Tally of photo outcomes for one album
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumReport {
    pub downloaded: usize,
    pub bytes: u64,
    pub failed: Vec<i64>,
    pub skipped: Vec<i64>,
}

impl AlbumReport {
    fn record(&mut self, outcome: PhotoOutcome) {
        match outcome {
            PhotoOutcome::Downloaded {
                photo_id,
                path,
                bytes,
            } => {
                self.downloaded += 1;
                self.bytes += bytes;
                info!(
                    "  ✓ Downloaded {} ({} bytes) -> {}",
                    photo_id,
                    bytes,
                    path.display()
                );
            }
            PhotoOutcome::Skipped { photo_id } => {
                warn!("  ✗ Skipped photo {}: no downloadable size", photo_id);
                self.skipped.push(photo_id);
            }
            PhotoOutcome::Failed { photo_id, error } => {
                warn!("  ✗ Failed to download photo {}: {}", photo_id, error);
                self.failed.push(photo_id);
            }
        }
    }

    /// Counts photos whose task panicked or was cancelled as failed
    fn record_lost(&mut self, pending: HashSet<i64>) {
        let mut lost: Vec<i64> = pending.into_iter().collect();
        lost.sort_unstable();
        for photo_id in lost {
            warn!("  ✗ Photo {} was lost with its download task", photo_id);
            self.failed.push(photo_id);
        }
    }
}

/// Path of the temporary sibling a transfer streams into before it is
/// renamed over the destination
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// Streams the body of `url` into `dest`, replacing any existing file
///
/// The body is written to a `.part` sibling first and renamed over `dest`
/// only once complete, so a failed transfer leaves an existing `dest`
/// untouched.
///
/// # Arguments
///
/// * `client` - A reqwest HTTP client
/// * `url` - The image URL
/// * `dest` - Destination file path
///
/// # Returns
///
/// The number of bytes written
pub async fn download_file(client: &Client, url: &str, dest: &Path) -> Result<u64, DownloadError> {
    let path = dest.display().to_string();

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|source| DownloadError::Http {
            source,
            path: path.clone(),
        })?;

    if !response.status().is_success() {
        return Err(DownloadError::HttpStatus {
            status: response.status().as_u16(),
            path,
        });
    }

    let part = part_path(dest);
    let mut file = tokio::fs::File::create(&part).await?;
    let result = async {
        let mut written: u64 = 0;
        loop {
            let chunk = response.chunk().await.map_err(|source| DownloadError::Http {
                source,
                path: path.clone(),
            })?;
            let Some(chunk) = chunk else { break };
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok::<u64, DownloadError>(written)
    }
    .await;
    drop(file);

    let written = match result {
        Ok(written) => written,
        Err(e) => {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }
    };

    if let Err(e) = tokio::fs::rename(&part, dest).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(e.into());
    }
    Ok(written)
}

/// Finds the URL to download for a photo
///
/// Uses the sizes from the album listing, re-fetching the photo with
/// `photos.getById` when none of them is usable. Lookup errors are logged
/// and treated as "no URL".
async fn resolve_photo_url(client: &VkClient, owner_id: i64, photo: &Photo) -> Option<String> {
    if let Some(size) = select_best_size(&photo.sizes) {
        return Some(size.url.clone());
    }

    debug!(
        "Photo {} has no usable size in listing ({} variants), trying photos.getById",
        photo.id,
        photo.sizes.len()
    );
    match client.get_photo_by_id(owner_id, photo.id).await {
        Ok(Some(full)) => select_best_size(&full.sizes).map(|s| s.url.clone()),
        Ok(None) => None,
        Err(e) => {
            debug!("photos.getById failed for {}: {}", photo.id, e);
            None
        }
    }
}

/// Downloads one photo into `album_dir`
pub async fn fetch_photo(
    client: &VkClient,
    owner_id: i64,
    photo: &Photo,
    album_dir: &Path,
) -> PhotoOutcome {
    let Some(url) = resolve_photo_url(client, owner_id, photo).await else {
        return PhotoOutcome::Skipped { photo_id: photo.id };
    };

    let dest = album_dir.join(photo_file_name(photo.id));
    match download_file(client.http(), &url, &dest).await {
        Ok(bytes) => PhotoOutcome::Downloaded {
            photo_id: photo.id,
            path: dest,
            bytes,
        },
        Err(error) => PhotoOutcome::Failed {
            photo_id: photo.id,
            error,
        },
    }
}

/// Drops photos whose id was already seen, keeping the first occurrence
///
/// File names derive from photo ids, so this guarantees at most one writer
/// per destination path.
fn unique_by_id(photos: Vec<Photo>) -> Vec<Photo> {
    let mut seen = HashSet::new();
    photos
        .into_iter()
        .filter(|photo| {
            let fresh = seen.insert(photo.id);
            if !fresh {
                debug!("Ignoring duplicate photo {} in listing", photo.id);
            }
            fresh
        })
        .collect()
}

/// Downloads every photo of one album
///
/// With `concurrency <= 1` photos are processed strictly one after another.
/// Larger values run up to that many transfers at once. Either way a failed
/// photo is recorded and the rest continue.
///
/// # Arguments
///
/// * `client` - The VK client, also used for the image transfers
/// * `owner_id` - Owner of the album (negative for communities)
/// * `photos` - The album's photo listing
/// * `album_dir` - Existing directory to write into
/// * `concurrency` - Maximum number of simultaneous transfers
pub async fn download_album_photos(
    client: &VkClient,
    owner_id: i64,
    photos: Vec<Photo>,
    album_dir: &Path,
    concurrency: usize,
) -> AlbumReport {
    let photos = unique_by_id(photos);
    let mut report = AlbumReport::default();

    if concurrency <= 1 {
        for photo in &photos {
            let outcome = fetch_photo(client, owner_id, photo, album_dir).await;
            report.record(outcome);
        }
        return report;
    }

    let mut tasks = JoinSet::new();
    let mut pending: HashSet<i64> = photos.iter().map(|p| p.id).collect();
    for photo in photos {
        while tasks.len() >= concurrency {
            collect_next(&mut tasks, &mut pending, &mut report).await;
        }
        let client = client.clone();
        let album_dir = album_dir.to_path_buf();
        tasks.spawn(async move { fetch_photo(&client, owner_id, &photo, &album_dir).await });
    }
    while !tasks.is_empty() {
        collect_next(&mut tasks, &mut pending, &mut report).await;
    }

    report.record_lost(pending);
    report
}

async fn collect_next(
    tasks: &mut JoinSet<PhotoOutcome>,
    pending: &mut HashSet<i64>,
    report: &mut AlbumReport,
) {
    match tasks.join_next().await {
        Some(Ok(outcome)) => {
            pending.remove(&outcome.photo_id());
            report.record(outcome);
        }
        Some(Err(e)) => error!("Download task aborted: {}", e),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PhotoSize;

    fn photo(id: i64) -> Photo {
        Photo {
            id,
            album_id: None,
            owner_id: None,
            sizes: vec![PhotoSize {
                size_type: "x".to_string(),
                width: 1,
                height: 1,
                url: format!("https://example.com/{}.jpg", id),
            }],
        }
    }

    #[test]
    fn test_unique_by_id_keeps_first_and_order() {
        let photos = vec![photo(3), photo(1), photo(3), photo(2), photo(1)];
        let ids: Vec<i64> = unique_by_id(photos).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_album_report_record() {
        let mut report = AlbumReport::default();
        report.record(PhotoOutcome::Downloaded {
            photo_id: 1,
            path: PathBuf::from("x/1.jpg"),
            bytes: 10,
        });
        report.record(PhotoOutcome::Skipped { photo_id: 2 });
        report.record(PhotoOutcome::Failed {
            photo_id: 3,
            error: DownloadError::HttpStatus {
                status: 404,
                path: "x/3.jpg".to_string(),
            },
        });

        assert_eq!(report.downloaded, 1);
        assert_eq!(report.bytes, 10);
        assert_eq!(report.skipped, vec![2]);
        assert_eq!(report.failed, vec![3]);
    }

    #[test]
    fn test_lost_tasks_count_as_failed() {
        let mut report = AlbumReport::default();
        report.record(PhotoOutcome::Failed {
            photo_id: 4,
            error: DownloadError::HttpStatus {
                status: 500,
                path: "x/4.jpg".to_string(),
            },
        });
        report.record_lost(HashSet::from([9, 7]));

        assert_eq!(report.failed, vec![4, 7, 9]);
        assert_eq!(report.downloaded, 0);
    }

    #[test]
    fn test_outcome_photo_id() {
        assert_eq!(PhotoOutcome::Skipped { photo_id: 12 }.photo_id(), 12);
    }

    #[test]
    fn test_part_path_is_sibling() {
        let dest = Path::new("out/5_Winter/601.jpg");
        assert_eq!(part_path(dest), PathBuf::from("out/5_Winter/601.jpg.part"));
    }
}
