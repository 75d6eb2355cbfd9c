//! Run configuration.
//!
//! A [`Config`] is built once at startup (usually from the command line),
//! validated, and then passed by reference to the download orchestrator.

use crate::api::MAX_PHOTOS_PER_REQUEST;
use crate::endpoint::DEFAULT_API_BASE;
use crate::filter::AlbumFilter;
use log::warn;
use std::fmt;
use std::path::PathBuf;

/// Token value shipped in sample configurations; never a real credential
pub const PLACEHOLDER_TOKEN: &str = "YOUR_ACCESS_TOKEN_HERE";

/// Default root directory for downloads
pub const DEFAULT_OUTPUT_FOLDER: &str = "photos";

/// Default number of photos requested per album
pub const DEFAULT_PHOTO_COUNT: u32 = 100;

/// Problems detected before any network call is made
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no access token given")]
    MissingToken,
    #[error("the access token is still the placeholder value")]
    PlaceholderToken,
    #[error("no group id or short name given")]
    MissingGroup,
    #[error("photo count must be at least 1")]
    ZeroPhotoCount,
}

impl ConfigError {
    /// Instructions for fixing the problem, suitable for printing to a user
    pub fn remediation(&self) -> &'static str {
        match self {
            ConfigError::MissingToken | ConfigError::PlaceholderToken => {
                "How to get a token:\n\
                 1. Open https://vkhost.github.io/\n\
                 2. Choose 'VK Admin' or an app with the 'photos' permission\n\
                 3. Pass the token with --token or the VK_ACCESS_TOKEN environment variable"
            }
            ConfigError::MissingGroup => {
                "Pass the community with --group, either as a numeric id or a short name such as 'durov'"
            }
            ConfigError::ZeroPhotoCount => "Pass --count with a value between 1 and 200",
        }
    }
}

/// Everything a run needs to know
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Community numeric id or short name
    pub group: String,
    /// Pre-obtained VK access token
    pub access_token: String,
    /// Root directory; one subdirectory is created per album
    pub output_folder: PathBuf,
    /// Photos requested per album, at most 200
    pub photo_count: u32,
    /// Which albums to process; empty means all
    pub filter: AlbumFilter,
    /// Only print the album table
    pub list_only: bool,
    /// Only run the token access check
    pub check_token: bool,
    /// Simultaneous photo transfers within an album; 1 is sequential
    pub concurrency: usize,
    /// VK API base URL
    pub api_base: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("group", &self.group)
            .field("access_token", &"<redacted>")
            .field("output_folder", &self.output_folder)
            .field("photo_count", &self.photo_count)
            .field("filter", &self.filter)
            .field("list_only", &self.list_only)
            .field("check_token", &self.check_token)
            .field("concurrency", &self.concurrency)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Config {
    /// Creates a configuration with default settings for everything but the
    /// community and the token
    pub fn new(group: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            access_token: access_token.into(),
            output_folder: PathBuf::from(DEFAULT_OUTPUT_FOLDER),
            photo_count: DEFAULT_PHOTO_COUNT,
            filter: AlbumFilter::default(),
            list_only: false,
            check_token: false,
            concurrency: 1,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Checks the configuration and normalises out-of-range values
    ///
    /// A photo count above the API limit is capped with a warning, and a
    /// concurrency of 0 is treated as 1.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.access_token = self.access_token.trim().to_string();
        self.group = self.group.trim().to_string();

        if self.access_token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.access_token == PLACEHOLDER_TOKEN {
            return Err(ConfigError::PlaceholderToken);
        }
        if self.group.is_empty() {
            return Err(ConfigError::MissingGroup);
        }
        if self.photo_count == 0 {
            return Err(ConfigError::ZeroPhotoCount);
        }
        if self.photo_count > MAX_PHOTOS_PER_REQUEST {
            warn!(
                "Photo count {} exceeds the API limit, using {}",
                self.photo_count, MAX_PHOTOS_PER_REQUEST
            );
            self.photo_count = MAX_PHOTOS_PER_REQUEST;
        }
        if self.concurrency == 0 {
            self.concurrency = 1;
        }

        Ok(self)
    }
}
