use crate::config::{Config, ConfigError, DEFAULT_OUTPUT_FOLDER, DEFAULT_PHOTO_COUNT};
use crate::endpoint::DEFAULT_API_BASE;
use crate::filter::AlbumFilter;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vk-album-dl",
    version,
    about = "Download photos from the albums of a VK community"
)]
pub struct Cli {
    /// Community numeric id or short name (e.g. "durov")
    #[arg(short = 'g', long)]
    pub group: String,

    /// VK access token.
    /// WARNING: passing via --token is visible in process listings.
    /// Prefer the VK_ACCESS_TOKEN environment variable instead.
    #[arg(short = 't', long, env = "VK_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Root directory for downloads
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_FOLDER)]
    pub output: PathBuf,

    /// Photos to download per album (the API returns at most 200)
    #[arg(short = 'c', long, default_value_t = DEFAULT_PHOTO_COUNT)]
    pub count: u32,

    /// Only download the album with this id (repeatable)
    #[arg(long = "album-id", allow_negative_numbers = true)]
    pub album_ids: Vec<i64>,

    /// Only download the album with exactly this title (repeatable)
    #[arg(long = "album-title")]
    pub album_titles: Vec<String>,

    /// Print the community's albums and exit
    #[arg(short = 'l', long)]
    pub list_albums: bool,

    /// Check the token's access to the community and exit
    #[arg(long, conflicts_with = "list_albums")]
    pub check_token: bool,

    /// Number of photos to download at the same time
    #[arg(short = 'j', long, default_value_t = 1)]
    pub concurrency: usize,

    /// VK API base URL
    #[arg(long, default_value = DEFAULT_API_BASE, hide = true)]
    pub api_base: String,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Converts parsed arguments into a validated [`Config`]
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let mut config = Config::new(self.group, self.token.unwrap_or_default());
        config.output_folder = self.output;
        config.photo_count = self.count;
        config.filter = AlbumFilter::new(self.album_ids, self.album_titles);
        config.list_only = self.list_albums;
        config.check_token = self.check_token;
        config.concurrency = self.concurrency;
        config.api_base = self.api_base;
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["vk-album-dl"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["-g", "durov", "-t", "token"]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.group, "durov");
        assert_eq!(config.output_folder, PathBuf::from("photos"));
        assert_eq!(config.photo_count, 100);
        assert!(config.filter.is_empty());
        assert!(!config.list_only);
    }

    #[test]
    fn test_album_selectors() {
        let cli = parse(&[
            "-g",
            "1",
            "-t",
            "token",
            "--album-id",
            "268951427",
            "--album-id",
            "-7",
            "--album-title",
            "Фото 2024",
        ]);
        let config = cli.into_config().unwrap();
        assert!(config.filter.ids.contains(&268951427));
        assert!(config.filter.ids.contains(&-7));
        assert!(config.filter.titles.contains("Фото 2024"));
    }

    #[test]
    fn test_list_and_check_conflict() {
        let result = Cli::try_parse_from(["vk-album-dl", "-g", "1", "-l", "--check-token"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_group_is_required() {
        assert!(Cli::try_parse_from(["vk-album-dl", "-t", "token"]).is_err());
    }
}
