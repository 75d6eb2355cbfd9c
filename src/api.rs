//! API client for the VK methods used to enumerate community photos.
//!
//! [`VkClient`] is a thin authenticated handle: it attaches the access token
//! and API version to each call, unwraps the `response`/`error` envelope and
//! returns typed models. It holds no state beyond the HTTP client and token.

use crate::endpoint::{self, EndpointError, API_VERSION};
use crate::models::{Album, Envelope, GroupsResponse, Group, ItemList, Photo, User};
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;

/// Largest `count` VK accepts for a single `photos.get` request
pub const MAX_PHOTOS_PER_REQUEST: u32 = 200;

/// Custom error type for API-related errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Error from a network request
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Non-success HTTP status
    #[error("Request error (status {status}) calling {method}")]
    Status {
        /// The HTTP status code
        status: u16,
        /// The VK method that was called
        method: String,
    },
    /// Error object returned by VK in place of a response
    #[error("VK API error {code}: {message}")]
    Vk {
        /// VK error code (5 = authorization failed, 15/30 = access denied, 100 = bad parameter)
        code: i32,
        /// Human readable message from VK
        message: String,
    },
    /// Error when parsing JSON
    #[error("JSON parse error: {0}")]
    Json(String),
    /// A method returned no usable item
    #[error("Empty response from {0}")]
    EmptyResponse(String),
    /// The request URL could not be built
    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] EndpointError),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Json(err.to_string())
    }
}

impl ApiError {
    /// Whether VK rejected the token itself rather than the request
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Vk { code: 5, .. })
    }
}

/// Authenticated handle for VK API calls
#[derive(Clone)]
pub struct VkClient {
    http: Client,
    base: String,
    token: String,
}

impl fmt::Debug for VkClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VkClient")
            .field("base", &self.base)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl VkClient {
    /// Creates a client with an explicit HTTP client and API base URL
    ///
    /// # Arguments
    ///
    /// * `http` - A reqwest HTTP client, shared with photo downloads
    /// * `base` - The API base URL (tests point this at a mock server)
    /// * `token` - A pre-obtained VK access token
    pub fn with_base(http: Client, base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            base: base.into(),
            token: token.into(),
        }
    }

    /// The underlying HTTP client
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Calls a VK method and unwraps its response envelope
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = endpoint::method_url(&self.base, method)?;
        debug!("Calling {} with {:?}", method, params);

        let resp = self
            .http
            .get(&url)
            .query(params)
            .query(&[("access_token", self.token.as_str()), ("v", API_VERSION)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApiError::Status {
                status: resp.status().as_u16(),
                method: method.to_string(),
            });
        }

        let body = resp.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;

        if let Some(err) = envelope.error {
            return Err(ApiError::Vk {
                code: err.error_code,
                message: err.error_msg,
            });
        }

        envelope
            .response
            .ok_or_else(|| ApiError::EmptyResponse(method.to_string()))
    }

    /// Resolves a community by numeric id or short name
    ///
    /// # Arguments
    ///
    /// * `group` - Numeric id (`"1"`) or screen name (`"durov"`)
    ///
    /// # Returns
    ///
    /// The community with its positive numeric id and display name
    pub async fn resolve_group(&self, group: &str) -> Result<Group, ApiError> {
        let response: GroupsResponse = self
            .call("groups.getById", &[("group_id", group.to_string())])
            .await?;

        response
            .into_first()
            .ok_or_else(|| ApiError::EmptyResponse("groups.getById".to_string()))
    }

    /// Lists the albums of an owner in the order VK returns them
    ///
    /// # Arguments
    ///
    /// * `owner_id` - Album owner; negative for communities
    pub async fn get_albums(&self, owner_id: i64) -> Result<Vec<Album>, ApiError> {
        let list: ItemList<Album> = self
            .call("photos.getAlbums", &[("owner_id", owner_id.to_string())])
            .await?;
        Ok(list.items)
    }

    /// Fetches a single page of photos from an album
    ///
    /// `count` is capped at [`MAX_PHOTOS_PER_REQUEST`]. Photos that fail to
    /// parse are logged and skipped rather than failing the whole page.
    ///
    /// # Arguments
    ///
    /// * `owner_id` - Album owner; negative for communities
    /// * `album_id` - The album to list
    /// * `count` - Number of photos to request
    pub async fn get_photos(
        &self,
        owner_id: i64,
        album_id: i64,
        count: u32,
    ) -> Result<Vec<Photo>, ApiError> {
        let count = count.min(MAX_PHOTOS_PER_REQUEST);
        let list: ItemList<serde_json::Value> = self
            .call(
                "photos.get",
                &[
                    ("owner_id", owner_id.to_string()),
                    ("album_id", album_id.to_string()),
                    ("count", count.to_string()),
                    ("extended", "1".to_string()),
                    ("photo_sizes", "1".to_string()),
                ],
            )
            .await?;

        let mut photos = Vec::with_capacity(list.items.len());
        for (index, raw) in list.items.into_iter().enumerate() {
            match serde_json::from_value::<Photo>(raw) {
                Ok(photo) => photos.push(photo),
                Err(e) => {
                    warn!(
                        "Failed to parse photo at index {} of album {}: {}",
                        index, album_id, e
                    );
                }
            }
        }

        Ok(photos)
    }

    /// Fetches a single photo with its sizes via `photos.getById`
    ///
    /// Returns `Ok(None)` when VK knows no such photo.
    pub async fn get_photo_by_id(
        &self,
        owner_id: i64,
        photo_id: i64,
    ) -> Result<Option<Photo>, ApiError> {
        let photos: Vec<Photo> = self
            .call(
                "photos.getById",
                &[
                    ("photos", endpoint::photo_ref(owner_id, photo_id)),
                    ("photo_sizes", "1".to_string()),
                ],
            )
            .await?;
        Ok(photos.into_iter().next())
    }

    /// Returns the account the token belongs to
    pub async fn get_current_user(&self) -> Result<User, ApiError> {
        let users: Vec<User> = self.call("users.get", &[]).await?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::EmptyResponse("users.get".to_string()))
    }
}
