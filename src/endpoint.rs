//! URL generation for VK API methods.
//!
//! Every VK method lives under a common base (`https://api.vk.com/method/`)
//! and is addressed by its dotted name. Community-owned objects are addressed
//! with a negated owner id.

/// Default base URL for API method calls
pub const DEFAULT_API_BASE: &str = "https://api.vk.com/method/";

/// API version sent with every request
pub const API_VERSION: &str = "5.131";

/// Error type for endpoint construction
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("Empty API base URL")]
    EmptyBase,
    #[error("Invalid method name: {0:?}")]
    InvalidMethod(String),
}

/// Builds the full URL for a VK method
///
/// A missing trailing slash on `base` is tolerated.
///
/// # Arguments
///
/// * `base` - The API base URL
/// * `method` - Dotted method name such as `photos.get`
pub fn method_url(base: &str, method: &str) -> Result<String, EndpointError> {
    if base.is_empty() {
        return Err(EndpointError::EmptyBase);
    }
    let valid = !method.is_empty()
        && method
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
    if !valid {
        return Err(EndpointError::InvalidMethod(method.to_string()));
    }

    if base.ends_with('/') {
        Ok(format!("{}{}", base, method))
    } else {
        Ok(format!("{}/{}", base, method))
    }
}

/// Owner id under which a community's albums and photos are addressed
pub fn community_owner_id(group_id: i64) -> i64 {
    -group_id.abs()
}

/// Identifier accepted by `photos.getById`, e.g. `-1_456239017`
pub fn photo_ref(owner_id: i64, photo_id: i64) -> String {
    format!("{}_{}", owner_id, photo_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url() {
        assert_eq!(
            method_url(DEFAULT_API_BASE, "photos.getAlbums").unwrap(),
            "https://api.vk.com/method/photos.getAlbums"
        );
        assert_eq!(
            method_url("http://127.0.0.1:1234", "groups.getById").unwrap(),
            "http://127.0.0.1:1234/groups.getById"
        );

        assert!(matches!(method_url("", "photos.get"), Err(EndpointError::EmptyBase)));
        match method_url(DEFAULT_API_BASE, "photos.get?x=1") {
            Err(EndpointError::InvalidMethod(m)) => assert_eq!(m, "photos.get?x=1"),
            _ => panic!("Expected InvalidMethod error"),
        }
    }

    #[test]
    fn test_community_owner_id() {
        assert_eq!(community_owner_id(1), -1);
        assert_eq!(community_owner_id(-42), -42);
    }

    #[test]
    fn test_photo_ref() {
        assert_eq!(photo_ref(-1, 456239017), "-1_456239017");
    }
}
