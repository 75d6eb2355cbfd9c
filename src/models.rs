//! Data structures for VK API responses.
//!
//! This module defines the data models for communities, albums, photos and
//! their size variants, together with the response envelope every VK method
//! is wrapped in. The API is not always consistent about numeric types, so
//! dimension and counter fields are deserialized leniently.

use serde::{Deserialize, Serialize};

/// Lenient (de)serialization for `u32` fields that VK may send as numbers,
/// numeric strings, or `null`
mod lenient_u32 {
    use log::{trace, warn};
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LenientVisitor;

        impl Visitor<'_> for LenientVisitor {
            type Value = u32;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a non-negative number or numeric string")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(u32::try_from(value).unwrap_or(u32::MAX))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if value < 0 {
                    return Ok(0);
                }
                Ok(u32::try_from(value).unwrap_or(u32::MAX))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if value.is_finite() && value > 0.0 {
                    Ok(value.min(u32::MAX as f64) as u32)
                } else {
                    Ok(0)
                }
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                match value.trim().parse::<u32>() {
                    Ok(num) => Ok(num),
                    Err(e) => {
                        warn!(
                            "Type inconsistency: could not parse '{}' as a number, using 0",
                            value
                        );
                        trace!("Parse error details: {:?}", e);
                        Ok(0)
                    }
                }
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(0)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(0)
            }
        }

        deserializer.deserialize_any(LenientVisitor)
    }

    pub fn serialize<S>(value: &u32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(*value)
    }
}

/// A VK community (group, public page or event)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Group {
    /// Positive numeric community id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Short name used in vk.com/<screen_name> links
    #[serde(default)]
    pub screen_name: Option<String>,
}

/// A photo album owned by a community
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Album {
    /// Album id, unique within its owner. System albums use negative ids.
    pub id: i64,
    /// Free-form album title
    pub title: String,
    /// Number of photos in the album
    #[serde(rename = "size", default, with = "lenient_u32")]
    pub photo_count: u32,
}

/// One resolution of a photo
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct PhotoSize {
    /// Size type letter (`s`, `m`, `x`, `y`, `z`, `w`, ...)
    #[serde(rename = "type", default)]
    pub size_type: String,
    /// Width in pixels; 0 for legacy photos that carry no dimensions
    #[serde(default, with = "lenient_u32")]
    pub width: u32,
    /// Height in pixels; 0 for legacy photos that carry no dimensions
    #[serde(default, with = "lenient_u32")]
    pub height: u32,
    /// Direct URL of this variant
    #[serde(default, alias = "src")]
    pub url: String,
}

impl PhotoSize {
    /// Pixel area of the variant, widened so large images cannot overflow
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether both dimensions are known
    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// A photo with all of its available size variants
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: i64,
    #[serde(default)]
    pub album_id: Option<i64>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub sizes: Vec<PhotoSize>,
}

/// The account that owns the access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Paged list returned by `photos.getAlbums` and `photos.get`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ItemList<T> {
    /// Total number of items on the server (may exceed `items.len()`)
    #[serde(default)]
    pub count: u32,
    pub items: Vec<T>,
}

/// Error body VK returns instead of `response`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VkErrorBody {
    pub error_code: i32,
    pub error_msg: String,
}

/// Envelope wrapping every VK method result
///
/// Exactly one of `response` or `error` is expected to be present. VK signals
/// failures with HTTP 200 and an `error` object, so callers must check both.
#[derive(Debug, Deserialize, Clone)]
pub struct Envelope<T> {
    pub response: Option<T>,
    pub error: Option<VkErrorBody>,
}

/// `groups.getById` result
///
/// Older API versions return a bare array, newer ones wrap it in `groups`.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum GroupsResponse {
    List(Vec<Group>),
    Wrapped { groups: Vec<Group> },
}

impl GroupsResponse {
    /// Consumes the response and returns the first community, if any
    pub fn into_first(self) -> Option<Group> {
        match self {
            GroupsResponse::List(groups) | GroupsResponse::Wrapped { groups } => {
                groups.into_iter().next()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_size_defaults_to_zero() {
        let album: Album = serde_json::from_str(r#"{"id": 7, "title": "Wall"}"#).unwrap();
        assert_eq!(album.photo_count, 0);
    }

    #[test]
    fn test_photo_size_accepts_strings_and_nulls() {
        let size: PhotoSize = serde_json::from_str(
            r#"{"type": "z", "width": "1280", "height": null, "url": "https://a/b.jpg"}"#,
        )
        .unwrap();
        assert_eq!(size.width, 1280);
        assert_eq!(size.height, 0);
        assert!(!size.has_dimensions());
    }

    #[test]
    fn test_photo_size_legacy_src_field() {
        let size: PhotoSize =
            serde_json::from_str(r#"{"type": "x", "src": "https://a/x.jpg"}"#).unwrap();
        assert_eq!(size.url, "https://a/x.jpg");
    }

    #[test]
    fn test_groups_response_both_shapes() {
        let list: GroupsResponse =
            serde_json::from_str(r#"[{"id": 1, "name": "Durov"}]"#).unwrap();
        assert_eq!(list.into_first().map(|g| g.id), Some(1));

        let wrapped: GroupsResponse =
            serde_json::from_str(r#"{"groups": [{"id": 2, "name": "Other"}], "profiles": []}"#)
                .unwrap();
        assert_eq!(wrapped.into_first().map(|g| g.name), Some("Other".to_string()));
    }
}
