//! ABOUTME: Size selection and file naming helpers
//! ABOUTME: Picks the largest photo variant and builds filesystem-safe album and photo names

use crate::models::{Album, PhotoSize};

/// Characters that are reserved in Windows file names
const RESERVED_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Ranking of VK size type letters, used when a variant carries no dimensions
///
/// `w` (up to 2560px) > `z` (1280px) > `y` (807px) > `x` (604px) > `m` (130px) > `s` (75px).
pub fn size_type_priority(size_type: &str) -> u8 {
    match size_type {
        "w" => 6,
        "z" => 5,
        "y" => 4,
        "x" => 3,
        "m" => 2,
        "s" => 1,
        _ => 0,
    }
}

/// Selects the highest resolution variant of a photo
///
/// Variants without a URL are ignored. Among the rest:
/// 1. The variant with the largest `width * height` wins. When several share
///    the maximum area the first one encountered is returned.
/// 2. If no variant has both dimensions, the best size type letter wins.
/// 3. Failing that, the last variant with a URL is returned.
///
/// # Arguments
///
/// * `sizes` - The photo's size variants, in any order
///
/// # Returns
///
/// The selected variant, or `None` if no variant has a URL
pub fn select_best_size(sizes: &[PhotoSize]) -> Option<&PhotoSize> {
    let usable = || sizes.iter().filter(|s| !s.url.is_empty());

    let mut best: Option<&PhotoSize> = None;
    for size in usable().filter(|s| s.has_dimensions()) {
        match best {
            Some(current) if size.area() <= current.area() => {}
            _ => best = Some(size),
        }
    }
    if best.is_some() {
        return best;
    }

    let mut best_priority = 0;
    for size in usable() {
        let priority = size_type_priority(&size.size_type);
        if priority > best_priority {
            best_priority = priority;
            best = Some(size);
        }
    }
    if best.is_some() {
        return best;
    }

    usable().last()
}

/// Replaces Windows-reserved characters in a title with `_`
///
/// Every other character, including non-ASCII, is kept, so the output has
/// the same number of characters as the input.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Directory name for an album: `{id}_{sanitized title}`
pub fn album_dir_name(album: &Album) -> String {
    format!("{}_{}", album.id, sanitize_title(&album.title))
}

/// File name for a photo. Always `.jpg`, whatever the actual format.
pub fn photo_file_name(photo_id: i64) -> String {
    format!("{}.jpg", photo_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(size_type: &str, width: u32, height: u32, url: &str) -> PhotoSize {
        PhotoSize {
            size_type: size_type.to_string(),
            width,
            height,
            url: url.to_string(),
        }
    }

    #[test]
    fn test_select_best_size_by_area() {
        let sizes = vec![
            size("m", 100, 100, "A"),
            size("y", 800, 600, "B"),
            size("x", 200, 200, "C"),
        ];
        assert_eq!(select_best_size(&sizes).map(|s| s.url.as_str()), Some("B"));
    }

    #[test]
    fn test_select_best_size_area_beats_type_letter() {
        // A tall narrow image can be larger than its nominal type suggests
        let sizes = vec![size("w", 100, 100, "small-w"), size("s", 300, 900, "big-s")];
        assert_eq!(select_best_size(&sizes).map(|s| s.url.as_str()), Some("big-s"));
    }

    #[test]
    fn test_select_best_size_skips_missing_urls() {
        let sizes = vec![size("w", 2560, 1920, ""), size("z", 1280, 960, "Z")];
        assert_eq!(select_best_size(&sizes).map(|s| s.url.as_str()), Some("Z"));
    }

    #[test]
    fn test_select_best_size_falls_back_to_type_priority() {
        let sizes = vec![
            size("x", 0, 0, "X"),
            size("z", 0, 0, "Z"),
            size("m", 0, 0, "M"),
        ];
        assert_eq!(select_best_size(&sizes).map(|s| s.url.as_str()), Some("Z"));
    }

    #[test]
    fn test_select_best_size_falls_back_to_last_with_url() {
        let sizes = vec![size("a", 0, 0, "first"), size("b", 0, 0, "last"), size("c", 0, 0, "")];
        assert_eq!(select_best_size(&sizes).map(|s| s.url.as_str()), Some("last"));
    }

    #[test]
    fn test_select_best_size_empty() {
        assert!(select_best_size(&[]).is_none());
        assert!(select_best_size(&[size("w", 10, 10, "")]).is_none());
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Summer/2024"), "Summer_2024");
        assert_eq!(sanitize_title(r#"a<b>c:d"e/f\g|h?i*j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_title("Фото 2024"), "Фото 2024");
        assert_eq!(sanitize_title(""), "");
    }

    #[test]
    fn test_sanitize_title_keeps_length() {
        let titles = ["???", "Отдых: море/горы", "a\\b", "plain"];
        for title in titles {
            let sanitized = sanitize_title(title);
            assert_eq!(sanitized.chars().count(), title.chars().count());
            assert!(!sanitized.contains(&RESERVED_CHARS[..]));
        }
    }

    #[test]
    fn test_names() {
        let album = Album {
            id: 1,
            title: "Summer/2024".to_string(),
            photo_count: 3,
        };
        assert_eq!(album_dir_name(&album), "1_Summer_2024");
        assert_eq!(photo_file_name(456239017), "456239017.jpg");
    }
}
