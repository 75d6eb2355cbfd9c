use serde_json::json;
use vk_album_rs::models::{Album, Envelope, ItemList, Photo, VkErrorBody};

#[test]
fn test_album_list_deserialization() {
    let value = json!({
        "count": 2,
        "items": [
            { "id": 268951427, "title": "Отдых", "size": 470, "thumb_id": 1, "created": 1600000000 },
            { "id": -7, "title": "Wall photos", "size": 12 }
        ]
    });

    let list: ItemList<Album> = serde_json::from_value(value).unwrap();
    assert_eq!(list.count, 2);
    assert_eq!(list.items[0].title, "Отдых");
    assert_eq!(list.items[0].photo_count, 470);
    assert_eq!(list.items[1].id, -7);
}

#[test]
fn test_photo_deserialization() {
    let json_str = r#"
    {
        "id": 456239017,
        "album_id": 268951427,
        "owner_id": -1,
        "date": 1600000000,
        "text": "",
        "sizes": [
            { "type": "s", "width": 75, "height": 56, "url": "https://sun9-1.userapi.com/s.jpg" },
            { "type": "w", "width": 2560, "height": 1920, "url": "https://sun9-1.userapi.com/w.jpg" }
        ]
    }
    "#;

    let photo: Photo = serde_json::from_str(json_str).unwrap();
    assert_eq!(photo.id, 456239017);
    assert_eq!(photo.album_id, Some(268951427));
    assert_eq!(photo.owner_id, Some(-1));
    assert_eq!(photo.sizes.len(), 2);
    assert_eq!(photo.sizes[1].size_type, "w");
    assert_eq!(photo.sizes[1].area(), 2560 * 1920);
}

#[test]
fn test_photo_without_sizes() {
    let photo: Photo = serde_json::from_value(json!({ "id": 1 })).unwrap();
    assert!(photo.sizes.is_empty());
}

#[test]
fn test_envelope_with_error() {
    let envelope: Envelope<ItemList<Album>> = serde_json::from_value(json!({
        "error": {
            "error_code": 15,
            "error_msg": "Access denied",
            "request_params": [{ "key": "method", "value": "photos.getAlbums" }]
        }
    }))
    .unwrap();

    assert!(envelope.response.is_none());
    assert_eq!(
        envelope.error,
        Some(VkErrorBody {
            error_code: 15,
            error_msg: "Access denied".to_string()
        })
    );
}
