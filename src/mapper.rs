use serde_json::Value;

use crate::error::{ScrapeError, ScrapeResult};
use crate::records::{MediaItem, PostRecord, ProfileRecord};

/// The profile endpoint nests its directly-keyed user fields under this
/// path; anything else in the response is wrapper structure.
const PROFILE_LEGACY_PATH: &[&str] = &["data", "user", "result", "legacy"];

/// Map a full profile endpoint response into a [`ProfileRecord`].
///
/// Only the traversal down to the legacy user object is mandatory; each of
/// the seven fields is an optional lookup that maps to null when absent.
pub fn map_profile(payload: &Value) -> ScrapeResult<ProfileRecord> {
    let legacy = traverse(payload, PROFILE_LEGACY_PATH)?;
    Ok(ProfileRecord {
        username: str_field(legacy, "screen_name"),
        display_name: str_field(legacy, "name"),
        followers: int_field(legacy, "followers_count"),
        following: int_field(legacy, "friends_count"),
        tweets_count: int_field(legacy, "statuses_count"),
        profile_banner_url: str_field(legacy, "profile_banner_url"),
        avatar_url: str_field(legacy, "profile_image_url_https"),
    })
}

/// Map one legacy post fragment into a [`PostRecord`].
///
/// `created_at` and `full_text` are mandatory; the engagement counts default
/// to 0 when absent. An absent or empty media list yields no media field.
pub fn map_post(legacy: &Value) -> ScrapeResult<PostRecord> {
    let created_at = str_field(legacy, "created_at")
        .ok_or_else(|| ScrapeError::missing("created_at"))?;
    let text =
        str_field(legacy, "full_text").ok_or_else(|| ScrapeError::missing("full_text"))?;
    Ok(PostRecord {
        created_at,
        text,
        quote_count: int_field(legacy, "quote_count").unwrap_or(0),
        reply_count: int_field(legacy, "reply_count").unwrap_or(0),
        retweet_count: int_field(legacy, "retweet_count").unwrap_or(0),
        bookmark_count: int_field(legacy, "bookmark_count").unwrap_or(0),
        media: media_items(legacy),
    })
}

/// Collect the secure media URLs from `entities.media`, in source order.
/// Entries without a URL are skipped; an empty result collapses to `None`.
fn media_items(legacy: &Value) -> Option<Vec<MediaItem>> {
    let entries = legacy.get("entities")?.get("media")?.as_array()?;
    let items: Vec<MediaItem> = entries
        .iter()
        .filter_map(|entry| entry.get("media_url_https").and_then(Value::as_str))
        .map(|url| MediaItem {
            url: url.to_string(),
        })
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Walk a mandatory key path, reporting the deepest missing segment as a
/// dotted path instead of faulting partway down.
pub(crate) fn traverse<'a>(value: &'a Value, path: &[&str]) -> ScrapeResult<&'a Value> {
    let mut current = value;
    for (depth, key) in path.iter().enumerate() {
        current = current
            .get(key)
            .ok_or_else(|| ScrapeError::missing(&path[..=depth].join(".")))?;
    }
    Ok(current)
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn int_field(value: &Value, key: &str) -> Option<u64> {
    value.get(key).and_then(Value::as_u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile_payload() -> Value {
        json!({
            "data": {
                "user": {
                    "result": {
                        "legacy": {
                            "screen_name": "spacewatch",
                            "name": "Space Watch",
                            "followers_count": 1042,
                            "friends_count": 31,
                            "statuses_count": 887,
                            "profile_banner_url": "https://pbs.example.com/banner",
                            "profile_image_url_https": "https://pbs.example.com/avatar"
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_map_profile_extracts_all_fields() {
        let profile = map_profile(&profile_payload()).unwrap();
        assert_eq!(profile.username.as_deref(), Some("spacewatch"));
        assert_eq!(profile.display_name.as_deref(), Some("Space Watch"));
        assert_eq!(profile.followers, Some(1042));
        assert_eq!(profile.following, Some(31));
        assert_eq!(profile.tweets_count, Some(887));
        assert_eq!(
            profile.profile_banner_url.as_deref(),
            Some("https://pbs.example.com/banner")
        );
        assert_eq!(
            profile.avatar_url.as_deref(),
            Some("https://pbs.example.com/avatar")
        );
    }

    #[test]
    fn test_map_profile_missing_optionals_become_null() {
        let payload = json!({
            "data": { "user": { "result": { "legacy": { "screen_name": "sparse" } } } }
        });
        let profile = map_profile(&payload).unwrap();
        assert_eq!(profile.username.as_deref(), Some("sparse"));
        assert_eq!(profile.display_name, None);
        assert_eq!(profile.followers, None);
        assert_eq!(profile.profile_banner_url, None);
    }

    #[test]
    fn test_map_profile_error_body_is_malformed() {
        let payload = json!({ "errors": [{ "message": "user not found" }] });
        let err = map_profile(&payload).unwrap_err();
        assert_eq!(err.to_string(), "malformed payload: missing field `data`");
    }

    #[test]
    fn test_map_profile_truncated_path_names_deepest_segment() {
        let payload = json!({ "data": { "user": {} } });
        let err = map_profile(&payload).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed payload: missing field `data.user.result`"
        );
    }

    #[test]
    fn test_map_post_extracts_counts() {
        let legacy = json!({
            "created_at": "Sat Feb 08 17:40:31 +0000 2025",
            "full_text": "launch window confirmed",
            "quote_count": 3,
            "reply_count": 14,
            "retweet_count": 27,
            "bookmark_count": 5
        });
        let post = map_post(&legacy).unwrap();
        assert_eq!(post.created_at, "Sat Feb 08 17:40:31 +0000 2025");
        assert_eq!(post.text, "launch window confirmed");
        assert_eq!(post.quote_count, 3);
        assert_eq!(post.reply_count, 14);
        assert_eq!(post.retweet_count, 27);
        assert_eq!(post.bookmark_count, 5);
        assert!(post.media.is_none());
    }

    #[test]
    fn test_map_post_bookmark_count_defaults_to_zero() {
        let legacy = json!({
            "created_at": "Sat Feb 08 17:40:31 +0000 2025",
            "full_text": "no bookmarks field here",
            "quote_count": 0,
            "reply_count": 0,
            "retweet_count": 0
        });
        let post = map_post(&legacy).unwrap();
        assert_eq!(post.bookmark_count, 0);
    }

    #[test]
    fn test_map_post_missing_created_at_is_malformed() {
        let legacy = json!({ "full_text": "orphaned text" });
        let err = map_post(&legacy).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed payload: missing field `created_at`"
        );
    }

    #[test]
    fn test_map_post_missing_full_text_is_malformed() {
        let legacy = json!({ "created_at": "Sat Feb 08 17:40:31 +0000 2025" });
        assert!(map_post(&legacy).is_err());
    }

    #[test]
    fn test_map_post_empty_media_list_omits_media() {
        let legacy = json!({
            "created_at": "Sat Feb 08 17:40:31 +0000 2025",
            "full_text": "text only",
            "entities": { "media": [] }
        });
        let post = map_post(&legacy).unwrap();
        assert!(post.media.is_none());
    }

    #[test]
    fn test_map_post_collects_media_urls_in_order() {
        let legacy = json!({
            "created_at": "Sat Feb 08 17:40:31 +0000 2025",
            "full_text": "two photos",
            "entities": {
                "media": [
                    { "media_url_https": "https://pbs.example.com/a.jpg" },
                    { "media_url_https": "https://pbs.example.com/b.jpg" }
                ]
            }
        });
        let post = map_post(&legacy).unwrap();
        let media = post.media.unwrap();
        assert_eq!(media.len(), 2);
        assert_eq!(media[0].url, "https://pbs.example.com/a.jpg");
        assert_eq!(media[1].url, "https://pbs.example.com/b.jpg");
    }

    #[test]
    fn test_map_post_media_entry_without_url_is_skipped() {
        let legacy = json!({
            "created_at": "Sat Feb 08 17:40:31 +0000 2025",
            "full_text": "one good photo",
            "entities": {
                "media": [
                    { "type": "animated_gif" },
                    { "media_url_https": "https://pbs.example.com/only.jpg" }
                ]
            }
        });
        let post = map_post(&legacy).unwrap();
        assert_eq!(post.media.unwrap().len(), 1);
    }
}
