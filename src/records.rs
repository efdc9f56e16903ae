use serde::{Deserialize, Serialize};

/// Account-level metadata captured from the profile endpoint. Every field is
/// optional in the source payload; all seven keys are always serialized so
/// the output shape is stable across accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub tweets_count: Option<u64>,
    pub profile_banner_url: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
}

/// One post from the timeline endpoint. `created_at` is the source timestamp
/// string, preserved verbatim. A post with no media serializes without a
/// `media` key at all, matching the upstream output shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub created_at: String,
    pub text: String,
    pub quote_count: u64,
    pub reply_count: u64,
    pub retweet_count: u64,
    pub bookmark_count: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub media: Option<Vec<MediaItem>>,
}

/// The aggregated result of one capture session. Either key may be absent
/// when the corresponding endpoint was never observed; partial capture is a
/// normal outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSnapshot {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user: Option<ProfileRecord>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub posts: Option<Vec<PostRecord>>,
}
