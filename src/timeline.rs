use serde_json::Value;
use tracing::warn;

use crate::error::{ScrapeError, ScrapeResult};
use crate::mapper::{map_post, traverse};
use crate::records::PostRecord;

const INSTRUCTIONS_PATH: &[&str] = &[
    "data",
    "user",
    "result",
    "timeline_v2",
    "timeline",
    "instructions",
];

/// By convention of the timeline endpoint, the instruction at this index
/// wraps the single pinned/first post.
const PINNED_INSTRUCTION: usize = 1;
/// And the instruction at this index carries the ordered entries list.
const ENTRIES_INSTRUCTION: usize = 2;

const PINNED_POST_PATH: &[&str] = &[
    "entry",
    "content",
    "itemContent",
    "tweet_results",
    "result",
    "legacy",
];
const ENTRY_POST_PATH: &[&str] =
    &["content", "itemContent", "tweet_results", "result", "legacy"];

/// What to do with a timeline entry that does not carry a post (the entries
/// list occasionally mixes in cursor or module entries).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPolicy {
    /// Log the entry and keep going. The default.
    Skip,
    /// Fail the whole batch.
    Abort,
}

/// Extract at most `cap` posts from a full timeline response: the pinned
/// post first, then the entries in delivery order. The pinned post counts
/// toward the cap, and a `cap` of 1 never touches the entries instruction.
///
/// A missing or misshapen pinned/entries instruction fails the batch; a
/// misshapen individual entry is governed by `policy`. Entries that map to
/// the same record as the pinned post are dropped so it never appears twice.
pub fn extract_posts(
    payload: &Value,
    cap: usize,
    policy: EntryPolicy,
) -> ScrapeResult<Vec<PostRecord>> {
    let mut posts = Vec::new();
    if cap == 0 {
        return Ok(posts);
    }

    let instructions = traverse(payload, INSTRUCTIONS_PATH)?
        .as_array()
        .ok_or_else(|| ScrapeError::MalformedPayload("instructions is not an array".into()))?;

    let pinned_slot = instructions.get(PINNED_INSTRUCTION).ok_or_else(|| {
        ScrapeError::MalformedPayload(format!(
            "no pinned-post instruction at index {PINNED_INSTRUCTION}"
        ))
    })?;
    let pinned = map_post(traverse(pinned_slot, PINNED_POST_PATH)?)?;
    posts.push(pinned);
    if posts.len() >= cap {
        return Ok(posts);
    }

    let entries = instructions
        .get(ENTRIES_INSTRUCTION)
        .and_then(|slot| slot.get("entries"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ScrapeError::MalformedPayload(format!(
                "no entries instruction at index {ENTRIES_INSTRUCTION}"
            ))
        })?;

    for entry in entries {
        if posts.len() >= cap {
            break;
        }
        let post = traverse(entry, ENTRY_POST_PATH).and_then(map_post);
        match post {
            Ok(post) => {
                if post == posts[0] {
                    continue;
                }
                posts.push(post);
            }
            Err(err) => match policy {
                EntryPolicy::Skip => warn!("skipping timeline entry: {err}"),
                EntryPolicy::Abort => return Err(err),
            },
        }
    }

    Ok(posts)
}
