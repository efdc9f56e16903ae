use std::fs;
use std::path::Path;

use crate::error::{ScrapeError, ScrapeResult};
use crate::records::{PostRecord, ProfileRecord, ResultSnapshot};

/// Session-scoped accumulator for whatever the interception router manages
/// to capture. One store per session; merges are last-write-wins, though in
/// practice each slot is written at most once.
#[derive(Debug, Default)]
pub struct ResultStore {
    snapshot: ResultSnapshot,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_user(&mut self, user: ProfileRecord) {
        self.snapshot.user = Some(user);
    }

    pub fn merge_posts(&mut self, posts: Vec<PostRecord>) {
        self.snapshot.posts = Some(posts);
    }

    /// Both endpoints have contributed; nothing more is expected from the
    /// page.
    pub fn is_complete(&self) -> bool {
        self.snapshot.user.is_some() && self.snapshot.posts.is_some()
    }

    pub fn snapshot(&self) -> &ResultSnapshot {
        &self.snapshot
    }

    /// Write the snapshot as pretty-printed UTF-8 JSON. Non-ASCII text is
    /// preserved literally. The store is untouched on failure, so the caller
    /// can retry with another path.
    pub fn save(&self, path: &Path) -> ScrapeResult<()> {
        let mut body = serde_json::to_vec_pretty(&self.snapshot).map_err(|err| {
            ScrapeError::Serialization {
                path: path.to_path_buf(),
                source: err.into(),
            }
        })?;
        body.push(b'\n');
        fs::write(path, body).map_err(|err| ScrapeError::Serialization {
            path: path.to_path_buf(),
            source: err,
        })
    }
}
