use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::mapper::map_profile;
use crate::store::ResultStore;
use crate::timeline::{extract_posts, EntryPolicy};

/// Only requests whose URL matches this pattern are paused for inspection;
/// the rest of the page's traffic is never touched.
pub const INTERCEPT_URL_PATTERN: &str = "*graphql*";

/// Endpoint-name substring identifying the profile metadata call.
pub const PROFILE_MARKER: &str = "UserByScreenName";
/// Endpoint-name substring identifying the timeline page call.
pub const TIMELINE_MARKER: &str = "UserTweets";

/// Capability handed to the router for each intercepted exchange: fetch the
/// full response body and decode it as JSON. Implemented over CDP in the
/// browser module and by fakes in tests.
#[async_trait]
pub trait BodyFetcher: Send + Sync {
    async fn fetch_json(&self) -> Result<Value>;
}

/// What the router did with a request. Either way the caller forwards the
/// original request unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterAction {
    PassThrough,
    FetchThenForward,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndpointMatch {
    pub profile: bool,
    pub timeline: bool,
}

impl EndpointMatch {
    pub fn any(self) -> bool {
        self.profile || self.timeline
    }
}

pub struct Router {
    post_cap: usize,
    entry_policy: EntryPolicy,
}

impl Router {
    pub fn new(post_cap: usize, entry_policy: EntryPolicy) -> Self {
        Self {
            post_cap,
            entry_policy,
        }
    }

    /// Substring classification against the two recognized endpoint names.
    /// Deliberately non-exclusive: both classes are evaluated independently.
    pub fn classify(url: &str) -> EndpointMatch {
        EndpointMatch {
            profile: url.contains(PROFILE_MARKER),
            timeline: url.contains(TIMELINE_MARKER),
        }
    }

    /// Handle one intercepted request. On a classification miss nothing is
    /// fetched. On a match, each matched class fetches the body on its own
    /// and merges its records into `store`; a failure in either branch is
    /// logged and dropped so the page session is never aborted by a bad
    /// payload.
    pub async fn on_request(
        &self,
        url: &str,
        fetcher: &dyn BodyFetcher,
        store: &mut ResultStore,
    ) -> RouterAction {
        let matched = Self::classify(url);
        if !matched.any() {
            return RouterAction::PassThrough;
        }

        if matched.profile {
            match fetcher.fetch_json().await {
                Ok(payload) => match map_profile(&payload) {
                    Ok(profile) => {
                        info!("captured profile metadata");
                        store.merge_user(profile);
                    }
                    Err(err) => warn!("dropping profile payload: {err}"),
                },
                Err(err) => warn!("failed to read profile response body: {err}"),
            }
        }

        if matched.timeline {
            match fetcher.fetch_json().await {
                Ok(payload) => match extract_posts(&payload, self.post_cap, self.entry_policy) {
                    Ok(posts) => {
                        info!(count = posts.len(), "captured timeline posts");
                        store.merge_posts(posts);
                    }
                    Err(err) => warn!("dropping timeline payload: {err}"),
                },
                Err(err) => warn!("failed to read timeline response body: {err}"),
            }
        }

        RouterAction::FetchThenForward
    }
}
